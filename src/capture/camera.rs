//! カメラ入力
//!
//! デバイスは `CameraDevice` として抽象化する。`CameraSession` は
//! 取得したデバイスを保持し、drop時に必ず停止する。

use super::{image_input_from_frame, MAX_CAPTURE_DIMENSION};
use crate::error::{EcoScanError, Result};
use ecoscan_common::ImageInput;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// カメラの向き
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// 背面カメラ
    Environment,
    /// 任意のカメラ
    Any,
}

pub trait CameraDevice {
    fn start(&mut self, facing: Facing) -> Result<()>;
    fn grab_frame(&mut self) -> Result<DynamicImage>;
    fn stop(&mut self);
}

/// 起動済みカメラ。スコープを抜けると停止する
pub struct CameraSession<D: CameraDevice> {
    device: D,
    facing: Facing,
    max_dimension: u32,
    quality: u8,
}

impl<D: CameraDevice> CameraSession<D> {
    /// 背面カメラ優先で起動し、失敗したら任意のカメラで再試行
    ///
    /// 長辺の上限は `MAX_CAPTURE_DIMENSION` を超えない
    pub fn open(mut device: D, max_dimension: u32, quality: u8) -> Result<Self> {
        let facing = match device.start(Facing::Environment) {
            Ok(()) => Facing::Environment,
            Err(e) => {
                tracing::warn!("environment camera unavailable, falling back to any camera: {}", e);
                if let Err(fallback) = device.start(Facing::Any) {
                    device.stop();
                    return Err(EcoScanError::CameraUnavailable(fallback.to_string()));
                }
                Facing::Any
            }
        };

        Ok(Self {
            device,
            facing,
            max_dimension: max_dimension.clamp(1, MAX_CAPTURE_DIMENSION),
            quality,
        })
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// 現在のフレームを縮小・JPEG化して返す
    pub fn capture(&mut self) -> Result<ImageInput> {
        let frame = self.device.grab_frame()?;
        tracing::debug!(width = frame.width(), height = frame.height(), "frame captured");
        image_input_from_frame(frame, self.max_dimension, self.quality)
    }
}

impl<D: CameraDevice> Drop for CameraSession<D> {
    fn drop(&mut self) {
        self.device.stop();
    }
}

/// スナップショットディレクトリを読むカメラ
///
/// 外部の撮影ツールが書き出した最新の画像をフレームとして扱う。
/// `environment/` サブディレクトリが背面カメラ、ルート直下が任意カメラ。
#[derive(Debug)]
pub struct SnapshotCamera {
    root: PathBuf,
    active: Option<PathBuf>,
}

impl SnapshotCamera {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn latest_frame(dir: &Path) -> Result<Option<PathBuf>> {
        let mut latest: Option<(SystemTime, PathBuf)> = None;
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || super::mime_type_for(&path).is_none() {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            let newer = match &latest {
                Some((t, p)) => modified > *t || (modified == *t && path > *p),
                None => true,
            };
            if newer {
                latest = Some((modified, path));
            }
        }
        Ok(latest.map(|(_, p)| p))
    }
}

impl CameraDevice for SnapshotCamera {
    fn start(&mut self, facing: Facing) -> Result<()> {
        let dir = match facing {
            Facing::Environment => self.root.join("environment"),
            Facing::Any => self.root.clone(),
        };
        if !dir.is_dir() {
            return Err(EcoScanError::CameraUnavailable(format!(
                "no camera feed at {}",
                dir.display()
            )));
        }
        tracing::debug!(?facing, dir = %dir.display(), "snapshot camera started");
        self.active = Some(dir);
        Ok(())
    }

    fn grab_frame(&mut self) -> Result<DynamicImage> {
        let dir = self
            .active
            .as_ref()
            .ok_or_else(|| EcoScanError::CameraUnavailable("camera not started".into()))?;
        let frame = Self::latest_frame(dir)?
            .ok_or_else(|| EcoScanError::CameraUnavailable("no frame available".into()))?;
        image::open(&frame).map_err(|e| EcoScanError::ImageDecode(e.to_string()))
    }

    fn stop(&mut self) {
        if self.active.take().is_some() {
            tracing::debug!("snapshot camera stopped");
        }
    }
}
