//! 画像入力モジュール
//!
//! カメラ画像・ファイルのどちらからでも `ImageInput`（Base64 + MIME）を作る。
//! 不正な画像はここで弾き、パイプラインには渡さない。

mod camera;

pub use camera::{CameraDevice, CameraSession, Facing, SnapshotCamera};

use crate::error::{EcoScanError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ecoscan_common::ImageInput;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::path::Path;

/// カメラ画像の長辺上限(px)
pub const MAX_CAPTURE_DIMENSION: u32 = 1024;

/// 拡張子からMIMEタイプを判定（`image` が認識する形式のみ）
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type())
}

/// ファイルから入力画像を作る
///
/// ファイルのバイト列はそのままBase64化する（縮小しない）
pub fn image_input_from_file(path: &Path) -> Result<ImageInput> {
    if !path.is_file() {
        return Err(EcoScanError::FileNotFound(path.display().to_string()));
    }

    let mime_type = mime_type_for(path).ok_or_else(|| {
        EcoScanError::ImageDecode(format!("unsupported image type: {}", path.display()))
    })?;

    let bytes = std::fs::read(path)?;
    image_input_from_bytes(&bytes, mime_type)
}

/// バイト列から入力画像を作る（デコードできることを確認）
pub fn image_input_from_bytes(bytes: &[u8], mime_type: &str) -> Result<ImageInput> {
    if bytes.is_empty() {
        return Err(EcoScanError::ImageDecode("empty file".into()));
    }
    image::load_from_memory(bytes)
        .map_err(|e| EcoScanError::ImageDecode(e.to_string()))?;

    tracing::debug!(mime_type, size = bytes.len(), "image input prepared");
    Ok(ImageInput::new(STANDARD.encode(bytes), mime_type))
}

/// 長辺を `max_dimension` 以下にした寸法（アスペクト比維持）
pub fn downscale_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let (mut w, mut h) = (width, height);
    if w > h {
        if w > max_dimension {
            h = ((h as f64) * (max_dimension as f64 / w as f64)).round() as u32;
            w = max_dimension;
        }
    } else if h > max_dimension {
        w = ((w as f64) * (max_dimension as f64 / h as f64)).round() as u32;
        h = max_dimension;
    }
    (w.max(1), h.max(1))
}

/// 長辺を `max_dimension` 以下に縮小
pub fn downscale(image: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (w, h) = downscale_dimensions(image.width(), image.height(), max_dimension);
    if (w, h) == (image.width(), image.height()) {
        image
    } else {
        image.resize_exact(w, h, FilterType::Triangle)
    }
}

/// JPEGエンコード
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| EcoScanError::ImageEncode(e.to_string()))?;
    Ok(buf)
}

/// フレームを縮小・JPEG化して入力画像にする
pub fn image_input_from_frame(
    frame: DynamicImage,
    max_dimension: u32,
    quality: u8,
) -> Result<ImageInput> {
    let resized = downscale(frame, max_dimension);
    let jpeg = encode_jpeg(&resized, quality)?;
    Ok(ImageInput::new(STANDARD.encode(jpeg), "image/jpeg"))
}
