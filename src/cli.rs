use crate::ai_provider::AiProvider;
use crate::views::View;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ecoscan")]
#[command(about = "写真からリサイクル可否を判定するスキャナ", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 分類プロバイダ (relay/gemini)。省略時は設定ファイルの値
    #[arg(long, global = true)]
    pub provider: Option<AiProvider>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// はじめに（説明を表示してスキャンを開始）
    Welcome,

    /// 画像を判定して履歴に追加
    Scan {
        /// 画像ファイルのパス
        #[arg(required_unless_present = "camera", conflicts_with = "camera")]
        image: Option<PathBuf>,

        /// スナップショットディレクトリをカメラとして使う
        #[arg(long)]
        camera: Option<PathBuf>,
    },

    /// スキャン履歴を表示
    History {
        /// 表示件数
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// 近くのリサイクルセンター
    Map {
        /// 緯度（省略時は設定の既定位置）
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// 経度
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },

    /// 統計と実績
    Profile,

    /// 今日のエコTip
    Tips {
        /// 次のTip
        #[arg(long, conflicts_with = "prev")]
        next: bool,

        /// 前のTip
        #[arg(long)]
        prev: bool,

        /// 日付の代わりに通算日(1-366)を指定
        #[arg(long)]
        day: Option<u32>,
    },

    /// 中継サーバを起動
    Serve {
        /// 待ち受けアドレス
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 中継サーバのエンドポイントを設定
        #[arg(long)]
        set_endpoint: Option<String>,

        /// 既定位置を設定（"緯度,経度"）
        #[arg(long, value_parser = parse_location, allow_hyphen_values = true)]
        set_location: Option<(f64, f64)>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

impl Commands {
    /// 対応する画面（サーバ・設定は画面なし）
    pub fn view(&self) -> Option<View> {
        match self {
            Commands::Welcome => Some(View::Welcome),
            Commands::Scan { .. } | Commands::Tips { .. } => Some(View::Scanner),
            Commands::History { .. } => Some(View::History),
            Commands::Map { .. } => Some(View::Map),
            Commands::Profile => Some(View::Profile),
            Commands::Serve { .. } | Commands::Config { .. } => None,
        }
    }
}

fn parse_location(s: &str) -> Result<(f64, f64), String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("\"緯度,経度\" の形式で指定してください: {}", s))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("緯度が不正です: {}", e))?;
    let lng: f64 = lng.trim().parse().map_err(|e| format!("経度が不正です: {}", e))?;
    Ok((lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_image() {
        let cli = Cli::try_parse_from(["ecoscan", "scan", "bottle.jpg", "--provider", "gemini"]).unwrap();
        assert_eq!(cli.provider, Some(AiProvider::Gemini));
        match cli.command {
            Commands::Scan { image, camera } => {
                assert_eq!(image, Some(PathBuf::from("bottle.jpg")));
                assert!(camera.is_none());
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_scan_requires_source() {
        assert!(Cli::try_parse_from(["ecoscan", "scan"]).is_err());
        assert!(Cli::try_parse_from(["ecoscan", "scan", "a.jpg", "--camera", "snap"]).is_err());
    }

    #[test]
    fn test_map_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["ecoscan", "map", "--lat", "13.0"]).is_err());
        let cli = Cli::try_parse_from(["ecoscan", "map", "--lat", "-33.9", "--lng", "151.2"]).unwrap();
        assert!(matches!(cli.command, Commands::Map { lat: Some(_), lng: Some(_) }));
    }

    #[test]
    fn test_parse_location() {
        assert_eq!(parse_location("13.08, 80.27"), Ok((13.08, 80.27)));
        assert!(parse_location("13.08").is_err());
        assert!(parse_location("a,b").is_err());
    }

    #[test]
    fn test_command_views() {
        let cli = Cli::try_parse_from(["ecoscan", "history"]).unwrap();
        assert_eq!(cli.command.view(), Some(View::History));
        let cli = Cli::try_parse_from(["ecoscan", "serve"]).unwrap();
        assert_eq!(cli.command.view(), None);
    }
}
