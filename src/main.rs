use chrono::{Datelike, Local};
use clap::Parser;
use dialoguer::{Confirm, Input};
use ecoscan::{capture, cli, config, error, history, pipeline, server, views};
use ecoscan::ai_provider::AiProvider;
use ecoscan::classifier::{build_classifier, Classifier, GeminiClient};
use cli::{Cli, Commands};
use config::Config;
use ecoscan_common::{rank_centers, Coordinates, ImageInput, ProfileStats, TipCursor, RECYCLING_CENTERS};
use error::{EcoScanError, Result};
use history::{HistoryStore, Persistence};
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::{ScanPipeline, ScanState};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use views::View;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("エラー: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "ecoscan=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 失敗を画面に表示済みの場合は `ExitCode::FAILURE` を返す
async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load()?;
    config.validate()?;
    let provider = cli.provider.unwrap_or(config.provider);

    if let Some(view) = cli.command.view() {
        print!("{}", views::render_header(view));
    }

    match cli.command {
        Commands::Welcome => {
            print!("{}", views::render_welcome());
            let start = Confirm::new()
                .with_prompt("Get Started")
                .default(true)
                .interact()
                .map_err(|e| EcoScanError::Prompt(e.to_string()))?;
            if !start {
                return Ok(ExitCode::SUCCESS);
            }

            let path: String = Input::new()
                .with_prompt("画像ファイルのパス")
                .interact_text()
                .map_err(|e| EcoScanError::Prompt(e.to_string()))?;
            print!("\n{}", views::render_header(View::Scanner));
            let input = capture::image_input_from_file(Path::new(path.trim()))?;
            return scan(&config, provider, input).await;
        }

        Commands::Scan { image, camera } => {
            let input = match (image, camera) {
                (Some(path), _) => capture::image_input_from_file(&path)?,
                (None, Some(dir)) => capture_from_camera(&config, dir)?,
                (None, None) => {
                    return Err(EcoScanError::Config("画像またはカメラを指定してください".into()))
                }
            };
            return scan(&config, provider, input).await;
        }

        Commands::History { limit } => {
            let store = open_history(&config)?;
            let items = store.list();
            let shown = &items[..limit.unwrap_or(items.len()).min(items.len())];
            print!("{}", views::render_history(shown));
        }

        Commands::Map { lat, lng } => {
            let explicit = lat.zip(lng).map(|(lat, lng)| Coordinates::new(lat, lng));
            match views::locate(explicit, config.home_location) {
                Ok(location) => {
                    let ranked = rank_centers(location, RECYCLING_CENTERS);
                    print!("{}", views::render_map(location, &ranked));
                }
                Err(e) => {
                    print!("{}", views::render_location_error(&e.to_string()));
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Commands::Profile => {
            let store = open_history(&config)?;
            let stats = ProfileStats::from_history(store.list());
            print!("{}", views::render_profile(&stats));
        }

        Commands::Tips { next, prev, day } => {
            let day = day.unwrap_or_else(|| Local::now().ordinal());
            let mut cursor = TipCursor::for_day(day);
            if next {
                cursor = cursor.next();
            } else if prev {
                cursor = cursor.prev();
            }
            print!("{}", views::render_tip(cursor));
        }

        Commands::Serve { addr } => {
            let classifier: Option<Arc<dyn Classifier>> = match GeminiClient::from_config(&config) {
                Ok(client) => Some(Arc::new(client)),
                Err(EcoScanError::MissingApiKey) => None,
                Err(e) => return Err(e),
            };
            server::serve(addr, classifier).await?;
        }

        Commands::Config { set_api_key, set_endpoint, set_location, show } => {
            let mut changed = false;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if let Some(endpoint) = set_endpoint {
                config.endpoint = endpoint;
                changed = true;
            }

            if let Some((lat, lng)) = set_location {
                let location = Coordinates::new(lat, lng);
                if !location.is_valid() {
                    return Err(EcoScanError::Config(format!("座標が範囲外です: {}, {}", lat, lng)));
                }
                config.home_location = Some(location);
                changed = true;
            }

            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show {
                print_config(&config, provider)?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn open_history(config: &Config) -> Result<HistoryStore> {
    Ok(HistoryStore::open_dir(&config.data_dir()?))
}

fn capture_from_camera(config: &Config, dir: PathBuf) -> Result<ImageInput> {
    let camera = capture::SnapshotCamera::new(dir);
    let mut session =
        capture::CameraSession::open(camera, config.max_image_size, config.jpeg_quality)?;
    tracing::debug!(facing = ?session.facing(), "camera opened");
    session.capture()
}

async fn scan(config: &Config, provider: AiProvider, input: ImageInput) -> Result<ExitCode> {
    let mut store = open_history(config)?;
    let classifier = build_classifier(config, provider)?;
    let mut pipeline = ScanPipeline::new(classifier)
        .with_timeout(Duration::from_secs(config.timeout_seconds));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Analyzing...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let submitted = pipeline.submit(&mut store, input).await;
    spinner.finish_and_clear();

    match submitted {
        Ok(outcome) => {
            print!("{}", views::render_result(&outcome.item.result, &outcome.item.image));
            println!("\n+{} eco points", outcome.item.points);
            if let Persistence::Degraded(reason) = outcome.persistence {
                eprintln!("⚠ 履歴を保存できませんでした（今回の結果は表示のみ）: {}", reason);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => match pipeline.state() {
            ScanState::Failed { preview, message } => {
                print!("{}", views::render_failure(preview, message));
                Ok(ExitCode::FAILURE)
            }
            _ => Err(e),
        },
    }
}

fn print_config(config: &Config, provider: AiProvider) -> Result<()> {
    println!("設定:");
    println!("  設定ファイル: {}", Config::config_path()?.display());
    println!("  プロバイダ: {}", provider);
    println!("  エンドポイント: {}", config.endpoint);
    println!("  モデル: {}", config.model);
    println!("  最大画像サイズ: {}px", config.max_image_size);
    println!("  タイムアウト: {}秒", config.timeout_seconds);
    println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
    match config.home_location {
        Some(loc) => println!("  既定位置: {}, {}", loc.lat, loc.lng),
        None => println!("  既定位置: 未設定"),
    }
    println!("  履歴: {}", config.data_dir()?.display());
    Ok(())
}
