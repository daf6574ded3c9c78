//! 中継サーバ
//!
//! ブラウザから画像を受け取り、サーバ側のAPIキーで分類APIを呼ぶ。
//! `POST /api/analyze-image` `{ base64ImageData, mimeType }`

use crate::classifier::Classifier;
use crate::error::{EcoScanError, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use ecoscan_common::{ClassifyRequest, ErrorBody};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub const ANALYZE_PATH: &str = "/api/analyze-image";

/// リクエストボディの上限（無加工の写真をBase64化した分を含む）
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

const MISSING_FIELDS: &str = "Missing required fields: base64ImageData and mimeType";
const MISSING_KEY: &str =
    "GEMINI_API_KEY is not configured. Please set it in the server environment.";

#[derive(Clone)]
struct RelayState {
    /// APIキー未設定ならNone
    classifier: Option<Arc<dyn Classifier>>,
}

/// 中継サーバのルーター
pub fn relay_router(classifier: Option<Arc<dyn Classifier>>) -> Router {
    Router::new()
        .route(ANALYZE_PATH, post(analyze_image).fallback(method_not_allowed))
        .with_state(RelayState { classifier })
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
}

fn error_response(status: StatusCode, error: &str, message: Option<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
            message,
        }),
    )
        .into_response()
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None)
}

async fn analyze_image(
    State(state): State<RelayState>,
    body: std::result::Result<Json<ClassifyRequest>, JsonRejection>,
) -> Response {
    let Some(classifier) = state.classifier else {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, MISSING_KEY, None);
    };

    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("rejected request body: {}", rejection);
            return match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => error_response(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "Request body too large",
                    Some(rejection.body_text()),
                ),
                _ => error_response(StatusCode::BAD_REQUEST, MISSING_FIELDS, None),
            };
        }
    };

    if request.base64_image_data.trim().is_empty() || request.mime_type.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, MISSING_FIELDS, None);
    }

    let input = ecoscan_common::ImageInput::new(request.base64_image_data, request.mime_type);
    match classifier.classify(&input).await {
        Ok(result) => {
            tracing::info!(item = %result.item_name, "image analyzed");
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(e) => {
            tracing::error!("Error in analyze-image API: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to analyze image",
                Some(e.to_string()),
            )
        }
    }
}

/// サーバを起動し、Ctrl+Cで停止するまで待つ
pub async fn serve(addr: SocketAddr, classifier: Option<Arc<dyn Classifier>>) -> Result<()> {
    if classifier.is_none() {
        tracing::warn!("GEMINI_API_KEY is not configured; every analyze request will fail");
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| EcoScanError::Server(format!("{} にバインドできません: {}", addr, e)))?;
    let local = listener.local_addr()?;
    tracing::info!("relay listening on http://{}{}", local, ANALYZE_PATH);
    println!("✔ 中継サーバ起動: http://{}{}", local, ANALYZE_PATH);

    axum::serve(listener, relay_router(classifier))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await
        .map_err(|e| EcoScanError::Server(e.to_string()))
}
