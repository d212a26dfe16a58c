//! # ヘルスチェックハンドラ
//!
//! サーバーの稼働状態を確認するためのエンドポイント。
//!
//! ## エンドポイント
//!
//! ```text
//! GET /api/health
//! GET /api/ping
//! ```
//!
//! ## レスポンス例
//!
//! ```json
//! {
//!   "status": "OK",
//!   "message": "NGO Email Backend Server is running",
//!   "timestamp": "2026-10-19T09:30:00.000Z",
//!   "services": { "email": true }
//! }
//! ```
//!
//! `services.email` はメール送信アカウントが設定されているかだけを示す。
//! SMTP への疎通は確認しない（起動時の検証ログを参照）。

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::SecondsFormat;
use hrslife_domain::clock::Clock;
use hrslife_shared::{HealthResponse, PingResponse, ServiceStatus};

/// ヘルスチェックの State
pub struct HealthState {
    pub email_configured: bool,
    pub clock:            Arc<dyn Clock>,
}

/// ヘルスチェックエンドポイント
pub async fn health_check(State(state): State<Arc<HealthState>>) -> Json<HealthResponse> {
    let timestamp = state
        .clock
        .now()
        .to_rfc3339_opts(SecondsFormat::Millis, true);

    Json(HealthResponse::ok(
        timestamp,
        ServiceStatus {
            email: state.email_configured,
        },
    ))
}

/// 死活確認エンドポイント
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse::alive())
}
