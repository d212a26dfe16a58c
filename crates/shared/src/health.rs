//! # ヘルスチェック共通型
//!
//! `/api/health` と `/api/ping` が返すレスポンス型を提供する。

use serde::{Deserialize, Serialize};

/// 依存サービスの設定状況
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// メール送信アカウントが設定されているか
    pub email: bool,
}

/// ヘルスチェックレスポンス
///
/// `status` は常に `"OK"`。メール設定の有無は `services.email` で判断する。
/// リレー処理の成否とは独立しており、SMTP への疎通までは確認しない。
///
/// ## 使用例
///
/// ```
/// use hrslife_shared::{HealthResponse, ServiceStatus};
///
/// let response = HealthResponse::ok("2026-10-19T00:00:00Z", ServiceStatus { email: true });
/// assert_eq!(response.status, "OK");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status:    String,
    pub message:   String,
    /// RFC 3339 形式の応答時刻
    pub timestamp: String,
    pub services:  ServiceStatus,
}

impl HealthResponse {
    pub fn ok(timestamp: impl Into<String>, services: ServiceStatus) -> Self {
        Self {
            status: "OK".to_string(),
            message: "NGO Email Backend Server is running".to_string(),
            timestamp: timestamp.into(),
            services,
        }
    }
}

/// 死活確認レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub success: bool,
    pub message: String,
}

impl PingResponse {
    pub fn alive() -> Self {
        Self {
            success: true,
            message: "Backend is alive".to_string(),
        }
    }
}
