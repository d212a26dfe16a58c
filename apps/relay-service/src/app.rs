//! # アプリケーション組み立て
//!
//! ルーター・HTTP ミドルウェア・メール送信バックエンドを設定から組み立てる。
//!
//! ## ミドルウェア構成（外側から）
//!
//! ```text
//! TraceLayer → CorsLayer → RequestBodyLimitLayer → セキュリティヘッダー
//!   → 429 本文の置き換え → GovernorLayer → ルート
//! ```
//!
//! レート制限はクライアント IP ごとのトークンバケット。接続元アドレスを `ConnectInfo<SocketAddr>` から
//! 取得するため、`into_make_service_with_connect_info::<SocketAddr>()` で起動すること。

use std::sync::Arc;

use axum::{
    Json,
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use hrslife_domain::notification::MailError;
use hrslife_infra::mail::{MailSender, NoopMailSender, SmtpMailSender};
use hrslife_shared::{
    ErrorResponse,
    event_log::{error, event},
    log_business_event,
};
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::{
    config::{ConfigError, HttpConfig, MailBackend, MailConfig, RateLimitConfig, RelayConfig},
    handler::{
        HealthState,
        RelayState,
        health_check,
        ping,
        submit_contact,
        submit_donation,
        submit_volunteer,
    },
};

/// レート制限超過時に返す文言
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests from this IP, please try again later.";

/// ルーターを構築する（ミドルウェアなし）
pub fn routes(relay_state: Arc<RelayState>, health_state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/ping", get(ping))
        .with_state(health_state)
        .route("/api/contact", post(submit_contact))
        .route("/api/donation-confirmation", post(submit_donation))
        .route("/api/volunteer", post(submit_volunteer))
        .with_state(relay_state)
}

/// クライアント IP ごとのレート制限を付与する
///
/// 最大 `max_requests` 件まで連続で受け付け、トークンは `window_secs / max_requests` ごとに
/// 1 つずつ補充される。超過時は `{ "error": RATE_LIMITED_MESSAGE }` の 429 を返す。
pub fn with_rate_limit(router: Router, limit: &RateLimitConfig) -> Result<Router, ConfigError> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_millisecond(limit.replenish_interval_ms()?)
        .burst_size(limit.max_requests)
        .finish()
        .ok_or_else(|| ConfigError::InvalidValue {
            name:  "RATE_LIMIT_MAX_REQUESTS",
            value: limit.max_requests.to_string(),
        })?;

    Ok(router
        .layer(GovernorLayer::new(Arc::new(governor_conf)))
        .layer(middleware::map_response(rate_limited_body)))
}

/// GovernorLayer の 429 本文を他のエラーと同じ JSON 形状に置き換える
///
/// `Retry-After` などのヘッダーはそのまま残す。
async fn rate_limited_body(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);
    (parts, Json(ErrorResponse::new(RATE_LIMITED_MESSAGE))).into_response()
}

/// CORS・ボディサイズ制限・セキュリティヘッダー・リクエストトレースを付与する
pub fn with_http_layers(router: Router, http: &HttpConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(http.allowed_origins.iter().cloned()))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    router
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        // Json 抽出器の既定上限（2MB）を設定値に合わせる
        .layer(DefaultBodyLimit::max(http.body_limit_bytes))
        .layer(RequestBodyLimitLayer::new(http.body_limit_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// ルーターとすべてのミドルウェアを組み立てる
pub fn build_app(
    relay_state: Arc<RelayState>,
    health_state: Arc<HealthState>,
    config: &RelayConfig,
) -> Result<Router, ConfigError> {
    let router = with_rate_limit(routes(relay_state, health_state), &config.rate_limit)?;
    Ok(with_http_layers(router, &config.http))
}

/// 設定に応じたメール送信バックエンドを作成する
pub fn build_mail_sender(mail: &MailConfig) -> Result<Arc<dyn MailSender>, MailError> {
    match mail.backend {
        MailBackend::Smtp => {
            tracing::info!(
                smtp.host = %mail.smtp.host,
                smtp.port = mail.smtp.port,
                "SMTP メール送信を使用します"
            );
            Ok(Arc::new(SmtpMailSender::new(&mail.smtp)?))
        }
        MailBackend::Noop => {
            tracing::warn!("MAIL_BACKEND=noop: メールは送信されません（ログ出力のみ）");
            Ok(Arc::new(NoopMailSender))
        }
    }
}

/// 起動時にメール送信設定を検証する
///
/// 結果はログに出力するだけで、失敗してもサーバーの起動は止めない。
/// 検証に成功したかを返す。
pub async fn verify_mail_transport(sender: Arc<dyn MailSender>) -> bool {
    match sender.verify().await {
        Ok(()) => {
            log_business_event!(
                event.category = event::category::MAIL,
                event.action = event::action::MAIL_TRANSPORT_VERIFIED,
                event.result = event::result::SUCCESS,
                "メール送信の準備ができました (ready)"
            );
            true
        }
        Err(e) => {
            tracing::error!(
                event.kind = "business_event",
                event.category = event::category::MAIL,
                event.action = event::action::MAIL_TRANSPORT_VERIFIED,
                event.result = event::result::FAILURE,
                error.category = error::category::EXTERNAL_SERVICE,
                error.kind = error::kind::MAIL_CONFIGURATION,
                "メール送信設定の検証に失敗しました（リクエストは受け付けますが送信は失敗します）: {}",
                e
            );
            false
        }
    }
}
