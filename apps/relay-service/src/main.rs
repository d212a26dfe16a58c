//! # Relay Service サーバー
//!
//! 公開サイトのフォームから呼ばれる唯一のバックエンド。
//!
//! ```text
//! ┌──────────────┐  JSON   ┌──────────────┐  SMTP   ┌──────────────┐
//! │  公開サイト   │────────→│Relay Service │────────→│ SMTP リレー   │
//! └──────────────┘         └──────────────┘         └──────────────┘
//!                                                     ├→ 送信者
//!                                                     └→ 事務局
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `RELAY_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `PORT` | No | ポート番号（デフォルト: `3001`） |
//! | `EMAIL_USER` | No | 送信アカウント。未設定だと送信は失敗する |
//! | `EMAIL_PASS` | No | SMTP パスワード（アプリパスワード） |
//! | `NGO_OWNER_EMAIL` | No | 事務局の受信箱（デフォルト: `EMAIL_USER`） |
//! | `MAIL_BACKEND` | No | `smtp`（デフォルト）または `noop` |
//!
//! その他の変数は [`hrslife_relay_service::config`] を参照。
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（メールは送らずログのみ）
//! MAIL_BACKEND=noop cargo run -p hrslife-relay-service
//!
//! # 本番環境
//! EMAIL_USER=... EMAIL_PASS=... cargo run -p hrslife-relay-service --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use hrslife_domain::{
    clock::{Clock, SystemClock},
    reference_code::MonotonicReferenceCodes,
};
use hrslife_relay_service::{
    app,
    config::RelayConfig,
    handler::{HealthState, RelayState},
    usecase::{SubmissionRelay, relay::NotificationComposer},
};
use hrslife_shared::observability::{self, TracingConfig};
use tokio::net::TcpListener;
use tracing::Instrument as _;

/// Relay Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env("relay-service");
    observability::init_tracing(&tracing_config)
        .context("トレーシングの初期化に失敗しました")?;
    let _tracing_guard =
        tracing::info_span!("app", service = %tracing_config.service_name).entered();

    // 設定読み込み
    let config = RelayConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Relay Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );
    tracing::info!(
        email_configured = config.mail.email_configured(),
        "メール送信アカウント: {}",
        if config.mail.email_configured() {
            "設定済み"
        } else {
            "未設定"
        }
    );

    // メール送信バックエンド
    let sender =
        app::build_mail_sender(&config.mail).context("メール送信の初期化に失敗しました")?;
    tokio::spawn(app::verify_mail_transport(Arc::clone(&sender)).in_current_span());

    // 依存コンポーネントを初期化
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let composer = NotificationComposer::new(config.mail.composer_settings())
        .context("メールテンプレートの読み込みに失敗しました")?;
    let relay = SubmissionRelay::new(
        sender,
        composer,
        Arc::new(MonotonicReferenceCodes::new(Arc::clone(&clock))),
        Arc::clone(&clock),
        config.validation,
    );
    let relay_state = Arc::new(RelayState { relay });
    let health_state = Arc::new(HealthState {
        email_configured: config.mail.email_configured(),
        clock,
    });

    // ルーター構築
    let app = app::build_app(relay_state, health_state, &config)?;

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Relay Service サーバーが起動しました: {}", addr);

    // レート制限が接続元アドレスを参照する
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
