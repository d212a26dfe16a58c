//! # Observability 基盤
//!
//! 中継サーバーのログ出力を初期化する。
//!
//! ## 設計方針
//!
//! - **出力形式**: `LOG_FORMAT=json` で 1 行 1 JSON（本番のログ収集向け）、それ以外は Pretty
//! - **フィルタ**: `RUST_LOG` が優先。未設定なら [`DEFAULT_FILTER`]
//! - **SMTP のやり取りは出さない**: lettre は debug 以下で SMTP の対話を出力するため、
//!   既定では warn に抑える。フォームの本文や認証情報をログに残さない
//! - **初期化は一度だけ**: 二重初期化はパニックではなくエラーとして返す

/// `RUST_LOG` 未設定時のフィルタ
///
/// `tower_http=debug` は `TraceLayer` のリクエスト開始・終了ログを出すために必要。
pub const DEFAULT_FILTER: &str = "info,hrslife=debug,tower_http=debug,lettre=warn";

/// ログ出力形式（`LOG_FORMAT`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 行 1 JSON
    Json,
    /// 人間が読みやすい形式（開発環境向け）
    #[default]
    Pretty,
}

impl LogFormat {
    /// 大文字小文字と前後の空白を無視してパースする
    ///
    /// 不明な値は [`Pretty`](LogFormat::Pretty) にフォールバックし、stderr に警告を出す
    /// （subscriber の初期化前に呼ばれるため `tracing` は使えない）。
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" | "" => Self::Pretty,
            _ => {
                eprintln!("WARNING: unknown LOG_FORMAT={s:?}, falling back to pretty");
                Self::Pretty
            }
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// サービス名（ルートスパンの `service` フィールドに出力）
    pub service_name: String,
    pub log_format:   LogFormat,
    /// `EnvFilter` のディレクティブ
    pub filter:       String,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
            filter: DEFAULT_FILTER.to_string(),
        }
    }

    /// `LOG_FORMAT` と `RUST_LOG` から設定を作る
    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self::from_lookup(service_name, |name| std::env::var(name).ok())
    }

    fn from_lookup(
        service_name: impl Into<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let log_format = lookup("LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or_default();
        let filter = lookup("RUST_LOG")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        Self {
            service_name: service_name.into(),
            log_format,
            filter,
        }
    }
}

/// トレーシングを初期化する
///
/// JSON モードではイベントのフィールドをトップレベルに展開し、現在のスパン
/// （`app` スパンの `service` など）を付与する。
/// サービス名は呼び出し元が `tracing::info_span!("app", service = ...)` で付与する。
///
/// subscriber が既に設定されていればエラーを返す。
#[cfg(feature = "observability")]
pub fn init_tracing(
    config: &TracingConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::{Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.filter))
        .with(fmt_layer)
        .try_init()
}

/// ディレクティブが不正なら警告を出して [`DEFAULT_FILTER`] を使う
#[cfg(feature = "observability")]
fn env_filter(directives: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|e| {
        eprintln!("WARNING: invalid RUST_LOG={directives:?} ({e}), falling back to {DEFAULT_FILTER}");
        tracing_subscriber::EnvFilter::new(DEFAULT_FILTER)
    })
}
