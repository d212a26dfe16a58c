//! # Relay Service 設定
//!
//! 環境変数から中継サーバーの設定を読み込む。
//!
//! すべての項目に既定値があり、`EMAIL_USER` などが未設定でも起動できる。
//! その場合 `/api/health` は `services.email = false` を返し、
//! 中継リクエストは送信時に失敗する。

use std::{collections::HashMap, env, str::FromStr};

use axum::http::HeaderValue;
use hrslife_domain::submission::ValidationPolicy;
use hrslife_infra::mail::{InvalidSmtpSecurity, SmtpSecurity, SmtpSettings};
use thiserror::Error;

use crate::usecase::relay::ComposerSettings;

/// 公開サイトのオリジン（`CORS_ALLOWED_ORIGINS` 未設定時）
pub const DEFAULT_ALLOWED_ORIGINS: &str =
    "https://www.hrslifecharitabletrust.com,https://hrslifecharitabletrust.com";

/// 送信者向けメールの差出人表示名（`MAIL_SENDER_NAME` 未設定時）
pub const DEFAULT_SENDER_NAME: &str = "Help Rescue Secure Life Charitable Trust";

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} は有効な数値である必要があります: {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} の値が不正です: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("SMTP_TLS の値が不正です: {0}")]
    SmtpSecurity(#[from] InvalidSmtpSecurity),

    #[error("CORS_ALLOWED_ORIGINS に不正なオリジンがあります: {0:?}")]
    InvalidOrigin(String),
}

/// Relay Service サーバーの設定
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// バインドアドレス
    pub host:       String,
    /// ポート番号
    pub port:       u16,
    pub mail:       MailConfig,
    pub http:       HttpConfig,
    pub rate_limit: RateLimitConfig,
    pub validation: ValidationPolicy,
}

/// 送信バックエンド（`MAIL_BACKEND`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailBackend {
    /// SMTP リレー経由で送信
    #[default]
    Smtp,
    /// 送信しない（ログ出力のみ）
    Noop,
}

impl FromStr for MailBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smtp" => Ok(Self::Smtp),
            "noop" => Ok(Self::Noop),
            _ => Err(ConfigError::InvalidValue {
                name:  "MAIL_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

/// メール送信の設定
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub backend:            MailBackend,
    pub smtp:               SmtpSettings,
    /// 送信アカウント（`EMAIL_USER`）。全メールの送信元アドレスになる
    pub account_address:    Option<String>,
    /// 送信者向けメールの差出人表示名
    pub sender_name:        String,
    /// 事務局の受信箱（`NGO_OWNER_EMAIL`）
    pub organization_inbox: Option<String>,
}

impl MailConfig {
    /// 送信アカウントが設定されているか
    pub fn email_configured(&self) -> bool {
        self.account_address.is_some()
    }

    /// 事務局の受信箱。未設定なら送信アカウント宛てに送る
    pub fn organization_inbox(&self) -> &str {
        self.organization_inbox
            .as_deref()
            .or(self.account_address.as_deref())
            .unwrap_or_default()
    }

    pub fn composer_settings(&self) -> ComposerSettings {
        ComposerSettings {
            sender_name:        self.sender_name.clone(),
            account_address:    self.account_address.clone().unwrap_or_default(),
            organization_inbox: self.organization_inbox().to_string(),
        }
    }
}

/// HTTP 層の設定
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// CORS で許可するオリジン
    pub allowed_origins:  Vec<HeaderValue>,
    /// リクエストボディの上限（バイト）
    pub body_limit_bytes: usize,
}

/// レート制限の設定（クライアント IP ごと）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// ウィンドウあたりの最大リクエスト数
    pub max_requests: u32,
    /// ウィンドウ長（秒）
    pub window_secs:  u64,
}

impl RateLimitConfig {
    /// トークン 1 個が補充されるまでの間隔（ミリ秒）
    ///
    /// ウィンドウをミリ秒に換算して `u64` に収まらなければエラー。
    pub fn replenish_interval_ms(&self) -> Result<u64, ConfigError> {
        let window_ms =
            self.window_secs
                .checked_mul(1000)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name:  "RATE_LIMIT_WINDOW_SECS",
                    value: self.window_secs.to_string(),
                })?;
        Ok((window_ms / u64::from(self.max_requests)).max(1))
    }
}

impl RelayConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// キーと値の組から設定を読み込む
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| vars.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // 空文字列は未設定として扱う
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let account_address = var("EMAIL_USER");
        let security = var("SMTP_TLS")
            .map(|v| v.parse::<SmtpSecurity>())
            .transpose()?
            .unwrap_or_default();
        let smtp = SmtpSettings {
            host: var("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            // ポート未指定なら暗号化方式の標準ポート
            port: parse_number("SMTP_PORT", var("SMTP_PORT"), security.default_port())?,
            security,
            username: account_address.clone(),
            password: var("EMAIL_PASS"),
        };

        let mail = MailConfig {
            backend: var("MAIL_BACKEND")
                .map(|v| v.parse::<MailBackend>())
                .transpose()?
                .unwrap_or_default(),
            smtp,
            account_address,
            sender_name: var("MAIL_SENDER_NAME").unwrap_or_else(|| DEFAULT_SENDER_NAME.to_string()),
            organization_inbox: var("NGO_OWNER_EMAIL"),
        };

        let http = HttpConfig {
            allowed_origins:  parse_origins(
                var("CORS_ALLOWED_ORIGINS")
                    .as_deref()
                    .unwrap_or(DEFAULT_ALLOWED_ORIGINS),
            )?,
            body_limit_bytes: parse_number("BODY_LIMIT_BYTES", var("BODY_LIMIT_BYTES"), 10 * 1024 * 1024)?,
        };

        let rate_limit = RateLimitConfig {
            max_requests: parse_positive("RATE_LIMIT_MAX_REQUESTS", var("RATE_LIMIT_MAX_REQUESTS"), 50)?,
            window_secs:  parse_positive("RATE_LIMIT_WINDOW_SECS", var("RATE_LIMIT_WINDOW_SECS"), 15 * 60)?,
        };
        rate_limit.replenish_interval_ms()?;

        let validation = ValidationPolicy {
            strict_volunteer: parse_flag(
                "VOLUNTEER_STRICT_VALIDATION",
                var("VOLUNTEER_STRICT_VALIDATION"),
            )?,
        };

        Ok(Self {
            host: var("RELAY_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_number("PORT", var("PORT"), 3001)?,
            mail,
            http,
            rate_limit,
            validation,
        })
    }
}

fn parse_number<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}

fn parse_positive<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + Default,
{
    let parsed = parse_number(name, value, default)?;
    if parsed == T::default() {
        return Err(ConfigError::InvalidValue {
            name,
            value: "0".to_string(),
        });
    }
    Ok(parsed)
}

fn parse_flag(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { name, value }),
    }
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidOrigin(origin.to_string()))
        })
        .collect()
}
