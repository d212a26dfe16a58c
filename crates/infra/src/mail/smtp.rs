//! SMTP メール送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 本番では Gmail などの SMTP リレー（アプリパスワード認証）、
//! 開発環境では Mailpit（ローカル SMTP サーバー、TLS なし）に接続する。

use std::str::FromStr;

use async_trait::async_trait;
use hrslife_domain::notification::{MailError, OutboundMessage};
use lettre::{
    Address,
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox, Message, MultiPart},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use super::MailSender;

/// SMTP 接続の暗号化方式（`SMTP_TLS`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpSecurity {
    /// 接続直後から TLS（465 番ポート）
    #[default]
    Tls,
    /// STARTTLS で昇格（587 番ポート）
    StartTls,
    /// 平文（Mailpit 等のローカル SMTP 向け）
    None,
}

impl SmtpSecurity {
    /// `SMTP_PORT` 未設定時に使うポート
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Tls => 465,
            Self::StartTls => 587,
            Self::None => 25,
        }
    }
}

#[derive(Debug, Error)]
#[error("SMTP_TLS は tls / starttls / none のいずれかである必要があります: {0:?}")]
pub struct InvalidSmtpSecurity(String);

impl FromStr for SmtpSecurity {
    type Err = InvalidSmtpSecurity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tls" => Ok(Self::Tls),
            "starttls" => Ok(Self::StartTls),
            "none" => Ok(Self::None),
            _ => Err(InvalidSmtpSecurity(s.to_string())),
        }
    }
}

/// SMTP 接続設定
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host:     String,
    pub port:     u16,
    pub security: SmtpSecurity,
    /// 認証ユーザー（未設定なら認証しない）
    pub username: Option<String>,
    pub password: Option<String>,
}

/// SMTP メール送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
/// トランスポートは内部で接続プールを持つため、プロセスで 1 つだけ作成して共有する。
pub struct SmtpMailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// 接続はここでは行わない（最初の送信または [`MailSender::verify`] で行われる）。
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let builder = match settings.security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .map_err(|e| MailError::BuildFailed(format!("SMTP リレー設定失敗: {e}")))?,
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                    .map_err(|e| MailError::BuildFailed(format!("STARTTLS 設定失敗: {e}")))?
            }
            // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            }
        };

        let mut builder = builder.port(settings.port);
        if let Some(username) = &settings.username {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                settings.password.clone().unwrap_or_default(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

/// `OutboundMessage` を lettre のメッセージ（text + HTML の multipart/alternative）に変換する
fn build_message(message: &OutboundMessage) -> Result<Message, MailError> {
    let from_address: Address = message
        .from
        .address
        .parse()
        .map_err(|e| MailError::InvalidAddress(format!("送信元 {}: {e}", message.from.address)))?;
    let from = Mailbox::new(Some(message.from.name.clone()), from_address);

    let to: Mailbox = message
        .to
        .parse()
        .map_err(|e| MailError::InvalidAddress(format!("宛先 {}: {e}", message.to)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(&message.subject)
        .multipart(MultiPart::alternative_plain_html(
            message.text_body.clone(),
            message.html_body.clone(),
        ))
        .map_err(|e| MailError::BuildFailed(e.to_string()))
}

#[async_trait]
impl MailSender for SmtpMailSender {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        let email = build_message(message)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        Ok(())
    }

    async fn verify(&self) -> Result<(), MailError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailError::SendFailed(
                "SMTP サーバーが接続確認に応答しませんでした".to_string(),
            )),
            Err(e) => Err(MailError::SendFailed(format!("SMTP 接続確認失敗: {e}"))),
        }
    }
}
