//! Noop メール送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! ローカル開発やメール無効化時に使用する。

use async_trait::async_trait;
use hrslife_domain::notification::{MailError, OutboundMessage};

use super::MailSender;

/// Noop メール送信（ログ出力のみ）
#[derive(Debug, Clone, Default)]
pub struct NoopMailSender;

#[async_trait]
impl MailSender for NoopMailSender {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        tracing::info!(
            to = %message.to,
            audience = %message.audience,
            subject = %message.subject,
            "Noop: メール送信をスキップ"
        );
        Ok(())
    }

    async fn verify(&self) -> Result<(), MailError> {
        tracing::info!("Noop: メール送信は無効化されています");
        Ok(())
    }
}
