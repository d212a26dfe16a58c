//! # テスト用モックメール送信
//!
//! リレーのテストで使用するインメモリのメール送信。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! hrslife-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use hrslife_domain::notification::{MailError, OutboundMessage};

use crate::mail::MailSender;

// ===== MockMailSender =====

/// 送信内容を記録するモック
///
/// `fail_for` で指定した宛先への送信は失敗させる。片方だけ失敗する組み合わせを
/// 決定的に再現するために使う。送信試行はすべて `attempts` に記録される。
#[derive(Clone, Default)]
pub struct MockMailSender {
    attempts:           Arc<Mutex<Vec<OutboundMessage>>>,
    delivered:          Arc<Mutex<Vec<OutboundMessage>>>,
    failing_recipients: Arc<Mutex<HashSet<String>>>,
    verify_fails:       Arc<Mutex<bool>>,
}

impl MockMailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定した宛先への送信を失敗させる
    pub fn fail_for(&self, recipient: impl Into<String>) {
        self.failing_recipients
            .lock()
            .unwrap()
            .insert(recipient.into());
    }

    /// `verify` を失敗させる
    pub fn fail_verify(&self) {
        *self.verify_fails.lock().unwrap() = true;
    }

    /// 送信試行されたメール（失敗したものも含む）
    pub fn attempts(&self) -> Vec<OutboundMessage> {
        self.attempts.lock().unwrap().clone()
    }

    /// 送信に成功したメール
    pub fn delivered(&self) -> Vec<OutboundMessage> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSender for MockMailSender {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        self.attempts.lock().unwrap().push(message.clone());

        if self.failing_recipients.lock().unwrap().contains(&message.to) {
            return Err(MailError::SendFailed(format!(
                "mock: {} への送信を拒否",
                message.to
            )));
        }

        self.delivered.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn verify(&self) -> Result<(), MailError> {
        if *self.verify_fails.lock().unwrap() {
            return Err(MailError::SendFailed("mock: 認証情報が不正".to_string()));
        }
        Ok(())
    }
}
