//! # メール送信
//!
//! 送信メールの配送を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `MailSender` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（本番・Mailpit）、Noop（ログ出力のみ）
//! - **環境変数切替**: `MAIL_BACKEND` でランタイム選択
//! - **1 通 = 1 結果**: 送信は 1 通ごとに成功か失敗のどちらか。リトライはしない

mod noop;
mod smtp;

use async_trait::async_trait;
use hrslife_domain::notification::{MailError, OutboundMessage};
pub use noop::NoopMailSender;
pub use smtp::{InvalidSmtpSecurity, SmtpMailSender, SmtpSecurity, SmtpSettings};

/// メール送信トレイト
///
/// リレー処理の唯一の I/O。テストでは `MockMailSender` に差し替える。
#[async_trait]
pub trait MailSender: Send + Sync {
    /// メールを 1 通送信する
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError>;

    /// 送信設定（接続先・認証情報）を検証する
    ///
    /// 起動時に 1 度だけ呼ばれる。失敗してもサーバーは起動を続ける。
    async fn verify(&self) -> Result<(), MailError>;
}
