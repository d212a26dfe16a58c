//! # フォーム送信の中継
//!
//! 公開サイトのフォーム送信を検証し、送信者と事務局にメールで届ける。
//!
//! ```text
//! フォーム → validate → (受付番号の発行) → NotificationComposer → MailSender × 2
//! ```

mod composer;
mod service;

pub use composer::{ComposerSettings, NotificationComposer};
pub use service::{RelayReceipt, SubmissionRelay};
