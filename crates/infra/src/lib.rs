//! # HRS Life インフラ層
//!
//! 外部システム（SMTP サーバー）との通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! ドメイン層の送信メール（`OutboundMessage`）を実際に配送する実装を提供する。
//! 送信手段は [`mail::MailSender`] trait で抽象化し、プロセス起動時に 1 つ構築して
//! 全リクエストで読み取り専用に共有する。
//!
//! ## 依存関係
//!
//! ```text
//! relay-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`mail`] - メール送信 trait と SMTP / Noop 実装
//! - `mock` - テスト用のインメモリ送信（`test-utils` feature）

pub mod mail;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use mail::{MailSender, NoopMailSender, SmtpMailSender, SmtpSecurity, SmtpSettings};
