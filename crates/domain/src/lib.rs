//! # HRS Life ドメイン層
//!
//! 公開サイトのフォーム送信（お問い合わせ・寄付通知・ボランティア応募）を
//! メールで中継するためのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **検証済み型**: 未検証フォーム（`*Form`）は検証を通過したときだけ
//!   必須項目が `String` になった型に変換される。メール生成は検証済み型しか受け取らない
//! - **純粋性**: このクレートは I/O を行わない。時刻は [`clock::Clock`] で注入する
//! - **永続化なし**: すべての値は 1 リクエストの間だけ生存する
//!
//! ## 依存関係の方向
//!
//! ```text
//! relay-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`submission`] - フォーム種別、未検証フォーム、検証済みレコード、検証エラー
//! - [`reference_code`] - 受付番号（`RCPT-` / `VOL-`）の発行
//! - [`notification`] - 送信メールとメール送信エラー
//! - [`clock`] - 時刻プロバイダ
//!
//! ## 使用例
//!
//! ```rust
//! use hrslife_domain::submission::{ContactForm, ValidationPolicy, validate};
//!
//! let form = ContactForm {
//!     first_name: Some("Asha".to_string()),
//!     last_name: Some("Rao".to_string()),
//!     email: Some("a@x.com".to_string()),
//!     message: Some("Hello".to_string()),
//!     ..Default::default()
//! };
//!
//! let contact = validate(form, &ValidationPolicy::default()).unwrap();
//! assert_eq!(contact.subject_or_default(), "General Inquiry");
//! ```

pub mod clock;
pub mod notification;
pub mod reference_code;
pub mod submission;

pub use submission::{SubmissionKind, ValidationError};
