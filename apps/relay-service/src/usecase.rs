//! # ユースケース層
//!
//! フォーム送信の中継ロジックを実装する。ハンドラはここに処理を委譲する。

pub mod relay;

pub use relay::{RelayReceipt, SubmissionRelay};
