//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、中継処理は `usecase` に委譲

pub mod health;
pub mod submission;

pub use health::{HealthState, health_check, ping};
pub use submission::{
    RelayState,
    SubmissionAccepted,
    submit_contact,
    submit_donation,
    submit_volunteer,
};
