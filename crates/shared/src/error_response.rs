//! # エラーレスポンス
//!
//! フォーム送信 API で共通のエラーレスポンス構造体を提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換はサービス側の責務（shared に axum 依存を入れない）
//! - 公開サイトのフロントエンドが `error` フィールドのみを参照するため、
//!   形状は `{ "error": "..." }` に固定する

use serde::{Deserialize, Serialize};

/// エラーレスポンス
///
/// `error` には利用者に表示してよい固定文言のみを入れる。
/// 内部エラーの詳細はログにのみ出力する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
