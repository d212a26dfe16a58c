//! # Relay Service エラー定義
//!
//! 中継処理のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! レスポンス本文は `{"error": "..."}` の固定メッセージだけを返す。
//! 不足項目の一覧や SMTP のエラー内容はログにのみ出力する。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hrslife_domain::{
    SubmissionKind,
    ValidationError,
    notification::{DispatchFailure, MailError},
};
use hrslife_shared::{ErrorResponse, event_log::error};
use thiserror::Error;

/// 中継処理で発生するエラー
#[derive(Debug, Error)]
pub enum RelayError {
    /// 必須項目が不足している
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    /// どちらか（または両方）のメール送信に失敗した
    #[error(transparent)]
    DispatchFailed(#[from] DispatchFailure),

    /// メール生成に失敗した
    #[error("{kind}: メール生成に失敗: {source}")]
    Compose {
        kind:   SubmissionKind,
        #[source]
        source: MailError,
    },
}

impl RelayError {
    pub fn kind(&self) -> SubmissionKind {
        match self {
            Self::Rejected(e) => e.kind,
            Self::DispatchFailed(e) => e.kind,
            Self::Compose { kind, .. } => *kind,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::DispatchFailed(_) | Self::Compose { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 必須項目不足時のメッセージ
pub fn rejection_message(kind: SubmissionKind) -> &'static str {
    match kind {
        SubmissionKind::Contact | SubmissionKind::DonationNotice => "Missing required fields",
        SubmissionKind::VolunteerApplication => "Required fields are missing",
    }
}

/// 処理失敗時のメッセージ
pub fn failure_message(kind: SubmissionKind) -> &'static str {
    match kind {
        SubmissionKind::Contact => "Failed to process contact form",
        SubmissionKind::DonationNotice => "Failed to process donation",
        SubmissionKind::VolunteerApplication => "Failed to process volunteer application",
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = self.status();

        let message = match &self {
            RelayError::Rejected(e) => {
                tracing::debug!(
                    submission.kind = %kind,
                    missing_fields = ?e.missing_fields,
                    "必須項目不足のためリクエストを拒否"
                );
                rejection_message(kind)
            }
            RelayError::DispatchFailed(e) => {
                tracing::error!(
                    error.category = error::category::EXTERNAL_SERVICE,
                    error.kind = error::kind::MAIL_DELIVERY,
                    submission.kind = %kind,
                    partially_delivered = e.partially_delivered(),
                    "メール配送エラー: {}",
                    e
                );
                failure_message(kind)
            }
            RelayError::Compose { source, .. } => {
                tracing::error!(
                    error.category = error::category::INTERNAL,
                    error.kind = error::kind::TEMPLATE,
                    submission.kind = %kind,
                    "メール生成エラー: {}",
                    source
                );
                failure_message(kind)
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
