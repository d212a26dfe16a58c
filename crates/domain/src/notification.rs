//! # 送信メール
//!
//! フォーム送信 1 件につき生成される 2 通のメール（利用者向けの受付確認と
//! 事務局向けの通知）と、メール送信のエラーを定義する。
//!
//! ## 設計方針
//!
//! - **宛先ごとに独立**: 2 通は互いに依存せず、別々に送信・失敗しうる
//! - **受付番号の共有**: [`SubmissionNotice`] が検証済みレコードと受付番号を束ね、
//!   2 通のメールに同じ番号が入ることを保証する
//! - **テンプレート分離**: 本文の生成は relay-service の Composer が担当する

use serde::Serialize;
use strum::IntoStaticStr;
use thiserror::Error;

use crate::{
    reference_code::ReferenceCode,
    submission::{ContactRequest, DonationNotice, SubmissionKind, VolunteerApplication},
};

/// メール送信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailError {
    /// 宛先・送信元アドレスが不正
    #[error("メールアドレスが不正: {0}")]
    InvalidAddress(String),

    /// メッセージの組み立てに失敗
    #[error("メッセージ構築に失敗: {0}")]
    BuildFailed(String),

    /// 送信（SMTP 通信）に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),
}

/// メールの宛先区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, IntoStaticStr, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Audience {
    /// フォームを送信した本人
    Submitter,
    /// 事務局の受信箱
    Organization,
}

/// 送信元の表示名とアドレス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    pub name:    String,
    pub address: String,
}

/// 送信メール
///
/// Composer の出力。MailSender に渡される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub audience:  Audience,
    pub from:      SenderIdentity,
    /// 送信先メールアドレス
    pub to:        String,
    pub subject:   String,
    /// HTML 本文（利用者入力はエスケープ済み）
    pub html_body: String,
    /// プレーンテキスト本文
    pub text_body: String,
}

/// 1 件の送信から生成される 2 通のメール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePair {
    pub submitter:    OutboundMessage,
    pub organization: OutboundMessage,
}

/// メール生成の入力となる検証済みの送信内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionNotice {
    Contact(ContactRequest),
    Donation {
        notice:  DonationNotice,
        receipt: ReferenceCode,
    },
    Volunteer {
        application:    VolunteerApplication,
        application_id: ReferenceCode,
    },
}

impl SubmissionNotice {
    pub fn kind(&self) -> SubmissionKind {
        match self {
            Self::Contact(_) => SubmissionKind::Contact,
            Self::Donation { .. } => SubmissionKind::DonationNotice,
            Self::Volunteer { .. } => SubmissionKind::VolunteerApplication,
        }
    }

    /// 受付番号（お問い合わせには無い）
    pub fn reference(&self) -> Option<&ReferenceCode> {
        match self {
            Self::Contact(_) => None,
            Self::Donation { receipt, .. } => Some(receipt),
            Self::Volunteer { application_id, .. } => Some(application_id),
        }
    }

    /// 送信者本人のメールアドレス
    pub fn submitter_email(&self) -> &str {
        match self {
            Self::Contact(contact) => contact.email(),
            Self::Donation { notice, .. } => notice.email(),
            Self::Volunteer { application, .. } => application.email(),
        }
    }
}

/// 2 通の送信結果
///
/// 片方が失敗してももう片方の送信は取り消されない。両方の結果をそのまま保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub submitter:    Result<(), MailError>,
    pub organization: Result<(), MailError>,
}

impl DispatchOutcome {
    /// 両方成功なら `Ok`、どちらかが失敗していれば [`DispatchFailure`] を返す
    pub fn into_result(self, kind: SubmissionKind) -> Result<(), DispatchFailure> {
        match (self.submitter, self.organization) {
            (Ok(()), Ok(())) => Ok(()),
            (submitter, organization) => Err(DispatchFailure {
                kind,
                submitter: submitter.err(),
                organization: organization.err(),
            }),
        }
    }
}

/// メール配送の失敗
///
/// 失敗した宛先のエラーだけを保持する。`None` の宛先には配送済み。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: メール配送に失敗しました (失敗した宛先: {})", self.failed_audiences_label())]
pub struct DispatchFailure {
    pub kind:         SubmissionKind,
    pub submitter:    Option<MailError>,
    pub organization: Option<MailError>,
}

impl DispatchFailure {
    pub fn failed_audiences(&self) -> Vec<Audience> {
        let mut failed = Vec::with_capacity(2);
        if self.submitter.is_some() {
            failed.push(Audience::Submitter);
        }
        if self.organization.is_some() {
            failed.push(Audience::Organization);
        }
        failed
    }

    /// 片方の宛先には届いている
    pub fn partially_delivered(&self) -> bool {
        self.submitter.is_none() || self.organization.is_none()
    }

    fn failed_audiences_label(&self) -> String {
        self.failed_audiences()
            .iter()
            .map(Audience::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
