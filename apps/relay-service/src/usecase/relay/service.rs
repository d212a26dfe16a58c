//! # 中継サービス
//!
//! 検証 → 受付番号の発行 → メール生成 → 2 通の同時送信 を統合するサービス。
//!
//! ## 設計方針
//!
//! - **全成功のみ成功**: 2 通のどちらかが失敗すればリクエストは失敗扱い。
//!   ただし片方の失敗でもう片方の送信を取り消すことはない
//! - **リトライしない**: 送信は 1 通につき 1 回だけ試行する
//! - **依存性注入**: `MailSender`、`ReferenceCodeGenerator`、`Clock` は trait で抽象化

use std::sync::Arc;

use hrslife_domain::{
    SubmissionKind,
    ValidationError,
    clock::Clock,
    notification::{DispatchOutcome, SubmissionNotice},
    reference_code::{ReferenceCode, ReferenceCodeGenerator, ReferencePrefix},
    submission::{ContactForm, DonationForm, ValidationPolicy, VolunteerForm, validate},
};
use hrslife_infra::mail::MailSender;
use hrslife_shared::{event_log::event, log_business_event};

use super::NotificationComposer;
use crate::error::RelayError;

/// 中継結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReceipt {
    pub kind:      SubmissionKind,
    /// 受付番号（お問い合わせには無い）
    pub reference: Option<ReferenceCode>,
}

/// フォーム送信の中継サービス
///
/// 起動時に 1 つ作成し、全リクエストで共有する。リクエスト間で共有する可変状態は
/// 受付番号の発行器だけ。
pub struct SubmissionRelay {
    sender:   Arc<dyn MailSender>,
    composer: NotificationComposer,
    codes:    Arc<dyn ReferenceCodeGenerator>,
    clock:    Arc<dyn Clock>,
    policy:   ValidationPolicy,
}

impl SubmissionRelay {
    pub fn new(
        sender: Arc<dyn MailSender>,
        composer: NotificationComposer,
        codes: Arc<dyn ReferenceCodeGenerator>,
        clock: Arc<dyn Clock>,
        policy: ValidationPolicy,
    ) -> Self {
        Self {
            sender,
            composer,
            codes,
            clock,
            policy,
        }
    }

    /// お問い合わせを中継する
    pub async fn relay_contact(&self, form: ContactForm) -> Result<RelayReceipt, RelayError> {
        let contact = validate(form, &self.policy).map_err(reject)?;
        self.dispatch(SubmissionNotice::Contact(contact)).await
    }

    /// 寄付通知を中継する
    ///
    /// 検証を通過したときだけ領収番号（`RCPT-`）を発行する。
    pub async fn relay_donation(&self, form: DonationForm) -> Result<RelayReceipt, RelayError> {
        let notice = validate(form, &self.policy).map_err(reject)?;
        let receipt = self.codes.issue(ReferencePrefix::Receipt);
        self.dispatch(SubmissionNotice::Donation { notice, receipt })
            .await
    }

    /// ボランティア応募を中継する
    ///
    /// 検証を通過したときだけ応募番号（`VOL-`）を発行する。
    pub async fn relay_volunteer(&self, form: VolunteerForm) -> Result<RelayReceipt, RelayError> {
        let application = validate(form, &self.policy).map_err(reject)?;
        let application_id = self.codes.issue(ReferencePrefix::Volunteer);
        self.dispatch(SubmissionNotice::Volunteer {
            application,
            application_id,
        })
        .await
    }

    /// 2 通のメールを生成し、同時に送信する
    async fn dispatch(&self, notice: SubmissionNotice) -> Result<RelayReceipt, RelayError> {
        let kind = notice.kind();
        let kind_str: &str = kind.into();
        let reference = notice.reference().cloned();
        let reference_str = reference.as_ref().map(ToString::to_string).unwrap_or_default();

        let messages = self
            .composer
            .compose(&notice, self.clock.now())
            .map_err(|source| RelayError::Compose { kind, source })?;

        let (submitter, organization) = tokio::join!(
            self.sender.send(&messages.submitter),
            self.sender.send(&messages.organization),
        );
        let outcome = DispatchOutcome {
            submitter,
            organization,
        };

        if let Err(failure) = outcome.into_result(kind) {
            let failed: Vec<&'static str> = failure
                .failed_audiences()
                .into_iter()
                .map(Into::into)
                .collect();
            log_business_event!(
                event.category = event::category::SUBMISSION,
                event.action = event::action::SUBMISSION_DISPATCH_FAILED,
                event.result = event::result::FAILURE,
                submission.kind = kind_str,
                submission.reference = %reference_str,
                failed_audiences = ?failed,
                "フォーム送信のメール配送に失敗"
            );
            return Err(failure.into());
        }

        log_business_event!(
            event.category = event::category::SUBMISSION,
            event.action = event::action::SUBMISSION_DELIVERED,
            event.result = event::result::SUCCESS,
            submission.kind = kind_str,
            submission.reference = %reference_str,
            "フォーム送信を中継"
        );

        Ok(RelayReceipt { kind, reference })
    }
}

fn reject(error: ValidationError) -> RelayError {
    let kind_str: &str = error.kind.into();
    log_business_event!(
        event.category = event::category::SUBMISSION,
        event.action = event::action::SUBMISSION_REJECTED,
        event.result = event::result::FAILURE,
        submission.kind = kind_str,
        missing_fields = ?error.missing_fields,
        "必須項目不足のためフォーム送信を拒否"
    );
    RelayError::Rejected(error)
}
