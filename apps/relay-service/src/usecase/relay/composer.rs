//! # メールコンポーザー
//!
//! tera テンプレートエンジンで、フォーム送信 1 件から 2 通のメール
//! （送信者向けの受付確認、事務局向けの通知）を HTML/plaintext 両形式で生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **テンプレート名**: `{種別}_{宛先}.{html|txt}`（例: `donation_organization.html`）
//! - **エスケープ**: `.html` テンプレートは tera の自動エスケープが効く。
//!   `.txt` は入力をそのまま埋め込む
//! - **未入力の任意項目**: 事務局向けの本文では `N/A` と表示する

use chrono::{DateTime, Utc};
use hrslife_domain::notification::{
    Audience,
    MailError,
    MessagePair,
    OutboundMessage,
    SenderIdentity,
    SubmissionNotice,
};
use tera::{Context, Tera};

/// 送信者向けメールの署名に使う団体名
const ORGANIZATION_NAME: &str = "Help Rescue Secure Life Charitable Trust";

/// 未入力の任意項目の表示
const NOT_PROVIDED: &str = "N/A";

/// コンポーザーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerSettings {
    /// 送信者向けメールの差出人表示名
    pub sender_name:        String,
    /// 送信元アドレス（送信アカウント）
    pub account_address:    String,
    /// 事務局の受信箱
    pub organization_inbox: String,
}

/// テンプレート 1 組分のパラメータ
struct TemplateParams {
    /// テンプレート名の接頭辞（`contact` / `donation` / `volunteer`）
    template:             &'static str,
    submitter_subject:    String,
    organization_subject: String,
    /// 事務局向けメールの差出人表示名
    organization_sender:  &'static str,
    context:              Context,
}

/// メールコンポーザー
///
/// 起動時に 1 つ作成し、全リクエストで共有する。
pub struct NotificationComposer {
    engine:   Tera,
    settings: ComposerSettings,
}

impl NotificationComposer {
    /// `include_str!` で埋め込んだテンプレートを tera に登録する
    pub fn new(settings: ComposerSettings) -> Result<Self, MailError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    "contact_submitter.html",
                    include_str!("../../../templates/mail/contact_submitter.html"),
                ),
                (
                    "contact_submitter.txt",
                    include_str!("../../../templates/mail/contact_submitter.txt"),
                ),
                (
                    "contact_organization.html",
                    include_str!("../../../templates/mail/contact_organization.html"),
                ),
                (
                    "contact_organization.txt",
                    include_str!("../../../templates/mail/contact_organization.txt"),
                ),
                (
                    "donation_submitter.html",
                    include_str!("../../../templates/mail/donation_submitter.html"),
                ),
                (
                    "donation_submitter.txt",
                    include_str!("../../../templates/mail/donation_submitter.txt"),
                ),
                (
                    "donation_organization.html",
                    include_str!("../../../templates/mail/donation_organization.html"),
                ),
                (
                    "donation_organization.txt",
                    include_str!("../../../templates/mail/donation_organization.txt"),
                ),
                (
                    "volunteer_submitter.html",
                    include_str!("../../../templates/mail/volunteer_submitter.html"),
                ),
                (
                    "volunteer_submitter.txt",
                    include_str!("../../../templates/mail/volunteer_submitter.txt"),
                ),
                (
                    "volunteer_organization.html",
                    include_str!("../../../templates/mail/volunteer_organization.html"),
                ),
                (
                    "volunteer_organization.txt",
                    include_str!("../../../templates/mail/volunteer_organization.txt"),
                ),
            ])
            .map_err(|e| MailError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine, settings })
    }

    /// 送信内容から 2 通のメールを生成する
    ///
    /// 副作用はない。`submitted_at` は事務局向け本文の受付時刻に使う。
    pub fn compose(
        &self,
        notice: &SubmissionNotice,
        submitted_at: DateTime<Utc>,
    ) -> Result<MessagePair, MailError> {
        let params = build_template_params(notice, submitted_at);

        let submitter = self.render(
            &params,
            Audience::Submitter,
            SenderIdentity {
                name:    self.settings.sender_name.clone(),
                address: self.settings.account_address.clone(),
            },
            notice.submitter_email(),
            &params.submitter_subject,
        )?;

        let organization = self.render(
            &params,
            Audience::Organization,
            SenderIdentity {
                name:    params.organization_sender.to_string(),
                address: self.settings.account_address.clone(),
            },
            &self.settings.organization_inbox,
            &params.organization_subject,
        )?;

        Ok(MessagePair {
            submitter,
            organization,
        })
    }

    fn render(
        &self,
        params: &TemplateParams,
        audience: Audience,
        from: SenderIdentity,
        to: &str,
        subject: &str,
    ) -> Result<OutboundMessage, MailError> {
        let template_name = format!("{}_{audience}", params.template);

        let html_body = self
            .engine
            .render(&format!("{template_name}.html"), &params.context)
            .map_err(|e| MailError::TemplateFailed(e.to_string()))?;

        let text_body = self
            .engine
            .render(&format!("{template_name}.txt"), &params.context)
            .map_err(|e| MailError::TemplateFailed(e.to_string()))?;

        Ok(OutboundMessage {
            audience,
            from,
            to: to.to_string(),
            subject: subject.to_string(),
            html_body,
            text_body,
        })
    }
}

/// テンプレート名、件名、コンテキストを構築する
fn build_template_params(notice: &SubmissionNotice, submitted_at: DateTime<Utc>) -> TemplateParams {
    let mut context = Context::new();
    context.insert("organization_name", ORGANIZATION_NAME);
    context.insert(
        "submitted_at",
        &submitted_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );

    match notice {
        SubmissionNotice::Contact(contact) => {
            let full_name = contact.full_name();
            let subject = contact.subject_or_default();
            context.insert("full_name", &full_name);
            context.insert("email", contact.email());
            context.insert("phone", or_not_provided(contact.phone()));
            context.insert("subject", subject);
            context.insert("message", contact.message());

            TemplateParams {
                template:             "contact",
                submitter_subject:    "Thank You for Contacting Us - Help Rescue Secure Life"
                    .to_string(),
                organization_subject: format!("New Contact Form Submission - {subject}"),
                organization_sender:  "NGO Website Contact Form",
                context,
            }
        }
        SubmissionNotice::Donation { notice, receipt } => {
            let amount = notice.amount().as_str();
            context.insert("donor_name", notice.name());
            context.insert("email", notice.email());
            context.insert("phone", or_not_provided(notice.phone()));
            context.insert("pan", or_not_provided(notice.pan()));
            context.insert("amount", amount);
            context.insert("donation_type", notice.donation_type_or_default());
            context.insert("message", or_not_provided(notice.message()));
            context.insert("receipt_number", &receipt.to_string());

            TemplateParams {
                template:             "donation",
                submitter_subject:    format!("Thank You for Your Donation - Receipt #{receipt}"),
                organization_subject: format!("New Donation Received - ₹{amount}"),
                organization_sender:  "NGO Donation System",
                context,
            }
        }
        SubmissionNotice::Volunteer {
            application,
            application_id,
        } => {
            context.insert("full_name", &application.full_name());
            context.insert("email", application.email());
            context.insert("phone", application.phone());
            context.insert("age", or_not_provided(application.age()));
            context.insert("occupation", or_not_provided(application.occupation()));
            context.insert("experience", or_not_provided(application.experience()));
            context.insert("skills", or_not_provided(application.skills()));
            context.insert("availability", or_not_provided(application.availability()));
            context.insert("motivation", or_not_provided(application.motivation()));
            context.insert("message", application.message());
            context.insert("application_id", &application_id.to_string());

            TemplateParams {
                template:             "volunteer",
                submitter_subject:    format!("Volunteer Application Received - {application_id}"),
                organization_subject: format!(
                    "New Volunteer Application - {} {}",
                    application.first_name(),
                    application.last_name()
                ),
                organization_sender:  "NGO Volunteer System",
                context,
            }
        }
    }
}

fn or_not_provided(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_PROVIDED)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use hrslife_domain::{
        reference_code::{ReferenceCode, ReferencePrefix},
        submission::{ContactForm, DonationForm, ValidationPolicy, VolunteerForm, validate},
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn composer() -> NotificationComposer {
        NotificationComposer::new(ComposerSettings {
            sender_name:        "Help Rescue Secure Life Charitable Trust".to_string(),
            account_address:    "ngo@gmail.com".to_string(),
            organization_inbox: "owner@hrslife.org".to_string(),
        })
        .unwrap()
    }

    fn submitted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    fn contact_notice(subject: Option<&str>, message: &str) -> SubmissionNotice {
        let contact = validate(
            ContactForm {
                first_name: Some("Asha".to_string()),
                last_name: Some("Rao".to_string()),
                email: Some("asha@example.com".to_string()),
                subject: subject.map(str::to_string),
                message: Some(message.to_string()),
                ..Default::default()
            },
            &ValidationPolicy::default(),
        )
        .unwrap();
        SubmissionNotice::Contact(contact)
    }

    #[test]
    fn test_お問い合わせの2通を生成する() {
        let pair = composer()
            .compose(&contact_notice(Some("Partnership"), "Hello"), submitted_at())
            .unwrap();

        assert_eq!(pair.submitter.to, "asha@example.com");
        assert_eq!(
            pair.submitter.subject,
            "Thank You for Contacting Us - Help Rescue Secure Life"
        );
        assert_eq!(
            pair.submitter.from,
            SenderIdentity {
                name:    "Help Rescue Secure Life Charitable Trust".to_string(),
                address: "ngo@gmail.com".to_string(),
            }
        );
        assert!(pair.submitter.text_body.contains("Dear Asha Rao"));
        assert!(pair.submitter.text_body.contains("Partnership"));
        assert!(pair.submitter.text_body.contains("Hello"));

        assert_eq!(pair.organization.to, "owner@hrslife.org");
        assert_eq!(
            pair.organization.subject,
            "New Contact Form Submission - Partnership"
        );
        assert_eq!(pair.organization.from.name, "NGO Website Contact Form");
        assert!(pair.organization.text_body.contains("Phone: N/A"));
        assert!(pair.organization.text_body.contains("2026-10-19 09:30:00 UTC"));
    }

    #[test]
    fn test_件名未入力ならgeneral_inquiryを使う() {
        let pair = composer()
            .compose(&contact_notice(None, "Hello"), submitted_at())
            .unwrap();

        assert_eq!(
            pair.organization.subject,
            "New Contact Form Submission - General Inquiry"
        );
        assert!(pair.submitter.text_body.contains("Subject: General Inquiry"));
    }

    #[test]
    fn test_html本文は利用者入力をエスケープしテキスト本文はそのまま埋め込む() {
        let pair = composer()
            .compose(
                &contact_notice(None, "<script>alert(1)</script>"),
                submitted_at(),
            )
            .unwrap();

        assert!(!pair.organization.html_body.contains("<script>"));
        assert!(pair.organization.html_body.contains("&lt;script&gt;"));
        assert!(
            pair.organization
                .text_body
                .contains("<script>alert(1)</script>")
        );
    }

    #[test]
    fn test_寄付通知は両方のメールに同じ領収番号が入る() {
        let donation = validate(
            DonationForm {
                name: Some("Ravi Kumar".to_string()),
                email: Some("ravi@example.com".to_string()),
                amount: Some("1500".to_string()),
                pan: Some("ABCDE1234F".to_string()),
                ..Default::default()
            },
            &ValidationPolicy::default(),
        )
        .unwrap();
        let receipt = ReferenceCode::new(ReferencePrefix::Receipt, 1_760_868_000_123);
        let notice = SubmissionNotice::Donation {
            notice:  donation,
            receipt: receipt.clone(),
        };

        let pair = composer().compose(&notice, submitted_at()).unwrap();

        assert_eq!(
            pair.submitter.subject,
            "Thank You for Your Donation - Receipt #RCPT-1760868000123"
        );
        assert_eq!(pair.organization.subject, "New Donation Received - ₹1500");
        assert_eq!(pair.organization.from.name, "NGO Donation System");
        for message in [&pair.submitter, &pair.organization] {
            assert!(message.text_body.contains("RCPT-1760868000123"));
            assert!(message.html_body.contains("RCPT-1760868000123"));
        }
        assert!(pair.submitter.text_body.contains("Donation Type: General"));
        assert!(pair.organization.text_body.contains("PAN: ABCDE1234F"));
        assert!(pair.organization.text_body.contains("Message: N/A"));
    }

    #[test]
    fn test_ボランティア応募は未入力項目をna表示する() {
        let application = validate(
            VolunteerForm {
                first_name: Some("Meena".to_string()),
                last_name: Some("Iyer".to_string()),
                email: Some("meena@example.com".to_string()),
                phone: Some("9876543210".to_string()),
                skills: Some("Teaching".to_string()),
                message: Some("Happy to help".to_string()),
                ..Default::default()
            },
            &ValidationPolicy::default(),
        )
        .unwrap();
        let application_id = ReferenceCode::new(ReferencePrefix::Volunteer, 1_760_868_000_456);
        let notice = SubmissionNotice::Volunteer {
            application,
            application_id,
        };

        let pair = composer().compose(&notice, submitted_at()).unwrap();

        assert_eq!(
            pair.submitter.subject,
            "Volunteer Application Received - VOL-1760868000456"
        );
        assert_eq!(
            pair.organization.subject,
            "New Volunteer Application - Meena Iyer"
        );
        assert_eq!(pair.organization.from.name, "NGO Volunteer System");
        assert!(pair.submitter.text_body.contains("VOL-1760868000456"));
        let body = &pair.organization.text_body;
        assert!(body.contains("Skills: Teaching"));
        assert!(body.contains("Age: N/A"));
        assert!(body.contains("Availability: N/A"));
        assert!(body.contains("Motivation: N/A"));
        assert!(body.contains("Application ID: VOL-1760868000456"));
    }
}
