//! # フォーム送信
//!
//! 公開サイトの 3 種類のフォーム送信と、その必須項目検証を定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 必須項目 |
//! |---|------------|------|
//! | [`ContactRequest`] | お問い合わせ | firstName, lastName, email, message |
//! | [`DonationNotice`] | 寄付通知 | name, email, amount（正の数） |
//! | [`VolunteerApplication`] | ボランティア応募 | firstName, lastName, email, phone, message |
//!
//! ## 設計方針
//!
//! - **未検証フォームと検証済みレコードを型で分ける**: `*Form` はすべて
//!   `Option<String>`。[`validate`] を通過すると必須項目が `String` になった
//!   レコードに変換され、任意項目はそのまま引き継がれる
//! - **入力はそのまま保持**: 未送信・`null`・空文字列だけを未入力とみなし、
//!   それ以外の値は空白も含めて加工せずにメールへ渡す
//! - **数値も受け付ける**: 寄付フォームは `amount` を数値で送ってくるため、
//!   JSON の文字列・数値・真偽値をすべて文字列に正規化して受け取る

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

/// フォーム送信の種別
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionKind {
    Contact,
    DonationNotice,
    VolunteerApplication,
}

/// 必須項目の不足
///
/// どの項目が不足していたかはログとテストのために保持するが、
/// HTTP レスポンスには列挙しない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: 必須項目が不足しています [{}]", .missing_fields.join(", "))]
pub struct ValidationError {
    pub kind:           SubmissionKind,
    pub missing_fields: Vec<&'static str>,
}

/// 検証ポリシー
///
/// ボランティア応募で `availability` と `motivation` も必須にするかを切り替える。
/// 既定は従来のフォーム API と同じ緩い検証。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub strict_volunteer: bool,
}

/// 未検証フォームの共通インターフェース
///
/// 検証を通過したときだけ [`Submission::Valid`] に変換される。
pub trait Submission: Sized {
    const KIND: SubmissionKind;

    type Valid;

    /// 不足している項目名（JSON のフィールド名）を返す
    fn missing_fields(&self, policy: &ValidationPolicy) -> Vec<&'static str>;

    /// 検証済みレコードに変換する
    ///
    /// `missing_fields` が空であることを前提とする。
    fn into_valid(self) -> Option<Self::Valid>;
}

/// 必須項目を検証し、検証済みレコードを返す
///
/// 副作用はない。不足項目があれば [`ValidationError`] を返す。
pub fn validate<S: Submission>(
    form: S,
    policy: &ValidationPolicy,
) -> Result<S::Valid, ValidationError> {
    let missing_fields = form.missing_fields(policy);
    if !missing_fields.is_empty() {
        return Err(ValidationError {
            kind: S::KIND,
            missing_fields,
        });
    }

    form.into_valid().ok_or(ValidationError {
        kind:           S::KIND,
        missing_fields: Vec::new(),
    })
}

// ===== フィールド値の正規化 =====

/// JSON で受け付けるフィールド値
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// 文字列・数値・真偽値を `Option<String>` に正規化する（`null` は `None`）
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<FieldValue>::deserialize(deserializer)?;
    Ok(value.map(|v| v.to_string()))
}

/// 入力済みの値。未送信・空文字列なら `None`
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn require(missing: &mut Vec<&'static str>, name: &'static str, value: &Option<String>) {
    if present(value).is_none() {
        missing.push(name);
    }
}

fn take(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ===== お問い合わせ =====

/// お問い合わせフォーム（未検証）
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForm {
    #[serde(deserialize_with = "lenient_string")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub last_name:  Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email:      Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub phone:      Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub subject:    Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub message:    Option<String>,
}

/// お問い合わせ（検証済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequest {
    first_name: String,
    last_name:  String,
    email:      String,
    phone:      Option<String>,
    subject:    Option<String>,
    message:    String,
}

impl ContactRequest {
    /// 件名が未入力のときの既定値
    pub const DEFAULT_SUBJECT: &'static str = "General Inquiry";

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn subject_or_default(&self) -> &str {
        self.subject.as_deref().unwrap_or(Self::DEFAULT_SUBJECT)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Submission for ContactForm {
    const KIND: SubmissionKind = SubmissionKind::Contact;

    type Valid = ContactRequest;

    fn missing_fields(&self, _policy: &ValidationPolicy) -> Vec<&'static str> {
        let mut missing = Vec::new();
        require(&mut missing, "firstName", &self.first_name);
        require(&mut missing, "lastName", &self.last_name);
        require(&mut missing, "email", &self.email);
        require(&mut missing, "message", &self.message);
        missing
    }

    fn into_valid(self) -> Option<ContactRequest> {
        Some(ContactRequest {
            first_name: take(self.first_name)?,
            last_name:  take(self.last_name)?,
            email:      take(self.email)?,
            phone:      take(self.phone),
            subject:    take(self.subject),
            message:    take(self.message)?,
        })
    }
}

// ===== 寄付通知 =====

/// 寄付金額
///
/// 正の有限数としてパースできることを保証する。表示には入力された表記を使う。
#[derive(Debug, Clone, PartialEq)]
pub struct DonationAmount {
    text:  String,
    value: f64,
}

impl DonationAmount {
    /// 正の数としてパースする。0 以下・非数値・非有限値は `None`
    pub fn parse(input: &str) -> Option<Self> {
        let text = input.trim();
        let value: f64 = text.parse().ok()?;
        (value.is_finite() && value > 0.0).then(|| Self {
            text: text.to_string(),
            value,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Eq for DonationAmount {}

impl fmt::Display for DonationAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// 寄付通知フォーム（未検証）
///
/// 決済はフロントエンド側の模擬フローで完了しており、ここでは通知のみ扱う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DonationForm {
    #[serde(deserialize_with = "lenient_string")]
    pub name:          Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email:         Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub phone:         Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub amount:        Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub message:       Option<String>,
    /// PAN（所得税控除の申請用、任意）
    #[serde(deserialize_with = "lenient_string")]
    pub pan:           Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub donation_type: Option<String>,
}

/// 寄付通知（検証済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationNotice {
    name:          String,
    email:         String,
    phone:         Option<String>,
    amount:        DonationAmount,
    message:       Option<String>,
    pan:           Option<String>,
    donation_type: Option<String>,
}

impl DonationNotice {
    /// 寄付種別が未入力のときの既定値
    pub const DEFAULT_DONATION_TYPE: &'static str = "General";

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn amount(&self) -> &DonationAmount {
        &self.amount
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn pan(&self) -> Option<&str> {
        self.pan.as_deref()
    }

    pub fn donation_type_or_default(&self) -> &str {
        self.donation_type
            .as_deref()
            .unwrap_or(Self::DEFAULT_DONATION_TYPE)
    }
}

impl Submission for DonationForm {
    const KIND: SubmissionKind = SubmissionKind::DonationNotice;

    type Valid = DonationNotice;

    fn missing_fields(&self, _policy: &ValidationPolicy) -> Vec<&'static str> {
        let mut missing = Vec::new();
        require(&mut missing, "name", &self.name);
        require(&mut missing, "email", &self.email);
        if present(&self.amount).and_then(DonationAmount::parse).is_none() {
            missing.push("amount");
        }
        missing
    }

    fn into_valid(self) -> Option<DonationNotice> {
        let amount = present(&self.amount).and_then(DonationAmount::parse)?;
        Some(DonationNotice {
            name: take(self.name)?,
            email: take(self.email)?,
            phone: take(self.phone),
            amount,
            message: take(self.message),
            pan: take(self.pan),
            donation_type: take(self.donation_type),
        })
    }
}

// ===== ボランティア応募 =====

/// ボランティア応募フォーム（未検証）
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolunteerForm {
    #[serde(deserialize_with = "lenient_string")]
    pub first_name:   Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub last_name:    Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email:        Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub phone:        Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub age:          Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub occupation:   Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub experience:   Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub availability: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub skills:       Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub motivation:   Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub message:      Option<String>,
}

/// ボランティア応募（検証済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolunteerApplication {
    first_name:   String,
    last_name:    String,
    email:        String,
    phone:        String,
    age:          Option<String>,
    occupation:   Option<String>,
    experience:   Option<String>,
    availability: Option<String>,
    skills:       Option<String>,
    motivation:   Option<String>,
    message:      String,
}

impl VolunteerApplication {
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn age(&self) -> Option<&str> {
        self.age.as_deref()
    }

    pub fn occupation(&self) -> Option<&str> {
        self.occupation.as_deref()
    }

    pub fn experience(&self) -> Option<&str> {
        self.experience.as_deref()
    }

    pub fn availability(&self) -> Option<&str> {
        self.availability.as_deref()
    }

    pub fn skills(&self) -> Option<&str> {
        self.skills.as_deref()
    }

    pub fn motivation(&self) -> Option<&str> {
        self.motivation.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Submission for VolunteerForm {
    const KIND: SubmissionKind = SubmissionKind::VolunteerApplication;

    type Valid = VolunteerApplication;

    fn missing_fields(&self, policy: &ValidationPolicy) -> Vec<&'static str> {
        let mut missing = Vec::new();
        require(&mut missing, "firstName", &self.first_name);
        require(&mut missing, "lastName", &self.last_name);
        require(&mut missing, "email", &self.email);
        require(&mut missing, "phone", &self.phone);
        require(&mut missing, "message", &self.message);
        if policy.strict_volunteer {
            require(&mut missing, "availability", &self.availability);
            require(&mut missing, "motivation", &self.motivation);
        }
        missing
    }

    fn into_valid(self) -> Option<VolunteerApplication> {
        Some(VolunteerApplication {
            first_name:   take(self.first_name)?,
            last_name:    take(self.last_name)?,
            email:        take(self.email)?,
            phone:        take(self.phone)?,
            age:          take(self.age),
            occupation:   take(self.occupation),
            experience:   take(self.experience),
            availability: take(self.availability),
            skills:       take(self.skills),
            motivation:   take(self.motivation),
            message:      take(self.message)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn contact_form() -> ContactForm {
        ContactForm {
            first_name: Some("Asha".to_string()),
            last_name:  Some("Rao".to_string()),
            email:      Some("a@x.com".to_string()),
            phone:      None,
            subject:    None,
            message:    Some("Hello".to_string()),
        }
    }

    fn donation_form() -> DonationForm {
        DonationForm {
            name: Some("Ravi".to_string()),
            email: Some("r@x.com".to_string()),
            amount: Some("50".to_string()),
            ..Default::default()
        }
    }

    fn volunteer_form() -> VolunteerForm {
        VolunteerForm {
            first_name: Some("Meera".to_string()),
            last_name: Some("Iyer".to_string()),
            email: Some("meera@example.com".to_string()),
            phone: Some("+91 98765 43210".to_string()),
            message: Some("I would like to help on weekends".to_string()),
            ..Default::default()
        }
    }

    // ===== お問い合わせ =====

    #[test]
    fn test_お問い合わせの件名未入力はgeneral_inquiryになる() {
        let contact = validate(contact_form(), &ValidationPolicy::default()).unwrap();

        assert_eq!(contact.subject_or_default(), "General Inquiry");
        assert_eq!(contact.full_name(), "Asha Rao");
        assert_eq!(contact.phone(), None);
    }

    #[rstest]
    #[case("firstName")]
    #[case("lastName")]
    #[case("email")]
    #[case("message")]
    fn test_お問い合わせの必須項目が欠けると不足項目を返す(#[case] field: &str) {
        let mut form = contact_form();
        match field {
            "firstName" => form.first_name = None,
            "lastName" => form.last_name = None,
            "email" => form.email = None,
            _ => form.message = None,
        }

        let err = validate(form, &ValidationPolicy::default()).unwrap_err();

        assert_eq!(err.kind, SubmissionKind::Contact);
        assert_eq!(err.missing_fields, vec![field]);
    }

    #[test]
    fn test_空文字列の必須項目は未入力として扱う() {
        let form = ContactForm {
            message: Some(String::new()),
            ..contact_form()
        };

        let err = validate(form, &ValidationPolicy::default()).unwrap_err();

        assert_eq!(err.missing_fields, vec!["message"]);
    }

    #[test]
    fn test_空白のみの値は入力済みとして受理する() {
        let form = ContactForm {
            message: Some("   ".to_string()),
            ..contact_form()
        };

        let contact = validate(form, &ValidationPolicy::default()).unwrap();

        assert_eq!(contact.message(), "   ");
    }

    #[test]
    fn test_すべて未入力なら全必須項目を列挙する() {
        let err = validate(ContactForm::default(), &ValidationPolicy::default()).unwrap_err();

        assert_eq!(
            err.missing_fields,
            vec!["firstName", "lastName", "email", "message"]
        );
        assert_eq!(
            err.to_string(),
            "contact: 必須項目が不足しています [firstName, lastName, email, message]"
        );
    }

    #[test]
    fn test_入力値は前後の空白や改行も含めてそのまま保持する() {
        let form = ContactForm {
            first_name: Some("  Asha ".to_string()),
            subject: Some(" Volunteering ".to_string()),
            message: Some("  Hello\n\n".to_string()),
            ..contact_form()
        };

        let contact = validate(form, &ValidationPolicy::default()).unwrap();

        assert_eq!(contact.first_name(), "  Asha ");
        assert_eq!(contact.subject_or_default(), " Volunteering ");
        assert_eq!(contact.message(), "  Hello\n\n");
    }

    #[test]
    fn test_空文字列の件名は既定値になる() {
        let form = ContactForm {
            subject: Some(String::new()),
            ..contact_form()
        };

        let contact = validate(form, &ValidationPolicy::default()).unwrap();

        assert_eq!(contact.subject_or_default(), "General Inquiry");
    }

    // ===== 寄付通知 =====

    #[test]
    fn test_寄付金額50は正の数として受理される() {
        let notice = validate(donation_form(), &ValidationPolicy::default()).unwrap();

        assert_eq!(notice.amount().as_str(), "50");
        assert_eq!(notice.amount().value(), 50.0);
        assert_eq!(notice.donation_type_or_default(), "General");
        assert_eq!(notice.pan(), None);
    }

    #[rstest]
    #[case("0", "ゼロ")]
    #[case("-100", "負数")]
    #[case("abc", "非数値")]
    #[case("NaN", "非数")]
    #[case("inf", "無限大")]
    #[case("", "空文字列")]
    fn test_不正な寄付金額はamount不足として扱う(#[case] amount: &str, #[case] _reason: &str) {
        let form = DonationForm {
            amount: Some(amount.to_string()),
            ..donation_form()
        };

        let err = validate(form, &ValidationPolicy::default()).unwrap_err();

        assert_eq!(err.kind, SubmissionKind::DonationNotice);
        assert_eq!(err.missing_fields, vec!["amount"]);
    }

    #[rstest]
    #[case("name")]
    #[case("email")]
    #[case("amount")]
    fn test_寄付通知の必須項目が欠けると不足項目を返す(#[case] field: &str) {
        let mut form = donation_form();
        match field {
            "name" => form.name = None,
            "email" => form.email = Some(String::new()),
            _ => form.amount = None,
        }

        let err = validate(form, &ValidationPolicy::default()).unwrap_err();

        assert_eq!(err.kind, SubmissionKind::DonationNotice);
        assert_eq!(err.missing_fields, vec![field]);
    }

    #[test]
    fn test_小数の寄付金額も正の数なら受理される() {
        let form = DonationForm {
            amount: Some(" 250.50 ".to_string()),
            ..donation_form()
        };

        let notice = validate(form, &ValidationPolicy::default()).unwrap();

        assert_eq!(notice.amount().to_string(), "250.50");
    }

    // ===== ボランティア応募 =====

    #[rstest]
    #[case("firstName")]
    #[case("lastName")]
    #[case("email")]
    #[case("phone")]
    #[case("message")]
    fn test_ボランティア応募の必須項目が欠けると不足項目を返す(#[case] field: &str) {
        let mut form = volunteer_form();
        match field {
            "firstName" => form.first_name = None,
            "lastName" => form.last_name = Some(String::new()),
            "email" => form.email = None,
            "phone" => form.phone = None,
            _ => form.message = Some(String::new()),
        }

        let err = validate(form, &ValidationPolicy::default()).unwrap_err();

        assert_eq!(err.kind, SubmissionKind::VolunteerApplication);
        assert_eq!(err.missing_fields, vec![field]);
    }

    #[test]
    fn test_緩い検証ではavailabilityとmotivationは任意() {
        let application = validate(volunteer_form(), &ValidationPolicy::default()).unwrap();

        assert_eq!(application.availability(), None);
        assert_eq!(application.motivation(), None);
    }

    #[test]
    fn test_厳格な検証ではavailabilityとmotivationも必須() {
        let policy = ValidationPolicy {
            strict_volunteer: true,
        };

        let err = validate(volunteer_form(), &policy).unwrap_err();
        assert_eq!(err.missing_fields, vec!["availability", "motivation"]);

        let form = VolunteerForm {
            availability: Some("Weekends".to_string()),
            motivation: Some("My grandmother".to_string()),
            ..volunteer_form()
        };
        assert!(validate(form, &policy).is_ok());
    }

    // ===== JSON 受け付け =====

    #[test]
    fn test_数値のamountを文字列として受け取る() {
        let json = r#"{"name": "Ravi", "email": "r@x.com", "amount": 1500, "pan": null}"#;
        let form: DonationForm = serde_json::from_str(json).unwrap();

        assert_eq!(form.amount.as_deref(), Some("1500"));
        assert_eq!(form.pan, None);
    }

    #[test]
    fn test_未知のフィールドは無視しキャメルケースで受け取る() {
        let json = r#"{
            "firstName": "Asha",
            "lastName": "Rao",
            "email": "a@x.com",
            "message": "Hello",
            "newsletter": true
        }"#;
        let form: ContactForm = serde_json::from_str(json).unwrap();

        assert_eq!(form.first_name.as_deref(), Some("Asha"));
        assert_eq!(form.subject, None);
    }

    #[test]
    fn test_submission_kindの文字列表現はsnake_case() {
        assert_eq!(SubmissionKind::Contact.to_string(), "contact");
        assert_eq!(SubmissionKind::DonationNotice.to_string(), "donation_notice");
        let s: &str = SubmissionKind::VolunteerApplication.into();
        assert_eq!(s, "volunteer_application");
    }
}
