//! # フォーム送信ハンドラ
//!
//! 公開サイトの 3 つのフォームを受け付け、中継サービスに委譲する。
//!
//! ## エンドポイント
//!
//! ```text
//! POST /api/contact
//! POST /api/donation-confirmation
//! POST /api/volunteer
//! ```
//!
//! ボディは `application/json` と `application/x-www-form-urlencoded` の両方を受け付ける。
//! 解釈できないボディは「全項目未入力」として扱い、必須項目不足（400）で応答する。
//! ボディサイズ超過（413）だけはそのまま返す。

use std::sync::Arc;

use axum::{
    Form,
    Json,
    extract::{FromRequest, Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use hrslife_domain::{
    SubmissionKind,
    submission::{ContactForm, DonationForm, VolunteerForm},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    error::RelayError,
    usecase::{RelayReceipt, SubmissionRelay},
};

/// フォーム送信ハンドラの State
pub struct RelayState {
    pub relay: SubmissionRelay,
}

/// 受付成功レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAccepted {
    pub success:        bool,
    pub message:        String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
}

impl From<RelayReceipt> for SubmissionAccepted {
    fn from(receipt: RelayReceipt) -> Self {
        let reference = receipt.reference.map(|code| code.to_string());
        let (message, receipt_number, application_id) = match receipt.kind {
            SubmissionKind::Contact => (
                "Thank you for your message. We will respond within 24 hours.",
                None,
                None,
            ),
            SubmissionKind::DonationNotice => {
                ("Donation confirmation sent successfully", reference, None)
            }
            SubmissionKind::VolunteerApplication => (
                "Thank you for your volunteer application. We will review it and get back to you.",
                None,
                reference,
            ),
        };

        Self {
            success: true,
            message: message.to_string(),
            receipt_number,
            application_id,
        }
    }
}

/// フォーム送信のボディ
///
/// `Content-Type` が URL エンコード形式なら `Form`、それ以外は `Json` として読む。
/// 読めなければ `T::default()`（全項目未入力）になる。
pub struct SubmissionBody<T>(pub T);

impl<T, S> FromRequest<S> for SubmissionBody<T>
where
    T: DeserializeOwned + Default + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let url_encoded = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(URL_ENCODED));

        let parsed = if url_encoded {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(form)| form)
                .map_err(IntoResponse::into_response)
        } else {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(form)| form)
                .map_err(IntoResponse::into_response)
        };

        match parsed {
            Ok(form) => Ok(Self(form)),
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => Err(rejection),
            Err(rejection) => {
                tracing::debug!(
                    status = %rejection.status(),
                    url_encoded,
                    "ボディを解釈できないため空のフォームとして扱う"
                );
                Ok(Self(T::default()))
            }
        }
    }
}

const URL_ENCODED: &str = "application/x-www-form-urlencoded";

/// お問い合わせ
pub async fn submit_contact(
    State(state): State<Arc<RelayState>>,
    SubmissionBody(form): SubmissionBody<ContactForm>,
) -> Result<Json<SubmissionAccepted>, RelayError> {
    let receipt = state.relay.relay_contact(form).await?;
    Ok(Json(receipt.into()))
}

/// 寄付通知
pub async fn submit_donation(
    State(state): State<Arc<RelayState>>,
    SubmissionBody(form): SubmissionBody<DonationForm>,
) -> Result<Json<SubmissionAccepted>, RelayError> {
    let receipt = state.relay.relay_donation(form).await?;
    Ok(Json(receipt.into()))
}

/// ボランティア応募
pub async fn submit_volunteer(
    State(state): State<Arc<RelayState>>,
    SubmissionBody(form): SubmissionBody<VolunteerForm>,
) -> Result<Json<SubmissionAccepted>, RelayError> {
    let receipt = state.relay.relay_volunteer(form).await?;
    Ok(Json(receipt.into()))
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
        routing::post,
    };
    use hrslife_domain::{
        clock::{Clock, FixedClock},
        reference_code::MonotonicReferenceCodes,
        submission::ValidationPolicy,
    };
    use hrslife_infra::mock::MockMailSender;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tower::ServiceExt;

    use super::*;
    use crate::usecase::relay::{ComposerSettings, NotificationComposer};

    const NOW_MS: i64 = 1_760_868_000_123;

    fn app(sender: &MockMailSender) -> Router {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::from_millis(NOW_MS));
        let composer = NotificationComposer::new(ComposerSettings {
            sender_name:        "Help Rescue Secure Life Charitable Trust".to_string(),
            account_address:    "ngo@gmail.com".to_string(),
            organization_inbox: "owner@hrslife.org".to_string(),
        })
        .unwrap();
        let relay = SubmissionRelay::new(
            Arc::new(sender.clone()),
            composer,
            Arc::new(MonotonicReferenceCodes::new(Arc::clone(&clock))),
            clock,
            ValidationPolicy::default(),
        );

        Router::new()
            .route("/api/contact", post(submit_contact))
            .route("/api/donation-confirmation", post(submit_donation))
            .route("/api/volunteer", post(submit_volunteer))
            .with_state(Arc::new(RelayState { relay }))
    }

    async fn post_raw(app: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        post_with_type(app, uri, "application/json", body).await
    }

    async fn post_with_type(
        app: Router,
        uri: &str,
        content_type: &str,
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_お問い合わせの成功レスポンス() {
        let sender = MockMailSender::new();

        let (status, body) = post_raw(
            app(&sender),
            "/api/contact",
            r#"{"firstName":"Asha","lastName":"Rao","email":"a@x.com","message":"Hello"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "success": true,
                "message": "Thank you for your message. We will respond within 24 hours."
            })
        );
        assert_eq!(sender.delivered().len(), 2);
    }

    #[tokio::test]
    async fn test_寄付通知は数値のamountを受け付け領収番号を返す() {
        let sender = MockMailSender::new();

        let (status, body) = post_raw(
            app(&sender),
            "/api/donation-confirmation",
            r#"{"name":"Ravi","email":"r@x.com","amount":500}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "success": true,
                "message": "Donation confirmation sent successfully",
                "receiptNumber": format!("RCPT-{NOW_MS}")
            })
        );
    }

    #[tokio::test]
    async fn test_ボランティア応募は応募番号を返す() {
        let sender = MockMailSender::new();

        let (status, body) = post_raw(
            app(&sender),
            "/api/volunteer",
            r#"{"firstName":"Meena","lastName":"Iyer","email":"m@x.com","phone":"98765","message":"Hi"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let accepted: SubmissionAccepted = serde_json::from_value(body).unwrap();
        assert_eq!(accepted.application_id, Some(format!("VOL-{NOW_MS}")));
        assert_eq!(accepted.receipt_number, None);
    }

    #[rstest]
    #[case("/api/contact", r#"{"firstName":"Asha"}"#, "Missing required fields")]
    #[case("/api/donation-confirmation", r#"{"name":"Ravi","email":"r@x.com","amount":"-5"}"#, "Missing required fields")]
    #[case("/api/volunteer", r#"{"firstName":"Meena","lastName":"Iyer","email":"m@x.com","message":"Hi"}"#, "Required fields are missing")]
    #[case("/api/contact", "not json", "Missing required fields")]
    #[tokio::test]
    async fn test_必須項目不足は400で送信しない(
        #[case] uri: &str,
        #[case] body: &str,
        #[case] expected: &str,
    ) {
        let sender = MockMailSender::new();

        let (status, response) = post_raw(app(&sender), uri, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, serde_json::json!({ "error": expected }));
        assert!(sender.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_urlエンコード形式のお問い合わせも受け付ける() {
        let sender = MockMailSender::new();

        let (status, body) = post_with_type(
            app(&sender),
            "/api/contact",
            "application/x-www-form-urlencoded",
            "firstName=Asha&lastName=Rao&email=a%40x.com&message=Hello+there",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let delivered = sender.delivered();
        assert_eq!(delivered.len(), 2);
        assert!(delivered.iter().any(|m| m.to == "a@x.com"));
        for message in &delivered {
            assert!(message.text_body.contains("Hello there"));
        }
    }

    #[tokio::test]
    async fn test_urlエンコード形式の寄付通知は金額を文字列で受け付ける() {
        let sender = MockMailSender::new();

        let (status, body) = post_with_type(
            app(&sender),
            "/api/donation-confirmation",
            "application/x-www-form-urlencoded; charset=UTF-8",
            "name=Ravi&email=r%40x.com&amount=500",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["receiptNumber"], format!("RCPT-{NOW_MS}"));
        assert_eq!(sender.delivered().len(), 2);
    }

    #[tokio::test]
    async fn test_urlエンコード形式でも必須項目不足は400() {
        let sender = MockMailSender::new();

        let (status, body) = post_with_type(
            app(&sender),
            "/api/volunteer",
            "application/x-www-form-urlencoded",
            "firstName=Meena&lastName=Iyer&email=m%40x.com&message=Hi",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({ "error": "Required fields are missing" })
        );
        assert!(sender.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_送信失敗は500で汎用メッセージ() {
        let sender = MockMailSender::new();
        sender.fail_for("a@x.com");

        let (status, body) = post_raw(
            app(&sender),
            "/api/contact",
            r#"{"firstName":"Asha","lastName":"Rao","email":"a@x.com","message":"Hello"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({ "error": "Failed to process contact form" })
        );
        assert_eq!(sender.attempts().len(), 2);
    }
}
