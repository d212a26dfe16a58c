//! # ビジネスイベントログ
//!
//! フォーム送信の受付・メール配送結果を `jq` で追跡できるよう、
//! ログフィールドの命名規約とヘルパーマクロを提供する。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`submission.kind`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。
//!
//! 利用者が入力した自由記述（メッセージ、志望動機など）はログに出さない。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。呼び出し側のクレートは `tracing` に依存すること。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: [`event::category`] の定数
/// - `event.action`: [`event::action`] の定数
/// - `event.result`: [`event::result`] の定数
///
/// ## 推奨フィールド
///
/// - `submission.kind`: 送信種別（`contact` / `donation_notice` / `volunteer_application`）
/// - `submission.reference`: 受付番号（寄付・ボランティアのみ）
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const SUBMISSION: &str = "submission";
        pub const MAIL: &str = "mail";
    }

    /// イベントアクション
    pub mod action {
        // フォーム送信
        pub const SUBMISSION_REJECTED: &str = "submission.rejected";
        pub const SUBMISSION_DELIVERED: &str = "submission.delivered";
        pub const SUBMISSION_DISPATCH_FAILED: &str = "submission.dispatch_failed";

        // メール
        pub const MAIL_TRANSPORT_VERIFIED: &str = "mail.transport_verified";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// 外部サービス呼び出し（SMTP）
        pub const EXTERNAL_SERVICE: &str = "external_service";
        /// サーバー内部（テンプレートなど）
        pub const INTERNAL: &str = "internal";
    }

    /// エラー種別
    pub mod kind {
        pub const MAIL_DELIVERY: &str = "mail_delivery";
        pub const MAIL_CONFIGURATION: &str = "mail_configuration";
        pub const TEMPLATE: &str = "template";
    }
}
