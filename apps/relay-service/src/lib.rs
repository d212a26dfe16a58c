//! # HRS Life Relay Service
//!
//! 公開サイトのフォーム送信（お問い合わせ・寄付通知・ボランティア応募）を受け付け、
//! 送信者への受付確認メールと事務局への通知メールを送る中継サーバー。
//!
//! ## 設計方針
//!
//! - **永続化なし**: 送信内容はメールとして届けるだけで、サーバーには保存しない
//! - **ステートレス**: リクエスト間で共有する可変状態は受付番号の発行器だけ
//! - **全成功のみ成功**: 2 通のどちらかが届かなければ失敗として応答する
//!
//! ## モジュール構成
//!
//! - [`config`] - 環境変数からの設定読み込み
//! - [`app`] - ルーター・ミドルウェア・送信バックエンドの組み立て
//! - [`handler`] - HTTP ハンドラ
//! - [`usecase`] - 検証・メール生成・送信の中継ロジック
//! - [`error`] - エラーと HTTP レスポンスへの変換

pub mod app;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
