//! # 受付番号
//!
//! 寄付通知（`RCPT-`）とボランティア応募（`VOL-`）に付与する、人が読める受付番号。
//! 同じ番号が利用者向けメール・事務局向けメール・API レスポンスのすべてに現れる。
//!
//! ## 採番方式
//!
//! 数値部はエポックミリ秒。ただし同一プロセス内では直前の番号より必ず大きくなるよう
//! `max(現在ミリ秒, 直前 + 1)` を採用する。同一ミリ秒に複数のリクエストが来ても
//! 衝突しない一方、既存のメール文面と同じ「プレフィックス + 13 桁以上の整数」形式を保つ。
//!
//! 複数プロセス間での一意性は保証しない。

use std::{
    cmp,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
};

use crate::clock::Clock;

/// 受付番号の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferencePrefix {
    /// 寄付の領収番号
    Receipt,
    /// ボランティア応募番号
    Volunteer,
}

impl ReferencePrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Receipt => "RCPT-",
            Self::Volunteer => "VOL-",
        }
    }
}

/// 受付番号（例: `RCPT-1760868000123`）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceCode {
    prefix: ReferencePrefix,
    number: i64,
}

impl ReferenceCode {
    pub fn new(prefix: ReferencePrefix, number: i64) -> Self {
        Self { prefix, number }
    }

    pub fn prefix(&self) -> ReferencePrefix {
        self.prefix
    }

    pub fn number(&self) -> i64 {
        self.number
    }
}

impl fmt::Display for ReferenceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix.as_str(), self.number)
    }
}

/// 受付番号の発行
pub trait ReferenceCodeGenerator: Send + Sync {
    fn issue(&self, prefix: ReferencePrefix) -> ReferenceCode;
}

/// プロセス内で単調増加する受付番号の発行器
///
/// プロセス起動時に 1 つ作成し、全リクエストで共有する。
pub struct MonotonicReferenceCodes {
    clock: Arc<dyn Clock>,
    last:  AtomicI64,
}

impl MonotonicReferenceCodes {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: AtomicI64::new(0),
        }
    }
}

impl ReferenceCodeGenerator for MonotonicReferenceCodes {
    fn issue(&self, prefix: ReferencePrefix) -> ReferenceCode {
        let now = self.clock.epoch_millis();
        // クロージャは常に Some を返すため Err にはならない
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(cmp::max(now, last + 1))
            })
            .unwrap_or_else(|last| last);

        ReferenceCode::new(prefix, cmp::max(now, previous + 1))
    }
}
