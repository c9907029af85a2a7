use std::fmt;

use serde::{Deserialize, Serialize};

use super::packet::Data;

/// 失败的 [`DispatchResult`] 携带的诊断文本
pub mod diagnostics {
    pub const TIMEOUT: &str = "timeout";
    pub const CLIENT_CANCELLED: &str = "client cancelled";
    pub const INVALID_NAME: &str = "invalid name";
    pub const MAKE_INTEREST_FAILED: &str = "failed to make interest";
    pub const EXPRESS_FAILED: &str = "express failed";
    pub const VALIDATION_FAILED: &str = "validation failed";
}

/// 网络拒绝请求的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NackReason {
    Congestion,
    Duplicate,
    NoRoute,
    Other(u64),
}

impl NackReason {
    pub fn code(&self) -> u64 {
        match self {
            NackReason::Congestion => 50,
            NackReason::Duplicate => 100,
            NackReason::NoRoute => 150,
            NackReason::Other(code) => *code,
        }
    }

    pub fn from_code(code: u64) -> Self {
        match code {
            50 => NackReason::Congestion,
            100 => NackReason::Duplicate,
            150 => NackReason::NoRoute,
            other => NackReason::Other(other),
        }
    }
}

impl fmt::Display for NackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NackReason::Congestion => f.write_str("congestion"),
            NackReason::Duplicate => f.write_str("duplicate"),
            NackReason::NoRoute => f.write_str("no route"),
            NackReason::Other(code) => write!(f, "unspecified ({code})"),
        }
    }
}

/// 一个兴趣包的唯一结果
#[derive(Debug, Clone)]
pub enum RequestOutcome {
    Data(Data),
    Nack(NackReason),
    Timeout,
}

/// 协调者一侧调用方看到的一次调度结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub success: bool,
    pub result: String,
}

impl DispatchResult {
    pub fn ok(payload: impl Into<String>) -> Self {
        Self {
            success: true,
            result: payload.into(),
        }
    }

    pub fn failure(diagnostic: impl Into<String>) -> Self {
        Self {
            success: false,
            result: diagnostic.into(),
        }
    }

    pub fn nack(reason: NackReason) -> Self {
        Self::failure(format!("nack: {reason}"))
    }
}
