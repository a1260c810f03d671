use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::RekapError;
use crate::models::ErrorCode;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == ErrorCode::Success as i32
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    // 从领域错误构造，消息带上错误类型名称
    pub fn from_error(code: ErrorCode, err: &RekapError) -> Self {
        Self::error_empty(code, err.format_simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let resp = ApiResponse::success(42_i64, "ok");
        assert!(resp.is_success());
        assert_eq!(resp.data, Some(42));
    }

    #[test]
    fn test_error_response_from_domain_error() {
        let resp = ApiResponse::from_error(
            ErrorCode::InvalidHonorTier,
            &RekapError::invalid_tier("Unknown tier 'Z'"),
        );
        assert!(!resp.is_success());
        assert_eq!(resp.code, ErrorCode::InvalidHonorTier as i32);
        assert!(resp.message.contains("Unknown tier 'Z'"));
        assert!(resp.data.is_none());
    }
}
