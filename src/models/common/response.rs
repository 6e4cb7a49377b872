use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::PreschoolError;
use crate::models::ErrorCode;

/// 所有接口的响应外壳，`code` 为 0 表示成功
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    fn build(code: ErrorCode, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::build(ErrorCode::Success, Some(data), message)
    }

    /// 带明细的失败响应，例如被拒绝的分配列表
    pub fn error(code: ErrorCode, data: T, message: impl Into<String>) -> Self {
        Self::build(code, Some(data), message)
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self::build(ErrorCode::Success, None, message)
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(code, None, message)
    }

    /// 存储层错误直接转成响应，消息取错误详情
    pub fn from_error(err: &PreschoolError) -> Self {
        Self::build(ErrorCode::from(err), None, err.message())
    }
}

impl From<&PreschoolError> for ErrorCode {
    fn from(err: &PreschoolError) -> Self {
        match err {
            PreschoolError::Validation(_) | PreschoolError::DateParse(_) => ErrorCode::BadRequest,
            PreschoolError::NotFound(_) => ErrorCode::NotFound,
            PreschoolError::Authentication(_) => ErrorCode::Unauthorized,
            PreschoolError::Authorization(_) => ErrorCode::Forbidden,
            PreschoolError::Assignment(_) => ErrorCode::AssignmentIneligible,
            PreschoolError::Export(_) => ErrorCode::ExportFailed,
            PreschoolError::Upstream(_) => ErrorCode::SuggestionsUpstreamFailed,
            _ => ErrorCode::InternalServerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_error_keeps_detail() {
        let resp = ApiResponse::from_error(&PreschoolError::assignment("教师 3 不能带 ukg 班"));
        assert_eq!(resp.code, ErrorCode::AssignmentIneligible as i32);
        assert_eq!(resp.message, "教师 3 不能带 ukg 班");
        assert!(resp.data.is_none());

        let code = ErrorCode::from(&PreschoolError::database_operation("locked"));
        assert_eq!(code, ErrorCode::InternalServerError);
    }

    #[test]
    fn test_empty_data_is_omitted() {
        let json = serde_json::to_value(ApiResponse::error_empty(
            ErrorCode::StudentNotFound,
            "Student not found",
        ))
        .unwrap();
        assert_eq!(json["code"], 5000);
        assert!(json.get("data").is_none());
    }
}
