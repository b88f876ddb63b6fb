// ==========================================
// 企业定额匹配系统 - API 响应信封
// ==========================================
// 所有变更操作对外的统一形态: {success, message, ...payload}
// 失败时绝不携带半成品对象
// ==========================================

use crate::api::error::ApiResult;
use serde::{Deserialize, Serialize};

// ==========================================
// ApiResponse - 统一响应信封
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// 把 ApiResult 折叠成信封（供外层 shell 使用）
    pub fn from_result(result: ApiResult<T>, ok_message: impl Into<String>) -> Self {
        match result {
            Ok(data) => Self::ok(ok_message, data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}

impl<T: serde::Serialize> ApiResponse<T> {
    /// 序列化为 shell 侧消费的 JSON 值
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

// ==========================================
// 批量操作结果（逐条执行，部分失败不致整批失败）
// ==========================================

/// 单条失败明细
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub id: i64,
    pub reason: String,
}

/// 批量操作汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub success_count: usize,
    pub fail_count: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self {
            success_count: 0,
            fail_count: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub fn record_failure(&mut self, id: i64, reason: impl Into<String>) {
        self.fail_count += 1;
        self.failures.push(BatchFailure {
            id,
            reason: reason.into(),
        });
    }
}

impl Default for BatchOutcome {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ApiError;

    #[test]
    fn test_envelope_from_result() {
        let ok: ApiResponse<i32> = ApiResponse::from_result(Ok(7), "完成");
        assert!(ok.success);
        assert_eq!(ok.data, Some(7));

        let fail: ApiResponse<i32> =
            ApiResponse::from_result(Err(ApiError::NotFound("x".to_string())), "完成");
        assert!(!fail.success);
        assert!(fail.data.is_none());
        assert!(fail.message.contains("未找到"));
    }

    #[test]
    fn test_envelope_json_shape() {
        let envelope = ApiResponse::ok("匹配完成", 3usize);
        let value = envelope.to_value().unwrap();
        assert_eq!(value["success"], serde_json::json!(true));
        assert_eq!(value["message"], serde_json::json!("匹配完成"));
        assert_eq!(value["data"], serde_json::json!(3));

        let fail: ApiResponse<usize> = ApiResponse::fail("版本不存在");
        let value = fail.to_value().unwrap();
        assert_eq!(value["success"], serde_json::json!(false));
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_batch_outcome_accumulates() {
        let mut outcome = BatchOutcome::new();
        outcome.record_success();
        outcome.record_success();
        outcome.record_failure(9, "不存在");

        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.fail_count, 1);
        assert_eq!(outcome.failures[0].id, 9);
    }
}
