// ==========================================
// 企业定额匹配系统 - 领域类型定义
// ==========================================
// 匹配状态为显式枚举：所有消费点穷尽匹配，
// 新增状态时由编译器强制补齐分支
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 匹配状态 (Match Status)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Unmatched, // 未匹配
    Matched,   // 自动匹配（可被重跑刷新）
    Manual,    // 人工单定额/人工价格（重跑不覆盖）
    Multi,     // 多定额（重跑不覆盖）
}

impl MatchStatus {
    /// 数据库存储文本
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Unmatched => "UNMATCHED",
            MatchStatus::Matched => "MATCHED",
            MatchStatus::Manual => "MANUAL",
            MatchStatus::Multi => "MULTI",
        }
    }

    /// 从数据库文本解析
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UNMATCHED" => Some(MatchStatus::Unmatched),
            "MATCHED" => Some(MatchStatus::Matched),
            "MANUAL" => Some(MatchStatus::Manual),
            "MULTI" => Some(MatchStatus::Multi),
            _ => None,
        }
    }

    /// 人工决策状态（自动匹配重跑时跳过）
    pub fn is_sticky(&self) -> bool {
        matches!(self, MatchStatus::Manual | MatchStatus::Multi)
    }

    /// 持有单定额快照字段的状态
    pub fn has_single_quota_fields(&self) -> bool {
        matches!(self, MatchStatus::Matched | MatchStatus::Manual)
    }
}

impl Default for MatchStatus {
    fn default() -> Self {
        MatchStatus::Unmatched
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_status_roundtrip() {
        for status in [
            MatchStatus::Unmatched,
            MatchStatus::Matched,
            MatchStatus::Manual,
            MatchStatus::Multi,
        ] {
            assert_eq!(MatchStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MatchStatus::parse("BOGUS"), None);
    }

    #[test]
    fn test_sticky_states() {
        assert!(!MatchStatus::Unmatched.is_sticky());
        assert!(!MatchStatus::Matched.is_sticky());
        assert!(MatchStatus::Manual.is_sticky());
        assert!(MatchStatus::Multi.is_sticky());
    }
}
