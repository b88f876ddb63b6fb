// ==========================================
// 企业定额匹配系统 - 领域层
// ==========================================
// 职责: 实体与类型定义，不含数据访问
// ==========================================

pub mod association;
pub mod item;
pub mod quota;
pub mod types;

// 重导出核心类型
pub use association::ItemQuotaLink;
pub use item::{Item, ItemDraft, ItemPatch};
pub use quota::{Quota, QuotaDraft, QuotaVersion};
pub use types::MatchStatus;
