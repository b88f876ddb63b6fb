// ==========================================
// 企业定额匹配系统 - 计价汇总引擎
// ==========================================
// 职责: 按匹配状态推导清单的生效单价与合价
// 规则:
// - MATCHED/MANUAL → 单定额快照价（缺省按 0）
// - MULTI          → 关联单价快照求和（缺省按 0）
// - UNMATCHED      → 0
// 合价 = 工程量 × 生效单价，读取时计算，不落库；
// 展示/导出时才舍入到 2 位小数，内部保持全精度
// ==========================================

use crate::domain::{Item, ItemQuotaLink, MatchStatus};
use rust_decimal::Decimal;

// ==========================================
// PricingAggregator - 计价汇总
// ==========================================
pub struct PricingAggregator;

impl PricingAggregator {
    /// 创建新的计价汇总引擎
    pub fn new() -> Self {
        Self
    }

    /// 生效单价
    pub fn effective_price(&self, item: &Item, links: &[ItemQuotaLink]) -> Decimal {
        match item.match_status {
            MatchStatus::Matched | MatchStatus::Manual => {
                item.matched_unit_price.unwrap_or(Decimal::ZERO)
            }
            MatchStatus::Multi => links
                .iter()
                .map(|link| link.unit_price.unwrap_or(Decimal::ZERO))
                .sum(),
            MatchStatus::Unmatched => Decimal::ZERO,
        }
    }

    /// 合价 = 工程量 × 生效单价（工程量缺省按 0）
    pub fn total_price(&self, item: &Item, links: &[ItemQuotaLink]) -> Decimal {
        item.quantity.unwrap_or(Decimal::ZERO) * self.effective_price(item, links)
    }

    /// 展示精度：2 位小数（仅在呈现/导出边界使用）
    pub fn present(&self, value: Decimal) -> Decimal {
        value.round_dp(2)
    }

    /// 汇总合计（报表总价行）
    pub fn grand_total<I>(&self, totals: I) -> Decimal
    where
        I: IntoIterator<Item = Decimal>,
    {
        totals.into_iter().sum()
    }
}

impl Default for PricingAggregator {
    fn default() -> Self {
        Self::new()
    }
}
