// ==========================================
// 企业定额匹配系统 - 清单定额匹配引擎
// ==========================================
// 状态机: UNMATCHED → {MATCHED, MANUAL, MULTI}，各状态间可经下列操作互达
// 自动匹配: 精确键匹配（编码+特征；无编码时退回名称+特征），
//           零命中或多命中一律保持未匹配，绝不猜测
// 人工决策 (MANUAL/MULTI) 粘滞：重跑自动匹配不触碰
// 版本参数显式传入，引擎无隐藏的"当前版本"
// ==========================================

use crate::domain::{Item, ItemQuotaLink, MatchStatus, Quota};
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::{
    ItemQuotaRepository, ItemRepository, QuotaRepository, QuotaVersionRepository,
    RepositoryError,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

// ==========================================
// MatchPolicy - 匹配键策略
// ==========================================
// 精确匹配是唯一语义；可调的只有键的构成与空白归一
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// 清单无编码时是否退回名称键
    pub name_fallback: bool,
    /// 比较前是否去除键两端空白（唯一允许的归一化）
    pub trim_keys: bool,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            name_fallback: true,
            trim_keys: true,
        }
    }
}

// ==========================================
// MatchRunReport - 自动匹配结果统计
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRunReport {
    pub total: usize,     // 参与匹配的清单数（不含粘滞项）
    pub matched: usize,   // 唯一命中数
    pub ambiguous: usize, // 多命中数（保持未匹配）
    pub unmatched: usize, // 零命中数
    pub skipped: usize,   // 人工决策跳过数
}

/// 索引值：唯一候选或已判定歧义
enum Candidate {
    Unique(usize),
    Ambiguous,
}

// ==========================================
// MatchingEngine - 匹配引擎
// ==========================================
pub struct MatchingEngine {
    item_repo: Arc<ItemRepository>,
    quota_repo: Arc<QuotaRepository>,
    version_repo: Arc<QuotaVersionRepository>,
    link_repo: Arc<ItemQuotaRepository>,
    /// 正在执行自动匹配的版本（同版本禁止并发重入）
    running_versions: Mutex<HashSet<i64>>,
}

impl MatchingEngine {
    /// 创建新的匹配引擎
    pub fn new(
        item_repo: Arc<ItemRepository>,
        quota_repo: Arc<QuotaRepository>,
        version_repo: Arc<QuotaVersionRepository>,
        link_repo: Arc<ItemQuotaRepository>,
    ) -> Self {
        Self {
            item_repo,
            quota_repo,
            version_repo,
            link_repo,
            running_versions: Mutex::new(HashSet::new()),
        }
    }

    // ==========================================
    // 自动匹配
    // ==========================================

    /// 对全部清单执行一轮自动匹配
    ///
    /// # 规则
    /// - MANUAL/MULTI 清单跳过（人工决策粘滞）
    /// - MATCHED 清单参与重算：目录变化后可能刷新为新命中或回退未匹配
    /// - 唯一命中才落快照；零命中/多命中保持 UNMATCHED（正常结果，非错误）
    /// - 全部状态变更在单事务内落库
    pub fn run_match(&self, version_id: i64, policy: &MatchPolicy) -> EngineResult<MatchRunReport> {
        if self.version_repo.find_by_id(version_id)?.is_none() {
            return Err(EngineError::NotFound {
                entity: "QuotaVersion".to_string(),
                id: version_id.to_string(),
            });
        }

        // 同版本互斥（RAII 守卫，异常路径也会释放）
        let _guard = RunGuard::acquire(&self.running_versions, version_id)?;

        let quotas = self.quota_repo.list_by_version(version_id)?;
        let (code_index, name_index) = Self::build_indexes(&quotas, policy);

        let items = self.item_repo.list_all()?;
        info!(
            version_id,
            quota_count = quotas.len(),
            item_count = items.len(),
            "开始自动匹配"
        );

        let mut report = MatchRunReport {
            total: 0,
            matched: 0,
            ambiguous: 0,
            unmatched: 0,
            skipped: 0,
        };
        let mut updates: Vec<Item> = Vec::new();

        for mut item in items {
            if item.match_status.is_sticky() {
                report.skipped += 1;
                continue;
            }
            report.total += 1;

            match Self::lookup(&item, &code_index, &name_index, policy) {
                Some(&Candidate::Unique(idx)) => {
                    item.apply_single_match(&quotas[idx], MatchStatus::Matched);
                    report.matched += 1;
                }
                Some(&Candidate::Ambiguous) => {
                    item.clear_match();
                    report.ambiguous += 1;
                }
                None => {
                    item.clear_match();
                    report.unmatched += 1;
                }
            }
            updates.push(item);
        }

        self.item_repo.batch_update(&updates)?;

        info!(
            version_id,
            matched = report.matched,
            ambiguous = report.ambiguous,
            unmatched = report.unmatched,
            skipped = report.skipped,
            "自动匹配完成"
        );
        Ok(report)
    }

    /// 构建 (键, 特征) → 候选 索引
    ///
    /// 编码索引只含有编码的定额；名称索引含全部定额。
    /// 同键多条定额直接判歧义，匹配阶段 O(1) 查询
    fn build_indexes(
        quotas: &[Quota],
        policy: &MatchPolicy,
    ) -> (
        HashMap<(String, String), Candidate>,
        HashMap<(String, String), Candidate>,
    ) {
        let mut code_index: HashMap<(String, String), Candidate> = HashMap::new();
        let mut name_index: HashMap<(String, String), Candidate> = HashMap::new();

        for (idx, quota) in quotas.iter().enumerate() {
            let feature = Self::normalize(quota.feature_value.as_deref(), policy);

            if let Some(code) = quota.quota_code.as_deref() {
                let code = Self::normalize(Some(code), policy);
                if !code.is_empty() {
                    Self::index_insert(&mut code_index, (code, feature.clone()), idx);
                }
            }

            let name = Self::normalize(Some(quota.quota_name.as_str()), policy);
            Self::index_insert(&mut name_index, (name, feature), idx);
        }

        (code_index, name_index)
    }

    fn index_insert(
        index: &mut HashMap<(String, String), Candidate>,
        key: (String, String),
        idx: usize,
    ) {
        index
            .entry(key)
            .and_modify(|c| *c = Candidate::Ambiguous)
            .or_insert(Candidate::Unique(idx));
    }

    /// 单条清单的键查询
    fn lookup<'a>(
        item: &Item,
        code_index: &'a HashMap<(String, String), Candidate>,
        name_index: &'a HashMap<(String, String), Candidate>,
        policy: &MatchPolicy,
    ) -> Option<&'a Candidate> {
        let feature = Self::normalize(item.feature_value.as_deref(), policy);

        let code = Self::normalize(item.item_code.as_deref(), policy);
        if !code.is_empty() {
            return code_index.get(&(code, feature));
        }

        if policy.name_fallback {
            let name = Self::normalize(Some(item.item_name.as_str()), policy);
            return name_index.get(&(name, feature));
        }

        None
    }

    /// 键归一化：仅按策略去空白；大小写保持（精确匹配）
    fn normalize(value: Option<&str>, policy: &MatchPolicy) -> String {
        let raw = value.unwrap_or("");
        if policy.trim_keys {
            raw.trim().to_string()
        } else {
            raw.to_string()
        }
    }

    // ==========================================
    // 人工操作（任意状态可进入）
    // ==========================================

    /// 人工单选定额 → MANUAL
    ///
    /// 若清单原为多定额，关联一并清除（单选取代多定额）
    pub fn select_quota(&self, item_id: i64, quota_id: i64) -> EngineResult<Item> {
        let mut item = self.require_item(item_id)?;
        let quota = self.require_quota(quota_id)?;

        item.apply_single_match(&quota, MatchStatus::Manual);
        let removed = self.item_repo.replace_links_with_state(&item)?;
        if removed > 0 {
            info!(item_id, removed, "人工单选清除了既有多定额关联");
        }
        Ok(item)
    }

    /// 人工直接定价 → MANUAL（价格权威，无目录背书）
    pub fn set_manual_price(&self, item_id: i64, price: Decimal) -> EngineResult<Item> {
        if price < Decimal::ZERO {
            return Err(EngineError::InvalidPrice(format!(
                "单价不能为负数: {}",
                price
            )));
        }

        let mut item = self.require_item(item_id)?;
        item.apply_manual_price(price);
        self.item_repo.replace_links_with_state(&item)?;
        Ok(item)
    }

    /// 挂接定额 → MULTI
    ///
    /// 重复挂接同一定额返回 AlreadyAttached（显式拒绝，非静默幂等）；
    /// 关联携带价格快照，定额后续变更不回溯
    pub fn attach_quota(&self, item_id: i64, quota_id: i64) -> EngineResult<ItemQuotaLink> {
        let mut item = self.require_item(item_id)?;
        let quota = self.require_quota(quota_id)?;

        if self.link_repo.exists(item_id, quota_id)? {
            return Err(EngineError::AlreadyAttached { item_id, quota_id });
        }

        item.enter_multi();
        let link = ItemQuotaLink::snapshot_of(item_id, &quota, 0);
        match self.item_repo.attach_link(&item, &link) {
            Ok(link) => Ok(link),
            // 并发窗口下的重复挂接由唯一约束兜底
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                Err(EngineError::AlreadyAttached { item_id, quota_id })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 摘除关联；删空时回退 UNMATCHED
    ///
    /// # 返回
    /// - `Ok(remaining)`: 摘除后剩余关联数
    pub fn detach_quota(&self, item_id: i64, link_id: i64) -> EngineResult<usize> {
        let item = self.require_item(item_id)?;

        let link = self.link_repo.find_by_id(link_id)?;
        let belongs = link.map(|l| l.item_id == item_id).unwrap_or(false);
        if !belongs {
            return Err(EngineError::NotFound {
                entity: "ItemQuotaLink".to_string(),
                id: link_id.to_string(),
            });
        }

        let mut reverted = item.clone();
        reverted.clear_match();
        let remaining = self.item_repo.detach_link(item_id, link_id, &reverted)?;
        if remaining == 0 {
            info!(item_id, "最后一条关联已摘除，清单回退未匹配");
        }
        Ok(remaining)
    }

    /// 清空全部关联并回退 UNMATCHED（幂等：重复调用删除 0 条并成功）
    pub fn clear_quotas(&self, item_id: i64) -> EngineResult<usize> {
        let mut item = self.require_item(item_id)?;
        item.clear_match();
        let removed = self.item_repo.replace_links_with_state(&item)?;
        Ok(removed)
    }

    // ==========================================
    // 校验辅助
    // ==========================================

    fn require_item(&self, item_id: i64) -> EngineResult<Item> {
        self.item_repo
            .find_by_id(item_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Item".to_string(),
                id: item_id.to_string(),
            })
    }

    fn require_quota(&self, quota_id: i64) -> EngineResult<Quota> {
        self.quota_repo
            .find_by_id(quota_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Quota".to_string(),
                id: quota_id.to_string(),
            })
    }
}

// ==========================================
// RunGuard - 版本级自动匹配互斥守卫
// ==========================================
struct RunGuard<'a> {
    running: &'a Mutex<HashSet<i64>>,
    version_id: i64,
}

impl<'a> RunGuard<'a> {
    fn acquire(running: &'a Mutex<HashSet<i64>>, version_id: i64) -> EngineResult<Self> {
        let mut set = running
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        if !set.insert(version_id) {
            warn!(version_id, "拒绝并发的自动匹配请求");
            return Err(EngineError::MatchRunInProgress { version_id });
        }
        Ok(Self {
            running,
            version_id,
        })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.running.lock() {
            set.remove(&self.version_id);
        }
    }
}
