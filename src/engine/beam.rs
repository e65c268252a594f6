// ==========================================
// 飞行员竞标优化系统 - 预算式搜索引擎
// ==========================================
// 职责: 大候选空间/延迟上限场景下的尽力而为 Top-K
// 红线: 与 Ranker 共用同一评分函数,预算检查只在迭代边界
// ==========================================

use crate::config::{PersonaRegistry, SeniorityConfig};
use crate::domain::bundle::FeatureBundle;
use crate::domain::candidate::CandidateSchedule;
use crate::engine::ranker::{CandidateRanker, TopKAccumulator};
use crate::engine::scoring::ScoringCore;
use crate::error::PipelineResult;
use crate::rulepack::RulePack;
use std::time::{Duration, Instant};
use tracing::info;

// ==========================================
// BeamSearchOptimizer - 预算式搜索引擎
// ==========================================
pub struct BeamSearchOptimizer {
    ranker: CandidateRanker,
}

impl BeamSearchOptimizer {
    pub fn new() -> Self {
        Self {
            ranker: CandidateRanker::new(),
        }
    }

    pub fn with_config(personas: PersonaRegistry, seniority: SeniorityConfig) -> Self {
        Self {
            ranker: CandidateRanker::with_config(personas, seniority),
        }
    }

    /// 预算内评估配对,返回已评估中的最优 K 个
    ///
    /// # 规则
    /// - 终止条件: 已评估节点数 ≥ max_nodes 或耗时 > time_budget_ms
    /// - 预算为协作式检查,仅在两次评估之间判断(可能超出一次评估的开销)
    /// - 契约: "预算内尽力而为",不保证覆盖全部候选
    pub fn search(
        &self,
        bundle: &FeatureBundle,
        pack: &RulePack,
        k: usize,
        time_budget_ms: u64,
        max_nodes: usize,
    ) -> PipelineResult<Vec<CandidateSchedule>> {
        let weights = self.ranker.resolve_weights(bundle, pack);
        let budget = Duration::from_millis(time_budget_ms);
        let started = Instant::now();

        let mut acc = TopKAccumulator::new(k);
        let mut evaluated = 0usize;
        let mut budget_exhausted = false;

        for (idx, pairing) in bundle.pairing_features.iter().enumerate() {
            // 迭代边界的协作式预算检查
            if evaluated >= max_nodes || started.elapsed() > budget {
                budget_exhausted = true;
                break;
            }

            let scored = ScoringCore::score_pairing(
                pairing,
                idx,
                bundle,
                &weights,
                self.ranker.seniority(),
            );
            acc.push(scored);
            evaluated += 1;
        }

        let candidates = acc.into_candidates();
        info!(
            total = bundle.pairing_features.len(),
            nodes_evaluated = evaluated,
            budget_exhausted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            selected = candidates.len(),
            "预算式搜索完成"
        );
        Ok(candidates)
    }
}

impl Default for BeamSearchOptimizer {
    fn default() -> Self {
        Self::new()
    }
}
