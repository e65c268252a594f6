// ==========================================
// 飞行员竞标优化系统 - 候选排序引擎
// ==========================================
// 职责: 可行配对的加权多准则评分与确定性 Top-K 选择
// 红线: 平局一律按原始输入序裁决,结果可复现
// ==========================================

use crate::config::{PersonaRegistry, SeniorityConfig};
use crate::domain::bundle::FeatureBundle;
use crate::domain::candidate::CandidateSchedule;
use crate::engine::scoring::{ScoredPairing, ScoringCore};
use crate::error::PipelineResult;
use crate::rulepack::RulePack;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tracing::{info, warn};

// ==========================================
// TopKAccumulator - 有界 Top-K 选择器
// ==========================================
// O(n log K) 的有界堆选择,避免全量排序;
// Ranker 与 BeamSearch 共用同一累积器与评分函数
pub(crate) struct TopKAccumulator {
    k: usize,
    heap: BinaryHeap<Reverse<HeapEntry>>,
}

struct HeapEntry(ScoredPairing);

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    /// 优度序: 分数高者大;同分时输入序小者大(平局裁决)
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .score
            .partial_cmp(&other.0.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.0.input_index.cmp(&self.0.input_index))
    }
}

impl TopKAccumulator {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k.saturating_add(1)),
        }
    }

    pub fn push(&mut self, scored: ScoredPairing) {
        if self.k == 0 {
            return;
        }
        self.heap.push(Reverse(HeapEntry(scored)));
        if self.heap.len() > self.k {
            // 弹出当前最差项,保持堆大小 ≤ K
            self.heap.pop();
        }
    }

    /// 按 (score desc, input_index asc) 输出候选
    pub fn into_candidates(self) -> Vec<CandidateSchedule> {
        let ranked: Vec<ScoredPairing> = self
            .heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(HeapEntry(s))| s)
            .collect();

        ranked
            .into_iter()
            .enumerate()
            .map(|(rank, scored)| CandidateSchedule {
                candidate_id: format!("C{:03}", rank + 1),
                score: scored.score,
                hard_ok: true,
                soft_breakdown: scored.breakdown,
                pairing_ids: vec![scored.pairing_id],
                rationale: scored.rationale,
            })
            .collect()
    }
}

// ==========================================
// CandidateRanker - 候选排序引擎
// ==========================================
pub struct CandidateRanker {
    personas: PersonaRegistry,
    seniority: SeniorityConfig,
}

impl CandidateRanker {
    pub fn new() -> Self {
        Self {
            personas: PersonaRegistry::builtin(),
            seniority: SeniorityConfig::default(),
        }
    }

    /// 注入外部配置(画像注册表/资历乘数)
    pub fn with_config(personas: PersonaRegistry, seniority: SeniorityConfig) -> Self {
        Self { personas, seniority }
    }

    /// 选出可行配对中的 Top-K 候选
    ///
    /// # 规则
    /// - bundle.pairing_features 视为可行集(上游 Validator 已过滤)
    /// - 结果长度 = min(K, |可行集|);空可行集返回空结果(非错误)
    /// - 排序: score 降序,同分按原始输入序升序
    pub fn select_topk(
        &self,
        bundle: &FeatureBundle,
        pack: &RulePack,
        k: usize,
    ) -> PipelineResult<Vec<CandidateSchedule>> {
        let weights = self.resolve_weights(bundle, pack);
        let mut acc = TopKAccumulator::new(k);

        for (idx, pairing) in bundle.pairing_features.iter().enumerate() {
            let scored =
                ScoringCore::score_pairing(pairing, idx, bundle, &weights, &self.seniority);
            acc.push(scored);
        }

        let candidates = acc.into_candidates();
        info!(
            feasible_count = bundle.pairing_features.len(),
            k,
            selected = candidates.len(),
            "Top-K 候选选择完成"
        );
        Ok(candidates)
    }

    /// 权重解析(画像查找失败时跳过画像步骤并告警)
    pub(crate) fn resolve_weights(
        &self,
        bundle: &FeatureBundle,
        pack: &RulePack,
    ) -> std::collections::BTreeMap<crate::domain::types::Category, f64> {
        let persona = bundle
            .preference_schema
            .persona
            .as_deref()
            .and_then(|id| {
                let found = self.personas.get(id);
                if found.is_none() {
                    warn!(persona = %id, "未知画像,跳过画像权重调整");
                }
                found
            });

        ScoringCore::resolve_weights(
            &bundle.preference_schema,
            &bundle.context.default_weights,
            pack,
            persona,
        )
    }

    pub(crate) fn seniority(&self) -> &SeniorityConfig {
        &self.seniority
    }
}

impl Default for CandidateRanker {
    fn default() -> Self {
        Self::new()
    }
}
