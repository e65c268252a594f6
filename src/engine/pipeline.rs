// ==========================================
// 飞行员竞标优化系统 - 引擎编排器
// ==========================================
// 用途: 协调规则加载/可行性校验/候选排序/层生成/静态分析/导出的执行顺序
// ==========================================

use crate::domain::artifact::{BidLayerArtifact, LintReport};
use crate::domain::bundle::FeatureBundle;
use crate::domain::candidate::{CandidateSchedule, Violation};
use crate::engine::{
    BeamSearchOptimizer, CandidateRanker, FeasibilityValidator, LayerGenerator, LayerLinter,
    RankStrategy,
};
use crate::error::PipelineResult;
use crate::export::ExportStore;
use crate::rulepack::RulePackLoader;
use std::path::PathBuf;
use tracing::{debug, info};

// ==========================================
// BidRequest - 单次优化请求
// ==========================================

#[derive(Debug, Clone)]
pub struct BidRequest {
    /// 规则文档路径,按声明序合并;空列表时回退保守默认规则包
    pub rule_pack_paths: Vec<PathBuf>,
    pub force_reload: bool,
    pub bundle: FeatureBundle,
    pub strategy: RankStrategy,
    pub k: usize,
    /// 导出根目录;None 时跳过导出步骤
    pub export_dir: Option<PathBuf>,
}

// ==========================================
// PipelineOutcome - 优化结果
// ==========================================

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    // Validator 输出
    pub violations: Vec<Violation>,

    // Ranker / BeamSearch 输出
    pub candidates: Vec<CandidateSchedule>,

    // LayerGenerator + Linter 输出
    pub artifact: BidLayerArtifact,
    pub lint: LintReport,

    // ExportStore 输出
    pub export_path: Option<PathBuf>,
}

// ==========================================
// BidPipeline - 引擎编排器
// ==========================================

pub struct BidPipeline {
    loader: RulePackLoader,
    validator: FeasibilityValidator,
    ranker: CandidateRanker,
    beam: BeamSearchOptimizer,
    generator: LayerGenerator,
    linter: LayerLinter,
    store: ExportStore,
}

impl BidPipeline {
    pub fn new() -> Self {
        Self {
            loader: RulePackLoader::new(),
            validator: FeasibilityValidator::new(),
            ranker: CandidateRanker::new(),
            beam: BeamSearchOptimizer::new(),
            generator: LayerGenerator::new(),
            linter: LayerLinter::new(),
            store: ExportStore::new(),
        }
    }

    /// 执行完整竞标优化流程
    ///
    /// # 参数
    /// - request: 单次优化请求(规则路径/特征包/策略/K/导出目录)
    ///
    /// # 返回
    /// 优化结果(违规明细/候选/工件/分析报告/导出路径)
    pub fn run(&mut self, request: BidRequest) -> PipelineResult<PipelineOutcome> {
        info!(
            pilot_id = %request.bundle.context.pilot_id,
            strategy = request.strategy.as_str(),
            k = request.k,
            pairing_count = request.bundle.pairing_features.len(),
            "开始执行竞标优化流程"
        );

        // ==========================================
        // 步骤1: RulePackLoader - 规则包加载
        // ==========================================
        debug!("步骤1: 加载合规规则包");
        let pack = self
            .loader
            .load(&request.rule_pack_paths, request.force_reload);

        // ==========================================
        // 步骤2: FeasibilityValidator - 硬规则可行性校验
        // ==========================================
        debug!("步骤2: 执行硬规则可行性校验");
        let report = self.validator.validate(&request.bundle, &pack)?;

        // 排序阶段只看可行集,违规配对已被整体剔除
        let feasible_bundle = request.bundle.with_pairings(report.feasible.clone());

        info!(
            feasible_count = feasible_bundle.pairing_features.len(),
            violation_count = report.violations.len(),
            "可行性校验完成"
        );

        // ==========================================
        // 步骤3: Ranker / BeamSearch - 候选排序
        // ==========================================
        debug!("步骤3: 执行候选排序 ({})", request.strategy.as_str());
        let candidates = match request.strategy {
            RankStrategy::TopK => self.ranker.select_topk(&feasible_bundle, &pack, request.k)?,
            RankStrategy::Beam {
                time_budget_ms,
                max_nodes,
            } => self
                .beam
                .search(&feasible_bundle, &pack, request.k, time_budget_ms, max_nodes)?,
        };

        // ==========================================
        // 步骤4: LayerGenerator - 竞标层生成
        // ==========================================
        debug!("步骤4: 生成竞标层工件");
        let mut artifact = self
            .generator
            .candidates_to_layers(&candidates, &request.bundle);

        // ==========================================
        // 步骤5: LayerLinter - 静态分析(建议性)
        // ==========================================
        debug!("步骤5: 执行竞标层静态分析");
        let lint = self.linter.lint(&artifact);
        artifact.lint = Some(lint.clone());

        // ==========================================
        // 步骤6: ExportStore - 原子化导出(可选)
        // ==========================================
        let export_path = match &request.export_dir {
            Some(base_dir) => {
                debug!("步骤6: 导出竞标层工件");
                Some(self.store.write(&artifact, base_dir)?)
            }
            None => None,
        };

        info!(
            candidate_count = candidates.len(),
            layer_count = artifact.layers.len(),
            lint_clean = lint.is_clean(),
            exported = export_path.is_some(),
            "竞标优化流程完成"
        );

        Ok(PipelineOutcome {
            violations: report.violations,
            candidates,
            artifact,
            lint,
            export_path,
        })
    }
}

impl Default for BidPipeline {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bundle::{
        AnalyticsFeatures, ContextSnapshot, PreferenceSchema, SoftPreference,
    };
    use crate::domain::pairing::Pairing;
    use crate::domain::types::Category;
    use chrono::NaiveTime;
    use std::collections::BTreeMap;

    fn pairing(id: &str, rest_hours: f64, layover: &str) -> Pairing {
        Pairing {
            pairing_id: id.to_string(),
            duty_days: Some(4),
            credit_hours: Some(20.0),
            layover_city: Some(layover.to_string()),
            report_time: NaiveTime::from_hms_opt(9, 0, 0),
            release_time: NaiveTime::from_hms_opt(17, 0, 0),
            rest_hours: Some(rest_hours),
            equipment: Some("B737".to_string()),
            is_redeye: Some(false),
            weekend_overlap: Some(false),
        }
    }

    fn bundle(pairings: Vec<Pairing>) -> FeatureBundle {
        let mut prefs = PreferenceSchema::default();
        prefs.soft.insert(
            Category::Layover,
            SoftPreference {
                weight: Some(1.0),
                prefer: vec!["DEN".to_string()],
                ..Default::default()
            },
        );
        FeatureBundle {
            context: ContextSnapshot {
                pilot_id: "EMP1".to_string(),
                airline: "UAL".to_string(),
                base: "DEN".to_string(),
                seat: "FO".to_string(),
                equipment: "B737".to_string(),
                seniority_percentile: 0.5,
                default_weights: BTreeMap::new(),
            },
            preference_schema: prefs,
            analytics_features: AnalyticsFeatures::default(),
            compliance_flags: BTreeMap::new(),
            pairing_features: pairings,
        }
    }

    fn request(pairings: Vec<Pairing>, strategy: RankStrategy) -> BidRequest {
        BidRequest {
            rule_pack_paths: vec![],
            force_reload: false,
            bundle: bundle(pairings),
            strategy,
            k: 5,
            export_dir: None,
        }
    }

    // ==========================================
    // 测试 1: 完整流程(默认规则包)
    // ==========================================

    #[test]
    fn test_full_flow_topk() {
        let mut pipeline = BidPipeline::new();
        let outcome = pipeline
            .run(request(
                vec![pairing("P1", 12.0, "DEN"), pairing("P2", 12.0, "ORD")],
                RankStrategy::TopK,
            ))
            .unwrap();

        assert!(outcome.violations.is_empty());
        assert_eq!(outcome.candidates.len(), 2);
        assert_eq!(outcome.candidates[0].pairing_ids, vec!["P1".to_string()]);
        assert_eq!(outcome.artifact.layers.len(), 2);
        assert!(outcome.lint.is_clean());
        assert!(outcome.export_path.is_none());
        // 工件携带分析报告,哈希仍只覆盖核心字段
        assert!(outcome.artifact.lint.is_some());
        assert!(outcome.artifact.hash_is_current());
    }

    // ==========================================
    // 测试 2: 违规配对整体剔除
    // ==========================================

    #[test]
    fn test_violating_pairing_excluded_from_ranking() {
        let mut pipeline = BidPipeline::new();
        // P2 休息 8h < 保守默认下限 10h
        let outcome = pipeline
            .run(request(
                vec![pairing("P1", 12.0, "DEN"), pairing("P2", 8.0, "DEN")],
                RankStrategy::TopK,
            ))
            .unwrap();

        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].pairing_id, "P2");
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].pairing_ids, vec!["P1".to_string()]);
    }

    // ==========================================
    // 测试 3: 预算策略走同一流程
    // ==========================================

    #[test]
    fn test_beam_strategy_full_flow() {
        let mut pipeline = BidPipeline::new();
        let outcome = pipeline
            .run(request(
                vec![pairing("P1", 12.0, "DEN"), pairing("P2", 12.0, "ORD")],
                RankStrategy::Beam {
                    time_budget_ms: 60_000,
                    max_nodes: usize::MAX,
                },
            ))
            .unwrap();

        assert_eq!(outcome.candidates.len(), 2);
        assert_eq!(outcome.candidates[0].pairing_ids, vec!["P1".to_string()]);
    }

    // ==========================================
    // 测试 4: 空可行集产出空工件
    // ==========================================

    #[test]
    fn test_all_infeasible_yields_empty_artifact() {
        let mut pipeline = BidPipeline::new();
        let outcome = pipeline
            .run(request(vec![pairing("P1", 2.0, "DEN")], RankStrategy::TopK))
            .unwrap();

        assert!(!outcome.violations.is_empty());
        assert!(outcome.candidates.is_empty());
        assert!(outcome.artifact.layers.is_empty());
        assert!(outcome.artifact.hash_is_current());
    }
}
