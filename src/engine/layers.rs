// ==========================================
// 飞行员竞标优化系统 - 竞标层生成引擎
// ==========================================
// 职责: 排名候选 → 有序竞标层工件,并计算内容哈希
// 红线: export_hash 是 {airline, format, month, layers} 的纯函数
// ==========================================

use crate::domain::artifact::{BidLayerArtifact, Filter, Layer, ARTIFACT_FORMAT};
use crate::domain::bundle::FeatureBundle;
use crate::domain::candidate::CandidateSchedule;
use crate::domain::types::{FilterOp, PreferDirection};
use chrono::{Datelike, NaiveDate, Utc};
use tracing::info;

// ==========================================
// LayerGenerator - 竞标层生成引擎
// ==========================================
pub struct LayerGenerator {
    // 无状态引擎,不需要注入依赖
}

impl LayerGenerator {
    pub fn new() -> Self {
        Self {}
    }

    /// 候选转竞标层工件(月份取生成时刻的下一个日历月)
    pub fn candidates_to_layers(
        &self,
        candidates: &[CandidateSchedule],
        bundle: &FeatureBundle,
    ) -> BidLayerArtifact {
        self.candidates_to_layers_at(candidates, bundle, Utc::now().date_naive())
    }

    /// 候选转竞标层工件(显式基准日期,便于测试)
    ///
    /// # 规则
    /// 1. 每个候选占一层,priority = 排名(从 1 起)
    /// 2. 每层单个包含过滤器: pairing_id IN {候选配对},方向恒为 prefer
    /// 3. 航司: 偏好结构优先,回退上下文
    /// 4. 月份: 基准日期的下一个日历月,格式 YYYY-MM
    /// 5. export_hash 生成后立即按内容计算
    pub fn candidates_to_layers_at(
        &self,
        candidates: &[CandidateSchedule],
        bundle: &FeatureBundle,
        today: NaiveDate,
    ) -> BidLayerArtifact {
        let layers: Vec<Layer> = candidates
            .iter()
            .enumerate()
            .map(|(rank, candidate)| Layer {
                priority: (rank + 1) as u32,
                filters: vec![Filter {
                    field: "pairing_id".to_string(),
                    op: FilterOp::In,
                    values: candidate.pairing_ids.clone(),
                }],
                prefer: PreferDirection::Yes,
            })
            .collect();

        let mut artifact = BidLayerArtifact {
            airline: bundle.resolve_airline().to_string(),
            format: ARTIFACT_FORMAT.to_string(),
            month: next_calendar_month(today),
            layers,
            lint: None,
            export_hash: String::new(),
        };
        artifact.export_hash = artifact.compute_hash();

        info!(
            airline = %artifact.airline,
            month = %artifact.month,
            layer_count = artifact.layers.len(),
            export_hash = %artifact.export_hash,
            "竞标层工件生成完成"
        );
        artifact
    }
}

impl Default for LayerGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// 基准日期的下一个日历月 (YYYY-MM)
fn next_calendar_month(today: NaiveDate) -> String {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    format!("{:04}-{:02}", year, month)
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bundle::{AnalyticsFeatures, ContextSnapshot, PreferenceSchema};
    use std::collections::BTreeMap;

    fn candidate(id: &str, pairing: &str, score: f64) -> CandidateSchedule {
        CandidateSchedule {
            candidate_id: id.to_string(),
            score,
            hard_ok: true,
            soft_breakdown: BTreeMap::new(),
            pairing_ids: vec![pairing.to_string()],
            rationale: vec!["TOP_CATEGORY LAYOVER: contribution=0.500".to_string()],
        }
    }

    fn bundle(pref_airline: Option<&str>) -> FeatureBundle {
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
            preference_schema: PreferenceSchema {
                airline: pref_airline.map(|s| s.to_string()),
                ..Default::default()
            },
            analytics_features: AnalyticsFeatures::default(),
            compliance_flags: BTreeMap::new(),
            pairing_features: vec![],
        }
    }

    // ==========================================
    // 测试 1: 场景 C - 层序与哈希一致性
    // ==========================================

    #[test]
    fn test_scenario_c_layers_in_rank_order() {
        let generator = LayerGenerator::new();
        let today = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
        let artifact = generator.candidates_to_layers_at(
            &[candidate("C001", "P1", 0.9), candidate("C002", "P2", 0.7)],
            &bundle(None),
            today,
        );

        assert_eq!(artifact.layers.len(), 2);
        assert_eq!(artifact.layers[0].priority, 1);
        assert_eq!(artifact.layers[0].filters[0].values, vec!["P1".to_string()]);
        assert_eq!(artifact.layers[1].priority, 2);
        assert_eq!(artifact.layers[1].filters[0].values, vec!["P2".to_string()]);

        // 从返回工件的核心字段重算哈希 = export_hash
        assert_eq!(artifact.compute_hash(), artifact.export_hash);
    }

    // ==========================================
    // 测试 2: 月份推导
    // ==========================================

    #[test]
    fn test_month_is_next_calendar_month() {
        let generator = LayerGenerator::new();
        let artifact = generator.candidates_to_layers_at(
            &[],
            &bundle(None),
            NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
        );
        assert_eq!(artifact.month, "2025-09");
    }

    #[test]
    fn test_month_rolls_over_year() {
        let generator = LayerGenerator::new();
        let artifact = generator.candidates_to_layers_at(
            &[],
            &bundle(None),
            NaiveDate::from_ymd_opt(2025, 12, 3).unwrap(),
        );
        assert_eq!(artifact.month, "2026-01");
    }

    // ==========================================
    // 测试 3: 航司解析
    // ==========================================

    #[test]
    fn test_airline_prefers_schema_then_context() {
        let generator = LayerGenerator::new();
        let today = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();

        let from_prefs = generator.candidates_to_layers_at(&[], &bundle(Some("DAL")), today);
        assert_eq!(from_prefs.airline, "DAL");

        let from_context = generator.candidates_to_layers_at(&[], &bundle(None), today);
        assert_eq!(from_context.airline, "UAL");
    }

    // ==========================================
    // 测试 4: 内容哈希幂等性
    // ==========================================

    #[test]
    fn test_identical_content_identical_hash() {
        let generator = LayerGenerator::new();
        let today = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let cands = [candidate("C001", "P1", 0.9)];

        let a = generator.candidates_to_layers_at(&cands, &bundle(None), today);
        let b = generator.candidates_to_layers_at(&cands, &bundle(None), today);
        assert_eq!(a.export_hash, b.export_hash);
    }

    #[test]
    fn test_direction_always_prefer() {
        let generator = LayerGenerator::new();
        let artifact = generator.candidates_to_layers_at(
            &[candidate("C001", "P1", 0.9)],
            &bundle(None),
            NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
        );
        assert_eq!(artifact.layers[0].prefer, PreferDirection::Yes);
    }
}
