// ==========================================
// 飞行员竞标优化系统 - Scoring Core 纯函数库
// ==========================================
// 职责: 权重解析链与各类别评分的纯逻辑
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use crate::config::{PersonaProfile, SeniorityConfig};
use crate::domain::bundle::{FeatureBundle, PreferenceSchema, SoftPreference};
use crate::domain::pairing::Pairing;
use crate::domain::types::Category;
use crate::rulepack::RulePack;
use chrono::NaiveTime;
use std::collections::BTreeMap;

/// 通勤默认时间窗(偏好未声明时的报到下限/解散上限)
const COMMUTE_DEFAULT_EARLIEST_REPORT: (u32, u32) = (9, 0);
const COMMUTE_DEFAULT_LATEST_RELEASE: (u32, u32) = (21, 0);

/// 收入效率口径: 每值勤日目标航程小时
const TARGET_CREDIT_HOURS_PER_DUTY_DAY: f64 = 6.0;

// ==========================================
// ScoredPairing - 单配对评分结果
// ==========================================
#[derive(Debug, Clone)]
pub struct ScoredPairing {
    pub input_index: usize, // 原始输入序(平局裁决键)
    pub pairing_id: String,
    pub score: f64,
    pub breakdown: BTreeMap<Category, f64>, // 类别 → 加权贡献
    pub rationale: Vec<String>,
}

// ==========================================
// ScoringCore - 纯函数工具类
// ==========================================
pub struct ScoringCore;

impl ScoringCore {
    /// 解析类别权重
    ///
    /// # 规则 (解析链,按序)
    /// 1. 起点: 上下文默认权重,缺失类别回退规则包软规则基线,再缺失为 0
    /// 2. 画像乘法调整(未声明画像跳过)
    /// 3. 偏好显式覆盖(soft[cat].weight)
    /// 4. 负值钳 0,归一化至总和 1.0;全零退化为均匀权重
    pub fn resolve_weights(
        prefs: &PreferenceSchema,
        default_weights: &BTreeMap<Category, f64>,
        pack: &RulePack,
        persona: Option<&PersonaProfile>,
    ) -> BTreeMap<Category, f64> {
        let mut weights: BTreeMap<Category, f64> = BTreeMap::new();

        for cat in Category::ALL {
            // 步骤1: 上下文默认 → 规则包基线 → 0
            let base = default_weights.get(&cat).copied().unwrap_or_else(|| {
                pack.soft
                    .iter()
                    .find(|r| r.category == cat)
                    .map(|r| r.weight)
                    .unwrap_or(0.0)
            });

            // 步骤2: 画像乘法调整
            let boosted = match persona {
                Some(profile) => base * profile.boost_for(cat),
                None => base,
            };

            // 步骤3: 显式覆盖
            let resolved = prefs
                .soft
                .get(&cat)
                .and_then(|p| p.weight)
                .unwrap_or(boosted);

            weights.insert(cat, resolved.max(0.0));
        }

        // 步骤4: 归一化
        let total: f64 = weights.values().sum();
        if total > f64::EPSILON {
            for w in weights.values_mut() {
                *w /= total;
            }
        } else {
            let uniform = 1.0 / Category::ALL.len() as f64;
            for w in weights.values_mut() {
                *w = uniform;
            }
        }

        weights
    }

    /// 对单个配对评分
    ///
    /// # 规则
    /// - 每类别独立纯函数输出 [0,1],按解析权重加权求和
    /// - 资历乘数 (1.0 + alpha·percentile) 作用于总分
    /// - breakdown 仅含权重 > 0 的类别
    /// - rationale 至少一条,命名贡献最高的类别
    pub fn score_pairing(
        pairing: &Pairing,
        input_index: usize,
        bundle: &FeatureBundle,
        weights: &BTreeMap<Category, f64>,
        seniority: &SeniorityConfig,
    ) -> ScoredPairing {
        let prefs = &bundle.preference_schema;
        let mut breakdown: BTreeMap<Category, f64> = BTreeMap::new();
        let mut raw_sum = 0.0;

        for cat in Category::ALL {
            let weight = weights.get(&cat).copied().unwrap_or(0.0);
            if weight <= 0.0 {
                continue;
            }
            let raw = Self::category_score(cat, pairing, bundle);
            let contribution = weight * raw;
            breakdown.insert(cat, contribution);
            raw_sum += contribution;
        }

        let multiplier = seniority.multiplier(bundle.context.seniority_percentile);
        let score = raw_sum * multiplier;

        let rationale = Self::build_rationale(&breakdown, prefs);

        ScoredPairing {
            input_index,
            pairing_id: pairing.pairing_id.clone(),
            score,
            breakdown,
            rationale,
        }
    }

    /// 单类别评分分派
    pub fn category_score(cat: Category, pairing: &Pairing, bundle: &FeatureBundle) -> f64 {
        let pref = bundle.preference_schema.soft.get(&cat);
        match cat {
            Category::Layover => Self::score_layover(pairing, pref),
            Category::AwardRate => Self::score_award_rate(pairing, bundle),
            Category::TripLength => Self::score_trip_length(pairing, pref),
            Category::ReportWindow => Self::score_report_window(pairing, pref),
            Category::Commutability => Self::score_commutability(pairing, pref),
            Category::Equipment => Self::score_equipment(pairing, bundle),
            Category::DutyHours => Self::score_duty_hours(pairing),
        }
    }

    // ==========================================
    // 各类别评分函数
    // ==========================================

    /// 驻外站匹配: 偏好 1.0 / 回避 0.0 / 其余中性 0.5
    pub fn score_layover(pairing: &Pairing, pref: Option<&SoftPreference>) -> f64 {
        let Some(city) = pairing.layover_city.as_deref() else {
            return 0.5;
        };
        let Some(pref) = pref else {
            return 0.5;
        };
        if pref.prefer.iter().any(|c| c == city) {
            1.0
        } else if pref.avoid.iter().any(|c| c == city) {
            0.0
        } else {
            0.5
        }
    }

    /// 驻外站历史中签率,缺失统计时中性 0.5
    pub fn score_award_rate(pairing: &Pairing, bundle: &FeatureBundle) -> f64 {
        pairing
            .layover_city
            .as_deref()
            .and_then(|city| bundle.analytics_features.station_award_rates.get(city))
            .copied()
            .map(|r| r.clamp(0.0, 1.0))
            .unwrap_or(0.5)
    }

    /// 行程天数与期望的偏差(线性衰减)
    pub fn score_trip_length(pairing: &Pairing, pref: Option<&SoftPreference>) -> f64 {
        let desired = pref.and_then(|p| p.desired_duty_days);
        match (pairing.duty_days, desired) {
            (Some(actual), Some(desired)) => {
                let denom = desired.max(1) as f64;
                (1.0 - (actual as f64 - desired as f64).abs() / denom).clamp(0.0, 1.0)
            }
            _ => 0.5,
        }
    }

    /// 报到/解散时间窗: 声明约束的满足比例,未声明中性 0.5
    pub fn score_report_window(pairing: &Pairing, pref: Option<&SoftPreference>) -> f64 {
        let Some(pref) = pref else {
            return 0.5;
        };

        let mut declared = 0u32;
        let mut satisfied = 0u32;

        if let Some(earliest) = pref.earliest_report {
            declared += 1;
            if pairing.report_time.map(|t| t >= earliest).unwrap_or(false) {
                satisfied += 1;
            }
        }
        if let Some(latest) = pref.latest_release {
            declared += 1;
            if pairing.release_time.map(|t| t <= latest).unwrap_or(false) {
                satisfied += 1;
            }
        }

        if declared == 0 {
            0.5
        } else {
            satisfied as f64 / declared as f64
        }
    }

    /// 通勤可行性: 报到下限与解散上限,缺省使用默认通勤时间窗
    pub fn score_commutability(pairing: &Pairing, pref: Option<&SoftPreference>) -> f64 {
        let earliest = pref
            .and_then(|p| p.earliest_report)
            .or_else(|| time_of(COMMUTE_DEFAULT_EARLIEST_REPORT));
        let latest = pref
            .and_then(|p| p.latest_release)
            .or_else(|| time_of(COMMUTE_DEFAULT_LATEST_RELEASE));

        let report_ok = match (pairing.report_time, earliest) {
            (Some(t), Some(e)) => t >= e,
            _ => false,
        };
        let release_ok = match (pairing.release_time, latest) {
            (Some(t), Some(l)) => t <= l,
            _ => false,
        };

        match (report_ok, release_ok) {
            (true, true) => 1.0,
            (true, false) | (false, true) => 0.5,
            (false, false) => 0.0,
        }
    }

    /// 机型匹配: 偏好列表优先,缺省对比上下文资质机型
    pub fn score_equipment(pairing: &Pairing, bundle: &FeatureBundle) -> f64 {
        let Some(equipment) = pairing.equipment.as_deref() else {
            return 0.0;
        };
        let pref = bundle.preference_schema.soft.get(&Category::Equipment);
        match pref.filter(|p| !p.prefer.is_empty()) {
            Some(p) => {
                if p.prefer.iter().any(|e| e == equipment) {
                    1.0
                } else {
                    0.0
                }
            }
            None => {
                if equipment == bundle.context.equipment {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// 航程小时效率: credit_hours / (duty_days × 目标小时)
    pub fn score_duty_hours(pairing: &Pairing) -> f64 {
        match (pairing.credit_hours, pairing.duty_days) {
            (Some(credit), Some(days)) if days > 0 => {
                (credit / (days as f64 * TARGET_CREDIT_HOURS_PER_DUTY_DAY)).clamp(0.0, 1.0)
            }
            _ => 0.5,
        }
    }

    // ==========================================
    // 可解释性
    // ==========================================

    /// 生成评分理由: 最高贡献类别,次高贡献接近时一并列出
    fn build_rationale(
        breakdown: &BTreeMap<Category, f64>,
        prefs: &PreferenceSchema,
    ) -> Vec<String> {
        let mut ranked: Vec<(Category, f64)> =
            breakdown.iter().map(|(c, v)| (*c, *v)).collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut rationale = Vec::new();
        if let Some(&(top_cat, top_val)) = ranked.first() {
            rationale.push(format!(
                "TOP_CATEGORY {}: contribution={:.3}",
                top_cat, top_val
            ));
            if let Some(&(second_cat, second_val)) = ranked.get(1) {
                if top_val > 0.0 && second_val >= 0.8 * top_val {
                    rationale.push(format!(
                        "CO_CATEGORY {}: contribution={:.3}",
                        second_cat, second_val
                    ));
                }
            }
        } else {
            rationale.push("NO_ACTIVE_CATEGORY: all weights zero".to_string());
        }

        if prefs.persona.is_some() {
            rationale.push(format!(
                "PERSONA_APPLIED: {}",
                prefs.persona.as_deref().unwrap_or("")
            ));
        }

        rationale
    }
}

fn time_of((h, m): (u32, u32)) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
}
