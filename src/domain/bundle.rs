// ==========================================
// 飞行员竞标优化系统 - 请求特征包
// ==========================================
// 职责: 单次竞标请求的上下文快照、偏好结构与配对特征
// 红线: 请求级数据只读,引擎不回写
// ==========================================

use crate::domain::pairing::Pairing;
use crate::domain::types::Category;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// ContextSnapshot - 飞行员上下文快照
// ==========================================
// 约束: seniority_percentile ∈ [0,1] (Validator 校验)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub pilot_id: String,            // 飞行员标识
    pub airline: String,             // 航空公司代码
    pub base: String,                // 基地(驻地机场)
    pub seat: String,                // 座席(CA/FO)
    pub equipment: String,           // 资质机型
    pub seniority_percentile: f64,   // 资历百分位 [0,1]

    /// 默认类别权重(权重解析链起点)
    #[serde(default)]
    pub default_weights: BTreeMap<Category, f64>,
}

// ==========================================
// HardConstraints - 偏好硬约束
// ==========================================
// 与规则包硬规则同等效力,违反即整体不可行
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HardConstraints {
    #[serde(default)]
    pub no_redeyes: bool, // 拒绝红眼航段

    #[serde(default)]
    pub no_weekend_overlap: bool, // 拒绝覆盖周末

    #[serde(default)]
    pub max_duty_days: Option<u32>, // 最大值勤天数

    #[serde(default)]
    pub min_rest_hours: Option<f64>, // 最小休息小时
}

// ==========================================
// SoftPreference - 单类别软偏好
// ==========================================
// weight 覆盖权重解析链中该类别的权重;
// 其余可选旋钮仅被对应类别的评分函数读取
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoftPreference {
    #[serde(default)]
    pub weight: Option<f64>, // 显式权重覆盖(≥0)

    #[serde(default)]
    pub prefer: Vec<String>, // 偏好值集合(城市/机型等)

    #[serde(default)]
    pub avoid: Vec<String>, // 回避值集合

    #[serde(default)]
    pub desired_duty_days: Option<u32>, // 期望行程天数(TRIP_LENGTH)

    #[serde(default)]
    pub earliest_report: Option<NaiveTime>, // 最早可接受报到(REPORT_WINDOW/COMMUTABILITY)

    #[serde(default)]
    pub latest_release: Option<NaiveTime>, // 最晚可接受解散(REPORT_WINDOW/COMMUTABILITY)
}

// ==========================================
// PreferenceSchema - 结构化偏好
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferenceSchema {
    /// 航空公司(缺省时回退 context.airline)
    #[serde(default)]
    pub airline: Option<String>,

    /// 画像标识(family_oriented/pay_maximizer/commuter/自定义)
    #[serde(default)]
    pub persona: Option<String>,

    #[serde(default)]
    pub hard: HardConstraints,

    /// 类别 → 软偏好
    #[serde(default)]
    pub soft: BTreeMap<Category, SoftPreference>,
}

// ==========================================
// AnalyticsFeatures - 统计特征
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsFeatures {
    /// 驻外站 → 历史中签率 [0,1]
    #[serde(default)]
    pub station_award_rates: BTreeMap<String, f64>,
}

// ==========================================
// FeatureBundle - 请求特征包
// ==========================================
// 外部协作方按请求提供,贯穿校验→评分→生成全流程
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureBundle {
    pub context: ContextSnapshot,

    #[serde(default)]
    pub preference_schema: PreferenceSchema,

    #[serde(default)]
    pub analytics_features: AnalyticsFeatures,

    /// 合规标志(谓词可按 "compliance.<key>" 引用,缺失 fail-closed)
    #[serde(default)]
    pub compliance_flags: BTreeMap<String, bool>,

    /// 候选配对(顺序即平局裁决的原始输入序)
    pub pairing_features: Vec<Pairing>,
}

impl FeatureBundle {
    /// 解析竞标航空公司: 偏好优先,回退上下文
    pub fn resolve_airline(&self) -> &str {
        self.preference_schema
            .airline
            .as_deref()
            .unwrap_or(&self.context.airline)
    }

    /// 以可行子集替换配对列表,其余字段共享
    pub fn with_pairings(&self, pairings: Vec<Pairing>) -> FeatureBundle {
        FeatureBundle {
            context: self.context.clone(),
            preference_schema: self.preference_schema.clone(),
            analytics_features: self.analytics_features.clone(),
            compliance_flags: self.compliance_flags.clone(),
            pairing_features: pairings,
        }
    }
}

// ==========================================
// 月份标签换算
// ==========================================

/// 协作方六位月份标签 (YYYYMM) → 工件月份 (YYYY-MM)
///
/// # 规则
/// - 必须为 6 位数字且月份 ∈ [01,12],否则返回 None
pub fn month_tag_to_artifact_month(tag: &str) -> Option<String> {
    if tag.len() != 6 || !tag.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let month: u32 = tag[4..6].parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some(format!("{}-{}", &tag[0..4], &tag[4..6]))
}
