// ==========================================
// 飞行员竞标优化系统 - 候选结果模型
// ==========================================
// 职责: 违规记录与候选排班的不可变值对象
// 红线: 所有判定必须输出 reason,保证可解释性
// ==========================================

use crate::domain::types::{Category, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Violation - 硬规则违规记录
// ==========================================
// 由 FeasibilityValidator 产出,追加写,不可修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub pairing_id: String, // 违规配对
    pub rule_id: String,    // 触发规则
    pub reason: String,     // 可读原因
    pub severity: Severity, // HARD=判定不通过 / ERROR=谓词异常
}

// ==========================================
// CandidateSchedule - 候选排班
// ==========================================
// 由 Ranker/Beam 产出,LayerGenerator 消费
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSchedule {
    pub candidate_id: String, // 候选标识
    pub score: f64,           // 加权总分(含资历置信乘数)
    pub hard_ok: bool,        // 硬规则全部通过

    /// 类别 → 加权贡献(确定性序列化,BTreeMap)
    pub soft_breakdown: BTreeMap<Category, f64>,

    /// 该候选覆盖的配对
    pub pairing_ids: Vec<String>,

    /// 可解释性: 至少一条,命名主要贡献类别
    pub rationale: Vec<String>,
}
