// ==========================================
// 飞行员竞标优化系统 - 可行性校验引擎
// ==========================================
// 职责: 逐配对评估硬规则,产出违规记录与可行子集
// 红线: 单条规则异常不中断批次;字段缺失 fail-closed
// ==========================================

use crate::domain::bundle::FeatureBundle;
use crate::domain::candidate::Violation;
use crate::domain::pairing::Pairing;
use crate::domain::types::Severity;
use crate::error::{PipelineError, PipelineResult};
use crate::rulepack::{HardRule, Predicate, PredicateSpec, RuleEvalError, RulePack};
use tracing::{debug, info, warn};

// ==========================================
// FeasibilityReport - 校验结果
// ==========================================
// 不变量: feasible ∪ {有违规的配对} = 全集,两者不相交
#[derive(Debug, Clone)]
pub struct FeasibilityReport {
    pub violations: Vec<Violation>,
    pub feasible: Vec<Pairing>,
}

// ==========================================
// FeasibilityValidator - 可行性校验引擎
// ==========================================
pub struct FeasibilityValidator {
    // 无状态引擎,不需要注入依赖
}

impl FeasibilityValidator {
    pub fn new() -> Self {
        Self {}
    }

    /// 校验特征包内全部配对
    ///
    /// # 规则
    /// 1. 先校验输入结构(百分位越界/空配对号 → ValidationInput,无部分结果)
    /// 2. 每配对 × 每硬规则逐一求值,评估序为规则包序
    /// 3. 谓词不满足 / 字段缺失(fail-closed) → HARD 违规
    /// 4. 谓词自身异常 → ERROR 违规,继续其余规则与配对
    /// 5. 配对可行 iff 零违规;划分结果与评估序无关
    pub fn validate(
        &self,
        bundle: &FeatureBundle,
        pack: &RulePack,
    ) -> PipelineResult<FeasibilityReport> {
        self.check_bundle(bundle)?;

        let pref_rules = preference_hard_rules(bundle);
        let mut violations: Vec<Violation> = Vec::new();
        let mut feasible: Vec<Pairing> = Vec::new();

        for pairing in &bundle.pairing_features {
            let before = violations.len();

            for rule in pack.hard.iter().chain(pref_rules.iter()) {
                match rule.predicate.eval(pairing, &bundle.compliance_flags) {
                    Ok(true) => {}
                    Ok(false) => {
                        violations.push(Violation {
                            pairing_id: pairing.pairing_id.clone(),
                            rule_id: rule.id.clone(),
                            reason: format!(
                                "RULE_FAIL: {}",
                                rule.description.as_deref().unwrap_or(&rule.id)
                            ),
                            severity: Severity::Hard,
                        });
                    }
                    // 字段缺失: 按 fail-closed 判不通过
                    Err(RuleEvalError::MissingField(field)) => {
                        violations.push(Violation {
                            pairing_id: pairing.pairing_id.clone(),
                            rule_id: rule.id.clone(),
                            reason: format!("FIELD_MISSING: {} (fail-closed)", field),
                            severity: Severity::Hard,
                        });
                    }
                    // 谓词配置错误: 记录 ERROR 违规,不中断批次
                    Err(e) => {
                        warn!(
                            pairing_id = %pairing.pairing_id,
                            rule_id = %rule.id,
                            error = %e,
                            "规则谓词求值异常,转为 ERROR 违规"
                        );
                        violations.push(Violation {
                            pairing_id: pairing.pairing_id.clone(),
                            rule_id: rule.id.clone(),
                            reason: format!("RULE_ERROR: {}", e),
                            severity: Severity::Error,
                        });
                    }
                }
            }

            if violations.len() == before {
                feasible.push(pairing.clone());
            } else {
                debug!(
                    pairing_id = %pairing.pairing_id,
                    violation_count = violations.len() - before,
                    "配对不可行"
                );
            }
        }

        info!(
            total = bundle.pairing_features.len(),
            feasible_count = feasible.len(),
            violation_count = violations.len(),
            "可行性校验完成"
        );

        Ok(FeasibilityReport {
            violations,
            feasible,
        })
    }

    /// 输入结构校验(畸形输入直接上浮,不产出部分结果)
    fn check_bundle(&self, bundle: &FeatureBundle) -> PipelineResult<()> {
        let pct = bundle.context.seniority_percentile;
        if !(0.0..=1.0).contains(&pct) || pct.is_nan() {
            return Err(PipelineError::ValidationInput {
                field: "context.seniority_percentile".to_string(),
                message: format!("必须在 [0,1] 区间: {}", pct),
            });
        }

        for (idx, pairing) in bundle.pairing_features.iter().enumerate() {
            if pairing.pairing_id.trim().is_empty() {
                return Err(PipelineError::ValidationInput {
                    field: format!("pairing_features[{}].pairing_id", idx),
                    message: "配对号为空".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Default for FeasibilityValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// 偏好硬约束转换为合成硬规则(与规则包硬规则同等求值)
fn preference_hard_rules(bundle: &FeatureBundle) -> Vec<HardRule> {
    let hard = &bundle.preference_schema.hard;
    let mut rules = Vec::new();

    if hard.no_redeyes {
        rules.push(HardRule {
            id: "pref_no_redeye".to_string(),
            description: Some("偏好硬约束: 拒绝红眼航段".to_string()),
            predicate: PredicateSpec::Valid(Predicate::Flag {
                field: "is_redeye".to_string(),
                expected: false,
            }),
        });
    }
    if hard.no_weekend_overlap {
        rules.push(HardRule {
            id: "pref_no_weekend_overlap".to_string(),
            description: Some("偏好硬约束: 拒绝覆盖周末".to_string()),
            predicate: PredicateSpec::Valid(Predicate::Flag {
                field: "weekend_overlap".to_string(),
                expected: false,
            }),
        });
    }
    if let Some(max_days) = hard.max_duty_days {
        rules.push(HardRule {
            id: "pref_max_duty_days".to_string(),
            description: Some(format!("偏好硬约束: 值勤天数 ≤ {}", max_days)),
            predicate: PredicateSpec::Valid(Predicate::Le {
                field: "duty_days".to_string(),
                value: max_days as f64,
            }),
        });
    }
    if let Some(min_rest) = hard.min_rest_hours {
        rules.push(HardRule {
            id: "pref_min_rest_hours".to_string(),
            description: Some(format!("偏好硬约束: 休息 ≥ {}h", min_rest)),
            predicate: PredicateSpec::Valid(Predicate::Ge {
                field: "rest_hours".to_string(),
                value: min_rest,
            }),
        });
    }

    rules
}
