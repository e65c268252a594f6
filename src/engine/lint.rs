// ==========================================
// 飞行员竞标优化系统 - 竞标层静态分析引擎
// ==========================================
// 职责: 遮蔽层/不可达层/非法过滤器的静态检查
// 红线: 仅建议性输出,永不修改工件
// ==========================================

use crate::domain::artifact::{BidLayerArtifact, Layer, LintMessage, LintReport};
use crate::domain::types::FilterOp;
use std::collections::BTreeSet;
use tracing::info;

// ==========================================
// LayerLinter - 静态分析引擎
// ==========================================
pub struct LayerLinter {
    // 无状态引擎,不需要注入依赖
}

impl LayerLinter {
    pub fn new() -> Self {
        Self {}
    }

    /// 分析竞标层工件
    ///
    /// # 规则
    /// 1. 遮蔽: 两层规范化过滤器集相同 → 后层警告(可移除)
    /// 2. 不可达: 后层接受集是先层接受集的非空真子集 → 警告
    /// 3. 包含型过滤器空值列表 → 错误
    /// 4. 过滤器内重复值 → 警告
    /// 5. 同层互斥过滤器(同字段不相交包含集) → 错误
    pub fn lint(&self, artifact: &BidLayerArtifact) -> LintReport {
        let mut report = LintReport::default();

        for layer in &artifact.layers {
            self.check_filters(layer, &mut report);
        }
        self.check_shadowing(&artifact.layers, &mut report);
        self.check_unreachability(&artifact.layers, &mut report);

        info!(
            layer_count = artifact.layers.len(),
            error_count = report.errors.len(),
            warning_count = report.warnings.len(),
            "竞标层静态分析完成"
        );
        report
    }

    // ==========================================
    // 单层过滤器检查
    // ==========================================

    fn check_filters(&self, layer: &Layer, report: &mut LintReport) {
        for filter in &layer.filters {
            // 规则 3: 包含型操作空值列表
            if filter.op.is_inclusion() && filter.values.is_empty() {
                report.errors.push(LintMessage {
                    layer: layer.priority,
                    code: "EMPTY_VALUE_LIST".to_string(),
                    message: format!(
                        "inclusion filter on {} has no values; layer {} can never match",
                        filter.field, layer.priority
                    ),
                });
            }

            // 规则 4: 过滤器内重复值
            let unique: BTreeSet<&String> = filter.values.iter().collect();
            if unique.len() < filter.values.len() {
                report.warnings.push(LintMessage {
                    layer: layer.priority,
                    code: "DUPLICATE_VALUES".to_string(),
                    message: format!(
                        "filter on {} contains duplicate values",
                        filter.field
                    ),
                });
            }
        }

        // 规则 5: 同字段互斥包含过滤器
        let inclusions: Vec<_> = layer
            .filters
            .iter()
            .filter(|f| f.op.is_inclusion() && !f.values.is_empty())
            .collect();
        for i in 0..inclusions.len() {
            for j in (i + 1)..inclusions.len() {
                if inclusions[i].field != inclusions[j].field {
                    continue;
                }
                let a: BTreeSet<&String> = inclusions[i].values.iter().collect();
                let b: BTreeSet<&String> = inclusions[j].values.iter().collect();
                if a.is_disjoint(&b) {
                    report.errors.push(LintMessage {
                        layer: layer.priority,
                        code: "CONTRADICTORY_FILTERS".to_string(),
                        message: format!(
                            "disjoint inclusion filters on {}; layer {} can never match",
                            inclusions[i].field, layer.priority
                        ),
                    });
                }
            }
        }
    }

    // ==========================================
    // 跨层检查
    // ==========================================

    /// 规则 1: 规范化过滤器集相同 → 后层遮蔽警告
    fn check_shadowing(&self, layers: &[Layer], report: &mut LintReport) {
        let canonical: Vec<_> = layers.iter().map(canonical_filter_set).collect();

        for j in 0..layers.len() {
            for i in 0..j {
                if canonical[i] == canonical[j] {
                    report.warnings.push(LintMessage {
                        layer: layers[j].priority,
                        code: "SHADOWED_LAYER".to_string(),
                        message: format!(
                            "identical filter set as layer {}; remove layer {}",
                            layers[i].priority, layers[j].priority
                        ),
                    });
                    break; // 每个后层只报首个遮蔽源
                }
            }
        }
    }

    /// 规则 2: 后层接受集 ⊊ 先层接受集(非空) → 不可达警告
    fn check_unreachability(&self, layers: &[Layer], report: &mut LintReport) {
        let accepted: Vec<_> = layers.iter().map(accepted_pairing_set).collect();

        for j in 0..layers.len() {
            let Some(later) = &accepted[j] else { continue };
            if later.is_empty() {
                continue;
            }
            for i in 0..j {
                let Some(earlier) = &accepted[i] else { continue };
                if later.is_subset(earlier) && later.len() < earlier.len() {
                    report.warnings.push(LintMessage {
                        layer: layers[j].priority,
                        code: "UNREACHABLE_LAYER".to_string(),
                        message: format!(
                            "accepted pairings are a strict subset of layer {}; layer {} can never award",
                            layers[i].priority, layers[j].priority
                        ),
                    });
                    break;
                }
            }
        }
    }
}

impl Default for LayerLinter {
    fn default() -> Self {
        Self::new()
    }
}

/// 规范化过滤器集: (field, op, 排序去重后的值),整体排序
fn canonical_filter_set(layer: &Layer) -> BTreeSet<(String, String, Vec<String>)> {
    layer
        .filters
        .iter()
        .map(|f| {
            let mut values = f.values.clone();
            values.sort();
            values.dedup();
            (f.field.clone(), f.op.to_string(), values)
        })
        .collect()
}

/// 层接受的配对集(仅当过滤器可静态求解时)
///
/// 按 pairing_id 上的包含过滤器求交,NOT_IN 求差;
/// 无 pairing_id 包含过滤器时无法静态判定,返回 None
fn accepted_pairing_set(layer: &Layer) -> Option<BTreeSet<String>> {
    let mut accepted: Option<BTreeSet<String>> = None;

    for filter in &layer.filters {
        if filter.field != "pairing_id" {
            continue;
        }
        match filter.op {
            FilterOp::In | FilterOp::Equals => {
                let values: BTreeSet<String> = filter.values.iter().cloned().collect();
                accepted = Some(match accepted {
                    Some(existing) => existing.intersection(&values).cloned().collect(),
                    None => values,
                });
            }
            FilterOp::NotIn => {
                if let Some(existing) = accepted.as_mut() {
                    for v in &filter.values {
                        existing.remove(v);
                    }
                }
            }
        }
    }

    accepted
}
