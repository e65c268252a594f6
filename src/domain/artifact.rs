// ==========================================
// 飞行员竞标优化系统 - 竞标工件模型
// ==========================================
// 职责: 竞标层、过滤器、工件与 Lint 报告的数据结构
// 红线: export_hash 永远由内容重算,不接受外部赋值
// ==========================================

use crate::domain::types::{FilterOp, PreferDirection};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 工件格式标签(当前唯一支持的过滤式竞标格式)
pub const ARTIFACT_FORMAT: &str = "pbs-filter-v1";

// ==========================================
// Filter - 层内过滤器
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,        // 过滤字段(如 pairing_id)
    pub op: FilterOp,         // 操作符
    pub values: Vec<String>,  // 值列表(包含型操作要求非空)
}

// ==========================================
// Layer - 竞标层
// ==========================================
// priority 从 1 开始,数值越小优先级越高
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub priority: u32,
    pub filters: Vec<Filter>,
    pub prefer: PreferDirection,
}

// ==========================================
// LintReport - 静态分析报告
// ==========================================
// 红线: 仅建议性输出,永不修改工件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LintReport {
    pub errors: Vec<LintMessage>,
    pub warnings: Vec<LintMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintMessage {
    pub layer: u32,      // 关联层 priority
    pub code: String,    // 问题代码(SHADOWED_LAYER 等)
    pub message: String, // 可读说明
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

// ==========================================
// BidLayerArtifact - 竞标层工件
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidLayerArtifact {
    pub airline: String, // 航空公司代码
    pub format: String,  // 格式标签
    pub month: String,   // 竞标月份 YYYY-MM
    pub layers: Vec<Layer>,

    /// Lint 结果(不参与哈希)
    #[serde(default)]
    pub lint: Option<LintReport>,

    /// 内容哈希(仅 {airline, format, month, layers} 的纯函数)
    pub export_hash: String,
}

// ==========================================
// 内容哈希信封
// ==========================================
// 字段顺序即序列化顺序,构成哈希的规范形式
#[derive(Serialize)]
struct HashEnvelope<'a> {
    airline: &'a str,
    format: &'a str,
    month: &'a str,
    layers: &'a [Layer],
}

impl BidLayerArtifact {
    /// 从内容重算 export_hash
    ///
    /// # 规则
    /// - 哈希输入严格为 {airline, format, month, layers}
    /// - 显式排除 lint 与既有 export_hash,保证幂等去重
    pub fn compute_hash(&self) -> String {
        let envelope = HashEnvelope {
            airline: &self.airline,
            format: &self.format,
            month: &self.month,
            layers: &self.layers,
        };
        // 结构体序列化字段顺序固定,serde_json 输出规范一致
        let bytes = serde_json::to_vec(&envelope)
            .unwrap_or_else(|_| Vec::new());
        let digest = Sha256::digest(&bytes);
        hex::encode(digest)
    }

    /// export_hash 是否与内容一致
    pub fn hash_is_current(&self) -> bool {
        self.export_hash == self.compute_hash()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{FilterOp, PreferDirection};

    fn sample_artifact() -> BidLayerArtifact {
        BidLayerArtifact {
            airline: "UAL".to_string(),
            format: ARTIFACT_FORMAT.to_string(),
            month: "2025-09".to_string(),
            layers: vec![Layer {
                priority: 1,
                filters: vec![Filter {
                    field: "pairing_id".to_string(),
                    op: FilterOp::In,
                    values: vec!["P1".to_string()],
                }],
                prefer: PreferDirection::Yes,
            }],
            lint: None,
            export_hash: String::new(),
        }
    }

    #[test]
    fn test_hash_deterministic() {
        let a = sample_artifact();
        assert_eq!(a.compute_hash(), a.compute_hash());
    }

    #[test]
    fn test_hash_ignores_lint_and_stale_hash() {
        let mut a = sample_artifact();
        let h = a.compute_hash();

        a.export_hash = "deadbeef".to_string();
        a.lint = Some(LintReport {
            errors: vec![],
            warnings: vec![LintMessage {
                layer: 1,
                code: "X".to_string(),
                message: "y".to_string(),
            }],
        });
        assert_eq!(a.compute_hash(), h);
    }

    #[test]
    fn test_hash_tracks_layer_content() {
        let mut a = sample_artifact();
        let h = a.compute_hash();
        a.layers[0].filters[0].values.push("P2".to_string());
        assert_ne!(a.compute_hash(), h);
    }
}
