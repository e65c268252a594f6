// ==========================================
// 飞行员竞标优化系统 - 排序策略定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// BEAM 策略的默认预算(字符串解析时使用)
const DEFAULT_BEAM_TIME_BUDGET_MS: u64 = 200;
const DEFAULT_BEAM_MAX_NODES: usize = 10_000;

/// 候选选择策略
///
/// - TopK: 全量精确评分(默认)
/// - Beam: 预算式尽力而为评分,适合大候选空间或延迟上限场景
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankStrategy {
    TopK,
    Beam {
        time_budget_ms: u64,
        max_nodes: usize,
    },
}

impl RankStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankStrategy::TopK => "TOP_K",
            RankStrategy::Beam { .. } => "BEAM",
        }
    }
}

impl Default for RankStrategy {
    fn default() -> Self {
        RankStrategy::TopK
    }
}

impl FromStr for RankStrategy {
    type Err = String;

    /// 解析策略名,BEAM 使用默认预算;未知名称报错由调用方处理
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TOP_K" | "TOPK" => Ok(RankStrategy::TopK),
            "BEAM" => Ok(RankStrategy::Beam {
                time_budget_ms: DEFAULT_BEAM_TIME_BUDGET_MS,
                max_nodes: DEFAULT_BEAM_MAX_NODES,
            }),
            other => Err(format!("未知排序策略: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_topk() {
        assert_eq!(RankStrategy::default(), RankStrategy::TopK);
    }

    #[test]
    fn test_serde_tagged_representation() {
        let s = RankStrategy::Beam {
            time_budget_ms: 200,
            max_nodes: 5_000,
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["mode"], "BEAM");
        assert_eq!(json["time_budget_ms"], 200);

        let back: RankStrategy = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_from_str_names() {
        assert_eq!("top_k".parse::<RankStrategy>(), Ok(RankStrategy::TopK));
        assert!(matches!(
            "BEAM".parse::<RankStrategy>(),
            Ok(RankStrategy::Beam { .. })
        ));
        assert!("greedy".parse::<RankStrategy>().is_err());
    }

    #[test]
    fn test_as_str() {
        assert_eq!(RankStrategy::TopK.as_str(), "TOP_K");
        assert_eq!(
            RankStrategy::Beam {
                time_budget_ms: 1,
                max_nodes: 1
            }
            .as_str(),
            "BEAM"
        );
    }
}
