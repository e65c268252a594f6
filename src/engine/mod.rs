// ==========================================
// 飞行员竞标优化系统 - 引擎层
// ==========================================
// 职责: 实现竞标优化核心引擎,不做 IO(导出除外,见 export 模块)
// 红线: 所有硬规则判定必须输出 reason, 排序结果必须可复现
// ==========================================

pub mod beam;
pub mod feasibility;
pub mod layers;
pub mod lint;
pub mod pipeline;
pub mod ranker;
pub mod scoring;
pub mod strategy;

// 重导出核心引擎
pub use beam::BeamSearchOptimizer;
pub use feasibility::{FeasibilityReport, FeasibilityValidator};
pub use layers::LayerGenerator;
pub use lint::LayerLinter;
pub use pipeline::{BidPipeline, BidRequest, PipelineOutcome};
pub use ranker::CandidateRanker;
pub use scoring::{ScoredPairing, ScoringCore};
pub use strategy::RankStrategy;
