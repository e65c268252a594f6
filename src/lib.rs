// ==========================================
// 飞行员竞标优化系统 - 核心库
// ==========================================
// 系统定位: 竞标决策支持流水线 (飞行员保留最终提交权)
// 流程: 规则加载 → 可行性校验 → 候选排序 → 层生成 → 静态分析 → 导出
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 规则包层 - 合规规则加载与谓词求值
pub mod rulepack;

// 引擎层 - 竞标优化核心
pub mod engine;

// 配置层 - 画像与资历配置
pub mod config;

// 导出层 - 工件落盘
pub mod export;

// 错误类型
pub mod error;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Category, FilterOp, PreferDirection, Severity};

// 领域实体
pub use domain::{
    AnalyticsFeatures, BidLayerArtifact, CandidateSchedule, ContextSnapshot, FeatureBundle,
    Layer, LintReport, Pairing, PreferenceSchema, Violation,
};

// 规则包
pub use rulepack::{RulePack, RulePackLoader};

// 引擎
pub use engine::{
    BeamSearchOptimizer, BidPipeline, BidRequest, CandidateRanker, FeasibilityValidator,
    LayerGenerator, LayerLinter, PipelineOutcome, RankStrategy,
};

// 配置
pub use config::{PersonaProfile, PersonaRegistry, SeniorityConfig};

// 导出
pub use export::ExportStore;

// 错误
pub use error::{PipelineError, PipelineResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "飞行员竞标优化系统";

// ==========================================
// 预编译检查
// ==========================================
