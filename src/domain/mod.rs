// ==========================================
// 飞行员竞标优化系统 - 领域层
// ==========================================
// 职责: 领域实体与基础类型,不含业务规则
// ==========================================

pub mod artifact;
pub mod bundle;
pub mod candidate;
pub mod pairing;
pub mod types;

pub use artifact::{BidLayerArtifact, Filter, Layer, LintMessage, LintReport, ARTIFACT_FORMAT};
pub use bundle::{
    month_tag_to_artifact_month, AnalyticsFeatures, ContextSnapshot, FeatureBundle,
    HardConstraints, PreferenceSchema, SoftPreference,
};
pub use candidate::{CandidateSchedule, Violation};
pub use pairing::{FieldValue, Pairing};
pub use types::{Category, FilterOp, PreferDirection, Severity};
