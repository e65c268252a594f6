// ==========================================
// 飞行员竞标优化系统 - 配置层
// ==========================================
// 职责: 启发式常量的外部化(画像系数/资历乘数)
// 红线: 无全局单例,配置对象显式注入各引擎
// ==========================================

pub mod persona_profile;

pub use persona_profile::{PersonaProfile, PersonaRegistry, SeniorityConfig};
