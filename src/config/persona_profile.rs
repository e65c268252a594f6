// ==========================================
// 飞行员竞标优化系统 - 画像配置
// ==========================================
// 职责: 画像乘法权重调整与资历置信乘数的外部配置
// 说明: 具体数值属启发式外部配置,非规范业务规则
// ==========================================

use crate::domain::types::Category;
use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

// ==========================================
// PersonaProfile - 画像配置(持久化对象)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaProfile {
    /// 画像 ID(用于选择/引用)
    pub persona_id: String,

    /// 显示名称
    pub title: String,

    /// 说明(可选)
    #[serde(default)]
    pub description: Option<String>,

    /// 类别 → 乘法系数(缺失类别系数为 1.0)
    #[serde(default)]
    pub boosts: BTreeMap<Category, f64>,
}

impl PersonaProfile {
    /// 某类别的乘法系数(未声明 → 1.0,负值钳制为 0)
    pub fn boost_for(&self, category: Category) -> f64 {
        self.boosts.get(&category).copied().unwrap_or(1.0).max(0.0)
    }
}

// ==========================================
// SeniorityConfig - 资历置信乘数配置
// ==========================================
// 乘数 = 1.0 + alpha * percentile,作用于总分
// 定位: 置信度标量,不是公平性校正
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeniorityConfig {
    pub alpha: f64,
}

impl Default for SeniorityConfig {
    fn default() -> Self {
        // 约束乘数于 [1.0, 1.1]
        Self { alpha: 0.1 }
    }
}

impl SeniorityConfig {
    pub fn multiplier(&self, percentile: f64) -> f64 {
        1.0 + self.alpha * percentile.clamp(0.0, 1.0)
    }
}

// ==========================================
// PersonaRegistry - 画像注册表
// ==========================================
pub struct PersonaRegistry {
    profiles: HashMap<String, PersonaProfile>,
}

impl PersonaRegistry {
    /// 内置预设画像
    pub fn builtin() -> Self {
        let mut registry = Self {
            profiles: HashMap::new(),
        };

        registry.register(PersonaProfile {
            persona_id: "family_oriented".to_string(),
            title: "家庭优先".to_string(),
            description: Some("抬升驻外站与时间窗类别,相对压低收入类别".to_string()),
            boosts: BTreeMap::from([
                (Category::Layover, 1.4),
                (Category::ReportWindow, 1.3),
                (Category::DutyHours, 0.8),
            ]),
        });

        registry.register(PersonaProfile {
            persona_id: "pay_maximizer".to_string(),
            title: "收入优先".to_string(),
            description: Some("抬升航程小时效率与行程天数类别".to_string()),
            boosts: BTreeMap::from([
                (Category::DutyHours, 1.5),
                (Category::TripLength, 1.2),
            ]),
        });

        registry.register(PersonaProfile {
            persona_id: "commuter".to_string(),
            title: "通勤优先".to_string(),
            description: Some("抬升通勤可行性与报到时间窗类别".to_string()),
            boosts: BTreeMap::from([
                (Category::Commutability, 1.6),
                (Category::ReportWindow, 1.2),
            ]),
        });

        registry
    }

    pub fn register(&mut self, profile: PersonaProfile) {
        self.profiles.insert(profile.persona_id.clone(), profile);
    }

    pub fn get(&self, persona_id: &str) -> Option<&PersonaProfile> {
        self.profiles.get(persona_id.trim())
    }

    /// 从 JSON 文件追加自定义画像
    pub fn load_custom(&mut self, path: &Path) -> PipelineResult<usize> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("画像配置读取失败: {}: {}", path.display(), e)))?;
        let profiles: Vec<PersonaProfile> = serde_json::from_str(&raw)
            .map_err(|e| PipelineError::Config(format!("画像配置解析失败: {}: {}", path.display(), e)))?;
        let count = profiles.len();
        for profile in profiles {
            self.register(profile);
        }
        Ok(count)
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
