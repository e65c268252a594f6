// ==========================================
// 飞行员竞标优化系统 - 规则包加载器
// ==========================================
// 职责: 规则包文档的深合并、拍平、缓存与保守降级
// 红线: 合规失败必须安全降级,绝不返回空规则集
// ==========================================

pub mod predicate;

pub use predicate::{Predicate, PredicateSpec, RuleEvalError};

use crate::domain::types::Category;
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

// ==========================================
// HardRule - 硬规则
// ==========================================
// 红线: 硬规则不携带权重,违反即整体不可行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardRule {
    pub id: String,

    #[serde(default)]
    pub description: Option<String>,

    pub predicate: PredicateSpec,
}

// ==========================================
// SoftRule - 软规则(航司级类别基线权重)
// ==========================================
// 仅在上下文未声明该类别默认权重时作为解析链起点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftRule {
    pub id: String,

    #[serde(default)]
    pub description: Option<String>,

    pub category: Category,
    pub weight: f64,
}

// ==========================================
// RulePack - 合并后的规则集
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulePack {
    pub airline: String,
    pub version: String,
    pub hard: Vec<HardRule>,
    pub soft: Vec<SoftRule>,
}

impl RulePack {
    /// 内置保守默认包
    ///
    /// # 规则
    /// - 规则包缺失/畸形时的安全降级目标
    /// - 仅含最小安全硬规则,无软规则
    pub fn conservative_default() -> RulePack {
        RulePack {
            airline: "DEFAULT".to_string(),
            version: "builtin-conservative".to_string(),
            hard: vec![
                HardRule {
                    id: "rest_min_10".to_string(),
                    description: Some("最短休息 10 小时".to_string()),
                    predicate: PredicateSpec::Valid(Predicate::Ge {
                        field: "rest_hours".to_string(),
                        value: 10.0,
                    }),
                },
                HardRule {
                    id: "duty_days_max_6".to_string(),
                    description: Some("值勤天数不超过 6 天".to_string()),
                    predicate: PredicateSpec::Valid(Predicate::Le {
                        field: "duty_days".to_string(),
                        value: 6.0,
                    }),
                },
            ],
            soft: vec![],
        }
    }
}

// ==========================================
// RulePackLoader - 规则包加载器
// ==========================================
// 缓存按解析后路径列表键控,force_reload 失效缓存
// 无全局单例: 实例由 PipelineContext 显式构造
pub struct RulePackLoader {
    cache: HashMap<String, RulePack>,
}

impl RulePackLoader {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// 加载并合并规则包文档
    ///
    /// # 规则
    /// - 文档按序深合并: 标量后者覆盖,嵌套映射递归,规则数组拼接
    /// - 命名规则分区(far117/union_contract 等)按输入序并入顶层 hard/soft
    /// - 任何缺失/畸形 → 记录结构化错误并返回内置保守默认包
    ///
    /// # 参数
    /// - paths: 规则包文档路径(按序)
    /// - force_reload: 跳过并刷新缓存
    pub fn load(&mut self, paths: &[PathBuf], force_reload: bool) -> RulePack {
        let key = cache_key(paths);

        if !force_reload {
            if let Some(pack) = self.cache.get(&key) {
                return pack.clone();
            }
        }

        let pack = match load_uncached(paths) {
            Ok(pack) => {
                info!(
                    airline = %pack.airline,
                    version = %pack.version,
                    hard_count = pack.hard.len(),
                    soft_count = pack.soft.len(),
                    "规则包加载完成"
                );
                pack
            }
            Err(e) => {
                error!(
                    paths = ?paths,
                    error = %e,
                    "规则包加载失败,降级为保守默认包"
                );
                RulePack::conservative_default()
            }
        };

        self.cache.insert(key, pack.clone());
        pack
    }
}

impl Default for RulePackLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn cache_key(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| resolve_path(p))
        .collect::<Vec<_>>()
        .join("\n")
}

fn resolve_path(path: &Path) -> String {
    std::fs::canonicalize(path)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| path.to_string_lossy().into_owned())
}

// ==========================================
// 加载与合并
// ==========================================

fn load_uncached(paths: &[PathBuf]) -> anyhow::Result<RulePack> {
    if paths.is_empty() {
        return Err(anyhow!("未提供规则包路径"));
    }

    let mut docs = Vec::with_capacity(paths.len());
    for path in paths {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("读取规则包失败: {}", path.display()))?;
        let doc: Value = serde_json::from_str(&raw)
            .with_context(|| format!("规则包 JSON 解析失败: {}", path.display()))?;
        docs.push(doc);
    }

    let merged = merge_documents(docs)?;
    flatten_pack(merged)
}

/// 按序深合并: 对象递归,数组拼接,标量后者覆盖
fn merge_documents(docs: Vec<Value>) -> anyhow::Result<Value> {
    let mut iter = docs.into_iter();
    let mut acc = iter.next().ok_or_else(|| anyhow!("空文档列表"))?;
    for doc in iter {
        acc = deep_merge(acc, doc);
    }
    Ok(acc)
}

fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut a), Value::Object(b)) => {
            // 就地合并已有键,保持其原始位置(拍平序依赖键的声明序)
            for (k, v) in b {
                match a.entry(k) {
                    serde_json::map::Entry::Occupied(mut entry) => {
                        let existing = entry.get_mut();
                        let merged = deep_merge(existing.take(), v);
                        *existing = merged;
                    }
                    serde_json::map::Entry::Vacant(entry) => {
                        entry.insert(v);
                    }
                }
            }
            Value::Object(a)
        }
        // 规则数组拼接,保持输入序
        (Value::Array(mut a), Value::Array(b)) => {
            a.extend(b);
            Value::Array(a)
        }
        // 标量叶子: 后者覆盖
        (_, overlay) => overlay,
    }
}

/// 拍平合并结果: 命名分区并入顶层 hard/soft 桶
fn flatten_pack(merged: Value) -> anyhow::Result<RulePack> {
    let obj = merged
        .as_object()
        .ok_or_else(|| anyhow!("规则包根节点必须是对象"))?;

    let airline = obj
        .get("airline")
        .and_then(|v| v.as_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let version = obj
        .get("version")
        .and_then(|v| v.as_str())
        .unwrap_or("0")
        .to_string();

    let mut hard: Vec<HardRule> = Vec::new();
    let mut soft: Vec<SoftRule> = Vec::new();

    // 顶层已合并形态 {hard, soft} 直接接受
    collect_bucket(obj.get("hard"), &mut hard, "hard")?;
    collect_bucket(obj.get("soft"), &mut soft, "soft")?;

    // 命名规则分区(preserve_order: 迭代序即输入序)
    for (key, value) in obj.iter() {
        if matches!(key.as_str(), "airline" | "version" | "hard" | "soft") {
            continue;
        }
        if let Value::Object(section) = value {
            if section.contains_key("hard") || section.contains_key("soft") {
                collect_bucket(section.get("hard"), &mut hard, key)?;
                collect_bucket(section.get("soft"), &mut soft, key)?;
            }
        }
    }

    if hard.is_empty() {
        return Err(anyhow!("规则包缺少硬规则结构"));
    }

    dedupe_by_id(&mut hard, |r| r.id.clone());
    dedupe_by_id(&mut soft, |r| r.id.clone());

    // 软权重下限 0 (负权重视为配置口误,钳制并告警)
    for rule in soft.iter_mut() {
        if rule.weight < 0.0 {
            warn!(rule_id = %rule.id, weight = rule.weight, "软规则权重为负,钳制为 0");
            rule.weight = 0.0;
        }
    }

    Ok(RulePack {
        airline,
        version,
        hard,
        soft,
    })
}

fn collect_bucket<T: serde::de::DeserializeOwned>(
    value: Option<&Value>,
    out: &mut Vec<T>,
    section: &str,
) -> anyhow::Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    let arr = value
        .as_array()
        .ok_or_else(|| anyhow!("分区 {} 的规则桶必须是数组", section))?;
    for item in arr {
        let rule: T = serde_json::from_value(item.clone())
            .with_context(|| format!("分区 {} 中的规则解析失败", section))?;
        out.push(rule);
    }
    Ok(())
}

/// 规则 id 去重: 后出现的同 id 规则覆盖先前定义,保留先前位置
fn dedupe_by_id<T, F: Fn(&T) -> String>(rules: &mut Vec<T>, id_of: F) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<T> = Vec::with_capacity(rules.len());
    for rule in rules.drain(..) {
        let id = id_of(&rule);
        match seen.get(&id) {
            Some(&idx) => out[idx] = rule,
            None => {
                seen.insert(id, out.len());
                out.push(rule);
            }
        }
    }
    *rules = out;
}
