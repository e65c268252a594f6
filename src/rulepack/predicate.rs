// ==========================================
// 飞行员竞标优化系统 - 规则谓词
// ==========================================
// 职责: 硬规则谓词的显式标签联合与安全求值树
// 红线: 不做通用表达式求值,谓词在加载时一次性解析
// ==========================================

use crate::domain::pairing::{FieldValue, Pairing};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// ==========================================
// RuleEvalError - 谓词求值错误
// ==========================================
// MissingField: 配对缺少规则所需字段 → fail-closed(HARD 违规)
// 其余: 谓词本身配置错误 → ERROR 违规,不中断批次
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleEvalError {
    #[error("字段缺失: {0}")]
    MissingField(String),

    #[error("未知字段: {0}")]
    UnknownField(String),

    #[error("字段类型不匹配 (field={field}, expected={expected})")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("谓词解析失败: {0}")]
    Malformed(String),
}

// ==========================================
// Predicate - 谓词标签联合
// ==========================================
// JSON 形态示例:
//   {"type":"ge","field":"rest_hours","value":10.0}
//   {"type":"in","field":"equipment","values":["B737","B738"]}
//   {"type":"all","preds":[...]}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    // ===== 数值比较 =====
    Lt { field: String, value: f64 },
    Le { field: String, value: f64 },
    Gt { field: String, value: f64 },
    Ge { field: String, value: f64 },

    // ===== 文本相等 =====
    Eq { field: String, value: String },
    Ne { field: String, value: String },

    // ===== 集合成员 =====
    In { field: String, values: Vec<String> },
    NotIn { field: String, values: Vec<String> },

    // ===== 布尔标志 =====
    Flag { field: String, expected: bool },

    // ===== 逻辑组合 =====
    All { preds: Vec<Predicate> },
    Any { preds: Vec<Predicate> },
    Not { pred: Box<Predicate> },
}

impl Predicate {
    /// 对单个配对求值
    ///
    /// # 参数
    /// - pairing: 候选配对
    /// - compliance: 请求级合规标志("compliance.<key>" 命名空间)
    ///
    /// # 返回
    /// - Ok(true): 谓词满足(配对通过该规则)
    /// - Ok(false): 谓词不满足(HARD 违规)
    /// - Err: 字段缺失或谓词配置错误,由调用方映射为违规
    pub fn eval(
        &self,
        pairing: &Pairing,
        compliance: &BTreeMap<String, bool>,
    ) -> Result<bool, RuleEvalError> {
        match self {
            Predicate::Lt { field, value } => Ok(num_field(pairing, field)? < *value),
            Predicate::Le { field, value } => Ok(num_field(pairing, field)? <= *value),
            Predicate::Gt { field, value } => Ok(num_field(pairing, field)? > *value),
            Predicate::Ge { field, value } => Ok(num_field(pairing, field)? >= *value),

            Predicate::Eq { field, value } => Ok(text_field(pairing, field)? == *value),
            Predicate::Ne { field, value } => Ok(text_field(pairing, field)? != *value),

            Predicate::In { field, values } => {
                Ok(values.contains(&text_field(pairing, field)?))
            }
            Predicate::NotIn { field, values } => {
                Ok(!values.contains(&text_field(pairing, field)?))
            }

            Predicate::Flag { field, expected } => {
                Ok(flag_field(pairing, compliance, field)? == *expected)
            }

            Predicate::All { preds } => {
                for p in preds {
                    if !p.eval(pairing, compliance)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Predicate::Any { preds } => {
                for p in preds {
                    if p.eval(pairing, compliance)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Predicate::Not { pred } => Ok(!pred.eval(pairing, compliance)?),
        }
    }
}

// ==========================================
// PredicateSpec - 可容错的谓词载体
// ==========================================
// 单条规则的谓词解析失败不应使整包加载失败:
// 解析失败保留为 Invalid,求值时转为 ERROR 违规
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateSpec {
    Valid(Predicate),
    Invalid { error: String },
}

impl PredicateSpec {
    pub fn eval(
        &self,
        pairing: &Pairing,
        compliance: &BTreeMap<String, bool>,
    ) -> Result<bool, RuleEvalError> {
        match self {
            PredicateSpec::Valid(p) => p.eval(pairing, compliance),
            PredicateSpec::Invalid { error } => Err(RuleEvalError::Malformed(error.clone())),
        }
    }
}

impl<'de> Deserialize<'de> for PredicateSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        match serde_json::from_value::<Predicate>(raw) {
            Ok(p) => Ok(PredicateSpec::Valid(p)),
            Err(e) => Ok(PredicateSpec::Invalid {
                error: e.to_string(),
            }),
        }
    }
}

impl Serialize for PredicateSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            PredicateSpec::Valid(p) => p.serialize(serializer),
            PredicateSpec::Invalid { error } => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "invalid")?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

// ==========================================
// 字段访问辅助
// ==========================================

fn resolve_field(
    pairing: &Pairing,
    compliance: &BTreeMap<String, bool>,
    name: &str,
) -> Result<FieldValue, RuleEvalError> {
    if let Some(key) = name.strip_prefix("compliance.") {
        return match compliance.get(key) {
            Some(v) => Ok(FieldValue::Flag(*v)),
            None => Err(RuleEvalError::MissingField(name.to_string())),
        };
    }
    match pairing.field(name) {
        Ok(Some(v)) => Ok(v),
        Ok(None) => Err(RuleEvalError::MissingField(name.to_string())),
        Err(unknown) => Err(RuleEvalError::UnknownField(unknown)),
    }
}

fn num_field(pairing: &Pairing, name: &str) -> Result<f64, RuleEvalError> {
    match resolve_field(pairing, &BTreeMap::new(), name)? {
        FieldValue::Num(v) => Ok(v),
        _ => Err(RuleEvalError::TypeMismatch {
            field: name.to_string(),
            expected: "number",
        }),
    }
}

fn text_field(pairing: &Pairing, name: &str) -> Result<String, RuleEvalError> {
    match resolve_field(pairing, &BTreeMap::new(), name)? {
        FieldValue::Text(v) => Ok(v),
        _ => Err(RuleEvalError::TypeMismatch {
            field: name.to_string(),
            expected: "text",
        }),
    }
}

fn flag_field(
    pairing: &Pairing,
    compliance: &BTreeMap<String, bool>,
    name: &str,
) -> Result<bool, RuleEvalError> {
    match resolve_field(pairing, compliance, name)? {
        FieldValue::Flag(v) => Ok(v),
        _ => Err(RuleEvalError::TypeMismatch {
            field: name.to_string(),
            expected: "flag",
        }),
    }
}
