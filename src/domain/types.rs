// ==========================================
// 飞行员竞标优化系统 - 领域类型定义
// ==========================================
// 职责: 评分类别、违规严重度、过滤器操作等基础枚举
// 红线: 类别是封闭集合,不接受自由字符串
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 评分类别 (Score Category)
// ==========================================
// 每个类别对应一个独立的纯评分函数,输出 [0,1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Layover,       // 驻外站偏好匹配
    AwardRate,     // 基地历史中签率
    TripLength,    // 行程天数偏好
    ReportWindow,  // 报到/解散时间窗
    Commutability, // 通勤可行性
    Equipment,     // 机型匹配
    DutyHours,     // 值勤/航程小时效率
}

impl Category {
    /// 全部类别(固定顺序,用于权重归一与遍历)
    pub const ALL: [Category; 7] = [
        Category::Layover,
        Category::AwardRate,
        Category::TripLength,
        Category::ReportWindow,
        Category::Commutability,
        Category::Equipment,
        Category::DutyHours,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Layover => write!(f, "LAYOVER"),
            Category::AwardRate => write!(f, "AWARD_RATE"),
            Category::TripLength => write!(f, "TRIP_LENGTH"),
            Category::ReportWindow => write!(f, "REPORT_WINDOW"),
            Category::Commutability => write!(f, "COMMUTABILITY"),
            Category::Equipment => write!(f, "EQUIPMENT"),
            Category::DutyHours => write!(f, "DUTY_HOURS"),
        }
    }
}

// ==========================================
// 违规严重度 (Violation Severity)
// ==========================================
// Hard: 硬规则判定不通过(含字段缺失的 fail-closed)
// Error: 规则谓词本身异常,按错误记录但不中断批次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Hard,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Hard => write!(f, "HARD"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

// ==========================================
// 过滤器操作 (Filter Operator)
// ==========================================
// In/Equals 为包含型操作,值列表必须非空(Linter 校验)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOp {
    In,
    Equals,
    NotIn,
}

impl FilterOp {
    /// 是否为包含型操作(值列表非空才有意义)
    pub fn is_inclusion(&self) -> bool {
        matches!(self, FilterOp::In | FilterOp::Equals)
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::In => write!(f, "IN"),
            FilterOp::Equals => write!(f, "EQUALS"),
            FilterOp::NotIn => write!(f, "NOT_IN"),
        }
    }
}

// ==========================================
// 竞标层偏好方向 (Prefer Direction)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreferDirection {
    Yes, // 偏好命中该层
    No,  // 回避命中该层
}

impl fmt::Display for PreferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferDirection::Yes => write!(f, "YES"),
            PreferDirection::No => write!(f, "NO"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_display_screaming_snake() {
        assert_eq!(Category::AwardRate.to_string(), "AWARD_RATE");
        assert_eq!(Category::ReportWindow.to_string(), "REPORT_WINDOW");
    }

    #[test]
    fn test_category_all_covers_seven() {
        assert_eq!(Category::ALL.len(), 7);
    }

    #[test]
    fn test_filter_op_inclusion() {
        assert!(FilterOp::In.is_inclusion());
        assert!(FilterOp::Equals.is_inclusion());
        assert!(!FilterOp::NotIn.is_inclusion());
    }

    #[test]
    fn test_serde_roundtrip_category() {
        let json = serde_json::to_string(&Category::Layover).unwrap();
        assert_eq!(json, r#""LAYOVER""#);
    }
}
