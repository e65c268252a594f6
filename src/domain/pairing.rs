// ==========================================
// 飞行员竞标优化系统 - 配对领域模型
// ==========================================
// 职责: 候选行程配对(Pairing)的只读数据结构与字段访问
// 红线: 配对一经摄入不可变,引擎层只读
// ==========================================

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Pairing - 候选行程配对
// ==========================================
// 来源: 外部配对数据(字段可能缺失)
// 规则评估对缺失字段按 fail-closed 处理
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pairing {
    // ===== 主键 =====
    pub pairing_id: String, // 配对唯一标识(配对号)

    // ===== 行程结构 =====
    pub duty_days: Option<u32>,     // 值勤天数
    pub credit_hours: Option<f64>,  // 航程贡献小时
    pub layover_city: Option<String>, // 驻外站(主要过夜城市)

    // ===== 时间信息 =====
    pub report_time: Option<NaiveTime>,  // 报到时间
    pub release_time: Option<NaiveTime>, // 解散时间
    pub rest_hours: Option<f64>,         // 最短休息小时

    // ===== 机型与标志 =====
    pub equipment: Option<String>,     // 执飞机型
    pub is_redeye: Option<bool>,       // 是否含红眼航段
    pub weekend_overlap: Option<bool>, // 是否覆盖周末
}

// ==========================================
// FieldValue - 谓词字段值
// ==========================================
// 谓词求值的统一字段视图,按名称解析
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Num(f64),
    Text(String),
    Flag(bool),
}

impl Pairing {
    /// 按名称解析配对字段
    ///
    /// # 返回
    /// - `Ok(Some(value))`: 字段存在且有值
    /// - `Ok(None)`: 字段存在但值缺失(fail-closed 由调用方处理)
    /// - `Err(name)`: 未知字段名(规则谓词配置错误)
    pub fn field(&self, name: &str) -> Result<Option<FieldValue>, String> {
        match name {
            "pairing_id" => Ok(Some(FieldValue::Text(self.pairing_id.clone()))),
            "duty_days" => Ok(self.duty_days.map(|v| FieldValue::Num(v as f64))),
            "credit_hours" => Ok(self.credit_hours.map(FieldValue::Num)),
            "layover_city" => Ok(self.layover_city.clone().map(FieldValue::Text)),
            "rest_hours" => Ok(self.rest_hours.map(FieldValue::Num)),
            "equipment" => Ok(self.equipment.clone().map(FieldValue::Text)),
            "is_redeye" => Ok(self.is_redeye.map(FieldValue::Flag)),
            "weekend_overlap" => Ok(self.weekend_overlap.map(FieldValue::Flag)),
            // 时间字段按当日分钟数暴露给数值谓词
            "report_minutes" => Ok(self
                .report_time
                .map(|t| FieldValue::Num(minutes_of_day(t)))),
            "release_minutes" => Ok(self
                .release_time
                .map(|t| FieldValue::Num(minutes_of_day(t)))),
            other => Err(other.to_string()),
        }
    }
}

fn minutes_of_day(t: NaiveTime) -> f64 {
    use chrono::Timelike;
    (t.hour() * 60 + t.minute()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn sample_pairing() -> Pairing {
        Pairing {
            pairing_id: "P100".to_string(),
            duty_days: Some(4),
            credit_hours: Some(22.5),
            layover_city: Some("DEN".to_string()),
            report_time: NaiveTime::from_hms_opt(9, 30, 0),
            release_time: NaiveTime::from_hms_opt(17, 0, 0),
            rest_hours: Some(12.0),
            equipment: Some("B737".to_string()),
            is_redeye: Some(false),
            weekend_overlap: Some(true),
        }
    }

    #[test]
    fn test_field_num_lookup() {
        let p = sample_pairing();
        assert_eq!(p.field("rest_hours").unwrap(), Some(FieldValue::Num(12.0)));
        assert_eq!(p.field("duty_days").unwrap(), Some(FieldValue::Num(4.0)));
    }

    #[test]
    fn test_field_time_as_minutes() {
        let p = sample_pairing();
        assert_eq!(
            p.field("report_minutes").unwrap(),
            Some(FieldValue::Num(570.0))
        );
    }

    #[test]
    fn test_field_missing_value() {
        let mut p = sample_pairing();
        p.rest_hours = None;
        assert_eq!(p.field("rest_hours").unwrap(), None);
    }

    #[test]
    fn test_field_unknown_name() {
        let p = sample_pairing();
        assert!(p.field("cabin_crew_count").is_err());
    }
}
