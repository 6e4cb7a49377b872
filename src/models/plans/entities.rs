use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::define_string_enum;
use crate::models::common::ClassLevel;

define_string_enum! {
    /// 教学计划状态
    #[ts(export, export_to = "../frontend/src/types/generated/plan.ts")]
    PlanStatus, "计划状态" {
        Draft => "draft",
        Published => "published",
    }
}

// 周教学计划
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/plan.ts")]
pub struct TeachingPlan {
    pub id: i64,
    pub teacher_id: i64,
    pub class_level: ClassLevel,
    pub title: String,
    /// 计划所在周的周一
    pub week_start: chrono::NaiveDate,
    pub objectives: String,
    pub activities: Vec<String>,
    pub status: PlanStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
