use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::define_string_enum;

define_string_enum! {
    /// 发展领域
    #[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
    ProgressArea, "发展领域" {
        Literacy => "literacy",
        Numeracy => "numeracy",
        MotorSkills => "motor_skills",
        Social => "social",
        Creative => "creative",
    }
}

/// 评分范围 1..=5
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

// 成长记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct ProgressEntry {
    pub id: i64,
    pub student_id: i64,
    /// 记录人
    pub teacher_id: i64,
    pub area: ProgressArea,
    pub rating: i32,
    pub remarks: Option<String>,
    pub recorded_on: chrono::NaiveDate,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
