use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::define_string_enum;
use crate::models::common::ClassLevel;

define_string_enum! {
    /// 学习能力分类
    #[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
    LearningAbility, "学习能力" {
        Slow => "slow",
        Average => "average",
        Fast => "fast",
    }
}

define_string_enum! {
    /// 书写速度分类
    #[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
    WritingSpeed, "书写速度" {
        Slow => "slow",
        Average => "average",
        Fast => "fast",
    }
}

// 学生档案
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub class_level: ClassLevel,
    pub learning_ability: LearningAbility,
    pub writing_speed: WritingSpeed,
    pub photo_url: Option<String>,
    /// 负责教师，None 表示未分配
    pub teacher_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
