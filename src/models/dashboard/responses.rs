use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::models::common::ClassLevel;
use crate::models::progress::entities::ProgressArea;

// 教师带班人数
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct TeacherLoad {
    pub teacher_id: i64,
    pub name: String,
    pub student_count: i64,
}

// 仪表盘统计（可缓存，因此同时实现 Deserialize）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct DashboardStatsResponse {
    pub total_students: i64,
    pub total_teachers: i64,
    pub unassigned_students: i64,
    pub students_per_class_level: BTreeMap<ClassLevel, i64>,
    pub teacher_loads: Vec<TeacherLoad>,
    /// 最近 30 天的成长记录数
    pub recent_progress_entries: i64,
    pub average_rating_by_area: BTreeMap<ProgressArea, f64>,
    pub published_plans: i64,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
