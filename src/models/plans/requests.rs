use serde::Deserialize;
use ts_rs::TS;

use super::entities::PlanStatus;
use crate::models::common::{ClassLevel, PaginationQuery};

// 教学计划列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/plan.ts")]
pub struct PlanListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub teacher_id: Option<i64>,
    pub class_level: Option<ClassLevel>,
    pub status: Option<PlanStatus>,
}

// 新建教学计划
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/plan.ts")]
pub struct CreatePlanRequest {
    /// 管理员代建时必须指定，教师账号默认为本人
    pub teacher_id: Option<i64>,
    pub class_level: ClassLevel,
    pub title: String,
    pub week_start: chrono::NaiveDate,
    #[serde(default)]
    pub objectives: String,
    #[serde(default)]
    pub activities: Vec<String>,
    pub status: Option<PlanStatus>,
}

// 更新教学计划
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/plan.ts")]
pub struct UpdatePlanRequest {
    pub class_level: Option<ClassLevel>,
    pub title: Option<String>,
    pub week_start: Option<chrono::NaiveDate>,
    pub objectives: Option<String>,
    pub activities: Option<Vec<String>>,
    pub status: Option<PlanStatus>,
}

// 教学计划列表查询参数（用于存储层）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/plan.ts")]
pub struct PlanListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub teacher_id: Option<i64>,
    pub class_level: Option<ClassLevel>,
    pub status: Option<PlanStatus>,
}
