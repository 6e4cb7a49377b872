use serde::Serialize;
use ts_rs::TS;

use super::entities::TeachingPlan;
use crate::models::PaginationInfo;

// 教学计划列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/plan.ts")]
pub struct PlanListResponse {
    pub items: Vec<TeachingPlan>,
    pub pagination: PaginationInfo,
}
