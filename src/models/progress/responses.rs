use serde::Serialize;
use ts_rs::TS;

use super::entities::ProgressEntry;
use crate::models::PaginationInfo;

// 成长记录列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct ProgressListResponse {
    pub items: Vec<ProgressEntry>,
    pub pagination: PaginationInfo,
}
