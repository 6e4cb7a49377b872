use serde::Serialize;
use ts_rs::TS;

use super::entities::Teacher;
use crate::models::PaginationInfo;

// 教师列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/teacher.ts")]
pub struct TeacherListResponse {
    pub items: Vec<Teacher>,
    pub pagination: PaginationInfo,
}
