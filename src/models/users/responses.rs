use super::entities::User;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

/// 员工账号及其关联的教师档案
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct AccountResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub user: User,
    /// 仅教师账号可能有值
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserListResponse {
    pub items: Vec<AccountResponse>,
    pub pagination: PaginationInfo,
}
