use serde::Deserialize;
use std::collections::BTreeSet;
use ts_rs::TS;

use crate::models::common::{ClassLevel, PaginationQuery};

// 教师列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/teacher.ts")]
pub struct TeacherListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub class_level: Option<ClassLevel>,
    pub search: Option<String>,
}

// 创建教师请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/teacher.ts")]
pub struct CreateTeacherRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub class_levels: BTreeSet<ClassLevel>,
    pub user_id: Option<i64>,
}

// 更新教师请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/teacher.ts")]
pub struct UpdateTeacherRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub class_levels: Option<BTreeSet<ClassLevel>>,
    pub user_id: Option<i64>,
}

// 教师列表查询参数（用于存储层）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/teacher.ts")]
pub struct TeacherListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub class_level: Option<ClassLevel>,
    pub search: Option<String>,
}
