use serde::Deserialize;
use ts_rs::TS;

use super::entities::ProgressArea;
use crate::models::common::PaginationQuery;

// 成长记录列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct ProgressListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub student_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub area: Option<ProgressArea>,
}

// 新建成长记录
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct CreateProgressRequest {
    pub student_id: i64,
    /// 管理员代录时必须指定，教师账号默认为本人
    pub teacher_id: Option<i64>,
    pub area: ProgressArea,
    pub rating: i32,
    pub remarks: Option<String>,
    /// 缺省为今天
    pub recorded_on: Option<chrono::NaiveDate>,
}

// 更新成长记录
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct UpdateProgressRequest {
    pub area: Option<ProgressArea>,
    pub rating: Option<i32>,
    pub remarks: Option<String>,
    pub recorded_on: Option<chrono::NaiveDate>,
}

// 成长记录列表查询参数（用于存储层）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct ProgressListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub student_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub area: Option<ProgressArea>,
}

// 成长报告导出参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct ProgressExportParams {
    #[serde(default = "default_export_format")]
    pub format: String,
}

fn default_export_format() -> String {
    "csv".to_string()
}
