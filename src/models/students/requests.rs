use serde::{Deserialize, Deserializer};
use ts_rs::TS;

use super::entities::{LearningAbility, WritingSpeed};
use crate::models::common::{ClassLevel, PaginationQuery};

// 学生列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub class_level: Option<ClassLevel>,
    pub teacher_id: Option<i64>,
    /// 只看未分配教师的学生
    pub unassigned: Option<bool>,
    pub search: Option<String>,
}

// 创建学生请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct CreateStudentRequest {
    pub name: String,
    pub age: i32,
    pub class_level: ClassLevel,
    pub learning_ability: LearningAbility,
    pub writing_speed: WritingSpeed,
    pub photo_url: Option<String>,
    pub teacher_id: Option<i64>,
}

// 更新学生请求（不含教师分配，分配走单独接口）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub class_level: Option<ClassLevel>,
    pub learning_ability: Option<LearningAbility>,
    pub writing_speed: Option<WritingSpeed>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[ts(optional)]
    pub photo_url: Option<Option<String>>,
}

// 修改负责教师请求，teacher_id 为 null 表示取消分配
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct AssignTeacherRequest {
    pub teacher_id: Option<i64>,
}

// 学生列表查询参数（用于存储层）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub class_level: Option<ClassLevel>,
    pub teacher_id: Option<i64>,
    pub unassigned: Option<bool>,
    pub search: Option<String>,
}

// 导出参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct ExportParams {
    #[serde(default = "default_export_format")]
    pub format: String,
    pub class_level: Option<ClassLevel>,
    pub teacher_id: Option<i64>,
}

fn default_export_format() -> String {
    "csv".to_string()
}

// 区分"字段缺失"与"显式 null"
fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_distinguishes_null_photo() {
        let absent: UpdateStudentRequest = serde_json::from_str(r#"{"name":"Asha"}"#).unwrap();
        assert!(absent.photo_url.is_none());

        let cleared: UpdateStudentRequest = serde_json::from_str(r#"{"photo_url":null}"#).unwrap();
        assert_eq!(cleared.photo_url, Some(None));
    }

    #[test]
    fn test_assign_teacher_null_means_unassign() {
        let req: AssignTeacherRequest = serde_json::from_str(r#"{"teacher_id":null}"#).unwrap();
        assert!(req.teacher_id.is_none());

        let req: AssignTeacherRequest = serde_json::from_str(r#"{"teacher_id":7}"#).unwrap();
        assert_eq!(req.teacher_id, Some(7));
    }
}
