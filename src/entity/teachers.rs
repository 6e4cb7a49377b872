//! 教师实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "teachers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// JSON 数组，如 `["nursery","lkg"]`
    #[sea_orm(column_type = "Text")]
    pub class_levels: String,
    pub user_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "SetNull"
    )]
    User,
    #[sea_orm(has_many = "super::students::Entity")]
    Students,
    #[sea_orm(has_many = "super::progress_entries::Entity")]
    ProgressEntries,
    #[sea_orm(has_many = "super::teaching_plans::Entity")]
    TeachingPlans,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Students.def()
    }
}

impl Related<super::progress_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProgressEntries.def()
    }
}

impl Related<super::teaching_plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeachingPlans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 班级集合序列化为 JSON 文本
pub fn encode_class_levels(
    levels: &std::collections::BTreeSet<crate::models::common::ClassLevel>,
) -> String {
    serde_json::to_string(levels).unwrap_or_else(|_| "[]".to_string())
}

/// 解析班级集合，忽略无法识别的值
pub fn decode_class_levels(
    raw: &str,
) -> std::collections::BTreeSet<crate::models::common::ClassLevel> {
    serde_json::from_str::<Vec<String>>(raw)
        .unwrap_or_default()
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect()
}

impl Model {
    pub fn into_teacher(self) -> crate::models::teachers::entities::Teacher {
        use crate::models::teachers::entities::Teacher;

        Teacher {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            class_levels: decode_class_levels(&self.class_levels),
            user_id: self.user_id,
            created_at: super::timestamp_to_datetime(self.created_at),
            updated_at: super::timestamp_to_datetime(self.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::ClassLevel;
    use std::collections::BTreeSet;

    #[test]
    fn test_class_levels_round_trip_and_tolerance() {
        let levels = BTreeSet::from([ClassLevel::Ukg, ClassLevel::Nursery]);
        let encoded = encode_class_levels(&levels);
        assert_eq!(encoded, r#"["nursery","ukg"]"#);
        assert_eq!(decode_class_levels(&encoded), levels);

        assert_eq!(
            decode_class_levels(r#"["lkg","grade1"]"#),
            BTreeSet::from([ClassLevel::Lkg])
        );
        assert!(decode_class_levels("not json").is_empty());
    }
}
