//! 教学计划实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "teaching_plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub teacher_id: i64,
    pub class_level: String,
    pub title: String,
    /// YYYY-MM-DD
    pub week_start: String,
    #[sea_orm(column_type = "Text")]
    pub objectives: String,
    /// JSON 字符串数组
    #[sea_orm(column_type = "Text")]
    pub activities: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teachers::Entity",
        from = "Column::TeacherId",
        to = "super::teachers::Column::Id",
        on_delete = "Cascade"
    )]
    Teacher,
}

impl Related<super::teachers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_plan(self) -> crate::models::plans::entities::TeachingPlan {
        use crate::models::common::ClassLevel;
        use crate::models::plans::entities::{PlanStatus, TeachingPlan};

        TeachingPlan {
            id: self.id,
            teacher_id: self.teacher_id,
            class_level: self
                .class_level
                .parse::<ClassLevel>()
                .unwrap_or(ClassLevel::Nursery),
            title: self.title,
            week_start: super::parse_date(&self.week_start),
            objectives: self.objectives,
            activities: serde_json::from_str(&self.activities).unwrap_or_default(),
            status: self.status.parse::<PlanStatus>().unwrap_or(PlanStatus::Draft),
            created_at: super::timestamp_to_datetime(self.created_at),
            updated_at: super::timestamp_to_datetime(self.updated_at),
        }
    }
}
