//! 成长记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "progress_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub teacher_id: i64,
    pub area: String,
    pub rating: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub remarks: Option<String>,
    /// YYYY-MM-DD
    pub recorded_on: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id",
        on_delete = "Cascade"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::teachers::Entity",
        from = "Column::TeacherId",
        to = "super::teachers::Column::Id",
        on_delete = "Cascade"
    )]
    Teacher,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::teachers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_progress_entry(self) -> crate::models::progress::entities::ProgressEntry {
        use crate::models::progress::entities::{ProgressArea, ProgressEntry};

        ProgressEntry {
            id: self.id,
            student_id: self.student_id,
            teacher_id: self.teacher_id,
            area: self
                .area
                .parse::<ProgressArea>()
                .unwrap_or(ProgressArea::Literacy),
            rating: self.rating,
            remarks: self.remarks,
            recorded_on: super::parse_date(&self.recorded_on),
            created_at: super::timestamp_to_datetime(self.created_at),
            updated_at: super::timestamp_to_datetime(self.updated_at),
        }
    }
}
