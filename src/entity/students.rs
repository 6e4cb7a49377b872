//! 学生实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub class_level: String,
    pub learning_ability: String,
    pub writing_speed: String,
    pub photo_url: Option<String>,
    pub teacher_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teachers::Entity",
        from = "Column::TeacherId",
        to = "super::teachers::Column::Id",
        on_delete = "SetNull"
    )]
    Teacher,
    #[sea_orm(has_many = "super::progress_entries::Entity")]
    ProgressEntries,
}

impl Related<super::teachers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::progress_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProgressEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_student(self) -> crate::models::students::entities::Student {
        use crate::models::common::ClassLevel;
        use crate::models::students::entities::{LearningAbility, Student, WritingSpeed};

        Student {
            id: self.id,
            name: self.name,
            age: self.age,
            class_level: self
                .class_level
                .parse::<ClassLevel>()
                .unwrap_or(ClassLevel::Nursery),
            learning_ability: self
                .learning_ability
                .parse::<LearningAbility>()
                .unwrap_or(LearningAbility::Average),
            writing_speed: self
                .writing_speed
                .parse::<WritingSpeed>()
                .unwrap_or(WritingSpeed::Average),
            photo_url: self.photo_url,
            teacher_id: self.teacher_id,
            created_at: super::timestamp_to_datetime(self.created_at),
            updated_at: super::timestamp_to_datetime(self.updated_at),
        }
    }
}
