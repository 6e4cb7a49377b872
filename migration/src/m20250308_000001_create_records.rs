use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_tables::{Students, Teachers};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建成长记录表
        manager
            .create_table(
                Table::create()
                    .table(ProgressEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProgressEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProgressEntries::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProgressEntries::TeacherId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProgressEntries::Area).string().not_null())
                    .col(ColumnDef::new(ProgressEntries::Rating).integer().not_null())
                    .col(ColumnDef::new(ProgressEntries::Remarks).text().null())
                    // ISO 日期字符串，YYYY-MM-DD
                    .col(
                        ColumnDef::new(ProgressEntries::RecordedOn)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProgressEntries::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProgressEntries::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ProgressEntries::Table, ProgressEntries::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ProgressEntries::Table, ProgressEntries::TeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建教学计划表
        manager
            .create_table(
                Table::create()
                    .table(TeachingPlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeachingPlans::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TeachingPlans::TeacherId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeachingPlans::ClassLevel)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TeachingPlans::Title).string().not_null())
                    .col(ColumnDef::new(TeachingPlans::WeekStart).string().not_null())
                    .col(ColumnDef::new(TeachingPlans::Objectives).text().not_null())
                    // JSON 数组
                    .col(ColumnDef::new(TeachingPlans::Activities).text().not_null())
                    .col(ColumnDef::new(TeachingPlans::Status).string().not_null())
                    .col(
                        ColumnDef::new(TeachingPlans::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeachingPlans::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TeachingPlans::Table, TeachingPlans::TeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_progress_entries_student_id")
                    .table(ProgressEntries::Table)
                    .col(ProgressEntries::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_teaching_plans_teacher_id")
                    .table(TeachingPlans::Table)
                    .col(TeachingPlans::TeacherId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TeachingPlans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProgressEntries::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ProgressEntries {
    Table,
    Id,
    StudentId,
    TeacherId,
    Area,
    Rating,
    Remarks,
    RecordedOn,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TeachingPlans {
    Table,
    Id,
    TeacherId,
    ClassLevel,
    Title,
    WeekStart,
    Objectives,
    Activities,
    Status,
    CreatedAt,
    UpdatedAt,
}
