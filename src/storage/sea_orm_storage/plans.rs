use super::SeaOrmStorage;
use crate::entity::format_date;
use crate::entity::teaching_plans::{ActiveModel, Column, Entity as TeachingPlans};
use crate::errors::{PreschoolError, Result};
use crate::models::{
    PaginationInfo, PaginationQuery,
    plans::{
        entities::{PlanStatus, TeachingPlan},
        requests::{CreatePlanRequest, PlanListQuery, UpdatePlanRequest},
        responses::PlanListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn create_plan_impl(
        &self,
        teacher_id: i64,
        req: CreatePlanRequest,
    ) -> Result<TeachingPlan> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            teacher_id: Set(teacher_id),
            class_level: Set(req.class_level.to_string()),
            title: Set(req.title),
            week_start: Set(format_date(req.week_start)),
            objectives: Set(req.objectives),
            activities: Set(serde_json::to_string(&req.activities)?),
            status: Set(req.status.unwrap_or(PlanStatus::Draft).to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("创建教学计划失败: {e}")))?;

        Ok(result.into_plan())
    }

    pub async fn get_plan_by_id_impl(&self, id: i64) -> Result<Option<TeachingPlan>> {
        let result = TeachingPlans::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询教学计划失败: {e}")))?;

        Ok(result.map(|m| m.into_plan()))
    }

    pub async fn list_plans_with_pagination_impl(
        &self,
        query: PlanListQuery,
    ) -> Result<PlanListResponse> {
        let (page, size) = PaginationQuery::normalized(query.page, query.size);

        let mut select = TeachingPlans::find();

        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }
        if let Some(level) = query.class_level {
            select = select.filter(Column::ClassLevel.eq(level.to_string()));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        select = select
            .order_by_desc(Column::WeekStart)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            PreschoolError::database_operation(format!("查询教学计划总数失败: {e}"))
        })?;
        let pages = paginator.num_pages().await.map_err(|e| {
            PreschoolError::database_operation(format!("查询教学计划页数失败: {e}"))
        })?;
        let plans = paginator.fetch_page(page - 1).await.map_err(|e| {
            PreschoolError::database_operation(format!("查询教学计划列表失败: {e}"))
        })?;

        Ok(PlanListResponse {
            items: plans.into_iter().map(|m| m.into_plan()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_plan_impl(
        &self,
        id: i64,
        update: UpdatePlanRequest,
    ) -> Result<Option<TeachingPlan>> {
        if self.get_plan_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(level) = update.class_level {
            model.class_level = Set(level.to_string());
        }
        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(week_start) = update.week_start {
            model.week_start = Set(format_date(week_start));
        }
        if let Some(objectives) = update.objectives {
            model.objectives = Set(objectives);
        }
        if let Some(activities) = update.activities {
            model.activities = Set(serde_json::to_string(&activities)?);
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("更新教学计划失败: {e}")))?;

        self.get_plan_by_id_impl(id).await
    }

    pub async fn delete_plan_impl(&self, id: i64) -> Result<bool> {
        let result = TeachingPlans::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("删除教学计划失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
