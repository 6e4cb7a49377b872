use super::SeaOrmStorage;
use crate::entity::format_date;
use crate::entity::progress_entries::{ActiveModel, Column, Entity as ProgressEntries};
use crate::errors::{PreschoolError, Result};
use crate::models::{
    PaginationInfo, PaginationQuery,
    progress::{
        entities::ProgressEntry,
        requests::{CreateProgressRequest, ProgressListQuery, UpdateProgressRequest},
        responses::ProgressListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    pub async fn create_progress_entry_impl(
        &self,
        teacher_id: i64,
        req: CreateProgressRequest,
    ) -> Result<ProgressEntry> {
        let now = chrono::Utc::now();
        let recorded_on = req.recorded_on.unwrap_or_else(|| now.date_naive());

        let model = ActiveModel {
            student_id: Set(req.student_id),
            teacher_id: Set(teacher_id),
            area: Set(req.area.to_string()),
            rating: Set(req.rating),
            remarks: Set(req.remarks),
            recorded_on: Set(format_date(recorded_on)),
            created_at: Set(now.timestamp()),
            updated_at: Set(now.timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("创建成长记录失败: {e}")))?;

        Ok(result.into_progress_entry())
    }

    pub async fn get_progress_entry_by_id_impl(&self, id: i64) -> Result<Option<ProgressEntry>> {
        let result = ProgressEntries::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询成长记录失败: {e}")))?;

        Ok(result.map(|m| m.into_progress_entry()))
    }

    pub async fn list_progress_with_pagination_impl(
        &self,
        query: ProgressListQuery,
    ) -> Result<ProgressListResponse> {
        let (page, size) = PaginationQuery::normalized(query.page, query.size);

        let mut select = ProgressEntries::find();

        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }
        if let Some(area) = query.area {
            select = select.filter(Column::Area.eq(area.to_string()));
        }

        // 最近的记录在前
        select = select
            .order_by_desc(Column::RecordedOn)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            PreschoolError::database_operation(format!("查询成长记录总数失败: {e}"))
        })?;
        let pages = paginator.num_pages().await.map_err(|e| {
            PreschoolError::database_operation(format!("查询成长记录页数失败: {e}"))
        })?;
        let entries = paginator.fetch_page(page - 1).await.map_err(|e| {
            PreschoolError::database_operation(format!("查询成长记录列表失败: {e}"))
        })?;

        Ok(ProgressListResponse {
            items: entries
                .into_iter()
                .map(|m| m.into_progress_entry())
                .collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_progress_for_student_impl(
        &self,
        student_id: i64,
        limit: u64,
    ) -> Result<Vec<ProgressEntry>> {
        let entries = ProgressEntries::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::RecordedOn)
            .order_by_asc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询成长记录失败: {e}")))?;

        Ok(entries
            .into_iter()
            .map(|m| m.into_progress_entry())
            .collect())
    }

    pub async fn update_progress_entry_impl(
        &self,
        id: i64,
        update: UpdateProgressRequest,
    ) -> Result<Option<ProgressEntry>> {
        if self.get_progress_entry_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(area) = update.area {
            model.area = Set(area.to_string());
        }
        if let Some(rating) = update.rating {
            model.rating = Set(rating);
        }
        if let Some(remarks) = update.remarks {
            model.remarks = Set(Some(remarks));
        }
        if let Some(recorded_on) = update.recorded_on {
            model.recorded_on = Set(format_date(recorded_on));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("更新成长记录失败: {e}")))?;

        self.get_progress_entry_by_id_impl(id).await
    }

    pub async fn delete_progress_entry_impl(&self, id: i64) -> Result<bool> {
        let result = ProgressEntries::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("删除成长记录失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
