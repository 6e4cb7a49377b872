use super::SeaOrmStorage;
use crate::entity::teachers::{
    ActiveModel, Column, Entity as Teachers, decode_class_levels, encode_class_levels,
};
use crate::errors::{PreschoolError, Result};
use crate::models::common::pagination::paginate_in_memory;
use crate::models::{
    PaginationInfo, PaginationQuery,
    teachers::{
        entities::Teacher,
        requests::{CreateTeacherRequest, TeacherListQuery, UpdateTeacherRequest},
        responses::TeacherListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    pub async fn create_teacher_impl(&self, req: CreateTeacherRequest) -> Result<Teacher> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            email: Set(req.email),
            phone: Set(req.phone),
            class_levels: Set(encode_class_levels(&req.class_levels)),
            user_id: Set(req.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("创建教师失败: {e}")))?;

        Ok(result.into_teacher())
    }

    pub async fn get_teacher_by_id_impl(&self, id: i64) -> Result<Option<Teacher>> {
        let result = Teachers::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询教师失败: {e}")))?;

        Ok(result.map(|m| m.into_teacher()))
    }

    pub async fn get_teacher_by_user_id_impl(&self, user_id: i64) -> Result<Option<Teacher>> {
        let result = Teachers::find()
            .filter(Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询教师失败: {e}")))?;

        Ok(result.map(|m| m.into_teacher()))
    }

    /// 分页列出教师
    ///
    /// 班级集合以 JSON 文本存储，按班级筛选时在内存中过滤后再分页。
    pub async fn list_teachers_with_pagination_impl(
        &self,
        query: TeacherListQuery,
    ) -> Result<TeacherListResponse> {
        let (page, size) = PaginationQuery::normalized(query.page, query.size);

        let mut select = Teachers::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Name.contains(&escaped))
                    .add(Column::Email.contains(&escaped)),
            );
        }

        select = select.order_by_asc(Column::Name).order_by_asc(Column::Id);

        if let Some(level) = query.class_level {
            let all = select
                .all(&self.db)
                .await
                .map_err(|e| PreschoolError::database_operation(format!("查询教师列表失败: {e}")))?;

            let matching: Vec<Teacher> = all
                .into_iter()
                .filter(|m| decode_class_levels(&m.class_levels).contains(&level))
                .map(|m| m.into_teacher())
                .collect();

            let total = matching.len() as u64;
            let pages = total.div_ceil(size);
            let items = paginate_in_memory(matching, page, size);

            return Ok(TeacherListResponse {
                items,
                pagination: PaginationInfo::new(page, size, total, pages),
            });
        }

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询教师总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询教师页数失败: {e}")))?;
        let teachers = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询教师列表失败: {e}")))?;

        Ok(TeacherListResponse {
            items: teachers.into_iter().map(|m| m.into_teacher()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_all_teachers_impl(&self) -> Result<Vec<Teacher>> {
        let teachers = Teachers::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询教师列表失败: {e}")))?;

        Ok(teachers.into_iter().map(|m| m.into_teacher()).collect())
    }

    pub async fn update_teacher_impl(
        &self,
        id: i64,
        update: UpdateTeacherRequest,
    ) -> Result<Option<Teacher>> {
        if self.get_teacher_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(email) = update.email {
            model.email = Set(Some(email));
        }
        if let Some(phone) = update.phone {
            model.phone = Set(Some(phone));
        }
        if let Some(levels) = update.class_levels {
            model.class_levels = Set(encode_class_levels(&levels));
        }
        if let Some(user_id) = update.user_id {
            model.user_id = Set(Some(user_id));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("更新教师失败: {e}")))?;

        self.get_teacher_by_id_impl(id).await
    }

    pub async fn delete_teacher_impl(&self, id: i64) -> Result<bool> {
        let result = Teachers::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("删除教师失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
