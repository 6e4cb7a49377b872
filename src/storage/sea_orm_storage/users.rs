//! 员工账号
//!
//! 教师账号通过 `teachers.user_id` 关联教师档案，一份档案最多关联一个账号。

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::teachers::{Column as TeacherColumn, Entity as Teachers};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{PreschoolError, Result};
use crate::models::{
    PaginationInfo, PaginationQuery,
    users::{
        entities::{User, UserRole, UserStatus},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::{AccountResponse, UserListResponse},
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait, sea_query::Expr,
};

fn db_err(action: &str) -> impl FnOnce(sea_orm::DbErr) -> PreschoolError + '_ {
    move |e| PreschoolError::database_operation(format!("{action}失败: {e}"))
}

/// 已关联教师档案的账号 ID 子查询
fn linked_user_ids() -> sea_orm::sea_query::SelectStatement {
    Teachers::find()
        .select_only()
        .column(TeacherColumn::UserId)
        .filter(TeacherColumn::UserId.is_not_null())
        .into_query()
}

/// 账号 ID -> 教师档案 ID
async fn teacher_links<C: ConnectionTrait>(db: &C, user_ids: &[i64]) -> Result<HashMap<i64, i64>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Option<i64>, i64)> = Teachers::find()
        .select_only()
        .column(TeacherColumn::UserId)
        .column(TeacherColumn::Id)
        .filter(TeacherColumn::UserId.is_in(user_ids.iter().copied()))
        .into_tuple()
        .all(db)
        .await
        .map_err(db_err("查询教师关联"))?;

    Ok(rows
        .into_iter()
        .filter_map(|(user_id, teacher_id)| user_id.map(|u| (u, teacher_id)))
        .collect())
}

impl SeaOrmStorage {
    async fn find_user(&self, condition: Condition) -> Result<Option<User>> {
        let model = Users::find()
            .filter(condition)
            .one(&self.db)
            .await
            .map_err(db_err("查询用户"))?;
        Ok(model.map(|m| m.into_user()))
    }

    /// 创建账号；带 `teacher_id` 时在同一事务中关联教师档案
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        if req.teacher_id.is_some() && req.role != UserRole::Teacher {
            return Err(PreschoolError::validation("只有教师账号可以关联教师档案"));
        }

        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务"))?;

        let created = ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            password_hash: Set(req.password),
            role: Set(req.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            display_name: Set(req.display_name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("创建用户"))?;

        if let Some(teacher_id) = req.teacher_id {
            let result = Teachers::update_many()
                .col_expr(TeacherColumn::UserId, Expr::value(created.id))
                .col_expr(TeacherColumn::UpdatedAt, Expr::value(now))
                .filter(TeacherColumn::Id.eq(teacher_id))
                .filter(TeacherColumn::UserId.is_null())
                .exec(&txn)
                .await
                .map_err(db_err("关联教师档案"))?;

            if result.rows_affected == 0 {
                let exists = Teachers::find_by_id(teacher_id)
                    .one(&txn)
                    .await
                    .map_err(db_err("查询教师"))?
                    .is_some();
                return Err(if exists {
                    PreschoolError::validation(format!("教师档案 {teacher_id} 已关联其他账号"))
                } else {
                    PreschoolError::not_found(format!("教师 {teacher_id} 不存在"))
                });
            }
        }

        txn.commit().await.map_err(db_err("提交事务"))?;
        Ok(created.into_user())
    }

    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        self.find_user(Condition::all().add(Column::Id.eq(id))).await
    }

    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        self.find_user(Condition::all().add(Column::Username.eq(username)))
            .await
    }

    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        self.find_user(Condition::all().add(Column::Email.eq(email)))
            .await
    }

    /// 登录时用户名和邮箱都可以
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        self.find_user(
            Condition::any()
                .add(Column::Username.eq(identifier))
                .add(Column::Email.eq(identifier)),
        )
        .await
    }

    /// 分页列出账号，每条附带关联的教师档案 ID
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let (page, size) = PaginationQuery::normalized(query.page, query.size);

        let mut select = Users::find();
        if let Some(search) = query.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            let escaped = escape_like_pattern(search);
            select = select.filter(
                Condition::any()
                    .add(Column::Username.contains(&escaped))
                    .add(Column::Email.contains(&escaped))
                    .add(Column::DisplayName.contains(&escaped)),
            );
        }
        if let Some(role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }
        match query.linked {
            Some(true) => select = select.filter(Column::Id.in_subquery(linked_user_ids())),
            Some(false) => select = select.filter(Column::Id.not_in_subquery(linked_user_ids())),
            None => {}
        }

        let paginator = select
            .order_by_asc(Column::Role)
            .order_by_asc(Column::Username)
            .paginate(&self.db, size);
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(db_err("统计账号"))?;
        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询账号列表"))?;

        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let links = teacher_links(&self.db, &ids).await?;
        let items = models
            .into_iter()
            .map(|m| {
                let teacher_id = links.get(&m.id).copied();
                AccountResponse {
                    user: m.into_user(),
                    teacher_id,
                }
            })
            .collect();

        Ok(UserListResponse {
            items,
            pagination: PaginationInfo::new(
                page,
                size,
                counts.number_of_items,
                counts.number_of_pages,
            ),
        })
    }

    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::LastLogin, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err("更新最后登录时间"))?;

        Ok(result.rows_affected > 0)
    }

    /// 修改账号；仍关联教师档案时拒绝改为管理员
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        let txn = self.db.begin().await.map_err(db_err("开启事务"))?;

        if Users::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err("查询用户"))?
            .is_none()
        {
            return Ok(None);
        }

        if update.role.is_some_and(|role| role != UserRole::Teacher)
            && let Some(teacher_id) = teacher_links(&txn, &[id]).await?.get(&id).copied()
        {
            return Err(PreschoolError::validation(format!(
                "账号 {id} 已关联教师档案 {teacher_id}，不能改为其他角色"
            )));
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(email) = update.email {
            model.email = Set(email);
        }
        if let Some(password) = update.password {
            model.password_hash = Set(password);
        }
        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        if let Some(display_name) = update.display_name {
            model.display_name = Set(Some(display_name));
        }

        let updated = model.update(&txn).await.map_err(db_err("更新用户"))?;
        txn.commit().await.map_err(db_err("提交事务"))?;

        Ok(Some(updated.into_user()))
    }

    /// 关联的教师档案保留，`user_id` 由外键置空
    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除用户"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_users_impl(&self) -> Result<u64> {
        Users::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计用户数量"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::temp_storage;
    use crate::errors::PreschoolError;
    use crate::models::common::ClassLevel;
    use crate::models::teachers::requests::CreateTeacherRequest;
    use crate::models::users::entities::UserRole;
    use crate::models::users::requests::{CreateUserRequest, UpdateUserRequest, UserListQuery};

    fn account(username: &str, role: UserRole, teacher_id: Option<i64>) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@school.test"),
            password: "hash".to_string(),
            role,
            display_name: None,
            teacher_id,
        }
    }

    fn profile() -> CreateTeacherRequest {
        CreateTeacherRequest {
            name: "Ms. Nair".to_string(),
            email: None,
            phone: None,
            class_levels: [ClassLevel::Nursery].into_iter().collect(),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_links_teacher_profile_once() {
        let storage = temp_storage().await;
        let teacher = storage.create_teacher(profile()).await.unwrap();

        let user = storage
            .create_user(account("nair", UserRole::Teacher, Some(teacher.id)))
            .await
            .unwrap();
        let linked = storage.get_teacher_by_user_id(user.id).await.unwrap().unwrap();
        assert_eq!(linked.id, teacher.id);

        // 档案已被占用，账号也不应留下
        let err = storage
            .create_user(account("nair2", UserRole::Teacher, Some(teacher.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, PreschoolError::Validation(_)));
        assert!(storage.get_user_by_username("nair2").await.unwrap().is_none());

        let err = storage
            .create_user(account("ghost", UserRole::Teacher, Some(999)))
            .await
            .unwrap_err();
        assert!(matches!(err, PreschoolError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_filters_by_role_and_link() {
        let storage = temp_storage().await;
        let teacher = storage.create_teacher(profile()).await.unwrap();
        storage
            .create_user(account("head", UserRole::Admin, None))
            .await
            .unwrap();
        let linked = storage
            .create_user(account("nair", UserRole::Teacher, Some(teacher.id)))
            .await
            .unwrap();
        storage
            .create_user(account("relief", UserRole::Teacher, None))
            .await
            .unwrap();

        let teachers = storage
            .list_users_with_pagination(UserListQuery {
                role: Some(UserRole::Teacher),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(teachers.pagination.total, 2);

        let with_profile = storage
            .list_users_with_pagination(UserListQuery {
                linked: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(with_profile.items.len(), 1);
        assert_eq!(with_profile.items[0].user.id, linked.id);
        assert_eq!(with_profile.items[0].teacher_id, Some(teacher.id));

        let without_profile = storage
            .list_users_with_pagination(UserListQuery {
                linked: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(without_profile.pagination.total, 2);
        assert!(without_profile.items.iter().all(|a| a.teacher_id.is_none()));
    }

    #[tokio::test]
    async fn test_linked_account_keeps_teacher_role() {
        let storage = temp_storage().await;
        let teacher = storage.create_teacher(profile()).await.unwrap();
        let user = storage
            .create_user(account("nair", UserRole::Teacher, Some(teacher.id)))
            .await
            .unwrap();

        let promote = UpdateUserRequest {
            email: None,
            password: None,
            role: Some(UserRole::Admin),
            status: None,
            display_name: None,
        };
        let err = storage.update_user(user.id, promote).await.unwrap_err();
        assert!(matches!(err, PreschoolError::Validation(_)));
        let stored = storage.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.role, UserRole::Teacher);

        // 删除账号后档案还在，只是解除关联
        assert!(storage.delete_user(user.id).await.unwrap());
        let kept = storage.get_teacher_by_id(teacher.id).await.unwrap().unwrap();
        assert_eq!(kept.user_id, None);
    }
}
