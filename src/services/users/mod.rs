pub mod create;
pub mod delete;
pub mod query;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::warn;

use crate::errors::PreschoolError;
use crate::models::users::entities::{User, UserRole};
use crate::models::users::requests::{CreateUserRequest, UpdateUserRequest, UserListParams};
use crate::models::users::responses::AccountResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct UserService {
    storage: Option<Arc<dyn Storage>>,
}

impl UserService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 获取账号列表
    pub async fn list_users(
        &self,
        query: UserListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        query::list_users(self, query, request).await
    }

    // 创建账号
    pub async fn create_user(
        &self,
        user_data: CreateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_user(self, user_data, request).await
    }

    pub async fn get_user(&self, user_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        query::get_user(self, user_id, request).await
    }

    pub async fn update_user(
        &self,
        user_id: i64,
        update_data: UpdateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_user(self, user_id, update_data, request).await
    }

    // 删除账号，不能删除自己
    pub async fn delete_user(
        &self,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_user(self, user_id, request).await
    }
}

/// 附上关联的教师档案，查询失败时按未关联处理
pub(crate) async fn account_view(storage: &dyn Storage, user: User) -> AccountResponse {
    let teacher_id = if user.role == UserRole::Teacher {
        match storage.get_teacher_by_user_id(user.id).await {
            Ok(teacher) => teacher.map(|t| t.id),
            Err(e) => {
                warn!("Failed to look up teacher profile for account {}: {}", user.id, e);
                None
            }
        }
    } else {
        None
    };
    AccountResponse { user, teacher_id }
}

pub(crate) fn user_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::UserNotFound,
        "User not found",
    ))
}

/// 教师档案关联冲突；其余错误返回 None 交给调用方
pub(crate) fn link_rejection(err: &PreschoolError) -> Option<HttpResponse> {
    match err {
        PreschoolError::Validation(msg) => Some(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::UserLinkedToTeacher, msg.as_str()),
        )),
        PreschoolError::NotFound(_) => Some(HttpResponse::NotFound().json(
            ApiResponse::error_empty(ErrorCode::TeacherNotFound, "Teacher not found"),
        )),
        _ => None,
    }
}

/// 唯一约束冲突（三种数据库的报错文本不同）
pub(crate) fn is_unique_violation(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("unique constraint") || lower.contains("duplicate")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    use crate::models::PaginationQuery;
    use crate::models::common::ClassLevel;
    use crate::models::teachers::requests::CreateTeacherRequest;
    use crate::services::test_support::{body_json, request_as, request_with};
    use crate::storage::sea_orm_storage::temp_storage;

    #[test]
    fn test_unique_violation_detection() {
        assert!(is_unique_violation(
            "Database Operation Error: UNIQUE constraint failed: users.username"
        ));
        assert!(is_unique_violation(
            "duplicate key value violates unique constraint \"users_email_key\""
        ));
        assert!(is_unique_violation("Duplicate entry 'admin' for key 'username'"));
        assert!(!is_unique_violation("connection refused"));
    }

    fn new_account(
        username: &str,
        role: UserRole,
        teacher_id: Option<i64>,
    ) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@school.test"),
            password: "SecurePass123".to_string(),
            role,
            display_name: None,
            teacher_id,
        }
    }

    async fn teacher_profile(storage: &Arc<dyn Storage>) -> i64 {
        storage
            .create_teacher(CreateTeacherRequest {
                name: "Ms. Pillai".to_string(),
                email: None,
                phone: None,
                class_levels: [ClassLevel::Lkg].into_iter().collect(),
                user_id: None,
            })
            .await
            .unwrap()
            .id
    }

    #[actix_web::test]
    async fn test_create_account_with_teacher_link() {
        let storage = temp_storage().await;
        let request = request_with(&storage);
        let service = UserService::new_lazy();
        let teacher_id = teacher_profile(&storage).await;

        let account = new_account("pillai", UserRole::Admin, Some(teacher_id));
        let resp = service
            .create_user(account, &request)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let account = new_account("pillai", UserRole::Teacher, Some(teacher_id));
        let resp = service
            .create_user(account, &request)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["teacher_id"], teacher_id);
        assert_eq!(json["data"]["role"], "teacher");
        assert!(json["data"].get("password_hash").is_none());

        let account = new_account("second", UserRole::Teacher, Some(teacher_id));
        let resp = service
            .create_user(account, &request)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(resp).await["code"],
            ErrorCode::UserLinkedToTeacher as i32
        );

        let account = new_account("orphan", UserRole::Teacher, Some(404));
        let resp = service
            .create_user(account, &request)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_linked_account_cannot_become_admin() {
        let storage = temp_storage().await;
        let request = request_with(&storage);
        let service = UserService::new_lazy();
        let teacher_id = teacher_profile(&storage).await;
        let user = storage
            .create_user(new_account("pillai", UserRole::Teacher, Some(teacher_id)))
            .await
            .unwrap();

        let promote = UpdateUserRequest {
            email: None,
            password: None,
            role: Some(UserRole::Admin),
            status: None,
            display_name: None,
        };
        let resp = service.update_user(user.id, promote, &request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let rename = UpdateUserRequest {
            email: None,
            password: None,
            role: None,
            status: None,
            display_name: Some("Anita Pillai".to_string()),
        };
        let resp = service.update_user(user.id, rename, &request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["display_name"], "Anita Pillai");
        assert_eq!(json["data"]["teacher_id"], teacher_id);
    }

    #[actix_web::test]
    async fn test_list_by_role_and_self_delete_guard() {
        let storage = temp_storage().await;
        let service = UserService::new_lazy();
        let admin = storage
            .create_user(new_account("office", UserRole::Admin, None))
            .await
            .unwrap();
        storage
            .create_user(new_account("relief", UserRole::Teacher, None))
            .await
            .unwrap();
        let request = request_as(&storage, admin.clone());

        let params = UserListParams {
            pagination: PaginationQuery::default(),
            role: Some(UserRole::Teacher),
            status: None,
            linked: None,
            search: None,
        };
        let resp = service.list_users(params, &request).await.unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["data"]["items"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"]["items"][0]["username"], "relief");

        let resp = service.delete_user(admin.id, &request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await["code"],
            ErrorCode::CanNotDeleteCurrentUser as i32
        );
    }
}
