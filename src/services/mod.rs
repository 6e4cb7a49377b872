pub mod assignments;
pub mod auth;
pub mod dashboard;
pub mod export;
pub mod plans;
pub mod progress;
pub mod students;
pub mod suggestions;
pub mod teachers;
pub mod users;

pub use assignments::AssignmentService;
pub use auth::AuthService;
pub use dashboard::DashboardService;
pub use plans::PlanService;
pub use progress::ProgressService;
pub use students::StudentService;
pub use suggestions::SuggestionService;
pub use teachers::TeacherService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;
use tracing::{debug, error};

use crate::cache::{DASHBOARD_STATS_KEY, ObjectCache};
use crate::middlewares::RequireJWT;
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

/// 从应用数据中取存储
pub(crate) fn storage_from_request(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("Storage not found in app data");
            actix_web::error::ErrorInternalServerError("storage unavailable")
        })
}

pub(crate) fn cache_from_request(request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
}

/// 学生、教师、成长记录、计划或分配变化后清除仪表盘缓存
pub(crate) async fn invalidate_dashboard(request: &HttpRequest) {
    if let Some(cache) = cache_from_request(request) {
        cache.remove(DASHBOARD_STATS_KEY).await;
        debug!("Dashboard stats cache invalidated");
    }
}

/// 当前登录账号；路由未挂 RequireJWT 时返回 401
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        ))
    })
}

/// 数据归属范围：管理员不受限，教师只能操作自己的数据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Actor {
    Admin,
    Teacher(i64),
}

impl Actor {
    pub(crate) fn may_modify(self, owner_teacher_id: i64) -> bool {
        match self {
            Actor::Admin => true,
            Actor::Teacher(id) => id == owner_teacher_id,
        }
    }
}

/// 解析当前账号对应的操作者；教师账号未关联教师档案时返回 403
pub(crate) async fn resolve_actor(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
) -> Result<Actor, HttpResponse> {
    let user = current_user(request)?;
    if user.role == UserRole::Admin {
        return Ok(Actor::Admin);
    }

    match storage.get_teacher_by_user_id(user.id).await {
        Ok(Some(teacher)) => Ok(Actor::Teacher(teacher.id)),
        Ok(None) => Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "This account is not linked to a teacher profile",
        ))),
        Err(e) => {
            error!("Failed to resolve teacher for user {}: {}", user.id, e);
            Err(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to resolve current teacher",
                )),
            )
        }
    }
}

/// 服务层测试共用：挂好存储的请求与响应体解析
#[cfg(test)]
pub(crate) mod test_support {
    use actix_web::{HttpMessage, HttpRequest, HttpResponse, test::TestRequest, web};
    use std::sync::Arc;

    use crate::models::users::entities::User;
    use crate::storage::Storage;

    pub(crate) fn request_with(storage: &Arc<dyn Storage>) -> HttpRequest {
        TestRequest::default()
            .app_data(web::Data::new(storage.clone()))
            .to_http_request()
    }

    /// 模拟已通过 RequireJWT 的请求
    pub(crate) fn request_as(storage: &Arc<dyn Storage>, user: User) -> HttpRequest {
        let request = request_with(storage);
        request.extensions_mut().insert(user);
        request
    }

    pub(crate) async fn body_json(response: HttpResponse) -> serde_json::Value {
        let bytes = actix_web::body::to_bytes(response.into_body())
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_ownership() {
        assert!(Actor::Admin.may_modify(3));
        assert!(Actor::Teacher(3).may_modify(3));
        assert!(!Actor::Teacher(4).may_modify(3));
    }
}
