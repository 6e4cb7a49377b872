use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::{CreateUserRequest, UpdateUserRequest, UserListParams};
use crate::services::UserService;
use crate::utils::SafeIDI64;

static USER_SERVICE: Lazy<UserService> = Lazy::new(UserService::new_lazy);

pub async fn list_accounts(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.list_users(query.into_inner(), &req).await
}

pub async fn create_account(
    req: HttpRequest,
    body: web::Json<CreateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.create_user(body.into_inner(), &req).await
}

pub async fn get_account(req: HttpRequest, account_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.get_user(account_id.0, &req).await
}

pub async fn update_account(
    req: HttpRequest,
    account_id: SafeIDI64,
    body: web::Json<UpdateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .update_user(account_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_account(req: HttpRequest, account_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.delete_user(account_id.0, &req).await
}

// 账号管理仅限管理员
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_accounts))
                    .route(web::post().to(create_account)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_account))
                    .route(web::put().to(update_account))
                    .route(web::delete().to(delete_account)),
            ),
    );
}
