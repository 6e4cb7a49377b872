use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::progress::requests::{
    CreateProgressRequest, ProgressListParams, UpdateProgressRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::ProgressService;
use crate::utils::SafeIDI64;

static PROGRESS_SERVICE: Lazy<ProgressService> = Lazy::new(ProgressService::new_lazy);

pub async fn list_entries(
    req: HttpRequest,
    query: web::Query<ProgressListParams>,
) -> ActixResult<HttpResponse> {
    PROGRESS_SERVICE.list_entries(query.into_inner(), &req).await
}

pub async fn create_entry(
    req: HttpRequest,
    body: web::Json<CreateProgressRequest>,
) -> ActixResult<HttpResponse> {
    PROGRESS_SERVICE.create_entry(body.into_inner(), &req).await
}

pub async fn get_entry(req: HttpRequest, entry_id: SafeIDI64) -> ActixResult<HttpResponse> {
    PROGRESS_SERVICE.get_entry(entry_id.0, &req).await
}

pub async fn update_entry(
    req: HttpRequest,
    entry_id: SafeIDI64,
    body: web::Json<UpdateProgressRequest>,
) -> ActixResult<HttpResponse> {
    PROGRESS_SERVICE
        .update_entry(entry_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_entry(req: HttpRequest, entry_id: SafeIDI64) -> ActixResult<HttpResponse> {
    PROGRESS_SERVICE.delete_entry(entry_id.0, &req).await
}

// 配置路由，归属检查在业务层
pub fn configure_progress_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/progress")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
                    .route("", web::get().to(list_entries))
                    .route("", web::post().to(create_entry))
                    .route("/{id}", web::get().to(get_entry))
                    .route("/{id}", web::put().to(update_entry))
                    .route("/{id}", web::delete().to(delete_entry)),
            ),
    );
}
