use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::plans::requests::{CreatePlanRequest, PlanListParams, UpdatePlanRequest};
use crate::models::users::entities::UserRole;
use crate::services::PlanService;
use crate::utils::SafeIDI64;

static PLAN_SERVICE: Lazy<PlanService> = Lazy::new(PlanService::new_lazy);

pub async fn list_plans(
    req: HttpRequest,
    query: web::Query<PlanListParams>,
) -> ActixResult<HttpResponse> {
    PLAN_SERVICE.list_plans(query.into_inner(), &req).await
}

pub async fn create_plan(
    req: HttpRequest,
    body: web::Json<CreatePlanRequest>,
) -> ActixResult<HttpResponse> {
    PLAN_SERVICE.create_plan(body.into_inner(), &req).await
}

pub async fn get_plan(req: HttpRequest, plan_id: SafeIDI64) -> ActixResult<HttpResponse> {
    PLAN_SERVICE.get_plan(plan_id.0, &req).await
}

pub async fn update_plan(
    req: HttpRequest,
    plan_id: SafeIDI64,
    body: web::Json<UpdatePlanRequest>,
) -> ActixResult<HttpResponse> {
    PLAN_SERVICE
        .update_plan(plan_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_plan(req: HttpRequest, plan_id: SafeIDI64) -> ActixResult<HttpResponse> {
    PLAN_SERVICE.delete_plan(plan_id.0, &req).await
}

pub fn configure_plan_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/plans")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
                    .route("", web::get().to(list_plans))
                    .route("", web::post().to(create_plan))
                    .route("/{id}", web::get().to(get_plan))
                    .route("/{id}", web::put().to(update_plan))
                    .route("/{id}", web::delete().to(delete_plan)),
            ),
    );
}
