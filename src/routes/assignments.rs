use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assignments::requests::ReconcileRequest;
use crate::models::users::entities::UserRole;
use crate::services::AssignmentService;

static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);

pub async fn get_snapshot(req: HttpRequest) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.get_snapshot(&req).await
}

pub async fn reconcile(
    req: HttpRequest,
    body: web::Json<ReconcileRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.reconcile(body.into_inner(), &req).await
}

// 仅管理员
pub fn configure_assignment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("", web::get().to(get_snapshot))
                    .route("/reconcile", web::post().to(reconcile)),
            ),
    );
}
