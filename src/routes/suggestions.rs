use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::suggestions::requests::ActivitySuggestionRequest;
use crate::models::users::entities::UserRole;
use crate::services::SuggestionService;

static SUGGESTION_SERVICE: Lazy<SuggestionService> = Lazy::new(SuggestionService::new_lazy);

pub async fn suggest_activities(
    req: HttpRequest,
    body: web::Json<ActivitySuggestionRequest>,
) -> ActixResult<HttpResponse> {
    SUGGESTION_SERVICE
        .suggest_activities(body.into_inner(), &req)
        .await
}

pub fn configure_suggestion_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/suggestions")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/activities")
                    .wrap(middlewares::RateLimit::suggestions())
                    .route(
                        web::post()
                            .to(suggest_activities)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    ),
            ),
    );
}
