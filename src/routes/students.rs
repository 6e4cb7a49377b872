use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::progress::requests::ProgressExportParams;
use crate::models::students::requests::{
    AssignTeacherRequest, CreateStudentRequest, ExportParams, StudentListParams,
    UpdateStudentRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::{ProgressService, StudentService};
use crate::utils::SafeIDI64;

static STUDENT_SERVICE: Lazy<StudentService> = Lazy::new(StudentService::new_lazy);
static PROGRESS_SERVICE: Lazy<ProgressService> = Lazy::new(ProgressService::new_lazy);

pub async fn list_students(
    req: HttpRequest,
    query: web::Query<StudentListParams>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.list_students(query.into_inner(), &req).await
}

pub async fn create_student(
    req: HttpRequest,
    body: web::Json<CreateStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.create_student(body.into_inner(), &req).await
}

pub async fn export_students(
    req: HttpRequest,
    query: web::Query<ExportParams>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.export_students(query.into_inner(), &req).await
}

pub async fn get_student(req: HttpRequest, student_id: SafeIDI64) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.get_student(student_id.0, &req).await
}

pub async fn update_student(
    req: HttpRequest,
    student_id: SafeIDI64,
    body: web::Json<UpdateStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .update_student(student_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_student(req: HttpRequest, student_id: SafeIDI64) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.delete_student(student_id.0, &req).await
}

pub async fn assign_teacher(
    req: HttpRequest,
    student_id: SafeIDI64,
    body: web::Json<AssignTeacherRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .assign_teacher(student_id.0, body.into_inner(), &req)
        .await
}

pub async fn export_progress(
    req: HttpRequest,
    student_id: SafeIDI64,
    query: web::Query<ProgressExportParams>,
) -> ActixResult<HttpResponse> {
    PROGRESS_SERVICE
        .export_student_report(student_id.0, query.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_student_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/students")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_students))
                    .route(
                        web::post()
                            .to(create_student)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            // 必须在 /{id} 之前注册
            .service(
                web::resource("/export")
                    .wrap(middlewares::RateLimit::export())
                    .route(web::get().to(export_students)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_student))
                    .route(
                        web::put()
                            .to(update_student)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_student)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            .service(
                web::resource("/{id}/teacher").route(
                    web::patch()
                        .to(assign_teacher)
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                ),
            )
            .service(
                web::resource("/{id}/progress/export")
                    .wrap(middlewares::RateLimit::export())
                    .route(web::get().to(export_progress)),
            ),
    );
}
