use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::{StudentService, check_teacher_for_level, student_not_found};
use crate::models::{
    ApiResponse, ErrorCode,
    students::requests::{CreateStudentRequest, UpdateStudentRequest},
};
use crate::services::invalidate_dashboard;
use crate::utils::validate::{validate_display_text, validate_student_age};

fn invalid(msg: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::StudentInvalid, msg))
}

fn write_failed(action: &str, e: impl std::fmt::Display) -> HttpResponse {
    error!("Failed to {} student: {}", action, e);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("Failed to {action} student: {e}"),
    ))
}

pub async fn create_student(
    service: &StudentService,
    student_data: CreateStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_display_text(&student_data.name, "name") {
        return Ok(invalid(msg));
    }
    if let Err(msg) = validate_student_age(student_data.age) {
        return Ok(invalid(msg));
    }

    let storage = service.get_storage(request)?;

    // 建档时指定的教师同样要满足班级资格
    if let Some(teacher_id) = student_data.teacher_id
        && let Some(resp) =
            check_teacher_for_level(storage.as_ref(), teacher_id, student_data.class_level).await
    {
        return Ok(resp);
    }

    match storage.create_student(student_data).await {
        Ok(student) => {
            info!("Created student {} in {}", student.id, student.class_level);
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Created().json(ApiResponse::success(student, "Student created")))
        }
        Err(e) => Ok(write_failed("create", e)),
    }
}

pub async fn update_student(
    service: &StudentService,
    student_id: i64,
    update_data: UpdateStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(name) = &update_data.name
        && let Err(msg) = validate_display_text(name, "name")
    {
        return Ok(invalid(msg));
    }
    if let Some(age) = update_data.age
        && let Err(msg) = validate_student_age(age)
    {
        return Ok(invalid(msg));
    }

    let storage = service.get_storage(request)?;

    // 换班时现任教师必须也能带新班级，否则先改分配
    if let Some(level) = update_data.class_level {
        let current = match storage.get_student_by_id(student_id).await {
            Ok(Some(student)) => student,
            Ok(None) => return Ok(student_not_found()),
            Err(e) => return Ok(write_failed("update", e)),
        };
        if let Some(teacher_id) = current.teacher_id
            && level != current.class_level
            && let Some(resp) = check_teacher_for_level(storage.as_ref(), teacher_id, level).await
        {
            return Ok(resp);
        }
    }

    match storage.update_student(student_id, update_data).await {
        Ok(Some(student)) => {
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(student, "Student updated")))
        }
        Ok(None) => Ok(student_not_found()),
        Err(e) => Ok(write_failed("update", e)),
    }
}

pub async fn delete_student(
    service: &StudentService,
    student_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.delete_student(student_id).await {
        Ok(true) => {
            info!("Deleted student {}", student_id);
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Student deleted")))
        }
        Ok(false) => Ok(student_not_found()),
        Err(e) => Ok(write_failed("delete", e)),
    }
}
