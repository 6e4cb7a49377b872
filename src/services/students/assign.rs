use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use super::{StudentService, check_teacher_for_level, student_not_found};
use crate::errors::PreschoolError;
use crate::models::{ApiResponse, ErrorCode, students::requests::AssignTeacherRequest};
use crate::services::invalidate_dashboard;

pub async fn assign_teacher(
    service: &StudentService,
    student_id: i64,
    body: AssignTeacherRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let student = match storage.get_student_by_id(student_id).await {
        Ok(Some(student)) => student,
        Ok(None) => return Ok(student_not_found()),
        Err(e) => {
            error!("Failed to load student {}: {}", student_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to load student",
                )),
            );
        }
    };

    // 取消分配无需校验
    if let Some(teacher_id) = body.teacher_id
        && let Some(resp) =
            check_teacher_for_level(storage.as_ref(), teacher_id, student.class_level).await
    {
        return Ok(resp);
    }

    match storage.set_student_teacher(student_id, body.teacher_id).await {
        Ok(true) => {}
        Ok(false) => return Ok(student_not_found()),
        // 校验之后教师或学生班级被改动
        Err(PreschoolError::Assignment(msg)) => {
            warn!("Assignment for student {} rejected on write: {}", student_id, msg);
            return Ok(
                HttpResponse::UnprocessableEntity().json(ApiResponse::error_empty(
                    ErrorCode::AssignmentIneligible,
                    "Teacher is no longer eligible for this student",
                )),
            );
        }
        Err(PreschoolError::NotFound(_)) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::TeacherNotFound,
                "Teacher not found",
            )));
        }
        Err(e) => {
            error!("Failed to assign teacher for student {}: {}", student_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to assign teacher: {e}"),
                )),
            );
        }
    }

    info!(
        "Student {} assigned to teacher {:?} (was {:?})",
        student_id, body.teacher_id, student.teacher_id
    );
    invalidate_dashboard(request).await;

    match storage.get_student_by_id(student_id).await {
        Ok(Some(updated)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "Teacher assigned")))
        }
        Ok(None) => Ok(student_not_found()),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to reload student: {e}"),
            )),
        ),
    }
}
