use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::TeacherService;
use crate::models::{
    ApiResponse, ErrorCode,
    teachers::requests::{CreateTeacherRequest, UpdateTeacherRequest},
    users::entities::UserRole,
};
use crate::services::invalidate_dashboard;
use crate::services::users::is_unique_violation;
use crate::storage::Storage;
use crate::utils::validate::{validate_display_text, validate_email};

fn validate_contact(
    name: Option<&str>,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<(), String> {
    if let Some(name) = name {
        validate_display_text(name, "name")?;
    }
    if let Some(email) = email {
        validate_email(email).map_err(str::to_string)?;
    }
    if let Some(phone) = phone
        && (phone.trim().is_empty() || phone.chars().count() > 32)
    {
        return Err("phone must be 1-32 characters".to_string());
    }
    Ok(())
}

/// 关联账号必须存在且为教师角色
async fn check_linked_user(storage: &dyn Storage, user_id: i64) -> Option<HttpResponse> {
    match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) if user.role == UserRole::Teacher => None,
        Ok(Some(_)) => Some(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::TeacherInvalid,
            "Linked account must have the teacher role",
        ))),
        Ok(None) => Some(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "Linked account not found",
        ))),
        Err(e) => {
            error!("Failed to look up linked account {}: {}", user_id, e);
            Some(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to look up linked account",
                )),
            )
        }
    }
}

fn write_failed(action: &str, e: impl std::fmt::Display) -> HttpResponse {
    let msg = format!("Failed to {action} teacher: {e}");
    if is_unique_violation(&msg) {
        return HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::TeacherInvalid,
            "Teacher conflicts with an existing record",
        ));
    }
    error!("{}", msg);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        msg,
    ))
}

pub async fn create_teacher(
    service: &TeacherService,
    teacher_data: CreateTeacherRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_contact(
        Some(&teacher_data.name),
        teacher_data.email.as_deref(),
        teacher_data.phone.as_deref(),
    ) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::TeacherInvalid, msg)));
    }

    let storage = service.get_storage(request)?;

    if let Some(user_id) = teacher_data.user_id
        && let Some(resp) = check_linked_user(storage.as_ref(), user_id).await
    {
        return Ok(resp);
    }

    match storage.create_teacher(teacher_data).await {
        Ok(teacher) => {
            info!("Created teacher {} ({})", teacher.id, teacher.name);
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Created().json(ApiResponse::success(teacher, "Teacher created")))
        }
        Err(e) => Ok(write_failed("create", e)),
    }
}

pub async fn update_teacher(
    service: &TeacherService,
    teacher_id: i64,
    update_data: UpdateTeacherRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_contact(
        update_data.name.as_deref(),
        update_data.email.as_deref(),
        update_data.phone.as_deref(),
    ) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::TeacherInvalid, msg)));
    }

    let storage = service.get_storage(request)?;

    if let Some(user_id) = update_data.user_id
        && let Some(resp) = check_linked_user(storage.as_ref(), user_id).await
    {
        return Ok(resp);
    }

    match storage.update_teacher(teacher_id, update_data).await {
        Ok(Some(teacher)) => {
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(teacher, "Teacher updated")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TeacherNotFound,
            "Teacher not found",
        ))),
        Err(e) => Ok(write_failed("update", e)),
    }
}

pub async fn delete_teacher(
    service: &TeacherService,
    teacher_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.delete_teacher(teacher_id).await {
        Ok(true) => {
            info!("Deleted teacher {}", teacher_id);
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Teacher deleted")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TeacherNotFound,
            "Teacher not found",
        ))),
        Err(e) => Ok(write_failed("delete", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_contact() {
        assert!(validate_contact(Some("Meera"), Some("meera@example.com"), None).is_ok());
        assert!(validate_contact(None, None, None).is_ok());
        assert!(validate_contact(Some("  "), None, None).is_err());
        assert!(validate_contact(None, Some("not-an-email"), None).is_err());
        assert!(validate_contact(None, None, Some("")).is_err());
    }
}
