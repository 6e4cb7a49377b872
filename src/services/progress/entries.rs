use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::ProgressService;
use crate::models::{
    ApiResponse, ErrorCode,
    progress::entities::ProgressEntry,
    progress::requests::{
        CreateProgressRequest, ProgressListParams, ProgressListQuery, UpdateProgressRequest,
    },
};
use crate::services::{Actor, invalidate_dashboard, resolve_actor};
use crate::storage::Storage;
use crate::utils::validate::{validate_rating, validate_remarks};

fn invalid(msg: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::ProgressInvalid, msg))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::ProgressNotFound,
        "Progress entry not found",
    ))
}

fn permission_denied() -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(
        ErrorCode::ProgressPermissionDenied,
        "Teachers can only modify their own progress entries",
    ))
}

fn storage_failed(action: &str, e: impl std::fmt::Display) -> HttpResponse {
    error!("Failed to {} progress entry: {}", action, e);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("Failed to {action} progress entry: {e}"),
    ))
}

fn check_fields(rating: Option<i32>, remarks: Option<&str>) -> Result<(), String> {
    if let Some(rating) = rating {
        validate_rating(rating)?;
    }
    if let Some(remarks) = remarks {
        validate_remarks(remarks)?;
    }
    Ok(())
}

/// 取记录并校验归属
async fn load_owned(
    storage: &dyn Storage,
    actor: Actor,
    entry_id: i64,
) -> Result<ProgressEntry, HttpResponse> {
    match storage.get_progress_entry_by_id(entry_id).await {
        Ok(Some(entry)) if actor.may_modify(entry.teacher_id) => Ok(entry),
        Ok(Some(_)) => Err(permission_denied()),
        Ok(None) => Err(not_found()),
        Err(e) => Err(storage_failed("load", e)),
    }
}

pub async fn list_entries(
    service: &ProgressService,
    query: ProgressListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let list_query = ProgressListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        student_id: query.student_id,
        teacher_id: query.teacher_id,
        area: query.area,
    };

    match storage.list_progress_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Progress entries retrieved",
        ))),
        Err(e) => Ok(storage_failed("list", e)),
    }
}

pub async fn get_entry(
    service: &ProgressService,
    entry_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_progress_entry_by_id(entry_id).await {
        Ok(Some(entry)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            entry,
            "Progress entry retrieved",
        ))),
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(storage_failed("load", e)),
    }
}

pub async fn create_entry(
    service: &ProgressService,
    entry: CreateProgressRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = check_fields(Some(entry.rating), entry.remarks.as_deref()) {
        return Ok(invalid(msg));
    }

    let storage = service.get_storage(request)?;
    let actor = match resolve_actor(&storage, request).await {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    // 记录人：教师为本人，管理员必须指定
    let teacher_id = match (actor, entry.teacher_id) {
        (Actor::Teacher(own), None) => own,
        (Actor::Teacher(own), Some(requested)) if requested == own => own,
        (Actor::Teacher(_), Some(_)) => return Ok(permission_denied()),
        (Actor::Admin, Some(requested)) => requested,
        (Actor::Admin, None) => {
            return Ok(invalid(
                "teacher_id is required when recording on behalf of a teacher".to_string(),
            ));
        }
    };

    match storage.get_student_by_id(entry.student_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "Student not found",
            )));
        }
        Err(e) => return Ok(storage_failed("create", e)),
    }

    if matches!(actor, Actor::Admin) {
        match storage.get_teacher_by_id(teacher_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::TeacherNotFound,
                    "Teacher not found",
                )));
            }
            Err(e) => return Ok(storage_failed("create", e)),
        }
    }

    match storage.create_progress_entry(teacher_id, entry).await {
        Ok(created) => {
            info!(
                "Progress entry {} recorded for student {} by teacher {}",
                created.id, created.student_id, created.teacher_id
            );
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Created().json(ApiResponse::success(created, "Progress recorded")))
        }
        Err(e) => Ok(storage_failed("create", e)),
    }
}

pub async fn update_entry(
    service: &ProgressService,
    entry_id: i64,
    update: UpdateProgressRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = check_fields(update.rating, update.remarks.as_deref()) {
        return Ok(invalid(msg));
    }

    let storage = service.get_storage(request)?;
    let actor = match resolve_actor(&storage, request).await {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = load_owned(storage.as_ref(), actor, entry_id).await {
        return Ok(resp);
    }

    match storage.update_progress_entry(entry_id, update).await {
        Ok(Some(entry)) => {
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(entry, "Progress entry updated")))
        }
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(storage_failed("update", e)),
    }
}

pub async fn delete_entry(
    service: &ProgressService,
    entry_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let actor = match resolve_actor(&storage, request).await {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = load_owned(storage.as_ref(), actor, entry_id).await {
        return Ok(resp);
    }

    match storage.delete_progress_entry(entry_id).await {
        Ok(true) => {
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Progress entry deleted")))
        }
        Ok(false) => Ok(not_found()),
        Err(e) => Ok(storage_failed("delete", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_fields() {
        assert!(check_fields(Some(3), Some("Counts to twenty")).is_ok());
        assert!(check_fields(None, None).is_ok());
        assert!(check_fields(Some(0), None).is_err());
        assert!(check_fields(None, Some(&"x".repeat(501))).is_err());
    }
}
