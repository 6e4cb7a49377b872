use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Datelike, NaiveDate, Weekday};
use tracing::{error, info};

use super::PlanService;
use crate::models::{
    ApiResponse, ErrorCode,
    plans::requests::{CreatePlanRequest, PlanListParams, PlanListQuery, UpdatePlanRequest},
};
use crate::services::{Actor, invalidate_dashboard, resolve_actor};
use crate::utils::validate::{validate_activities, validate_display_text};

const MAX_OBJECTIVES_CHARS: usize = 2000;

fn invalid(msg: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::PlanInvalid, msg))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::PlanNotFound,
        "Teaching plan not found",
    ))
}

fn permission_denied() -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(
        ErrorCode::PlanPermissionDenied,
        "Teachers can only modify their own plans",
    ))
}

fn storage_failed(action: &str, e: impl std::fmt::Display) -> HttpResponse {
    error!("Failed to {} teaching plan: {}", action, e);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("Failed to {action} teaching plan: {e}"),
    ))
}

fn check_fields(
    title: Option<&str>,
    week_start: Option<NaiveDate>,
    objectives: Option<&str>,
    activities: Option<&[String]>,
) -> Result<(), String> {
    if let Some(title) = title {
        validate_display_text(title, "title")?;
    }
    // 周计划从周一开始
    if let Some(week_start) = week_start
        && week_start.weekday() != Weekday::Mon
    {
        return Err("week_start must be a Monday".to_string());
    }
    if let Some(objectives) = objectives
        && objectives.chars().count() > MAX_OBJECTIVES_CHARS
    {
        return Err(format!(
            "Objectives must be at most {MAX_OBJECTIVES_CHARS} characters"
        ));
    }
    if let Some(activities) = activities {
        validate_activities(activities)?;
    }
    Ok(())
}

pub async fn list_plans(
    service: &PlanService,
    query: PlanListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let list_query = PlanListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        teacher_id: query.teacher_id,
        class_level: query.class_level,
        status: query.status,
    };

    match storage.list_plans_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Teaching plans retrieved",
        ))),
        Err(e) => Ok(storage_failed("list", e)),
    }
}

pub async fn get_plan(
    service: &PlanService,
    plan_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_plan_by_id(plan_id).await {
        Ok(Some(plan)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(plan, "Teaching plan retrieved")))
        }
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(storage_failed("load", e)),
    }
}

pub async fn create_plan(
    service: &PlanService,
    plan: CreatePlanRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = check_fields(
        Some(&plan.title),
        Some(plan.week_start),
        Some(&plan.objectives),
        Some(&plan.activities),
    ) {
        return Ok(invalid(msg));
    }

    let storage = service.get_storage(request)?;
    let actor = match resolve_actor(&storage, request).await {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    let teacher_id = match (actor, plan.teacher_id) {
        (Actor::Teacher(own), None) => own,
        (Actor::Teacher(own), Some(requested)) if requested == own => own,
        (Actor::Teacher(_), Some(_)) => return Ok(permission_denied()),
        (Actor::Admin, Some(requested)) => {
            match storage.get_teacher_by_id(requested).await {
                Ok(Some(_)) => requested,
                Ok(None) => {
                    return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                        ErrorCode::TeacherNotFound,
                        "Teacher not found",
                    )));
                }
                Err(e) => return Ok(storage_failed("create", e)),
            }
        }
        (Actor::Admin, None) => {
            return Ok(invalid(
                "teacher_id is required when creating a plan for a teacher".to_string(),
            ));
        }
    };

    match storage.create_plan(teacher_id, plan).await {
        Ok(created) => {
            info!(
                "Teaching plan {} created for teacher {} (week of {})",
                created.id, created.teacher_id, created.week_start
            );
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Created().json(ApiResponse::success(created, "Teaching plan created")))
        }
        Err(e) => Ok(storage_failed("create", e)),
    }
}

/// 修改和删除前确认归属
async fn ensure_owner(
    service: &PlanService,
    plan_id: i64,
    request: &HttpRequest,
) -> ActixResult<Option<HttpResponse>> {
    let storage = service.get_storage(request)?;
    let actor = match resolve_actor(&storage, request).await {
        Ok(actor) => actor,
        Err(resp) => return Ok(Some(resp)),
    };

    Ok(match storage.get_plan_by_id(plan_id).await {
        Ok(Some(plan)) if actor.may_modify(plan.teacher_id) => None,
        Ok(Some(_)) => Some(permission_denied()),
        Ok(None) => Some(not_found()),
        Err(e) => Some(storage_failed("load", e)),
    })
}

pub async fn update_plan(
    service: &PlanService,
    plan_id: i64,
    update: UpdatePlanRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = check_fields(
        update.title.as_deref(),
        update.week_start,
        update.objectives.as_deref(),
        update.activities.as_deref(),
    ) {
        return Ok(invalid(msg));
    }

    if let Some(resp) = ensure_owner(service, plan_id, request).await? {
        return Ok(resp);
    }

    let storage = service.get_storage(request)?;
    match storage.update_plan(plan_id, update).await {
        Ok(Some(plan)) => {
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(plan, "Teaching plan updated")))
        }
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(storage_failed("update", e)),
    }
}

pub async fn delete_plan(
    service: &PlanService,
    plan_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(resp) = ensure_owner(service, plan_id, request).await? {
        return Ok(resp);
    }

    let storage = service.get_storage(request)?;
    match storage.delete_plan(plan_id).await {
        Ok(true) => {
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Teaching plan deleted")))
        }
        Ok(false) => Ok(not_found()),
        Err(e) => Ok(storage_failed("delete", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_start_must_be_monday() {
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        assert!(check_fields(None, Some(monday), None, None).is_ok());
        assert!(check_fields(None, Some(tuesday), None, None).is_err());
    }

    #[test]
    fn test_plan_text_limits() {
        assert!(check_fields(Some(""), None, None, None).is_err());
        assert!(check_fields(None, None, Some(&"o".repeat(2001)), None).is_err());
        assert!(
            check_fields(Some("Shapes week"), None, Some("Circles"), Some(&["Clay".to_string()]))
                .is_ok()
        );
    }
}
