use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::AssignmentService;
use crate::assignment::{
    AssignmentRejection, AssignmentSession, StorageAssignmentBackend, load_snapshot,
};
use crate::config::AppConfig;
use crate::models::assignments::requests::{ProposedAssignment, ReconcileRequest};
use crate::models::assignments::responses::{
    ReconcileRejectedResponse, ReconcileResponse, ReconcileState,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::runtime::lifetime::shutdown::shutdown_token;
use crate::services::invalidate_dashboard;

/// 逐条提交；任何一条被拒绝都不落库
pub(crate) fn propose_all(
    session: &mut AssignmentSession,
    assignments: &[ProposedAssignment],
) -> Vec<AssignmentRejection> {
    assignments
        .iter()
        .filter_map(|a| session.propose(a.student_id, a.teacher_id).err())
        .collect()
}

fn rejection_code(violations: &[AssignmentRejection]) -> ErrorCode {
    if violations
        .iter()
        .all(|v| matches!(v, AssignmentRejection::UnknownStudent { .. }))
    {
        ErrorCode::AssignmentUnknownStudent
    } else {
        ErrorCode::AssignmentIneligible
    }
}

fn load_failed(message: String) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::AssignmentLoadFailed,
        message,
    ))
}

pub async fn reconcile(
    service: &AssignmentService,
    body: ReconcileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let snapshot = match load_snapshot(storage.as_ref()).await {
        Ok(snapshot) => snapshot,
        Err(e) => return Ok(load_failed(e.to_string())),
    };
    let mut session = match AssignmentSession::load(&snapshot) {
        Ok(session) => session,
        Err(e) => return Ok(load_failed(e.to_string())),
    };

    let violations = propose_all(&mut session, &body.assignments);
    if !violations.is_empty() {
        warn!(
            "Reconcile rejected: {} of {} proposals invalid",
            violations.len(),
            body.assignments.len()
        );
        let code = rejection_code(&violations);
        return Ok(HttpResponse::UnprocessableEntity().json(ApiResponse::error(
            code,
            ReconcileRejectedResponse { violations },
            "Some assignments are not allowed",
        )));
    }

    let timeout = Duration::from_millis(AppConfig::get().assignment.update_timeout_ms);
    let cancel = shutdown_token().child_token();
    let backend = StorageAssignmentBackend::new(Arc::clone(&storage));

    let report = match session.save(&backend, timeout, &cancel).await {
        Ok(report) => report,
        Err(e) => return Ok(load_failed(e.to_string())),
    };
    let state = ReconcileState::from_session(session.state());

    if !report.is_empty() {
        invalidate_dashboard(request).await;

        // 用写入后的数据重新开始，再对照一次请求，剩下的就是没写进去的
        match load_snapshot(storage.as_ref()).await {
            Ok(fresh) => {
                if session.reload(&fresh).is_ok() {
                    propose_all(&mut session, &body.assignments);
                    let pending = session.pending_changes();
                    if !pending.is_empty() {
                        warn!(
                            "{} assignment(s) still differ from the stored data after reload",
                            pending.len()
                        );
                    }
                }
            }
            Err(e) => warn!("Failed to reload assignments after save: {}", e),
        }
    }

    info!(
        "Reconcile finished with state {:?}: {} succeeded, {} failed, {} skipped",
        state, report.succeeded, report.failed, report.skipped
    );

    let message = match state {
        ReconcileState::SavedClean => "Assignments saved",
        ReconcileState::SavedWithErrors => "Assignments saved with errors",
        ReconcileState::Unchanged => "No changes to save",
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ReconcileResponse { state, report },
        message,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::AssignmentSnapshot;
    use crate::assignment::fixtures::{student, teacher};
    use crate::models::common::ClassLevel;

    fn proposal(student_id: i64, teacher_id: Option<i64>) -> ProposedAssignment {
        ProposedAssignment {
            student_id,
            teacher_id,
        }
    }

    #[test]
    fn test_propose_all_collects_every_violation() {
        let snapshot = AssignmentSnapshot {
            students: vec![
                student(1, ClassLevel::Lkg, None),
                student(2, ClassLevel::Ukg, None),
            ],
            teachers: vec![teacher(10, &[ClassLevel::Lkg])],
        };
        let mut session = AssignmentSession::load(&snapshot).unwrap();

        let violations = propose_all(
            &mut session,
            &[proposal(1, Some(10)), proposal(2, Some(10)), proposal(99, None)],
        );

        assert_eq!(violations.len(), 2);
        assert!(matches!(
            violations[0],
            AssignmentRejection::Ineligible { student_id: 2, .. }
        ));
        assert!(matches!(
            violations[1],
            AssignmentRejection::UnknownStudent { student_id: 99 }
        ));
        assert_eq!(rejection_code(&violations), ErrorCode::AssignmentIneligible);
        assert_eq!(
            rejection_code(&violations[1..]),
            ErrorCode::AssignmentUnknownStudent
        );
    }

    #[actix_web::test]
    async fn test_rejected_batch_writes_nothing() {
        use crate::models::students::entities::{LearningAbility, WritingSpeed};
        use crate::models::students::requests::CreateStudentRequest;
        use crate::models::teachers::requests::CreateTeacherRequest;
        use crate::services::test_support::{body_json, request_with};
        use crate::storage::sea_orm_storage::temp_storage;
        use actix_web::http::StatusCode;

        let storage = temp_storage().await;
        let request = request_with(&storage);

        let teacher = storage
            .create_teacher(CreateTeacherRequest {
                name: "Mr. Das".to_string(),
                email: None,
                phone: None,
                class_levels: [ClassLevel::Nursery].into_iter().collect(),
                user_id: None,
            })
            .await
            .unwrap();
        let mut ids = Vec::new();
        for level in [ClassLevel::Nursery, ClassLevel::Ukg] {
            let created = storage
                .create_student(CreateStudentRequest {
                    name: "Meera".to_string(),
                    age: 4,
                    class_level: level,
                    learning_ability: LearningAbility::Average,
                    writing_speed: WritingSpeed::Slow,
                    photo_url: None,
                    teacher_id: None,
                })
                .await
                .unwrap();
            ids.push(created.id);
        }

        // 第一条合法，第二条不合法，整批都不写
        let body = ReconcileRequest {
            assignments: vec![
                proposal(ids[0], Some(teacher.id)),
                proposal(ids[1], Some(teacher.id)),
            ],
        };
        let resp = reconcile(&AssignmentService::new_lazy(), body, &request)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(resp).await;
        assert_eq!(json["code"], ErrorCode::AssignmentIneligible as i32);
        assert_eq!(json["data"]["violations"].as_array().unwrap().len(), 1);

        let students = storage.list_all_students().await.unwrap();
        assert!(students.iter().all(|s| s.teacher_id.is_none()));

        let body = ReconcileRequest {
            assignments: vec![proposal(ids[0], Some(teacher.id))],
        };
        let resp = reconcile(&AssignmentService::new_lazy(), body, &request)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let stored = storage.get_student_by_id(ids[0]).await.unwrap().unwrap();
        assert_eq!(stored.teacher_id, Some(teacher.id));
    }
}
