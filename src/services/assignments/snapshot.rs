use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::BTreeMap;

use super::AssignmentService;
use crate::assignment::{AssignmentSnapshot, EligibilityIndex, load_snapshot};
use crate::models::assignments::responses::{
    AssignmentSnapshotResponse, AssignmentStudent, AssignmentTeacher,
};
use crate::models::common::ClassLevel;
use crate::models::{ApiResponse, ErrorCode};

pub(crate) fn build_response(snapshot: AssignmentSnapshot) -> AssignmentSnapshotResponse {
    let index = EligibilityIndex::build(&snapshot.teachers);
    let eligible_teachers: BTreeMap<ClassLevel, Vec<i64>> = ClassLevel::ALL
        .iter()
        .map(|&level| (level, index.eligible_teachers(level)))
        .collect();

    let students = snapshot
        .students
        .into_iter()
        .map(|s| AssignmentStudent {
            id: s.id,
            name: s.name,
            class_level: s.class_level,
            teacher_id: s.teacher_id,
        })
        .collect();
    let teachers = snapshot
        .teachers
        .into_iter()
        .map(|t| AssignmentTeacher {
            id: t.id,
            name: t.name,
            class_levels: t.class_levels.into_iter().collect(),
        })
        .collect();

    AssignmentSnapshotResponse {
        students,
        teachers,
        eligible_teachers,
    }
}

pub async fn get_snapshot(
    service: &AssignmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match load_snapshot(storage.as_ref()).await {
        Ok(snapshot) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            build_response(snapshot),
            "Assignment data loaded",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::AssignmentLoadFailed,
                e.to_string(),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::fixtures::{student, teacher};

    #[test]
    fn test_eligible_teachers_per_level() {
        let snapshot = AssignmentSnapshot {
            students: vec![student(1, ClassLevel::Lkg, Some(2))],
            teachers: vec![
                teacher(2, &[ClassLevel::Lkg, ClassLevel::Ukg]),
                teacher(1, &[ClassLevel::Lkg]),
                teacher(3, &[]),
            ],
        };

        let resp = build_response(snapshot);
        assert_eq!(resp.eligible_teachers[&ClassLevel::Lkg], vec![1, 2]);
        assert_eq!(resp.eligible_teachers[&ClassLevel::Ukg], vec![2]);
        assert!(resp.eligible_teachers[&ClassLevel::Nursery].is_empty());
        assert_eq!(resp.students[0].teacher_id, Some(2));
        assert_eq!(resp.teachers.len(), 3);
        assert!(resp.teachers[2].class_levels.is_empty());
    }
}
