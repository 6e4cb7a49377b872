//! 学生名册导出

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;
use tracing::{error, info};

use super::StudentService;
use crate::config::AppConfig;
use crate::models::students::entities::Student;
use crate::models::students::requests::ExportParams;
use crate::models::teachers::entities::Teacher;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::export::{Cell, ExportFormat, Table, into_response};

const HEADERS: &[&str] = &[
    "id",
    "name",
    "age",
    "class_level",
    "learning_ability",
    "writing_speed",
    "teacher_id",
    "teacher_name",
];

pub(crate) fn roster_table(students: &[Student], teachers: &[Teacher]) -> Table {
    let names: HashMap<i64, &str> = teachers.iter().map(|t| (t.id, t.name.as_str())).collect();

    let mut table = Table::new("students", HEADERS);
    for student in students {
        let teacher_name = student
            .teacher_id
            .and_then(|id| names.get(&id).copied())
            .map(Cell::from)
            .unwrap_or(Cell::Empty);
        table.push(vec![
            student.id.into(),
            student.name.as_str().into(),
            student.age.into(),
            student.class_level.as_str().into(),
            student.learning_ability.as_str().into(),
            student.writing_speed.as_str().into(),
            student.teacher_id.into(),
            teacher_name,
        ]);
    }
    table
}

pub async fn export_students(
    service: &StudentService,
    params: ExportParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let max_rows = AppConfig::get().export.max_rows;

    let students = match storage
        .list_students_for_export(params.class_level, params.teacher_id, max_rows)
        .await
    {
        Ok(students) => students,
        Err(e) => {
            error!("Student export failed: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ExportFailed,
                    format!("Student export failed: {e}"),
                )),
            );
        }
    };

    let teachers = match storage.list_all_teachers().await {
        Ok(teachers) => teachers,
        Err(e) => {
            error!("Student export failed to load teachers: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ExportFailed,
                    format!("Student export failed: {e}"),
                )),
            );
        }
    };

    info!("Exporting {} students as {}", students.len(), params.format);
    into_response(ExportFormat::parse(&params.format), &roster_table(&students, &teachers))
}
