//! 学生成长报告导出

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;
use tracing::error;

use super::ProgressService;
use crate::config::AppConfig;
use crate::entity::format_date;
use crate::models::progress::entities::ProgressEntry;
use crate::models::progress::requests::ProgressExportParams;
use crate::models::teachers::entities::Teacher;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::export::{Cell, ExportFormat, Table, into_response};

const HEADERS: &[&str] = &["recorded_on", "area", "rating", "remarks", "teacher"];

pub(crate) fn report_table(student_id: i64, entries: &[ProgressEntry], teachers: &[Teacher]) -> Table {
    let names: HashMap<i64, &str> = teachers.iter().map(|t| (t.id, t.name.as_str())).collect();

    let mut table = Table::new(format!("student_{student_id}_progress"), HEADERS);
    for entry in entries {
        table.push(vec![
            format_date(entry.recorded_on).into(),
            entry.area.as_str().into(),
            entry.rating.into(),
            entry.remarks.as_deref().into(),
            names.get(&entry.teacher_id).copied().into(),
        ]);
    }
    table
}

fn export_failed(e: impl std::fmt::Display) -> HttpResponse {
    error!("Progress report export failed: {}", e);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::ExportFailed,
        format!("Progress report export failed: {e}"),
    ))
}

pub async fn export_student_report(
    service: &ProgressService,
    student_id: i64,
    params: ProgressExportParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_student_by_id(student_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "Student not found",
            )));
        }
        Err(e) => return Ok(export_failed(e)),
    }

    let max_rows = AppConfig::get().export.max_rows;
    let entries = match storage.list_progress_for_student(student_id, max_rows).await {
        Ok(entries) => entries,
        Err(e) => return Ok(export_failed(e)),
    };
    let teachers = match storage.list_all_teachers().await {
        Ok(teachers) => teachers,
        Err(e) => return Ok(export_failed(e)),
    };

    into_response(
        ExportFormat::parse(&params.format),
        &report_table(student_id, &entries, &teachers),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::fixtures::teacher;
    use crate::models::common::ClassLevel;
    use crate::models::progress::entities::ProgressArea;
    use crate::services::export::render_csv;

    fn entry(id: i64, teacher_id: i64, remarks: Option<&str>) -> ProgressEntry {
        ProgressEntry {
            id,
            student_id: 9,
            teacher_id,
            area: ProgressArea::MotorSkills,
            rating: 4,
            remarks: remarks.map(str::to_string),
            recorded_on: chrono::NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_report_rows() {
        let mut meera = teacher(3, &[ClassLevel::Nursery]);
        meera.name = "Meera".to_string();
        let table = report_table(9, &[entry(1, 3, Some("Holds crayon well")), entry(2, 8, None)], &[meera]);

        assert_eq!(table.file_stem, "student_9_progress");
        let csv = String::from_utf8(render_csv(&table).unwrap()).unwrap();
        assert_eq!(
            csv,
            "recorded_on,area,rating,remarks,teacher\n\
             2025-03-14,motor_skills,4,Holds crayon well,Meera\n\
             2025-03-14,motor_skills,4,,\n"
        );
    }
}
