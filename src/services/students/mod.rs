pub mod assign;
pub mod export;
pub mod manage;
pub mod query;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::error;

use crate::models::common::ClassLevel;
use crate::models::students::requests::{
    AssignTeacherRequest, CreateStudentRequest, ExportParams, StudentListParams,
    UpdateStudentRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct StudentService {
    storage: Option<Arc<dyn Storage>>,
}

impl StudentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_students(
        &self,
        query: StudentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        query::list_students(self, query, request).await
    }

    pub async fn get_student(
        &self,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        query::get_student(self, student_id, request).await
    }

    pub async fn create_student(
        &self,
        student_data: CreateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_student(self, student_data, request).await
    }

    pub async fn update_student(
        &self,
        student_id: i64,
        update_data: UpdateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_student(self, student_id, update_data, request).await
    }

    pub async fn delete_student(
        &self,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::delete_student(self, student_id, request).await
    }

    // 单个学生修改负责教师
    pub async fn assign_teacher(
        &self,
        student_id: i64,
        body: AssignTeacherRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assign::assign_teacher(self, student_id, body, request).await
    }

    // 导出学生名册
    pub async fn export_students(
        &self,
        params: ExportParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        export::export_students(self, params, request).await
    }
}

/// 检查教师存在且可带该班级，失败时返回对应响应
pub(crate) async fn check_teacher_for_level(
    storage: &dyn Storage,
    teacher_id: i64,
    level: ClassLevel,
) -> Option<HttpResponse> {
    match storage.get_teacher_by_id(teacher_id).await {
        Ok(Some(teacher)) if teacher.can_take(level) => None,
        Ok(Some(teacher)) => Some(HttpResponse::UnprocessableEntity().json(
            ApiResponse::error_empty(
                ErrorCode::AssignmentIneligible,
                format!(
                    "Teacher {} is not eligible for class level {}",
                    teacher.id, level
                ),
            ),
        )),
        Ok(None) => Some(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TeacherNotFound,
            "Teacher not found",
        ))),
        Err(e) => {
            error!("Failed to look up teacher {}: {}", teacher_id, e);
            Some(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to look up teacher",
                )),
            )
        }
    }
}

pub(crate) fn student_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::StudentNotFound,
        "Student not found",
    ))
}
