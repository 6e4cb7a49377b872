pub mod entries;
pub mod report;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::progress::requests::{
    CreateProgressRequest, ProgressExportParams, ProgressListParams, UpdateProgressRequest,
};
use crate::storage::Storage;

pub struct ProgressService {
    storage: Option<Arc<dyn Storage>>,
}

impl ProgressService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_entries(
        &self,
        query: ProgressListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        entries::list_entries(self, query, request).await
    }

    pub async fn get_entry(&self, entry_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        entries::get_entry(self, entry_id, request).await
    }

    // 教师账号只能以本人名义记录
    pub async fn create_entry(
        &self,
        entry: CreateProgressRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        entries::create_entry(self, entry, request).await
    }

    pub async fn update_entry(
        &self,
        entry_id: i64,
        update: UpdateProgressRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        entries::update_entry(self, entry_id, update, request).await
    }

    pub async fn delete_entry(
        &self,
        entry_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        entries::delete_entry(self, entry_id, request).await
    }

    // 单个学生的成长报告
    pub async fn export_student_report(
        &self,
        student_id: i64,
        params: ProgressExportParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        report::export_student_report(self, student_id, params, request).await
    }
}
