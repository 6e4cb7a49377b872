//! 师生分配接口
//!
//! 每个请求持有自己的 [`AssignmentSession`](crate::assignment::AssignmentSession)，
//! 会话不跨请求共享。

pub mod reconcile;
pub mod snapshot;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::assignments::requests::ReconcileRequest;
use crate::storage::Storage;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 分配页面初始数据
    pub async fn get_snapshot(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        snapshot::get_snapshot(self, request).await
    }

    // 批量校验并保存分配
    pub async fn reconcile(
        &self,
        body: ReconcileRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        reconcile::reconcile(self, body, request).await
    }
}
