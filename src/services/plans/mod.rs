pub mod manage;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::plans::requests::{CreatePlanRequest, PlanListParams, UpdatePlanRequest};
use crate::storage::Storage;

pub struct PlanService {
    storage: Option<Arc<dyn Storage>>,
}

impl PlanService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_plans(
        &self,
        query: PlanListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::list_plans(self, query, request).await
    }

    pub async fn get_plan(&self, plan_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::get_plan(self, plan_id, request).await
    }

    pub async fn create_plan(
        &self,
        plan: CreatePlanRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_plan(self, plan, request).await
    }

    pub async fn update_plan(
        &self,
        plan_id: i64,
        update: UpdatePlanRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_plan(self, plan_id, update, request).await
    }

    pub async fn delete_plan(&self, plan_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::delete_plan(self, plan_id, request).await
    }
}
