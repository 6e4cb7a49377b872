//! 仪表盘统计，结果缓存 `cache.default_ttl` 秒

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::{debug, error};

use crate::cache::{DASHBOARD_STATS_KEY, ObjectCacheExt};
use crate::config::AppConfig;
use crate::models::dashboard::responses::DashboardStatsResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct DashboardService {
    storage: Option<Arc<dyn Storage>>,
}

impl DashboardService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn get_stats(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let cache = super::cache_from_request(request);

        if let Some(cache) = &cache
            && let Some(stats) = cache
                .get_json::<DashboardStatsResponse>(DASHBOARD_STATS_KEY)
                .await
        {
            debug!("Dashboard stats served from cache");
            return Ok(HttpResponse::Ok().json(ApiResponse::success(stats, "Dashboard stats")));
        }

        let storage = self.get_storage(request)?;
        match storage.get_dashboard_stats().await {
            Ok(stats) => {
                if let Some(cache) = &cache {
                    cache
                        .insert_json(
                            DASHBOARD_STATS_KEY,
                            &stats,
                            AppConfig::get().cache.default_ttl,
                        )
                        .await;
                }
                Ok(HttpResponse::Ok().json(ApiResponse::success(stats, "Dashboard stats")))
            }
            Err(e) => {
                error!("Failed to compute dashboard stats: {}", e);
                Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Failed to compute dashboard stats: {e}"),
                    )),
                )
            }
        }
    }
}
