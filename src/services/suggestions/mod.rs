//! 活动建议：调用 OpenAI 兼容的 chat-completions 接口

pub mod client;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use self::client::CompletionClient;
use crate::config::{AiConfig, AppConfig};
use crate::models::suggestions::requests::ActivitySuggestionRequest;
use crate::models::suggestions::responses::ActivitySuggestionResponse;
use crate::models::{ApiResponse, ErrorCode};

pub struct SuggestionService {
    client: Option<CompletionClient>,
}

impl SuggestionService {
    pub fn new_lazy() -> Self {
        Self::from_config(&AppConfig::get().ai)
    }

    /// 未配置 api_key 或客户端构建失败时不提供服务
    pub(crate) fn from_config(config: &AiConfig) -> Self {
        if config.api_key.trim().is_empty() {
            return Self { client: None };
        }
        match CompletionClient::new(config) {
            Ok(client) => Self {
                client: Some(client),
            },
            Err(e) => {
                error!("Activity suggestions disabled: {}", e);
                Self { client: None }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    pub async fn suggest_activities(
        &self,
        body: ActivitySuggestionRequest,
        _request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let Some(client) = &self.client else {
            return Ok(HttpResponse::ServiceUnavailable().json(ApiResponse::error_empty(
                ErrorCode::SuggestionsUnavailable,
                "Activity suggestions are not configured",
            )));
        };

        let count = body.effective_count();
        let prompt = client::build_prompt(&body, count);

        match client.complete(&prompt).await {
            Ok(reply) => {
                let activities = client::parse_activities(&reply, count);
                if activities.is_empty() {
                    warn!("Suggestion upstream returned no usable lines");
                    return Ok(HttpResponse::BadGateway().json(ApiResponse::error_empty(
                        ErrorCode::SuggestionsUpstreamFailed,
                        "Suggestion service returned an empty reply",
                    )));
                }
                info!(
                    "Generated {} activity suggestions for {} / {}",
                    activities.len(),
                    body.class_level,
                    body.area
                );
                Ok(HttpResponse::Ok().json(ApiResponse::success(
                    ActivitySuggestionResponse {
                        activities,
                        model: client.model().to_string(),
                    },
                    "Activity suggestions generated",
                )))
            }
            Err(e) => {
                warn!("Suggestion upstream failed: {}", e);
                Ok(HttpResponse::BadGateway().json(ApiResponse::error_empty(
                    ErrorCode::SuggestionsUpstreamFailed,
                    e.message().to_string(),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ai_config(api_key: &str) -> AiConfig {
        AiConfig {
            endpoint: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            api_key: api_key.to_string(),
            model: "local-model".to_string(),
            timeout_secs: 3,
        }
    }

    #[test]
    fn test_unconfigured_service_is_unavailable() {
        assert!(!SuggestionService::from_config(&ai_config("  ")).is_available());
        assert!(SuggestionService::from_config(&ai_config("key")).is_available());
    }

    #[actix_web::test]
    async fn test_unconfigured_service_returns_503() {
        use crate::models::common::ClassLevel;
        use crate::models::progress::entities::ProgressArea;

        let service = SuggestionService::from_config(&ai_config(""));
        let body = ActivitySuggestionRequest {
            class_level: ClassLevel::Lkg,
            area: ProgressArea::MotorSkills,
            learning_ability: None,
            count: Some(3),
        };
        let req = actix_web::test::TestRequest::default().to_http_request();
        let resp = service.suggest_activities(body, &req).await.unwrap();
        assert_eq!(resp.status(), actix_web::http::StatusCode::SERVICE_UNAVAILABLE);
    }
}
