/*!
 * JWT 认证中间件
 *
 * 校验 `Authorization: Bearer <token>`，通过后把当前账号放入请求扩展，
 * 处理程序通过 [`RequireJWT::extract_user_claims`] 等方法读取。
 *
 * ```rust,ignore
 * web::scope("/api/v1/students")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_students))
 * ```
 *
 * 账号信息按 token 缓存 `cache.default_ttl` 秒，停用的账号在缓存过期后失效。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, StatusCode, header::AUTHORIZATION},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::fmt;
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info, warn};

use super::create_error_response;
use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::users::entities::{User, UserStatus};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct RequireJWT;

/// 账号缓存键
fn user_cache_key(token: &str) -> String {
    format!("user:{token}")
}

/// 认证失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthRejection {
    MissingToken,
    InvalidToken,
    UnknownUser,
    Inactive,
    Unavailable,
}

impl fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingToken => "Missing or invalid Authorization header",
            Self::InvalidToken => "Invalid JWT token",
            Self::UnknownUser => "User not found",
            Self::Inactive => "User is not active",
            Self::Unavailable => "Authentication backend unavailable",
        })
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn cached_user(cache: &dyn ObjectCache, key: &str) -> Option<User> {
    match cache.get_raw(key).await {
        CacheResult::Found(json) => match serde_json::from_str::<User>(&json) {
            Ok(user) => Some(user),
            Err(_) => {
                cache.remove(key).await;
                debug!("Dropped undecodable cached user for current token");
                None
            }
        },
        _ => None,
    }
}

async fn authenticate(req: &ServiceRequest) -> Result<User, AuthRejection> {
    let token = bearer_token(req).ok_or(AuthRejection::MissingToken)?;

    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        debug!("JWT token validation failed: {}", err);
        AuthRejection::InvalidToken
    })?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone());
    let cache_key = user_cache_key(token);

    if let Some(cache) = &cache
        && let Some(user) = cached_user(cache.as_ref(), &cache_key).await
    {
        return Ok(user);
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .ok_or(AuthRejection::Unavailable)?
        .get_ref()
        .clone();

    let user_id = claims.user_id().ok_or(AuthRejection::InvalidToken)?;
    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|e| {
            warn!("Failed to load user {} for authentication: {}", user_id, e);
            AuthRejection::Unavailable
        })?
        .ok_or(AuthRejection::UnknownUser)?;

    if user.status != UserStatus::Active {
        return Err(AuthRejection::Inactive);
    }

    if let Some(cache) = cache
        && let Ok(json) = serde_json::to_string(&user)
    {
        cache
            .insert_raw(cache_key, json, AppConfig::get().cache.default_ttl)
            .await;
    }

    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 预检请求
            if req.method() == Method::OPTIONS {
                return Ok(req.into_response(
                    HttpResponse::NoContent().finish().map_into_right_body(),
                ));
            }

            match authenticate(&req).await {
                Ok(user) => {
                    debug!("Authenticated user {} for {}", user.id, req.path());
                    req.extensions_mut().insert(user);
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err(rejection) => {
                    info!("Rejected request to {}: {}", req.path(), rejection);
                    let status = match rejection {
                        AuthRejection::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                        _ => StatusCode::UNAUTHORIZED,
                    };
                    Ok(req.into_response(
                        create_error_response(
                            status,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {rejection}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 当前账号，只在 `RequireJWT` 之后可用
    pub fn extract_user_claims(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    pub fn extract_user_id(req: &HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc.def"))
            .to_srv_request();
        assert_eq!(bearer_token(&req), Some("abc.def"));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic abc"))
            .to_srv_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer "))
            .to_srv_request();
        assert_eq!(bearer_token(&req), None);
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(user_cache_key("t"), "user:t");
        assert_eq!(
            AuthRejection::Inactive.to_string(),
            "User is not active"
        );
    }
}
