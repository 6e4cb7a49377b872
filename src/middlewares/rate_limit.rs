/*!
 * 速率限制中间件
 *
 * 固定窗口计数。已登录请求按账号计数，匿名请求按客户端 IP 计数，
 * 同一前缀共用一组计数。
 *
 * ```rust,ignore
 * web::resource("/login")
 *     .wrap(RateLimit::login())
 *     .route(web::post().to(login))
 * ```
 *
 * 放行的响应带 `X-RateLimit-Limit` / `X-RateLimit-Remaining` / `X-RateLimit-Reset`，
 * 超限返回 429 并带 `Retry-After`。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::{CONTENT_TYPE, HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::net::IpAddr;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};

const MAX_WINDOW_SECS: u64 = 3600;

const LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const RESET_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// 键: 前缀:标识:窗口序号
static WINDOW_COUNTERS: Lazy<Cache<String, u32>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(MAX_WINDOW_SECS))
        .max_capacity(100_000)
        .build()
});

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window_secs: u64,
    key_prefix: String,
}

impl RateLimit {
    /// 每 `window_secs` 秒最多 `max_requests` 次，窗口限制在 1..=3600 秒
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs: window_secs.clamp(1, MAX_WINDOW_SECS),
            key_prefix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    /// 5 次/分钟
    pub fn login() -> Self {
        Self::new(5, 60).with_prefix("login")
    }

    /// 10 次/分钟
    pub fn refresh_token() -> Self {
        Self::new(10, 60).with_prefix("refresh")
    }

    /// 10 次/分钟，每次都会请求外部模型
    pub fn suggestions() -> Self {
        Self::new(10, 60).with_prefix("suggestions")
    }

    /// 20 次/分钟
    pub fn export() -> Self {
        Self::new(20, 60).with_prefix("export")
    }

    fn bucket_key(key_prefix: &str, identifier: &str, window_secs: u64, now_secs: u64) -> String {
        let bucket = now_secs / window_secs;
        if key_prefix.is_empty() {
            format!("{identifier}:{bucket}")
        } else {
            format!("{key_prefix}:{identifier}:{bucket}")
        }
    }
}

/// 一次计数后的窗口状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowState {
    limit: u32,
    count: u32,
    reset_secs: u64,
}

impl WindowState {
    fn exceeded(&self) -> bool {
        self.count > self.limit
    }

    fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.count)
    }

    fn apply_headers(&self, headers: &mut actix_web::http::header::HeaderMap) {
        headers.insert(LIMIT_HEADER, HeaderValue::from(self.limit));
        headers.insert(REMAINING_HEADER, HeaderValue::from(self.remaining()));
        headers.insert(RESET_HEADER, HeaderValue::from(self.reset_secs));
    }
}

/// 优先使用连接上的地址，其次是代理头。
/// 直接暴露在不可信网络时代理头可以伪造。
fn client_ip(req: &ServiceRequest) -> String {
    let peer = req
        .connection_info()
        .realip_remote_addr()
        .map(str::to_string);
    if let Some(ip) = peer.as_deref()
        && ip.parse::<IpAddr>().is_ok()
    {
        return ip.to_string();
    }

    let forwarded = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next());
    let real_ip = req
        .headers()
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok());

    [forwarded, real_ip]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|ip| ip.parse::<IpAddr>().is_ok())
        .map(str::to_string)
        .or(peer)
        .unwrap_or_else(|| "unknown".to_string())
}

fn client_identifier(req: &ServiceRequest) -> String {
    match req.extensions().get::<User>() {
        Some(user) => format!("user:{}", user.id),
        None => format!("ip:{}", client_ip(req)),
    }
}

fn too_many_requests(state: &WindowState) -> HttpResponse {
    let mut response = HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", state.reset_secs.to_string()))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ));
    state.apply_headers(response.headers_mut());
    response
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let limit = self.limit.clone();

        Box::pin(async move {
            let identifier = client_identifier(&req);
            let now_secs = chrono::Utc::now().timestamp().max(0) as u64;
            let key = RateLimit::bucket_key(&limit.key_prefix, &identifier, limit.window_secs, now_secs);

            // 原子自增
            let count = WINDOW_COUNTERS
                .entry(key.clone())
                .and_upsert_with(|current| {
                    let next = current.map_or(1, |entry| entry.into_value().saturating_add(1));
                    std::future::ready(next)
                })
                .await
                .into_value();

            let state = WindowState {
                limit: limit.max_requests,
                count,
                reset_secs: limit.window_secs - now_secs % limit.window_secs,
            };

            if state.exceeded() {
                warn!(
                    "Rate limit exceeded for {} ({}/{})",
                    key, state.count, state.limit
                );
                return Ok(req.into_response(too_many_requests(&state).map_into_right_body()));
            }

            let mut res = srv.call(req).await?;
            state.apply_headers(res.headers_mut());
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_presets() {
        let login = RateLimit::login();
        assert_eq!(login.max_requests, 5);
        assert_eq!(login.window_secs, 60);
        assert_eq!(login.key_prefix, "login");

        let suggestions = RateLimit::suggestions();
        assert_eq!(suggestions.max_requests, 10);
        assert_eq!(suggestions.key_prefix, "suggestions");

        assert_eq!(RateLimit::new(1, 0).window_secs, 1);
    }

    #[test]
    fn test_bucket_key_rolls_over_with_window() {
        let a = RateLimit::bucket_key("login", "ip:10.0.0.1", 60, 120);
        let b = RateLimit::bucket_key("login", "ip:10.0.0.1", 60, 179);
        let c = RateLimit::bucket_key("login", "ip:10.0.0.1", 60, 180);

        assert_eq!(a, "login:ip:10.0.0.1:2");
        assert_eq!(a, b);
        assert_ne!(b, c);
        assert_eq!(RateLimit::bucket_key("", "user:3", 60, 0), "user:3:0");
    }

    #[test]
    fn test_window_state() {
        let last_allowed = WindowState {
            limit: 5,
            count: 5,
            reset_secs: 12,
        };
        assert!(!last_allowed.exceeded());
        assert_eq!(last_allowed.remaining(), 0);

        let over = WindowState {
            count: 6,
            ..last_allowed
        };
        assert!(over.exceeded());

        let mut headers = actix_web::http::header::HeaderMap::new();
        WindowState { count: 2, ..last_allowed }.apply_headers(&mut headers);
        assert_eq!(headers.get("x-ratelimit-remaining").unwrap().to_str().unwrap(), "3");
        assert_eq!(headers.get("x-ratelimit-reset").unwrap().to_str().unwrap(), "12");
    }

    #[actix_web::test]
    async fn test_middleware_rejects_after_limit() {
        use actix_web::{App, test, web};

        let app = test::init_service(
            App::new().service(
                web::resource("/ping")
                    .wrap(RateLimit::new(2, 3600).with_prefix("test-ping"))
                    .route(web::get().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        for expected in ["1", "0"] {
            let res = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
            assert_eq!(res.status(), StatusCode::OK);
            assert_eq!(
                res.headers().get("x-ratelimit-remaining").unwrap().to_str().unwrap(),
                expected
            );
        }

        let res = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(res.headers().contains_key("retry-after"));
    }
}
