//! 安全的路径参数提取器
//!
//! 路径中的 ID 必须是正整数，否则直接返回 400 与统一的错误响应，
//! 不会进入处理程序。

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError,
};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn parse_positive_id(raw: Option<&str>, name: &str) -> Result<i64, String> {
    let raw = raw.ok_or_else(|| format!("缺少路径参数 {name}"))?;
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(format!("无效的 {name}: '{raw}'")),
    }
}

fn bad_request(message: String) -> actix_web::Error {
    let response = HttpResponse::BadRequest()
        .json(ApiResponse::<()>::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(message, response).into()
}

macro_rules! define_safe_i64_extractor {
    ($(#[$meta:meta])* $name:ident, $param:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                ready(
                    parse_positive_id(req.match_info().get($param), $param)
                        .map($name)
                        .map_err(bad_request),
                )
            }
        }
    };
}

define_safe_i64_extractor!(
    /// 路径中的 `{id}`
    SafeIDI64,
    "id"
);

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id(Some("42"), "id"), Ok(42));
        assert!(parse_positive_id(Some("0"), "id").is_err());
        assert!(parse_positive_id(Some("-1"), "id").is_err());
        assert!(parse_positive_id(Some("abc"), "id").is_err());
        assert!(parse_positive_id(None, "id").is_err());
    }

    #[actix_web::test]
    async fn test_extract_from_path() {
        let req = TestRequest::default().param("id", "7").to_http_request();
        let id = SafeIDI64::extract(&req).await.unwrap();
        assert_eq!(id, SafeIDI64(7));

        let req = TestRequest::default().param("id", "7x").to_http_request();
        let err = SafeIDI64::extract(&req).await.unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            actix_web::http::StatusCode::BAD_REQUEST
        );
    }
}
