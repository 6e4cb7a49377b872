//! 查询参数与 JSON 请求体的解析错误处理
//!
//! 把 actix 默认的纯文本错误换成统一的 `ApiResponse`。

use actix_web::{
    HttpRequest, HttpResponse,
    error::{InternalError, JsonPayloadError, QueryPayloadError},
};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Invalid JSON payload for {}: {}", req.path(), err);

    let response = match &err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            HttpResponse::PayloadTooLarge().json(ApiResponse::<()>::error_empty(
                ErrorCode::BadRequest,
                "请求体过大",
            ))
        }
        JsonPayloadError::ContentType => HttpResponse::UnsupportedMediaType().json(
            ApiResponse::<()>::error_empty(
                ErrorCode::BadRequest,
                "Content-Type 必须为 application/json",
            ),
        ),
        JsonPayloadError::Deserialize(e) => HttpResponse::BadRequest().json(
            ApiResponse::<()>::error_empty(ErrorCode::BadRequest, format!("请求体格式错误: {e}")),
        ),
        other => HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
            ErrorCode::BadRequest,
            format!("无法读取请求体: {other}"),
        )),
    };

    InternalError::from_response(err, response).into()
}

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Invalid query string for {}: {}", req.path(), err);

    let message = match &err {
        QueryPayloadError::Deserialize(e) => format!("查询参数错误: {e}"),
        other => format!("查询参数错误: {other}"),
    };
    let response = HttpResponse::BadRequest()
        .json(ApiResponse::<()>::error_empty(ErrorCode::BadRequest, message));

    InternalError::from_response(err, response).into()
}
