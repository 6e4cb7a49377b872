use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::{UserService, account_view, user_not_found};
use crate::models::{ApiResponse, ErrorCode, users::requests::UserListParams};

pub async fn list_users(
    service: &UserService,
    params: UserListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_users_with_pagination(params.into()).await {
        Ok(accounts) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            accounts,
            "Account list retrieved",
        ))),
        Err(e) => {
            error!("Failed to list accounts: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::from_error(&e)))
        }
    }
}

pub async fn get_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(user_not_found()),
        Err(e) => {
            error!("Failed to load account {}: {}", user_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to load account",
                )),
            );
        }
    };

    let account = account_view(storage.as_ref(), user).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(account, "Account retrieved")))
}
