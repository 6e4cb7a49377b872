use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::{UserService, account_view, is_unique_violation, link_rejection, user_not_found};
use crate::models::{ApiResponse, ErrorCode, users::requests::UpdateUserRequest};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_display_text, validate_email, validate_password_simple};

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(email) = &update_data.email
        && let Err(msg) = validate_email(email)
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    if let Some(name) = &update_data.display_name
        && let Err(msg) = validate_display_text(name, "display_name")
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    if let Some(password) = update_data.password.take() {
        if let Err(msg) = validate_password_simple(&password) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
        }
        match hash_password(&password) {
            Ok(hash) => update_data.password = Some(hash),
            Err(e) => {
                error!("Password hashing failed: {}", e);
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        "Password hashing failed",
                    )),
                );
            }
        }
    }

    let storage = service.get_storage(request)?;

    match storage.update_user(user_id, update_data).await {
        Ok(Some(user)) => {
            let account = account_view(storage.as_ref(), user).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(account, "Account updated")))
        }
        Ok(None) => Ok(user_not_found()),
        Err(e) => {
            // 关联教师档案的账号不能改为管理员
            if let Some(resp) = link_rejection(&e) {
                return Ok(resp);
            }
            let msg = format!("Failed to update account: {e}");
            if is_unique_violation(&msg) {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::UserAlreadyExists,
                    "Email already in use",
                )));
            }
            error!("{}", msg);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error_empty(ErrorCode::UserUpdateFailed, msg)))
        }
    }
}
