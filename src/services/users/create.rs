use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::{UserService, is_unique_violation, link_rejection};
use crate::models::{
    ApiResponse, ErrorCode,
    users::{entities::UserRole, requests::CreateUserRequest, responses::AccountResponse},
};
use crate::utils::password::hash_password;
use crate::utils::validate::{
    validate_display_text, validate_email, validate_password_simple, validate_username,
};

pub async fn create_user(
    service: &UserService,
    mut user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_username(&user_data.username) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    if let Err(msg) = validate_email(&user_data.email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    if let Err(msg) = validate_password_simple(&user_data.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }

    if let Some(name) = &user_data.display_name
        && let Err(msg) = validate_display_text(name, "display_name")
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    if user_data.teacher_id.is_some() && user_data.role != UserRole::Teacher {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Only teacher accounts can be linked to a teacher profile",
        )));
    }

    let storage = service.get_storage(request)?;

    // 先查重，唯一约束报错作为兜底
    let taken = match (
        storage.get_user_by_username(&user_data.username).await,
        storage.get_user_by_email(&user_data.email).await,
    ) {
        (Ok(by_name), Ok(by_email)) => by_name.is_some() || by_email.is_some(),
        (Err(e), _) | (_, Err(e)) => {
            error!("Account lookup failed: {}", e);
            false
        }
    };
    if taken {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserAlreadyExists,
            "Username or email already exists",
        )));
    }

    user_data.password = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Password hashing failed: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Password hashing failed",
                )),
            );
        }
    };

    let teacher_id = user_data.teacher_id;
    match storage.create_user(user_data).await {
        Ok(user) => {
            info!(
                "Created account {} ({}), teacher profile {:?}",
                user.username, user.role, teacher_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                AccountResponse { user, teacher_id },
                "Account created",
            )))
        }
        Err(e) => {
            if let Some(resp) = link_rejection(&e) {
                return Ok(resp);
            }
            let msg = format!("Account creation failed: {e}");
            if is_unique_violation(&msg) {
                Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::UserAlreadyExists,
                    "Username or email already exists",
                )))
            } else {
                error!("{}", msg);
                Ok(HttpResponse::InternalServerError()
                    .json(ApiResponse::error_empty(ErrorCode::UserCreationFailed, msg)))
            }
        }
    }
}
