pub mod responses;

use serde::Deserialize;
use ts_rs::TS;

pub use responses::{LoginResponse, RefreshTokenResponse, TokenVerificationResponse};

/// 员工登录，`username` 也可以填邮箱
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginRequest {
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
    /// 延长刷新令牌有效期
    #[serde(default)]
    pub remember_me: bool,
}

impl LoginRequest {
    pub fn identifier(&self) -> &str {
        self.username.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_accepts_email_field() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":" head@school.test ","password":"x"}"#).unwrap();
        assert_eq!(req.identifier(), "head@school.test");
        assert!(!req.remember_me);
    }
}
