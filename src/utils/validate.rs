use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    // 用户名长度校验：5 <= x <= 16
    if username.len() < 5 || username.len() > 16 {
        return Err("Username length must be between 5 and 16 characters");
    }
    // 用户名格式校验：只能包含字母、数字、下划线或连字符
    if !USERNAME_RE.is_match(username) {
        return Err("Username must contain only letters, numbers, underscores or hyphens");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    // 邮箱格式校验：必须包含 @ 和 .
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 密码策略验证结果
#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

impl PasswordValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// 验证密码是否符合安全策略
///
/// 策略要求：
/// - 最小长度：8 字符
/// - 必须包含：大写字母 + 小写字母 + 数字
/// - 可选：特殊字符（增强安全性）
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    // 1. 长度检查：至少 8 个字符
    if password.len() < 8 {
        errors.push("Password must be at least 8 characters long");
    }

    // 2. 大写字母检查
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }

    // 3. 小写字母检查
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }

    // 4. 数字检查
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }

    // 5. 常见弱密码检查
    let weak_passwords = [
        "password",
        "12345678",
        "123456789",
        "qwerty123",
        "admin123",
        "password1",
        "Password1",
        "Qwerty123",
        "Abcd1234",
    ];
    if weak_passwords
        .iter()
        .any(|&weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// 简化的密码验证（返回 Result）
pub fn validate_password_simple(password: &str) -> Result<(), String> {
    let result = validate_password(password);
    if result.is_valid {
        Ok(())
    } else {
        Err(result.error_message())
    }
}

/// 学生年龄范围
pub const STUDENT_AGE_RANGE: std::ops::RangeInclusive<i32> = 2..=7;

const MAX_NAME_CHARS: usize = 100;
const MAX_ACTIVITIES: usize = 30;
const MAX_ACTIVITY_CHARS: usize = 200;
const MAX_REMARKS_CHARS: usize = 500;

/// 姓名、标题等：去掉首尾空白后不能为空，且不超过 100 个字符
pub fn validate_display_text(value: &str, field: &str) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(format!("{field} must be at most {MAX_NAME_CHARS} characters"));
    }
    Ok(())
}

pub fn validate_student_age(age: i32) -> Result<(), String> {
    if !STUDENT_AGE_RANGE.contains(&age) {
        return Err(format!(
            "Student age must be between {} and {}",
            STUDENT_AGE_RANGE.start(),
            STUDENT_AGE_RANGE.end()
        ));
    }
    Ok(())
}

pub fn validate_rating(rating: i32) -> Result<(), String> {
    use crate::models::progress::entities::{MAX_RATING, MIN_RATING};

    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        ));
    }
    Ok(())
}

pub fn validate_activities(activities: &[String]) -> Result<(), String> {
    if activities.len() > MAX_ACTIVITIES {
        return Err(format!("At most {MAX_ACTIVITIES} activities per plan"));
    }
    if activities.iter().any(|a| a.trim().is_empty()) {
        return Err("Activities must not be empty".to_string());
    }
    if activities
        .iter()
        .any(|a| a.chars().count() > MAX_ACTIVITY_CHARS)
    {
        return Err(format!(
            "Each activity must be at most {MAX_ACTIVITY_CHARS} characters"
        ));
    }
    Ok(())
}

pub fn validate_remarks(remarks: &str) -> Result<(), String> {
    if remarks.chars().count() > MAX_REMARKS_CHARS {
        return Err(format!("Remarks must be at most {MAX_REMARKS_CHARS} characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(validate_password("SecureP@ss1").is_valid);
        assert!(validate_password("MyP@ssw0rd").is_valid);
        assert!(validate_password("SecurePass123").is_valid);
    }

    #[test]
    fn test_short_password() {
        let result = validate_password("Ab1");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must be at least 8 characters long")
        );
    }

    #[test]
    fn test_no_uppercase() {
        let result = validate_password("abcd1234");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one uppercase letter")
        );
    }

    #[test]
    fn test_no_lowercase() {
        let result = validate_password("ABCD1234");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one lowercase letter")
        );
    }

    #[test]
    fn test_no_digit() {
        let result = validate_password("AbcdEfgh");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one digit")
        );
    }

    #[test]
    fn test_common_password() {
        let result = validate_password("Password1");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password is too common, please choose a stronger password")
        );
    }

    #[test]
    fn test_display_text() {
        assert!(validate_display_text("Asha Rao", "Name").is_ok());
        assert!(validate_display_text("   ", "Name").is_err());
        assert!(validate_display_text(&"x".repeat(101), "Name").is_err());
        // 按字符而不是字节计数
        assert!(validate_display_text(&"小".repeat(100), "Name").is_ok());
    }

    #[test]
    fn test_student_age_bounds() {
        assert!(validate_student_age(2).is_ok());
        assert!(validate_student_age(7).is_ok());
        assert!(validate_student_age(1).is_err());
        assert!(validate_student_age(8).is_err());
    }

    #[test]
    fn test_rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_activities() {
        assert!(validate_activities(&[]).is_ok());
        assert!(validate_activities(&["Sand tray letters".to_string()]).is_ok());
        assert!(validate_activities(&[" ".to_string()]).is_err());
        assert!(validate_activities(&vec!["Clay".to_string(); 31]).is_err());
    }

    #[test]
    fn test_username_and_email() {
        assert!(validate_username("teacher_01").is_ok());
        assert!(validate_username("abc").is_err());
        assert!(validate_username("bad name!").is_err());
        assert!(validate_email("office@sunrise.school").is_ok());
        assert!(validate_email("no-at-sign").is_err());
    }

    #[test]
    fn test_validate_remarks() {
        assert!(validate_remarks("").is_ok());
        assert!(validate_remarks(&"a".repeat(500)).is_ok());
        assert!(validate_remarks(&"a".repeat(501)).is_err());
    }
}
