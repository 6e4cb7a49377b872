use crate::config::{AppConfig, Argon2Config};
use crate::errors::PreschoolError;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

/// 按全局配置哈希密码
pub fn hash_password(password: &str) -> Result<String, PreschoolError> {
    hash_password_with(password, &AppConfig::get().argon2)
}

/// Argon2id 哈希，参数写入 PHC 字符串，校验时无需再读配置
pub fn hash_password_with(password: &str, config: &Argon2Config) -> Result<String, PreschoolError> {
    let params = Params::new(
        config.memory_cost,
        config.time_cost,
        config.parallelism,
        None,
    )
    .map_err(|e| PreschoolError::validation(format!("Argon2 参数错误: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PreschoolError::validation(format!("密码哈希失败: {e}")))?;
    Ok(hash.to_string())
}

/// 验证密码
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light() -> Argon2Config {
        Argon2Config {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password_with("Sunflower42", &light()).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Sunflower42", &hash));
        assert!(!verify_password("sunflower42", &hash));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_invalid_params() {
        let config = Argon2Config {
            memory_cost: 1,
            time_cost: 0,
            parallelism: 1,
        };
        let err = hash_password_with("Sunflower42", &config).unwrap_err();
        assert_eq!(err.code(), "E007");
    }
}
