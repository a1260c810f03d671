use crate::config::AppConfig;
use crate::models::users::entities::{AuthUser, UserRole};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

const ACCESS_TOKEN_TYPE: &str = "access";

// JWT Claims 结构体（由外部认证服务签发）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // Subject (user ID)
    pub role: String,       // 用户角色
    pub token_type: String, // token类型: 只接受 "access"
    pub exp: usize,         // Expiration time (时间戳)
    pub iat: usize,         // Issued at (签发时间)
}

/// 访问令牌校验器
///
/// 注册为 app_data，由 `RequireJWT` 中间件取用；测试可用任意密钥构造。
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    pub fn from_config() -> Self {
        Self::new(&AppConfig::get().jwt.secret)
    }

    // 验证 JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
    }

    // 验证 Access Token
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let claims = self.verify_token(token)?;
        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }
        Ok(claims)
    }

    /// 校验令牌并解析出调用者身份
    pub fn authenticate(&self, token: &str) -> Result<AuthUser, String> {
        let claims = self
            .verify_access_token(token)
            .map_err(|e| format!("Invalid JWT token: {e}"))?;

        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| "Invalid user ID in JWT".to_string())?;
        let role = claims.role.parse::<UserRole>()?;

        Ok(AuthUser { id, role })
    }
}
