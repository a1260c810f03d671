use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 用户角色（由外部认证服务签发在令牌中）
#[derive(Debug, Clone, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "user.ts")]
pub enum UserRole {
    Assistant, // 助教
    Admin,     // 管理员
}

impl UserRole {
    pub const ASSISTANT: &'static str = "assistant";
    pub const ADMIN: &'static str = "admin";

    pub fn admin_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin]
    }
    pub fn assistant_roles() -> &'static [&'static UserRole] {
        &[&Self::Assistant]
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户角色: '{s}'. 支持的角色: assistant, admin"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Assistant => write!(f, "{}", UserRole::ASSISTANT),
            UserRole::Admin => write!(f, "{}", UserRole::ADMIN),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserRole::ASSISTANT => Ok(UserRole::Assistant),
            UserRole::ADMIN => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

// 已认证的调用者身份
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct AuthUser {
    pub id: i64,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// 管理员可访问任意助教的数据，助教只能访问自己的
    pub fn can_access_assistant(&self, assistant_id: i64) -> bool {
        self.is_admin() || self.id == assistant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_str() {
        assert_eq!("assistant".parse::<UserRole>(), Ok(UserRole::Assistant));
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert!("lecturer".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_access_rules() {
        let assistant = AuthUser {
            id: 7,
            role: UserRole::Assistant,
        };
        assert!(assistant.can_access_assistant(7));
        assert!(!assistant.can_access_assistant(8));

        let admin = AuthUser {
            id: 1,
            role: UserRole::Admin,
        };
        assert!(admin.can_access_assistant(8));
    }
}
