//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

use sea_orm::{DbErr, SqlErr};

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_rekap_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum RekapError {
            $($variant(String),)*
        }

        impl RekapError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(RekapError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(RekapError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(RekapError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl RekapError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        RekapError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_rekap_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Storage Error"),
    Validation("E004", "Validation Error"),
    InvalidTier("E005", "Invalid Honor Tier"),
    NotFound("E006", "Resource Not Found"),
    Authentication("E007", "Authentication Error"),
    Authorization("E008", "Authorization Error"),
    Conflict("E009", "Concurrent Modification Conflict"),
    Serialization("E010", "Serialization Error"),
}

impl RekapError {
    /// 是否为并发冲突（协调器据此决定是否重试整个工作单元）
    pub fn is_conflict(&self) -> bool {
        matches!(self, RekapError::Conflict(_))
    }

    /// 是否为输入校验类错误（含无效档位）
    pub fn is_validation(&self) -> bool {
        matches!(self, RekapError::Validation(_) | RekapError::InvalidTier(_))
    }

    /// 将数据库错误按类别归类，并附加上下文
    ///
    /// 锁等待、SQLite busy、序列化失败以及唯一键竞争归为 `Conflict`，其余归为存储错误。
    pub fn from_db(context: &str, err: DbErr) -> Self {
        if is_conflict_db_err(&err) {
            RekapError::conflict(format!("{context}: {err}"))
        } else {
            RekapError::database_operation(format!("{context}: {err}"))
        }
    }

    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

fn is_conflict_db_err(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }

    let msg = err.to_string().to_lowercase();
    [
        "database is locked",
        "database table is locked",
        "sqlite_busy",
        "could not serialize access",
        "deadlock",
        "lock wait timeout",
    ]
    .iter()
    .any(|needle| msg.contains(needle))
}

impl fmt::Display for RekapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for RekapError {}

// 为常见的错误类型实现 From trait
impl From<DbErr> for RekapError {
    fn from(err: DbErr) -> Self {
        RekapError::from_db("数据库操作失败", err)
    }
}

impl From<serde_json::Error> for RekapError {
    fn from(err: serde_json::Error) -> Self {
        RekapError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RekapError>;
