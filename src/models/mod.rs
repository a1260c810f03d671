pub mod attendances;
pub mod common;
pub mod disputes;
pub mod rekaps;
pub mod schedules;
pub mod users;

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo};

// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

// 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,
    ValidationFailed = 1400,

    // 考勤
    AttendanceNotFound = 3000,
    ScheduleNotFound = 3001,

    // 汇总
    RekapNotFound = 4000,
    InvalidHonorTier = 4001,

    // 申诉
    DisputeNotFound = 5000,
}
