use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AttendanceService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response};

pub async fn get_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    attendance_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);
    match storage.get_attendance_by_id(attendance_id).await {
        // 他人的考勤对助教不可见，按不存在处理
        Ok(Some(attendance)) if user.can_access_assistant(attendance.assistant_id) => Ok(
            HttpResponse::Ok().json(ApiResponse::success(
                attendance,
                "Attendance retrieved successfully",
            )),
        ),
        Ok(_) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AttendanceNotFound,
            "Attendance not found",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::AttendanceNotFound)),
    }
}
