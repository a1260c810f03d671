use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AttendanceService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response};

pub async fn delete_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    attendance_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);
    match storage.remove_attendance(attendance_id).await {
        Ok(rekap) => {
            info!("Attendance {} deleted by admin {}", attendance_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                rekap,
                "Attendance deleted successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::AttendanceNotFound)),
    }
}
