use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AttendanceService;
use crate::models::attendances::requests::AmendAttendanceRequest;
use crate::models::attendances::responses::AttendanceMutationResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response};

pub async fn update_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    attendance_id: i64,
    update_data: AmendAttendanceRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);
    match storage
        .amend_attendance(attendance_id, update_data.status)
        .await
    {
        Ok((attendance, rekap)) => {
            info!(
                "Attendance {} amended to {} by admin {}",
                attendance_id, attendance.status, user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                AttendanceMutationResponse { attendance, rekap },
                "Attendance updated successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::AttendanceNotFound)),
    }
}
