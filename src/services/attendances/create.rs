use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AttendanceService;
use crate::models::attendances::requests::CreateAttendanceRequest;
use crate::models::attendances::responses::AttendanceMutationResponse;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response, forbidden};

pub async fn create_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    attendance_data: CreateAttendanceRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    // 考勤只能由助教本人提交
    if user.role != UserRole::Assistant {
        return Ok(forbidden("Only assistants can submit attendance"));
    }

    let storage = service.get_storage(request);
    match storage.record_attendance(user.id, attendance_data).await {
        Ok((attendance, rekap)) => {
            info!(
                "Attendance {} submitted by assistant {}",
                attendance.id, user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                AttendanceMutationResponse { attendance, rekap },
                "Attendance submitted successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::ScheduleNotFound)),
    }
}
