use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AttendanceService;
use crate::models::attendances::requests::AttendanceListQuery;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response};

pub async fn list_attendances(
    service: &AttendanceService,
    request: &HttpRequest,
    mut query: AttendanceListQuery,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    // 助教只能查看自己的考勤
    if !user.is_admin() {
        query.assistant_id = Some(user.id);
    }

    let storage = service.get_storage(request);
    match storage.list_attendances_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Attendances retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::AttendanceNotFound)),
    }
}
