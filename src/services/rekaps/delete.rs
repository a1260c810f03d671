use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::RekapService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response};

pub async fn delete_rekap(
    service: &RekapService,
    request: &HttpRequest,
    rekap_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);
    match storage.delete_rekap(rekap_id).await {
        Ok(true) => {
            info!("Rekap {} deleted by admin {}", rekap_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Rekap deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::RekapNotFound,
            "Rekap not found",
        ))),
        // 仍有考勤或申诉引用时返回 409
        Err(e) => Ok(error_response(&e, ErrorCode::RekapNotFound)),
    }
}
