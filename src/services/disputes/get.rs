use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::DisputeService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response};

pub async fn get_dispute(
    service: &DisputeService,
    request: &HttpRequest,
    dispute_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);
    let dispute = match storage.get_dispute_by_id(dispute_id).await {
        Ok(Some(dispute)) => dispute,
        Ok(None) => return Ok(not_found()),
        Err(e) => return Ok(error_response(&e, ErrorCode::DisputeNotFound)),
    };

    if !user.is_admin() {
        match storage.get_rekap_by_id(dispute.rekap_id).await {
            Ok(Some(rekap)) if rekap.assistant_id == user.id => {}
            Ok(_) => return Ok(not_found()),
            Err(e) => return Ok(error_response(&e, ErrorCode::DisputeNotFound)),
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        dispute,
        "Dispute retrieved successfully",
    )))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::DisputeNotFound,
        "Dispute not found",
    ))
}
