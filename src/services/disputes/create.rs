use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::DisputeService;
use crate::models::disputes::requests::CreateDisputeRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response, forbidden};

pub async fn create_dispute(
    service: &DisputeService,
    request: &HttpRequest,
    dispute_data: CreateDisputeRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);

    // 助教只能对自己的汇总提出申诉
    match storage.get_rekap_by_id(dispute_data.rekap_id).await {
        Ok(Some(rekap)) if user.can_access_assistant(rekap.assistant_id) => {}
        Ok(Some(_)) => {
            return Ok(forbidden(
                "You do not have permission to dispute another assistant's rekap",
            ));
        }
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::RekapNotFound,
                "Rekap not found",
            )));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::RekapNotFound)),
    }

    match storage.create_dispute(dispute_data).await {
        Ok(dispute) => {
            info!(
                "Dispute {} filed on rekap {} by user {}",
                dispute.id, dispute.rekap_id, user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                dispute,
                "Dispute submitted successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::RekapNotFound)),
    }
}
