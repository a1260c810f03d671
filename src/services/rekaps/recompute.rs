use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::RekapService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response};

pub async fn recompute_rekap(
    service: &RekapService,
    request: &HttpRequest,
    assistant_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);
    match storage.recompute_rekap(assistant_id).await {
        Ok(rekap) => {
            info!(
                "Rekap of assistant {} recomputed by admin {}",
                assistant_id, user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                rekap,
                "Rekap recomputed successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::RekapNotFound)),
    }
}
