use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::RekapService;
use crate::models::rekaps::requests::SetHonorTierRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response};

pub async fn set_honor_tier(
    service: &RekapService,
    request: &HttpRequest,
    tier_data: SetHonorTierRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);
    match storage
        .set_honor_tier(tier_data.assistant_id, &tier_data.tier)
        .await
    {
        Ok(rekap) => {
            info!(
                "Honor tier of assistant {} set to {} by admin {}",
                rekap.assistant_id, tier_data.tier, user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                rekap,
                "Honor tier updated successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::RekapNotFound)),
    }
}
