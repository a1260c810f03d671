use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RekapService;
use crate::models::rekaps::requests::RekapListQuery;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response};

pub async fn list_rekaps(
    service: &RekapService,
    request: &HttpRequest,
    mut query: RekapListQuery,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if !user.is_admin() {
        query.assistant_id = Some(user.id);
    }

    let storage = service.get_storage(request);
    match storage.list_rekaps_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Rekaps retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::RekapNotFound)),
    }
}
