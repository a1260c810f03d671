use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::DisputeService;
use crate::models::disputes::requests::DisputeListQuery;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response};

pub async fn list_disputes(
    service: &DisputeService,
    request: &HttpRequest,
    mut query: DisputeListQuery,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    // 助教只能看到自己汇总下的申诉
    query.assistant_id = if user.is_admin() { None } else { Some(user.id) };

    let storage = service.get_storage(request);
    match storage.list_disputes_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Disputes retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::DisputeNotFound)),
    }
}
