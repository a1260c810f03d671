use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RekapService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response, forbidden};

pub async fn get_rekap(
    service: &RekapService,
    request: &HttpRequest,
    rekap_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);
    match storage.get_rekap_by_id(rekap_id).await {
        Ok(Some(rekap)) if user.can_access_assistant(rekap.assistant_id) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(rekap, "Rekap retrieved successfully"))),
        Ok(_) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::RekapNotFound,
            "Rekap not found",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::RekapNotFound)),
    }
}

pub async fn get_rekap_by_assistant(
    service: &RekapService,
    request: &HttpRequest,
    assistant_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if !user.can_access_assistant(assistant_id) {
        return Ok(forbidden(
            "You do not have permission to view another assistant's rekap",
        ));
    }

    let storage = service.get_storage(request);

    // 助教查看自己的汇总时惰性创建零值汇总
    if user.id == assistant_id {
        return match storage.get_or_create_rekap(assistant_id).await {
            Ok(rekap) => Ok(HttpResponse::Ok()
                .json(ApiResponse::success(rekap, "Rekap retrieved successfully"))),
            Err(e) => Ok(error_response(&e, ErrorCode::RekapNotFound)),
        };
    }

    match storage.get_rekap_by_assistant(assistant_id).await {
        Ok(Some(rekap)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(rekap, "Rekap retrieved successfully"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::RekapNotFound,
            "Rekap not found",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::RekapNotFound)),
    }
}
