pub mod attendances;
pub mod disputes;
pub mod rekaps;

pub use attendances::AttendanceService;
pub use disputes::DisputeService;
pub use rekaps::RekapService;

use actix_web::{HttpRequest, HttpResponse};
use tracing::error;

use crate::errors::RekapError;
use crate::middlewares::RequireJWT;
use crate::models::users::entities::AuthUser;
use crate::models::{ApiResponse, ErrorCode};

/// 取出调用者身份，缺失时返回 401 响应
pub(crate) fn current_user(request: &HttpRequest) -> Result<AuthUser, HttpResponse> {
    RequireJWT::extract_auth_user(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user id",
        ))
    })
}

/// 领域错误到 HTTP 响应的映射
///
/// `not_found` 为该资源对应的业务错误码。
pub(crate) fn error_response(err: &RekapError, not_found: ErrorCode) -> HttpResponse {
    match err {
        RekapError::Validation(_) => {
            HttpResponse::BadRequest().json(ApiResponse::from_error(ErrorCode::ValidationFailed, err))
        }
        RekapError::InvalidTier(_) => {
            HttpResponse::BadRequest().json(ApiResponse::from_error(ErrorCode::InvalidHonorTier, err))
        }
        RekapError::NotFound(_) => HttpResponse::NotFound().json(ApiResponse::from_error(not_found, err)),
        RekapError::Authentication(_) => {
            HttpResponse::Unauthorized().json(ApiResponse::from_error(ErrorCode::Unauthorized, err))
        }
        RekapError::Authorization(_) => {
            HttpResponse::Forbidden().json(ApiResponse::from_error(ErrorCode::Forbidden, err))
        }
        RekapError::Conflict(_) => {
            HttpResponse::Conflict().json(ApiResponse::from_error(ErrorCode::Conflict, err))
        }
        _ => {
            error!("{}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::from_error(ErrorCode::InternalServerError, err))
        }
    }
}

pub(crate) fn forbidden(message: &str) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(ErrorCode::Forbidden, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (RekapError::validation("x"), StatusCode::BAD_REQUEST),
            (RekapError::invalid_tier("Z"), StatusCode::BAD_REQUEST),
            (RekapError::not_found("x"), StatusCode::NOT_FOUND),
            (RekapError::authorization("x"), StatusCode::FORBIDDEN),
            (RekapError::conflict("x"), StatusCode::CONFLICT),
            (RekapError::database_operation("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(error_response(&err, ErrorCode::NotFound).status(), status);
        }
    }
}
