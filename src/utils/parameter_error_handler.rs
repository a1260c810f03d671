//! 请求参数错误处理器
//!
//! 把 JSON 请求体和查询参数的反序列化错误转换为统一的 400 响应。

use actix_web::{
    HttpRequest, HttpResponse,
    error::{InternalError, JsonPayloadError, QueryPayloadError},
};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("JSON 参数错误 {}: {}", req.path(), err);

    let (code, message) = match &err {
        JsonPayloadError::ContentType => (
            ErrorCode::BadRequest,
            "Content-Type must be application/json".to_string(),
        ),
        JsonPayloadError::Deserialize(e) => {
            (ErrorCode::ValidationFailed, format!("Invalid request body: {e}"))
        }
        _ => (ErrorCode::BadRequest, format!("Invalid JSON payload: {err}")),
    };

    let response = HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(code, message));
    InternalError::from_response(err, response).into()
}

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("查询参数错误 {}: {}", req.path(), err);

    let response = HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
        ErrorCode::ValidationFailed,
        format!("Invalid query parameters: {err}"),
    ));
    InternalError::from_response(err, response).into()
}
