//! 安全的路径参数提取器
//!
//! 路径参数解析失败时返回统一的 400 JSON 响应，而不是 actix 默认的纯文本错误。

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError, http::StatusCode,
};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn bad_path_param(name: &str, raw: &str) -> actix_web::Error {
    let response = HttpResponse::build(StatusCode::BAD_REQUEST).json(ApiResponse::<()>::error_empty(
        ErrorCode::BadRequest,
        format!("Invalid path parameter '{name}': '{raw}' is not a valid ID"),
    ));
    InternalError::from_response(format!("invalid path parameter {name}"), response).into()
}

/// 解析正整数 ID 路径参数
fn parse_id(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    let raw = req.match_info().get(name).unwrap_or_default();
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(bad_path_param(name, raw)),
    }
}

macro_rules! define_safe_id_extractors {
    ($($name:ident => $param:literal),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy)]
            pub struct $name(pub i64);

            impl FromRequest for $name {
                type Error = actix_web::Error;
                type Future = Ready<Result<Self, Self::Error>>;

                fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                    ready(parse_id(req, $param).map($name))
                }
            }
        )*
    };
}

define_safe_id_extractors! {
    SafeAttendanceIdI64 => "attendance_id",
    SafeRekapIdI64 => "rekap_id",
    SafeAssistantIdI64 => "assistant_id",
    SafeDisputeIdI64 => "dispute_id",
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_parses_positive_id() {
        let req = TestRequest::default()
            .param("attendance_id", "15")
            .to_http_request();
        let id = SafeAttendanceIdI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 15);
    }

    #[actix_web::test]
    async fn test_rejects_invalid_id() {
        for raw in ["abc", "0", "-4", ""] {
            let req = TestRequest::default().param("rekap_id", raw).to_http_request();
            let err = SafeRekapIdI64::extract(&req).await.unwrap_err();
            assert_eq!(
                err.as_response_error().status_code(),
                StatusCode::BAD_REQUEST
            );
        }
    }
}
