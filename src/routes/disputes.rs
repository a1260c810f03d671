use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::disputes::requests::{CreateDisputeRequest, DisputeListQuery};
use crate::services::DisputeService;
use crate::utils::SafeDisputeIdI64;

// 懒加载的全局 DISPUTE_SERVICE 实例
static DISPUTE_SERVICE: Lazy<DisputeService> = Lazy::new(DisputeService::new_lazy);

// HTTP处理程序
pub async fn create_dispute(
    req: HttpRequest,
    dispute_data: web::Json<CreateDisputeRequest>,
) -> ActixResult<HttpResponse> {
    DISPUTE_SERVICE
        .create_dispute(&req, dispute_data.into_inner())
        .await
}

pub async fn list_disputes(
    req: HttpRequest,
    query: web::Query<DisputeListQuery>,
) -> ActixResult<HttpResponse> {
    DISPUTE_SERVICE.list_disputes(&req, query.into_inner()).await
}

pub async fn get_dispute(
    req: HttpRequest,
    dispute_id: SafeDisputeIdI64,
) -> ActixResult<HttpResponse> {
    DISPUTE_SERVICE.get_dispute(&req, dispute_id.0).await
}

// 配置路由
pub fn configure_dispute_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/disputes")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(web::get().to(list_disputes)).route(
                    web::post()
                        .to(create_dispute)
                        .wrap(middlewares::RateLimit::dispute()),
                ),
            )
            .service(web::resource("/{dispute_id}").route(web::get().to(get_dispute))),
    );
}
