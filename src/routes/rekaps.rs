use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::rekaps::requests::{RekapListQuery, SetHonorTierRequest};
use crate::models::users::entities::UserRole;
use crate::services::RekapService;
use crate::utils::{SafeAssistantIdI64, SafeRekapIdI64};

// 懒加载的全局 REKAP_SERVICE 实例
static REKAP_SERVICE: Lazy<RekapService> = Lazy::new(RekapService::new_lazy);

// HTTP处理程序
pub async fn set_honor_tier(
    req: HttpRequest,
    tier_data: web::Json<SetHonorTierRequest>,
) -> ActixResult<HttpResponse> {
    REKAP_SERVICE
        .set_honor_tier(&req, tier_data.into_inner())
        .await
}

pub async fn list_rekaps(
    req: HttpRequest,
    query: web::Query<RekapListQuery>,
) -> ActixResult<HttpResponse> {
    REKAP_SERVICE.list_rekaps(&req, query.into_inner()).await
}

pub async fn get_rekap(req: HttpRequest, rekap_id: SafeRekapIdI64) -> ActixResult<HttpResponse> {
    REKAP_SERVICE.get_rekap(&req, rekap_id.0).await
}

pub async fn get_rekap_by_assistant(
    req: HttpRequest,
    assistant_id: SafeAssistantIdI64,
) -> ActixResult<HttpResponse> {
    REKAP_SERVICE
        .get_rekap_by_assistant(&req, assistant_id.0)
        .await
}

pub async fn recompute_rekap(
    req: HttpRequest,
    assistant_id: SafeAssistantIdI64,
) -> ActixResult<HttpResponse> {
    REKAP_SERVICE.recompute_rekap(&req, assistant_id.0).await
}

pub async fn delete_rekap(req: HttpRequest, rekap_id: SafeRekapIdI64) -> ActixResult<HttpResponse> {
    REKAP_SERVICE.delete_rekap(&req, rekap_id.0).await
}

// 配置路由
pub fn configure_rekap_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/rekaps")
            .wrap(middlewares::RequireJWT)
            // 助教查看自己的汇总，管理员可查看全部
            .service(web::resource("").route(web::get().to(list_rekaps)))
            // 固定路径需在 /{rekap_id} 之前注册
            .service(
                web::resource("/tier").route(
                    web::post()
                        .to(set_honor_tier)
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                ),
            )
            .service(
                web::resource("/assistant/{assistant_id}")
                    .route(web::get().to(get_rekap_by_assistant)),
            )
            .service(
                web::resource("/{assistant_id}/recompute").route(
                    web::post()
                        .to(recompute_rekap)
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                ),
            )
            .service(
                web::resource("/{rekap_id}")
                    .route(web::get().to(get_rekap))
                    .route(
                        web::delete()
                            .to(delete_rekap)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    use crate::routes::test_support::{bearer, storage_with_schedule};

    #[actix_web::test]
    async fn test_tiered_rekap_over_http() {
        let (storage, schedule_id) = storage_with_schedule().await;
        let app = test_app!(storage);

        let events = [
            ("primary", "present"),
            ("primary", "present"),
            ("substitute", "present"),
            ("primary", "absent"),
        ];
        for (kind, status) in events {
            let req = test::TestRequest::post()
                .uri("/api/v1/attendances")
                .insert_header(bearer(201, "assistant"))
                .set_json(json!({ "schedule_id": schedule_id, "kind": kind, "status": status }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::post()
            .uri("/api/v1/rekaps/tier")
            .insert_header(bearer(1, "admin"))
            .set_json(json!({ "assistant_id": 201, "tier": "B" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["honor_tier"], "B");
        assert_eq!(body["data"]["rate_per_session"], 14_500);
        assert_eq!(body["data"]["count_present"], 2);
        assert_eq!(body["data"]["count_substitute"], 1);
        assert_eq!(body["data"]["count_absent"], 1);
        assert_eq!(body["data"]["total_honor"], 43_500);
        let rekap_id = body["data"]["id"].as_i64().unwrap();

        // 档位设定后新的考勤按新费率累计
        let req = test::TestRequest::post()
            .uri("/api/v1/attendances")
            .insert_header(bearer(201, "assistant"))
            .set_json(json!({ "schedule_id": schedule_id, "kind": "primary", "status": "present" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["rekap"]["total_honor"], 58_000);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/rekaps/{rekap_id}"))
            .insert_header(bearer(201, "assistant"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["total_honor"], 58_000);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/rekaps/{rekap_id}"))
            .insert_header(bearer(202, "assistant"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/api/v1/rekaps/assistant/201")
            .insert_header(bearer(201, "assistant"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["id"], rekap_id);

        let req = test::TestRequest::get()
            .uri("/api/v1/rekaps/assistant/201")
            .insert_header(bearer(202, "assistant"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/v1/rekaps/assistant/202")
            .insert_header(bearer(1, "admin"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_own_rekap_is_created_on_first_view() {
        let (storage, _) = storage_with_schedule().await;
        let app = test_app!(storage);

        // 管理员查看不存在的汇总不会创建
        let req = test::TestRequest::get()
            .uri("/api/v1/rekaps/assistant/208")
            .insert_header(bearer(1, "admin"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/api/v1/rekaps/assistant/208")
            .insert_header(bearer(208, "assistant"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["assistant_id"], 208);
        assert_eq!(body["data"]["count_present"], 0);
        assert!(body["data"]["honor_tier"].is_null());
        assert_eq!(body["data"]["total_honor"], 0);
        let rekap_id = body["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::get()
            .uri("/api/v1/rekaps/assistant/208")
            .insert_header(bearer(1, "admin"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["id"], rekap_id);
    }

    #[actix_web::test]
    async fn test_invalid_tier_is_rejected() {
        let (storage, _) = storage_with_schedule().await;
        let app = test_app!(storage);

        let req = test::TestRequest::post()
            .uri("/api/v1/rekaps/tier")
            .insert_header(bearer(1, "admin"))
            .set_json(json!({ "assistant_id": 203, "tier": "Z" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].as_str().unwrap().contains("Invalid Honor Tier"));

        let req = test::TestRequest::post()
            .uri("/api/v1/rekaps/tier")
            .insert_header(bearer(203, "assistant"))
            .set_json(json!({ "assistant_id": 203, "tier": "A" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_recompute_and_delete() {
        let (storage, schedule_id) = storage_with_schedule().await;
        let app = test_app!(storage);

        let req = test::TestRequest::post()
            .uri("/api/v1/attendances")
            .insert_header(bearer(204, "assistant"))
            .set_json(json!({ "schedule_id": schedule_id, "kind": "primary", "status": "excused" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let rekap_id = body["data"]["rekap"]["id"].as_i64().unwrap();

        let req = test::TestRequest::post()
            .uri("/api/v1/rekaps/204/recompute")
            .insert_header(bearer(1, "admin"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["count_excused"], 1);

        let req = test::TestRequest::post()
            .uri("/api/v1/rekaps/9999/recompute")
            .insert_header(bearer(1, "admin"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        // 仍被考勤引用的汇总不可删除
        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/rekaps/{rekap_id}"))
            .insert_header(bearer(1, "admin"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        // 仅设置过档位的汇总可以删除
        let req = test::TestRequest::post()
            .uri("/api/v1/rekaps/tier")
            .insert_header(bearer(1, "admin"))
            .set_json(json!({ "assistant_id": 205, "tier": "E" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let idle_rekap_id = body["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/rekaps/{idle_rekap_id}"))
            .insert_header(bearer(1, "admin"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/rekaps/{idle_rekap_id}"))
            .insert_header(bearer(1, "admin"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_list_is_scoped_for_assistants() {
        let (storage, _) = storage_with_schedule().await;
        let app = test_app!(storage);

        for assistant_id in [206, 207] {
            let req = test::TestRequest::post()
                .uri("/api/v1/rekaps/tier")
                .insert_header(bearer(1, "admin"))
                .set_json(json!({ "assistant_id": assistant_id, "tier": "C" }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }

        let req = test::TestRequest::get()
            .uri("/api/v1/rekaps")
            .insert_header(bearer(206, "assistant"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["pagination"]["total"], 1);
        assert_eq!(body["data"]["items"][0]["assistant_id"], 206);

        let req = test::TestRequest::get()
            .uri("/api/v1/rekaps")
            .insert_header(bearer(1, "admin"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["pagination"]["total"], 2);
    }
}
