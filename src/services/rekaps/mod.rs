pub mod delete;
pub mod get;
pub mod list;
pub mod recompute;
pub mod tier;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::rekaps::requests::{RekapListQuery, SetHonorTierRequest};
use crate::storage::Storage;

pub struct RekapService {
    storage: Option<Arc<dyn Storage>>,
}

impl RekapService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 设置助教酬金档位
    pub async fn set_honor_tier(
        &self,
        request: &HttpRequest,
        tier_data: SetHonorTierRequest,
    ) -> ActixResult<HttpResponse> {
        tier::set_honor_tier(self, request, tier_data).await
    }

    pub async fn list_rekaps(
        &self,
        request: &HttpRequest,
        query: RekapListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_rekaps(self, request, query).await
    }

    pub async fn get_rekap(&self, request: &HttpRequest, rekap_id: i64) -> ActixResult<HttpResponse> {
        get::get_rekap(self, request, rekap_id).await
    }

    // 按助教获取汇总
    pub async fn get_rekap_by_assistant(
        &self,
        request: &HttpRequest,
        assistant_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_rekap_by_assistant(self, request, assistant_id).await
    }

    // 从考勤记录重建汇总
    pub async fn recompute_rekap(
        &self,
        request: &HttpRequest,
        assistant_id: i64,
    ) -> ActixResult<HttpResponse> {
        recompute::recompute_rekap(self, request, assistant_id).await
    }

    pub async fn delete_rekap(
        &self,
        request: &HttpRequest,
        rekap_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_rekap(self, request, rekap_id).await
    }
}
