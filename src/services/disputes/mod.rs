pub mod create;
pub mod get;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::disputes::requests::{CreateDisputeRequest, DisputeListQuery};
use crate::storage::Storage;

pub struct DisputeService {
    storage: Option<Arc<dyn Storage>>,
}

impl DisputeService {
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

    // 助教对自己的汇总提交申诉
    pub async fn create_dispute(
        &self,
        request: &HttpRequest,
        dispute_data: CreateDisputeRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_dispute(self, request, dispute_data).await
    }

    pub async fn list_disputes(
        &self,
        request: &HttpRequest,
        query: DisputeListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_disputes(self, request, query).await
    }

    pub async fn get_dispute(
        &self,
        request: &HttpRequest,
        dispute_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_dispute(self, request, dispute_id).await
    }
}
