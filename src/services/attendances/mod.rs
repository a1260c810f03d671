pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::attendances::requests::{
    AmendAttendanceRequest, AttendanceListQuery, CreateAttendanceRequest,
};
use crate::storage::Storage;

pub struct AttendanceService {
    storage: Option<Arc<dyn Storage>>,
}

impl AttendanceService {
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

    // 助教提交考勤，同一事务内更新汇总
    pub async fn create_attendance(
        &self,
        request: &HttpRequest,
        attendance_data: CreateAttendanceRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_attendance(self, request, attendance_data).await
    }

    // 获取考勤列表
    pub async fn list_attendances(
        &self,
        request: &HttpRequest,
        query: AttendanceListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_attendances(self, request, query).await
    }

    pub async fn get_attendance(
        &self,
        request: &HttpRequest,
        attendance_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_attendance(self, request, attendance_id).await
    }

    // 修正考勤状态
    pub async fn update_attendance(
        &self,
        request: &HttpRequest,
        attendance_id: i64,
        update_data: AmendAttendanceRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_attendance(self, request, attendance_id, update_data).await
    }

    // 删除考勤，返回更新后的汇总
    pub async fn delete_attendance(
        &self,
        request: &HttpRequest,
        attendance_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_attendance(self, request, attendance_id).await
    }
}
