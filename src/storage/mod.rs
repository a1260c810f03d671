use std::sync::Arc;

use crate::models::{
    attendances::{
        entities::{Attendance, AttendanceStatus},
        requests::{AttendanceListQuery, CreateAttendanceRequest},
        responses::AttendanceListResponse,
    },
    disputes::{
        entities::Dispute,
        requests::{CreateDisputeRequest, DisputeListQuery},
        responses::DisputeListResponse,
    },
    rekaps::{entities::Rekap, requests::RekapListQuery, responses::RekapListResponse},
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 考勤管理方法（写操作均在同一工作单元内同步汇总）
    // 记录考勤，返回考勤记录与更新后的汇总
    async fn record_attendance(
        &self,
        assistant_id: i64,
        req: CreateAttendanceRequest,
    ) -> Result<(Attendance, Rekap)>;
    // 修正考勤状态
    async fn amend_attendance(
        &self,
        attendance_id: i64,
        status: AttendanceStatus,
    ) -> Result<(Attendance, Rekap)>;
    // 删除考勤记录，返回重算后的汇总
    async fn remove_attendance(&self, attendance_id: i64) -> Result<Rekap>;
    // 通过ID获取考勤记录
    async fn get_attendance_by_id(&self, attendance_id: i64) -> Result<Option<Attendance>>;
    // 列出考勤记录
    async fn list_attendances_with_pagination(
        &self,
        query: AttendanceListQuery,
    ) -> Result<AttendanceListResponse>;

    /// 汇总管理方法
    // 获取或惰性创建助教汇总
    async fn get_or_create_rekap(&self, assistant_id: i64) -> Result<Rekap>;
    // 设置酬金档位
    async fn set_honor_tier(&self, assistant_id: i64, tier: &str) -> Result<Rekap>;
    // 从考勤记录完整重算汇总
    async fn recompute_rekap(&self, assistant_id: i64) -> Result<Rekap>;
    // 通过ID获取汇总
    async fn get_rekap_by_id(&self, rekap_id: i64) -> Result<Option<Rekap>>;
    // 通过助教ID获取汇总
    async fn get_rekap_by_assistant(&self, assistant_id: i64) -> Result<Option<Rekap>>;
    // 列出汇总
    async fn list_rekaps_with_pagination(&self, query: RekapListQuery)
    -> Result<RekapListResponse>;
    // 删除汇总（仍有考勤或申诉时拒绝）
    async fn delete_rekap(&self, rekap_id: i64) -> Result<bool>;

    /// 申诉管理方法
    // 提交申诉
    async fn create_dispute(&self, req: CreateDisputeRequest) -> Result<Dispute>;
    // 通过ID获取申诉
    async fn get_dispute_by_id(&self, dispute_id: i64) -> Result<Option<Dispute>>;
    // 列出申诉
    async fn list_disputes_with_pagination(
        &self,
        query: DisputeListQuery,
    ) -> Result<DisputeListResponse>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
