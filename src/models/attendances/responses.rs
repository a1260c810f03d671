use serde::Serialize;
use ts_rs::TS;

use super::entities::Attendance;
use crate::models::common::PaginatedResponse;
use crate::models::rekaps::entities::Rekap;

// 考勤列表响应
pub type AttendanceListResponse = PaginatedResponse<Attendance>;

// 考勤变更响应：考勤记录与同一事务内更新后的汇总
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceMutationResponse {
    pub attendance: Attendance,
    pub rekap: Rekap,
}
