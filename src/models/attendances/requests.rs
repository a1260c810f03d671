use serde::Deserialize;
use ts_rs::TS;

use super::entities::{AttendanceEvidence, AttendanceKind, AttendanceStatus};

// 助教提交考勤请求（助教身份来自令牌）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct CreateAttendanceRequest {
    pub schedule_id: i64,
    pub kind: AttendanceKind,
    pub status: AttendanceStatus,
    pub presence_proof: Option<String>,
    pub absence_proof: Option<String>,
    pub session_notes: Option<String>,
}

impl CreateAttendanceRequest {
    pub fn evidence(&self) -> AttendanceEvidence {
        AttendanceEvidence {
            presence_proof: self.presence_proof.clone(),
            absence_proof: self.absence_proof.clone(),
            session_notes: self.session_notes.clone(),
        }
        .normalized()
    }
}

// 管理员修正考勤状态请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AmendAttendanceRequest {
    pub status: AttendanceStatus,
}

// 考勤列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub assistant_id: Option<i64>,
    pub schedule_id: Option<i64>,
    pub status: Option<AttendanceStatus>,
}
