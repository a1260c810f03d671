//! 考勤记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attendances")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub schedule_id: i64,
    pub assistant_id: i64,
    pub kind: String,
    pub status: String,
    pub presence_proof: Option<String>,
    pub absence_proof: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub session_notes: Option<String>,
    pub recorded_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::schedules::Entity",
        from = "Column::ScheduleId",
        to = "super::schedules::Column::Id"
    )]
    Schedule,
}

impl Related<super::schedules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 转换为业务实体，库中出现无法识别的类型/状态时报存储错误
    pub fn into_attendance(self) -> crate::errors::Result<crate::models::attendances::entities::Attendance> {
        use crate::models::attendances::entities::{
            Attendance, AttendanceEvidence, AttendanceKind, AttendanceStatus,
        };
        use crate::errors::RekapError;
        use chrono::{DateTime, Utc};

        let kind = self
            .kind
            .parse::<AttendanceKind>()
            .map_err(|e| RekapError::database_operation(format!("考勤记录 {} 数据损坏: {e}", self.id)))?;
        let status = self
            .status
            .parse::<AttendanceStatus>()
            .map_err(|e| RekapError::database_operation(format!("考勤记录 {} 数据损坏: {e}", self.id)))?;

        Ok(Attendance {
            id: self.id,
            schedule_id: self.schedule_id,
            assistant_id: self.assistant_id,
            kind,
            status,
            evidence: AttendanceEvidence {
                presence_proof: self.presence_proof,
                absence_proof: self.absence_proof,
                session_notes: self.session_notes,
            },
            recorded_at: DateTime::<Utc>::from_timestamp(self.recorded_at, 0).unwrap_or_default(),
        })
    }
}
