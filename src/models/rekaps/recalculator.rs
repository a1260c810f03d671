//! 汇总重算
//!
//! 纯函数：给定某位助教的全部考勤记录，得出标准的四项计数。
//! 协调器的每次写入和修复重算都以此为唯一依据，不做增量加减。

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::attendances::entities::{Attendance, AttendanceKind, AttendanceStatus};

/// 助教考勤计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "rekap.ts")]
pub struct RekapCounts {
    pub present: i64,
    pub excused: i64,
    pub absent: i64,
    pub substitute: i64,
}

impl RekapCounts {
    /// 重放一组 (类型, 状态) 得到计数
    pub fn tally<I>(events: I) -> Self
    where
        I: IntoIterator<Item = (AttendanceKind, AttendanceStatus)>,
    {
        events
            .into_iter()
            .fold(Self::default(), |mut counts, (kind, status)| {
                counts.count(kind, status);
                counts
            })
    }

    /// 从考勤记录重放
    pub fn from_attendances<'a, I>(attendances: I) -> Self
    where
        I: IntoIterator<Item = &'a Attendance>,
    {
        Self::tally(attendances.into_iter().map(|a| (a.kind, a.status)))
    }

    fn count(&mut self, kind: AttendanceKind, status: AttendanceStatus) {
        match (status, kind) {
            (AttendanceStatus::Present, AttendanceKind::Primary) => self.present += 1,
            (AttendanceStatus::Present, AttendanceKind::Substitute) => self.substitute += 1,
            (AttendanceStatus::Excused, _) => self.excused += 1,
            (AttendanceStatus::Absent, _) => self.absent += 1,
        }
    }

    /// 计酬课次：出勤与代课同等计酬
    pub fn payable_sessions(&self) -> i64 {
        self.present + self.substitute
    }

    pub fn total_honor(&self, rate_per_session: i64) -> i64 {
        rate_per_session.saturating_mul(self.payable_sessions())
    }
}
