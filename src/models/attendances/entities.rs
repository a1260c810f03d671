use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 考勤类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "attendance.ts")]
pub enum AttendanceKind {
    Primary,    // 本人课次
    Substitute, // 代课
}

impl AttendanceKind {
    pub const PRIMARY: &'static str = "primary";
    pub const SUBSTITUTE: &'static str = "substitute";
}

impl<'de> Deserialize<'de> for AttendanceKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的考勤类型: '{s}'. 支持的类型: primary, substitute"
            ))
        })
    }
}

impl std::fmt::Display for AttendanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceKind::Primary => write!(f, "{}", AttendanceKind::PRIMARY),
            AttendanceKind::Substitute => write!(f, "{}", AttendanceKind::SUBSTITUTE),
        }
    }
}

impl std::str::FromStr for AttendanceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            AttendanceKind::PRIMARY => Ok(AttendanceKind::Primary),
            AttendanceKind::SUBSTITUTE => Ok(AttendanceKind::Substitute),
            _ => Err(format!("Invalid attendance kind: {s}")),
        }
    }
}

// 考勤状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "attendance.ts")]
pub enum AttendanceStatus {
    Present, // 出勤
    Excused, // 请假
    Absent,  // 缺勤
}

impl AttendanceStatus {
    pub const PRESENT: &'static str = "present";
    pub const EXCUSED: &'static str = "excused";
    pub const ABSENT: &'static str = "absent";

    pub fn is_present(&self) -> bool {
        matches!(self, AttendanceStatus::Present)
    }
}

impl<'de> Deserialize<'de> for AttendanceStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的考勤状态: '{s}'. 支持的状态: present, excused, absent"
            ))
        })
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "{}", AttendanceStatus::PRESENT),
            AttendanceStatus::Excused => write!(f, "{}", AttendanceStatus::EXCUSED),
            AttendanceStatus::Absent => write!(f, "{}", AttendanceStatus::ABSENT),
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            AttendanceStatus::PRESENT => Ok(AttendanceStatus::Present),
            AttendanceStatus::EXCUSED => Ok(AttendanceStatus::Excused),
            AttendanceStatus::ABSENT => Ok(AttendanceStatus::Absent),
            _ => Err(format!("Invalid attendance status: {s}")),
        }
    }
}

// 考勤佐证材料
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceEvidence {
    // 出勤凭证（照片链接等）
    pub presence_proof: Option<String>,
    // 请假/缺勤凭证
    pub absence_proof: Option<String>,
    // 授课内容记录
    pub session_notes: Option<String>,
}

impl AttendanceEvidence {
    /// 去除空白字段，空字符串视为未填写
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            presence_proof: clean(self.presence_proof),
            absence_proof: clean(self.absence_proof),
            session_notes: clean(self.session_notes),
        }
    }

    /// 按新状态清除与之冲突的佐证字段（管理员修正状态时使用）
    pub fn conform_to(self, status: AttendanceStatus) -> Self {
        if status.is_present() {
            Self {
                absence_proof: None,
                ..self
            }
        } else {
            Self {
                presence_proof: None,
                session_notes: None,
                ..self
            }
        }
    }
}

// 考勤记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct Attendance {
    pub id: i64,
    pub schedule_id: i64,
    pub assistant_id: i64,
    pub kind: AttendanceKind,
    pub status: AttendanceStatus,
    #[serde(flatten)]
    #[ts(flatten)]
    pub evidence: AttendanceEvidence,
    // 服务器记录时间
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!("present".parse(), Ok(AttendanceStatus::Present));
        assert_eq!("excused".parse(), Ok(AttendanceStatus::Excused));
        assert_eq!("absent".parse(), Ok(AttendanceStatus::Absent));
        assert!("late".parse::<AttendanceStatus>().is_err());
        assert!("Present".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn test_status_json_rejects_unknown_value() {
        let err = serde_json::from_str::<AttendanceStatus>("\"sick\"").unwrap_err();
        assert!(err.to_string().contains("present, excused, absent"));
    }

    #[test]
    fn test_evidence_normalization_drops_blank_fields() {
        let evidence = AttendanceEvidence {
            presence_proof: Some("  ".into()),
            absence_proof: Some(" letter.pdf ".into()),
            session_notes: None,
        }
        .normalized();
        assert_eq!(evidence.presence_proof, None);
        assert_eq!(evidence.absence_proof.as_deref(), Some("letter.pdf"));
    }

    #[test]
    fn test_conform_to_clears_conflicting_fields() {
        let evidence = AttendanceEvidence {
            presence_proof: Some("photo.jpg".into()),
            absence_proof: None,
            session_notes: Some("Week 3: loops".into()),
        };
        let excused = evidence.clone().conform_to(AttendanceStatus::Excused);
        assert_eq!(excused, AttendanceEvidence::default());

        let present = AttendanceEvidence {
            absence_proof: Some("letter.pdf".into()),
            ..Default::default()
        }
        .conform_to(AttendanceStatus::Present);
        assert_eq!(present.absence_proof, None);
    }
}
