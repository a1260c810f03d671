use crate::models::attendances::entities::{AttendanceEvidence, AttendanceStatus};

// 申诉内容最大长度（字符）
const MAX_DISPUTE_LENGTH: usize = 2000;
// 单个佐证字段最大长度（字符）
const MAX_EVIDENCE_LENGTH: usize = 2048;

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn too_long(value: &Option<String>) -> bool {
    value
        .as_deref()
        .is_some_and(|v| v.chars().count() > MAX_EVIDENCE_LENGTH)
}

/// 校验考勤状态与佐证字段组合
///
/// - 出勤：不得填写请假/缺勤凭证
/// - 请假/缺勤：不得填写出勤凭证和授课记录
pub fn validate_attendance_evidence(
    status: AttendanceStatus,
    evidence: &AttendanceEvidence,
) -> Result<(), &'static str> {
    if too_long(&evidence.presence_proof)
        || too_long(&evidence.absence_proof)
        || too_long(&evidence.session_notes)
    {
        return Err("Evidence fields must not exceed 2048 characters");
    }

    match status {
        AttendanceStatus::Present => {
            if is_filled(&evidence.absence_proof) {
                return Err("A present attendance must not carry an absence proof");
            }
        }
        AttendanceStatus::Excused | AttendanceStatus::Absent => {
            if is_filled(&evidence.presence_proof) {
                return Err("An excused or absent attendance must not carry a presence proof");
            }
            if is_filled(&evidence.session_notes) {
                return Err("An excused or absent attendance must not carry session notes");
            }
        }
    }
    Ok(())
}

pub fn validate_dispute_content(content: &str) -> Result<(), &'static str> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("Dispute content must not be empty");
    }
    if trimmed.chars().count() > MAX_DISPUTE_LENGTH {
        return Err("Dispute content must not exceed 2000 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(presence: Option<&str>, absence: Option<&str>, notes: Option<&str>) -> AttendanceEvidence {
        AttendanceEvidence {
            presence_proof: presence.map(String::from),
            absence_proof: absence.map(String::from),
            session_notes: notes.map(String::from),
        }
    }

    #[test]
    fn test_present_rejects_absence_proof() {
        let ev = evidence(Some("photo.jpg"), Some("letter.pdf"), None);
        assert!(validate_attendance_evidence(AttendanceStatus::Present, &ev).is_err());

        let ok = evidence(Some("photo.jpg"), None, Some("Week 1"));
        assert!(validate_attendance_evidence(AttendanceStatus::Present, &ok).is_ok());
    }

    #[test]
    fn test_excused_and_absent_reject_presence_fields() {
        for status in [AttendanceStatus::Excused, AttendanceStatus::Absent] {
            let with_photo = evidence(Some("photo.jpg"), None, None);
            assert!(validate_attendance_evidence(status, &with_photo).is_err());

            let with_notes = evidence(None, None, Some("covered recursion"));
            assert!(validate_attendance_evidence(status, &with_notes).is_err());

            let ok = evidence(None, Some("letter.pdf"), None);
            assert!(validate_attendance_evidence(status, &ok).is_ok());
        }
    }

    #[test]
    fn test_blank_fields_count_as_empty() {
        let ev = evidence(Some("photo.jpg"), Some("   "), None);
        assert!(validate_attendance_evidence(AttendanceStatus::Present, &ev).is_ok());
    }

    #[test]
    fn test_oversized_evidence_rejected() {
        let long = "x".repeat(MAX_EVIDENCE_LENGTH + 1);
        let ev = evidence(Some(&long), None, None);
        assert!(validate_attendance_evidence(AttendanceStatus::Present, &ev).is_err());
    }

    #[test]
    fn test_dispute_content() {
        assert!(validate_dispute_content("Count for week 3 is wrong").is_ok());
        assert!(validate_dispute_content("").is_err());
        assert!(validate_dispute_content(" \n\t ").is_err());
        assert!(validate_dispute_content(&"x".repeat(MAX_DISPUTE_LENGTH + 1)).is_err());
    }
}
