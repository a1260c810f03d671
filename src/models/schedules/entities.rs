use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课表（外部课表目录维护，本服务只读）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "schedule.ts")]
pub struct Schedule {
    pub id: i64,
    pub course_name: String,
    pub day: String,
    // 格式: "08:00"
    pub start_time: String,
    pub end_time: String,
    pub room: Option<String>,
    pub class_name: Option<String>,
    pub semester: i32,
}
