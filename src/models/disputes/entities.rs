use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 针对汇总的申诉记录，创建后不可修改
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "dispute.ts")]
pub struct Dispute {
    pub id: i64,
    pub rekap_id: i64,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
