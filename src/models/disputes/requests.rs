use serde::Deserialize;
use ts_rs::TS;

// 提交申诉请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "dispute.ts")]
pub struct CreateDisputeRequest {
    pub rekap_id: i64,
    pub content: String,
}

// 申诉列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "dispute.ts")]
pub struct DisputeListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub rekap_id: Option<i64>,
    // 仅返回该助教汇总下的申诉（服务层为助教强制填充）
    #[serde(skip)]
    #[ts(skip)]
    pub assistant_id: Option<i64>,
}
