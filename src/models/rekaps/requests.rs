use serde::Deserialize;
use ts_rs::TS;

// 设置酬金档位请求（档位在存储层解析，未知档位返回 InvalidTier）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "rekap.ts")]
pub struct SetHonorTierRequest {
    pub assistant_id: i64,
    pub tier: String,
}

// 汇总列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "rekap.ts")]
pub struct RekapListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub assistant_id: Option<i64>,
}
