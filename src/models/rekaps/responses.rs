use super::entities::Rekap;
use crate::models::common::PaginatedResponse;

// 汇总列表响应
pub type RekapListResponse = PaginatedResponse<Rekap>;
