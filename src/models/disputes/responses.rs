use super::entities::Dispute;
use crate::models::common::PaginatedResponse;

// 申诉列表响应
pub type DisputeListResponse = PaginatedResponse<Dispute>;
