use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 默认页码与每页条数
const DEFAULT_PAGE: i64 = 1;
const DEFAULT_SIZE: i64 = 10;
const MAX_SIZE: i64 = 100;

// 分页响应信息
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "pagination.ts")]
pub struct PaginationInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

// 分页列表响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "pagination.ts")]
pub struct PaginatedResponse<T: TS> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

/// 规范化分页参数，返回 (page, size)，page 从 1 开始
pub fn normalize_page(page: Option<i64>, size: Option<i64>) -> (u64, u64) {
    let page = page.unwrap_or(DEFAULT_PAGE).max(1) as u64;
    let size = size.unwrap_or(DEFAULT_SIZE).clamp(1, MAX_SIZE) as u64;
    (page, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_page_defaults_and_bounds() {
        assert_eq!(normalize_page(None, None), (1, 10));
        assert_eq!(normalize_page(Some(0), Some(0)), (1, 1));
        assert_eq!(normalize_page(Some(-3), Some(1000)), (1, 100));
        assert_eq!(normalize_page(Some(4), Some(25)), (4, 25));
    }
}
