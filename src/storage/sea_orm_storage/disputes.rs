//! 申诉存储操作（只追加，不可修改）

use super::{SeaOrmStorage, UnitOfWork};
use crate::entity::disputes::{ActiveModel, Column, Entity as Disputes};
use crate::entity::rekaps::{Column as RekapColumn, Entity as Rekaps};
use crate::errors::{RekapError, Result};
use crate::models::{
    PaginationInfo,
    common::normalize_page,
    disputes::{
        entities::Dispute,
        requests::{CreateDisputeRequest, DisputeListQuery},
        responses::DisputeListResponse,
    },
};
use crate::utils::validate::validate_dispute_content;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::info;

fn rekap_not_found(rekap_id: i64) -> RekapError {
    RekapError::not_found(format!("Rekap {rekap_id} not found"))
}

impl SeaOrmStorage {
    /// 提交申诉
    ///
    /// 在汇总所属助教的工作单元内确认汇总仍存在再写入，与并发的汇总删除互斥。
    pub async fn create_dispute_impl(&self, req: CreateDisputeRequest) -> Result<Dispute> {
        validate_dispute_content(&req.content).map_err(RekapError::validation)?;

        let rekap_id = req.rekap_id;
        let content = req.content.trim();
        let assistant_id = self.resolve_rekap_owner(rekap_id).await?;

        self.with_conflict_retry("create_dispute", Some(assistant_id), || async move {
            let uow = UnitOfWork::begin(&self.db, &self.locks, assistant_id).await?;
            let txn = uow.txn();

            let locked = Rekaps::find_by_id(rekap_id)
                .lock_exclusive()
                .one(txn)
                .await
                .map_err(|e| RekapError::from_db("查询汇总失败", e))?;
            if locked.is_none() {
                return Err(rekap_not_found(rekap_id));
            }

            let model = ActiveModel {
                rekap_id: Set(rekap_id),
                content: Set(content.to_string()),
                created_at: Set(chrono::Utc::now().timestamp()),
                ..Default::default()
            };
            let result = model
                .insert(txn)
                .await
                .map_err(|e| RekapError::from_db("创建申诉失败", e))?;
            uow.commit().await?;

            info!(dispute_id = result.id, rekap_id, assistant_id, "申诉已提交");
            Ok(result.into_dispute())
        })
        .await
    }

    /// 解析汇总所属助教（加锁前调用）
    async fn resolve_rekap_owner(&self, rekap_id: i64) -> Result<i64> {
        Rekaps::find_by_id(rekap_id)
            .one(&self.db)
            .await
            .map_err(|e| RekapError::from_db("查询汇总失败", e))?
            .map(|m| m.assistant_id)
            .ok_or_else(|| rekap_not_found(rekap_id))
    }

    /// 通过 ID 获取申诉
    pub async fn get_dispute_by_id_impl(&self, dispute_id: i64) -> Result<Option<Dispute>> {
        let result = Disputes::find_by_id(dispute_id)
            .one(&self.db)
            .await
            .map_err(|e| RekapError::from_db("查询申诉失败", e))?;

        Ok(result.map(|m| m.into_dispute()))
    }

    /// 分页列出申诉
    pub async fn list_disputes_with_pagination_impl(
        &self,
        query: DisputeListQuery,
    ) -> Result<DisputeListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Disputes::find();

        if let Some(rekap_id) = query.rekap_id {
            select = select.filter(Column::RekapId.eq(rekap_id));
        }

        // 限定为某位助教汇总下的申诉
        if let Some(assistant_id) = query.assistant_id {
            let own = Rekaps::find()
                .filter(RekapColumn::AssistantId.eq(assistant_id))
                .one(&self.db)
                .await
                .map_err(|e| RekapError::from_db("查询汇总失败", e))?;

            match own {
                Some(rekap) => select = select.filter(Column::RekapId.eq(rekap.id)),
                None => {
                    return Ok(DisputeListResponse {
                        items: Vec::new(),
                        pagination: PaginationInfo {
                            page: page as i64,
                            page_size: size as i64,
                            total: 0,
                            total_pages: 0,
                        },
                    });
                }
            }
        }

        // 排序
        select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| RekapError::from_db("查询申诉总数失败", e))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| RekapError::from_db("查询申诉页数失败", e))?;

        let disputes = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| RekapError::from_db("查询申诉列表失败", e))?;

        Ok(DisputeListResponse {
            items: disputes.into_iter().map(|m| m.into_dispute()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::memory_storage;

    fn dispute(rekap_id: i64, content: &str) -> CreateDisputeRequest {
        CreateDisputeRequest {
            rekap_id,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_file_and_read_dispute() {
        let storage = memory_storage().await;
        let rekap = storage.get_or_create_rekap_impl(1).await.unwrap();

        let created = storage
            .create_dispute_impl(dispute(rekap.id, "  Week 5 was a substitute session  "))
            .await
            .unwrap();
        assert_eq!(created.rekap_id, rekap.id);
        assert_eq!(created.content, "Week 5 was a substitute session");

        let fetched = storage.get_dispute_by_id_impl(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_dispute_requires_existing_rekap() {
        let storage = memory_storage().await;
        let err = storage
            .create_dispute_impl(dispute(77, "wrong total"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E006");
    }

    #[tokio::test]
    async fn test_dispute_on_deleted_rekap_is_not_found() {
        let storage = memory_storage().await;
        let rekap = storage.set_honor_tier_impl(4, "A").await.unwrap();
        assert!(storage.delete_rekap_impl(rekap.id).await.unwrap());

        let err = storage
            .create_dispute_impl(dispute(rekap.id, "tier was wrong"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E006");
    }

    #[tokio::test]
    async fn test_dispute_and_rekap_delete_race() {
        let storage = memory_storage().await;
        let rekap = storage.set_honor_tier_impl(6, "B").await.unwrap();

        let (filed, deleted) = tokio::join!(
            storage.create_dispute_impl(dispute(rekap.id, "missing session")),
            storage.delete_rekap_impl(rekap.id),
        );

        // 两者只能有一个生效：申诉成功则删除因引用冲突失败，删除成功则申诉找不到汇总
        match (filed, deleted) {
            (Ok(d), Err(e)) => {
                assert_eq!(d.rekap_id, rekap.id);
                assert!(e.is_conflict());
            }
            (Err(e), Ok(true)) => assert_eq!(e.code(), "E006"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_dispute_rejected() {
        let storage = memory_storage().await;
        let rekap = storage.get_or_create_rekap_impl(1).await.unwrap();
        let err = storage
            .create_dispute_impl(dispute(rekap.id, "   "))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_list_scoped_to_assistant() {
        let storage = memory_storage().await;
        let mine = storage.get_or_create_rekap_impl(1).await.unwrap();
        let theirs = storage.get_or_create_rekap_impl(2).await.unwrap();
        storage
            .create_dispute_impl(dispute(mine.id, "first"))
            .await
            .unwrap();
        storage
            .create_dispute_impl(dispute(theirs.id, "second"))
            .await
            .unwrap();

        let all = storage
            .list_disputes_with_pagination_impl(DisputeListQuery::default())
            .await
            .unwrap();
        assert_eq!(all.pagination.total, 2);

        let own = storage
            .list_disputes_with_pagination_impl(DisputeListQuery {
                assistant_id: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(own.items.len(), 1);
        assert_eq!(own.items[0].rekap_id, mine.id);

        // 助教查询他人汇总的申诉得到空结果
        let other = storage
            .list_disputes_with_pagination_impl(DisputeListQuery {
                rekap_id: Some(theirs.id),
                assistant_id: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(other.items.is_empty());

        let nobody = storage
            .list_disputes_with_pagination_impl(DisputeListQuery {
                assistant_id: Some(99),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(nobody.pagination.total, 0);
    }
}
