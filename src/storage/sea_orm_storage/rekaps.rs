//! 汇总存储操作
//!
//! 汇总行只通过工作单元写入：`get_or_create_in` 锁定行，`replay_counts_in` 重放考勤，
//! `apply_rekap_in` 写回计数与派生的 total_honor。

use super::{SeaOrmStorage, UnitOfWork};
use crate::entity::attendances::{Column as AttendanceColumn, Entity as Attendances};
use crate::entity::disputes::{Column as DisputeColumn, Entity as Disputes};
use crate::entity::rekaps::{ActiveModel, Column, Entity as Rekaps, Model};
use crate::errors::{RekapError, Result};
use crate::models::{
    PaginationInfo,
    common::normalize_page,
    rekaps::{
        entities::{HonorTier, Rekap},
        recalculator::RekapCounts,
        requests::RekapListQuery,
        responses::RekapListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::info;

/// 读取并锁定助教的汇总行，不存在时创建零值行（无档位，费率为 0）
pub(crate) async fn get_or_create_in<C: ConnectionTrait>(conn: &C, assistant_id: i64) -> Result<Model> {
    let existing = Rekaps::find()
        .filter(Column::AssistantId.eq(assistant_id))
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(|e| RekapError::from_db("查询汇总失败", e))?;

    if let Some(model) = existing {
        return Ok(model);
    }

    let model = ActiveModel {
        assistant_id: Set(assistant_id),
        count_present: Set(0),
        count_excused: Set(0),
        count_absent: Set(0),
        count_substitute: Set(0),
        honor_tier: Set(None),
        rate_per_session: Set(0),
        total_honor: Set(0),
        updated_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    };

    model
        .insert(conn)
        .await
        .map_err(|e| RekapError::from_db("创建汇总失败", e))
}

/// 重放助教的全部考勤记录得到标准计数
pub(crate) async fn replay_counts_in<C: ConnectionTrait>(
    conn: &C,
    assistant_id: i64,
) -> Result<RekapCounts> {
    let models = Attendances::find()
        .filter(AttendanceColumn::AssistantId.eq(assistant_id))
        .all(conn)
        .await
        .map_err(|e| RekapError::from_db("查询考勤记录失败", e))?;

    let attendances = models
        .into_iter()
        .map(|m| m.into_attendance())
        .collect::<Result<Vec<_>>>()?;

    Ok(RekapCounts::from_attendances(&attendances))
}

/// 覆盖写入计数、档位与费率，并重新计算 total_honor
///
/// 输入与当前行一致时不写库，重复调用得到同一行。
pub(crate) async fn apply_rekap_in<C: ConnectionTrait>(
    conn: &C,
    current: Model,
    counts: RekapCounts,
    honor_tier: Option<HonorTier>,
    rate_per_session: i64,
) -> Result<Model> {
    let honor_tier = honor_tier.map(|t| t.to_string());
    let total_honor = counts.total_honor(rate_per_session);

    let unchanged = current.count_present == counts.present
        && current.count_excused == counts.excused
        && current.count_absent == counts.absent
        && current.count_substitute == counts.substitute
        && current.honor_tier == honor_tier
        && current.rate_per_session == rate_per_session
        && current.total_honor == total_honor;
    if unchanged {
        return Ok(current);
    }

    let mut model: ActiveModel = current.into();
    model.count_present = Set(counts.present);
    model.count_excused = Set(counts.excused);
    model.count_absent = Set(counts.absent);
    model.count_substitute = Set(counts.substitute);
    model.honor_tier = Set(honor_tier);
    model.rate_per_session = Set(rate_per_session);
    model.total_honor = Set(total_honor);
    model.updated_at = Set(chrono::Utc::now().timestamp());

    model
        .update(conn)
        .await
        .map_err(|e| RekapError::from_db("更新汇总失败", e))
}

impl SeaOrmStorage {
    /// 当前档位对应的费率（未设档位为 0）
    fn rate_for_row(&self, current: &Model) -> Result<(Option<HonorTier>, i64)> {
        match current.honor_tier.as_deref() {
            Some(tier) => {
                let (tier, rate) = self.honor.resolve(tier)?;
                Ok((Some(tier), rate))
            }
            None => Ok((None, 0)),
        }
    }

    /// 在工作单元内重放并写回汇总（考勤写入后调用）
    pub(crate) async fn sync_rekap_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        current: Model,
    ) -> Result<Model> {
        let counts = replay_counts_in(conn, current.assistant_id).await?;
        let (tier, rate) = self.rate_for_row(&current)?;
        apply_rekap_in(conn, current, counts, tier, rate).await
    }

    /// 直接以给定计数和费率写入汇总（保留当前档位）
    pub async fn apply_rekap(
        &self,
        assistant_id: i64,
        counts: RekapCounts,
        rate_per_session: i64,
    ) -> Result<Rekap> {
        let uow = UnitOfWork::begin(&self.db, &self.locks, assistant_id).await?;
        let current = get_or_create_in(uow.txn(), assistant_id).await?;
        let (tier, _) = self.rate_for_row(&current)?;
        let model = apply_rekap_in(uow.txn(), current, counts, tier, rate_per_session).await?;
        let rekap = model.into_rekap()?;
        uow.commit().await?;
        Ok(rekap)
    }

    /// 获取或惰性创建汇总
    pub async fn get_or_create_rekap_impl(&self, assistant_id: i64) -> Result<Rekap> {
        if let Some(rekap) = self.get_rekap_by_assistant_impl(assistant_id).await? {
            return Ok(rekap);
        }

        self.with_conflict_retry("get_or_create_rekap", Some(assistant_id), || async move {
            let uow = UnitOfWork::begin(&self.db, &self.locks, assistant_id).await?;
            let model = get_or_create_in(uow.txn(), assistant_id).await?;
            let rekap = model.into_rekap()?;
            uow.commit().await?;
            Ok(rekap)
        })
        .await
    }

    /// 设置酬金档位，按当前考勤重新计算 total_honor
    pub async fn set_honor_tier_impl(&self, assistant_id: i64, tier: &str) -> Result<Rekap> {
        // 在任何写入之前解析档位
        let (tier, rate) = self.honor.resolve(tier)?;

        self.with_conflict_retry("set_honor_tier", Some(assistant_id), || async move {
            let uow = UnitOfWork::begin(&self.db, &self.locks, assistant_id).await?;
            let current = get_or_create_in(uow.txn(), assistant_id).await?;
            let counts = replay_counts_in(uow.txn(), assistant_id).await?;
            let model = apply_rekap_in(uow.txn(), current, counts, Some(tier), rate).await?;
            let rekap = model.into_rekap()?;
            uow.commit().await?;

            info!(
                assistant_id,
                tier = %tier,
                rate,
                total_honor = rekap.total_honor,
                "酬金档位已更新"
            );
            Ok(rekap)
        })
        .await
    }

    /// 修复：从考勤记录完整重算汇总
    pub async fn recompute_rekap_impl(&self, assistant_id: i64) -> Result<Rekap> {
        self.with_conflict_retry("recompute_rekap", Some(assistant_id), || async move {
            let uow = UnitOfWork::begin(&self.db, &self.locks, assistant_id).await?;
            let txn = uow.txn();

            let has_row = Rekaps::find()
                .filter(Column::AssistantId.eq(assistant_id))
                .count(txn)
                .await
                .map_err(|e| RekapError::from_db("查询汇总失败", e))?
                > 0;
            let has_events = Attendances::find()
                .filter(AttendanceColumn::AssistantId.eq(assistant_id))
                .count(txn)
                .await
                .map_err(|e| RekapError::from_db("查询考勤记录失败", e))?
                > 0;
            if !has_row && !has_events {
                return Err(RekapError::not_found(format!(
                    "Rekap for assistant {assistant_id} not found"
                )));
            }

            let current = get_or_create_in(txn, assistant_id).await?;
            let before = current.total_honor;
            let model = self.sync_rekap_in(txn, current).await?;
            let rekap = model.into_rekap()?;
            uow.commit().await?;

            info!(
                assistant_id,
                before,
                after = rekap.total_honor,
                "汇总已重算"
            );
            Ok(rekap)
        })
        .await
    }

    /// 通过 ID 获取汇总
    pub async fn get_rekap_by_id_impl(&self, rekap_id: i64) -> Result<Option<Rekap>> {
        let result = Rekaps::find_by_id(rekap_id)
            .one(&self.db)
            .await
            .map_err(|e| RekapError::from_db("查询汇总失败", e))?;

        result.map(|m| m.into_rekap()).transpose()
    }

    /// 通过助教 ID 获取汇总
    pub async fn get_rekap_by_assistant_impl(&self, assistant_id: i64) -> Result<Option<Rekap>> {
        let result = Rekaps::find()
            .filter(Column::AssistantId.eq(assistant_id))
            .one(&self.db)
            .await
            .map_err(|e| RekapError::from_db("查询汇总失败", e))?;

        result.map(|m| m.into_rekap()).transpose()
    }

    /// 分页列出汇总
    pub async fn list_rekaps_with_pagination_impl(
        &self,
        query: RekapListQuery,
    ) -> Result<RekapListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Rekaps::find();

        // 助教筛选
        if let Some(assistant_id) = query.assistant_id {
            select = select.filter(Column::AssistantId.eq(assistant_id));
        }

        // 排序
        select = select.order_by_asc(Column::AssistantId);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| RekapError::from_db("查询汇总总数失败", e))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| RekapError::from_db("查询汇总页数失败", e))?;

        let rekaps = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| RekapError::from_db("查询汇总列表失败", e))?;

        Ok(RekapListResponse {
            items: rekaps
                .into_iter()
                .map(|m| m.into_rekap())
                .collect::<Result<Vec<_>>>()?,
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 删除汇总
    ///
    /// 仍有考勤记录（汇总必须存在）或申诉引用时返回 `Conflict`，该拒绝不参与重试。
    pub async fn delete_rekap_impl(&self, rekap_id: i64) -> Result<bool> {
        let Some(existing) = self.get_rekap_by_id_impl(rekap_id).await? else {
            return Ok(false);
        };
        let assistant_id = existing.assistant_id;

        let outcome = self
            .with_conflict_retry("delete_rekap", Some(assistant_id), || async move {
                self.try_delete_rekap(rekap_id, assistant_id).await
            })
            .await?;

        match outcome {
            DeleteOutcome::Deleted => {
                info!(assistant_id, rekap_id, "汇总已删除");
                Ok(true)
            }
            DeleteOutcome::Missing => Ok(false),
            DeleteOutcome::Referenced(reason) => Err(RekapError::conflict(reason)),
        }
    }

    async fn try_delete_rekap(&self, rekap_id: i64, assistant_id: i64) -> Result<DeleteOutcome> {
        let uow = UnitOfWork::begin(&self.db, &self.locks, assistant_id).await?;
        let txn = uow.txn();

        let locked = Rekaps::find_by_id(rekap_id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(|e| RekapError::from_db("查询汇总失败", e))?;
        if locked.is_none() {
            return Ok(DeleteOutcome::Missing);
        }

        let events = Attendances::find()
            .filter(AttendanceColumn::AssistantId.eq(assistant_id))
            .count(txn)
            .await
            .map_err(|e| RekapError::from_db("查询考勤记录失败", e))?;
        if events > 0 {
            return Ok(DeleteOutcome::Referenced(format!(
                "Rekap {rekap_id} still has {events} attendance record(s)"
            )));
        }

        let disputes = Disputes::find()
            .filter(DisputeColumn::RekapId.eq(rekap_id))
            .count(txn)
            .await
            .map_err(|e| RekapError::from_db("查询申诉失败", e))?;
        if disputes > 0 {
            return Ok(DeleteOutcome::Referenced(format!(
                "Rekap {rekap_id} still has {disputes} dispute(s)"
            )));
        }

        let result = Rekaps::delete_by_id(rekap_id)
            .exec(txn)
            .await
            .map_err(|e| RekapError::from_db("删除汇总失败", e))?;
        uow.commit().await?;

        Ok(if result.rows_affected > 0 {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::Missing
        })
    }
}

enum DeleteOutcome {
    Deleted,
    Missing,
    Referenced(String),
}
