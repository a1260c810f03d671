//! 考勤存储操作
//!
//! 记录、修正、删除都在同一工作单元内完成考勤写入与汇总重算，二者同时可见或同时回滚。

use super::rekaps::get_or_create_in;
use super::schedules::find_schedule_in;
use super::{SeaOrmStorage, UnitOfWork};
use crate::entity::attendances::{ActiveModel, Column, Entity as Attendances, Model};
use crate::errors::{RekapError, Result};
use crate::models::{
    PaginationInfo,
    attendances::{
        entities::{Attendance, AttendanceEvidence, AttendanceStatus},
        requests::{AttendanceListQuery, CreateAttendanceRequest},
        responses::AttendanceListResponse,
    },
    common::normalize_page,
    rekaps::entities::Rekap,
};
use crate::utils::validate::validate_attendance_evidence;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

fn attendance_not_found(attendance_id: i64) -> RekapError {
    RekapError::not_found(format!("Attendance {attendance_id} not found"))
}

async fn find_attendance_in<C: ConnectionTrait>(conn: &C, attendance_id: i64) -> Result<Model> {
    Attendances::find_by_id(attendance_id)
        .one(conn)
        .await
        .map_err(|e| RekapError::from_db("查询考勤记录失败", e))?
        .ok_or_else(|| attendance_not_found(attendance_id))
}

impl SeaOrmStorage {
    /// 解析考勤记录所属助教（加锁前调用）
    async fn resolve_owner(&self, attendance_id: i64) -> Result<i64> {
        Ok(find_attendance_in(&self.db, attendance_id).await?.assistant_id)
    }

    /// 记录考勤并同步汇总
    pub async fn record_attendance_impl(
        &self,
        assistant_id: i64,
        req: CreateAttendanceRequest,
    ) -> Result<(Attendance, Rekap)> {
        let evidence = req.evidence();
        validate_attendance_evidence(req.status, &evidence).map_err(RekapError::validation)?;

        let req = &req;
        let evidence = &evidence;
        self.with_conflict_retry("record_attendance", Some(assistant_id), || async move {
            self.try_record_attendance(assistant_id, req, evidence).await
        })
        .await
    }

    async fn try_record_attendance(
        &self,
        assistant_id: i64,
        req: &CreateAttendanceRequest,
        evidence: &AttendanceEvidence,
    ) -> Result<(Attendance, Rekap)> {
        let uow = UnitOfWork::begin(&self.db, &self.locks, assistant_id).await?;
        let txn = uow.txn();

        if find_schedule_in(txn, req.schedule_id).await?.is_none() {
            return Err(RekapError::not_found(format!(
                "Schedule {} not found",
                req.schedule_id
            )));
        }

        let rekap = get_or_create_in(txn, assistant_id).await?;

        let model = ActiveModel {
            schedule_id: Set(req.schedule_id),
            assistant_id: Set(assistant_id),
            kind: Set(req.kind.to_string()),
            status: Set(req.status.to_string()),
            presence_proof: Set(evidence.presence_proof.clone()),
            absence_proof: Set(evidence.absence_proof.clone()),
            session_notes: Set(evidence.session_notes.clone()),
            recorded_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        let inserted = model
            .insert(txn)
            .await
            .map_err(|e| RekapError::from_db("创建考勤记录失败", e))?;

        let rekap = self.sync_rekap_in(txn, rekap).await?;
        let attendance = inserted.into_attendance()?;
        let rekap = rekap.into_rekap()?;
        uow.commit().await?;

        info!(
            assistant_id,
            attendance_id = attendance.id,
            kind = %attendance.kind,
            status = %attendance.status,
            present = rekap.count_present,
            excused = rekap.count_excused,
            absent = rekap.count_absent,
            substitute = rekap.count_substitute,
            total_honor = rekap.total_honor,
            "考勤已记录"
        );
        Ok((attendance, rekap))
    }

    /// 修正考勤状态并同步汇总，与新状态冲突的佐证字段被清除
    pub async fn amend_attendance_impl(
        &self,
        attendance_id: i64,
        status: AttendanceStatus,
    ) -> Result<(Attendance, Rekap)> {
        self.with_conflict_retry("amend_attendance", None, || async move {
            self.try_amend_attendance(attendance_id, status).await
        })
        .await
    }

    async fn try_amend_attendance(
        &self,
        attendance_id: i64,
        status: AttendanceStatus,
    ) -> Result<(Attendance, Rekap)> {
        let owner = self.resolve_owner(attendance_id).await?;
        let uow = UnitOfWork::begin(&self.db, &self.locks, owner).await?;
        let txn = uow.txn();

        // 加锁后重新读取，期间被删除则报 NotFound
        let current = find_attendance_in(txn, attendance_id).await?;
        if current.assistant_id != owner {
            return Err(RekapError::conflict(format!(
                "Attendance {attendance_id} changed owner during update"
            )));
        }

        let rekap = get_or_create_in(txn, owner).await?;

        let evidence = AttendanceEvidence {
            presence_proof: current.presence_proof.clone(),
            absence_proof: current.absence_proof.clone(),
            session_notes: current.session_notes.clone(),
        }
        .conform_to(status);

        let mut model: ActiveModel = current.into();
        model.status = Set(status.to_string());
        model.presence_proof = Set(evidence.presence_proof);
        model.absence_proof = Set(evidence.absence_proof);
        model.session_notes = Set(evidence.session_notes);
        let updated = model
            .update(txn)
            .await
            .map_err(|e| RekapError::from_db("更新考勤记录失败", e))?;

        let rekap = self.sync_rekap_in(txn, rekap).await?;
        let attendance = updated.into_attendance()?;
        let rekap = rekap.into_rekap()?;
        uow.commit().await?;

        info!(
            assistant_id = owner,
            attendance_id,
            status = %status,
            present = rekap.count_present,
            excused = rekap.count_excused,
            absent = rekap.count_absent,
            substitute = rekap.count_substitute,
            total_honor = rekap.total_honor,
            "考勤已修正"
        );
        Ok((attendance, rekap))
    }

    /// 删除考勤记录并完整重算汇总
    pub async fn remove_attendance_impl(&self, attendance_id: i64) -> Result<Rekap> {
        self.with_conflict_retry("remove_attendance", None, || async move {
            self.try_remove_attendance(attendance_id).await
        })
        .await
    }

    async fn try_remove_attendance(&self, attendance_id: i64) -> Result<Rekap> {
        let owner = self.resolve_owner(attendance_id).await?;
        let uow = UnitOfWork::begin(&self.db, &self.locks, owner).await?;
        let txn = uow.txn();

        let current = find_attendance_in(txn, attendance_id).await?;
        if current.assistant_id != owner {
            return Err(RekapError::conflict(format!(
                "Attendance {attendance_id} changed owner during removal"
            )));
        }

        let rekap = get_or_create_in(txn, owner).await?;

        Attendances::delete_by_id(attendance_id)
            .exec(txn)
            .await
            .map_err(|e| RekapError::from_db("删除考勤记录失败", e))?;

        let rekap = self.sync_rekap_in(txn, rekap).await?.into_rekap()?;
        uow.commit().await?;

        info!(
            assistant_id = owner,
            attendance_id,
            present = rekap.count_present,
            excused = rekap.count_excused,
            absent = rekap.count_absent,
            substitute = rekap.count_substitute,
            total_honor = rekap.total_honor,
            "考勤已删除"
        );
        Ok(rekap)
    }

    /// 通过 ID 获取考勤记录
    pub async fn get_attendance_by_id_impl(&self, attendance_id: i64) -> Result<Option<Attendance>> {
        let result = Attendances::find_by_id(attendance_id)
            .one(&self.db)
            .await
            .map_err(|e| RekapError::from_db("查询考勤记录失败", e))?;

        result.map(|m| m.into_attendance()).transpose()
    }

    /// 分页列出考勤记录
    pub async fn list_attendances_with_pagination_impl(
        &self,
        query: AttendanceListQuery,
    ) -> Result<AttendanceListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Attendances::find();

        // 助教筛选
        if let Some(assistant_id) = query.assistant_id {
            select = select.filter(Column::AssistantId.eq(assistant_id));
        }

        // 课表筛选
        if let Some(schedule_id) = query.schedule_id {
            select = select.filter(Column::ScheduleId.eq(schedule_id));
        }

        // 状态筛选
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        // 排序
        select = select
            .order_by_desc(Column::RecordedAt)
            .order_by_desc(Column::Id);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| RekapError::from_db("查询考勤总数失败", e))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| RekapError::from_db("查询考勤页数失败", e))?;

        let attendances = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| RekapError::from_db("查询考勤列表失败", e))?;

        Ok(AttendanceListResponse {
            items: attendances
                .into_iter()
                .map(|m| m.into_attendance())
                .collect::<Result<Vec<_>>>()?,
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
    use crate::entity::rekaps::{ActiveModel as RekapActiveModel, Entity as Rekaps};
    use crate::models::attendances::entities::AttendanceKind;
    use crate::models::rekaps::recalculator::RekapCounts;
    use crate::storage::sea_orm_storage::test_support::{
        file_storage, memory_storage, seed_schedule,
    };
    use std::sync::Arc;

    fn request(
        schedule_id: i64,
        kind: AttendanceKind,
        status: AttendanceStatus,
    ) -> CreateAttendanceRequest {
        let (presence_proof, absence_proof) = if status.is_present() {
            (Some("photo.jpg".to_string()), None)
        } else {
            (None, Some("letter.pdf".to_string()))
        };
        CreateAttendanceRequest {
            schedule_id,
            kind,
            status,
            presence_proof,
            absence_proof,
            session_notes: None,
        }
    }

    /// 汇总必须等于重放全部考勤的结果，且 total_honor 与费率一致
    async fn assert_rekap_matches_replay(storage: &SeaOrmStorage, assistant_id: i64) -> Rekap {
        let rekap = storage
            .get_rekap_by_assistant_impl(assistant_id)
            .await
            .unwrap()
            .expect("rekap should exist");
        let events = storage
            .list_attendances_with_pagination_impl(AttendanceListQuery {
                assistant_id: Some(assistant_id),
                size: Some(100),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(rekap.counts(), RekapCounts::from_attendances(&events.items));
        assert!(rekap.is_consistent(), "inconsistent rekap: {rekap:?}");
        rekap
    }

    #[tokio::test]
    async fn test_tier_scenario_end_to_end() {
        let storage = memory_storage().await;
        let schedule_id = seed_schedule(&storage).await;
        let a = 11;

        let (first, rekap) = storage
            .record_attendance_impl(
                a,
                request(schedule_id, AttendanceKind::Primary, AttendanceStatus::Present),
            )
            .await
            .unwrap();
        assert_eq!(
            rekap.counts(),
            RekapCounts {
                present: 1,
                ..Default::default()
            }
        );
        assert_eq!(rekap.rate_per_session, 0);
        assert_eq!(rekap.total_honor, 0);

        let rekap = storage.set_honor_tier_impl(a, "B").await.unwrap();
        assert_eq!(rekap.rate_per_session, 14_500);
        assert_eq!(rekap.total_honor, 14_500);

        let (substitute, rekap) = storage
            .record_attendance_impl(
                a,
                request(schedule_id, AttendanceKind::Substitute, AttendanceStatus::Present),
            )
            .await
            .unwrap();
        assert_eq!(rekap.count_present, 1);
        assert_eq!(rekap.count_substitute, 1);
        assert_eq!(rekap.total_honor, 29_000);

        let (_, rekap) = storage
            .amend_attendance_impl(first.id, AttendanceStatus::Excused)
            .await
            .unwrap();
        assert_eq!(
            rekap.counts(),
            RekapCounts {
                present: 0,
                excused: 1,
                absent: 0,
                substitute: 1,
            }
        );
        assert_eq!(rekap.total_honor, 14_500);

        let rekap = storage.remove_attendance_impl(substitute.id).await.unwrap();
        assert_eq!(
            rekap.counts(),
            RekapCounts {
                present: 0,
                excused: 1,
                absent: 0,
                substitute: 0,
            }
        );
        assert_eq!(rekap.total_honor, 0);
        assert_rekap_matches_replay(&storage, a).await;
    }

    #[tokio::test]
    async fn test_invariant_holds_across_mixed_sequences() {
        let storage = memory_storage().await;
        let schedule_id = seed_schedule(&storage).await;
        storage.set_honor_tier_impl(1, "C").await.unwrap();

        let kinds = [AttendanceKind::Primary, AttendanceKind::Substitute];
        let statuses = [
            AttendanceStatus::Present,
            AttendanceStatus::Excused,
            AttendanceStatus::Absent,
        ];

        // 固定种子的线性同余序列，保证可复现
        let mut seed: u64 = 42;
        let mut next = move |bound: usize| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((seed >> 33) as usize) % bound
        };

        let mut live: Vec<(i64, i64)> = Vec::new();
        for _ in 0..40 {
            let assistant_id = 1 + next(2) as i64;
            match next(4) {
                0 | 1 => {
                    let req = request(schedule_id, kinds[next(2)], statuses[next(3)]);
                    let (attendance, _) = storage
                        .record_attendance_impl(assistant_id, req)
                        .await
                        .unwrap();
                    live.push((attendance.id, assistant_id));
                }
                2 if !live.is_empty() => {
                    let (id, _) = live[next(live.len())];
                    storage
                        .amend_attendance_impl(id, statuses[next(3)])
                        .await
                        .unwrap();
                }
                3 if !live.is_empty() => {
                    let (id, _) = live.remove(next(live.len()));
                    storage.remove_attendance_impl(id).await.unwrap();
                }
                _ => continue,
            }

            for assistant_id in [1, 2] {
                if storage
                    .get_rekap_by_assistant_impl(assistant_id)
                    .await
                    .unwrap()
                    .is_some()
                {
                    assert_rekap_matches_replay(&storage, assistant_id).await;
                }
            }
        }

        let rekap = assert_rekap_matches_replay(&storage, 1).await;
        assert_eq!(rekap.rate_per_session, 16_500);
    }

    #[tokio::test]
    async fn test_invalid_evidence_leaves_state_unchanged() {
        let storage = memory_storage().await;
        let schedule_id = seed_schedule(&storage).await;
        let (_, before) = storage
            .record_attendance_impl(
                5,
                request(schedule_id, AttendanceKind::Primary, AttendanceStatus::Absent),
            )
            .await
            .unwrap();

        let mut bad = request(schedule_id, AttendanceKind::Primary, AttendanceStatus::Present);
        bad.absence_proof = Some("doctor-note.pdf".to_string());
        let err = storage.record_attendance_impl(5, bad).await.unwrap_err();
        assert_eq!(err.code(), "E004");

        let after = storage.get_rekap_by_assistant_impl(5).await.unwrap().unwrap();
        assert_eq!(before, after);
        let events = storage
            .list_attendances_with_pagination_impl(AttendanceListQuery::default())
            .await
            .unwrap();
        assert_eq!(events.pagination.total, 1);

        // 首次提交即无效时不会创建汇总行
        let mut bad = request(schedule_id, AttendanceKind::Primary, AttendanceStatus::Excused);
        bad.session_notes = Some("taught anyway".to_string());
        assert!(storage.record_attendance_impl(6, bad).await.is_err());
        assert!(storage.get_rekap_by_assistant_impl(6).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_schedule_rolls_back() {
        let storage = memory_storage().await;
        let err = storage
            .record_attendance_impl(
                3,
                request(999, AttendanceKind::Primary, AttendanceStatus::Present),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E006");
        assert!(storage.get_rekap_by_assistant_impl(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_event_is_not_found_without_change() {
        let storage = memory_storage().await;
        let schedule_id = seed_schedule(&storage).await;
        let (_, before) = storage
            .record_attendance_impl(
                4,
                request(schedule_id, AttendanceKind::Primary, AttendanceStatus::Present),
            )
            .await
            .unwrap();

        let err = storage.remove_attendance_impl(12_345).await.unwrap_err();
        assert_eq!(err.code(), "E006");
        let err = storage
            .amend_attendance_impl(12_345, AttendanceStatus::Absent)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E006");

        let after = storage.get_rekap_by_assistant_impl(4).await.unwrap().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_amend_clears_conflicting_evidence() {
        let storage = memory_storage().await;
        let schedule_id = seed_schedule(&storage).await;
        let mut req = request(schedule_id, AttendanceKind::Primary, AttendanceStatus::Present);
        req.session_notes = Some("Week 4: graphs".to_string());
        let (attendance, _) = storage.record_attendance_impl(8, req).await.unwrap();

        let (amended, rekap) = storage
            .amend_attendance_impl(attendance.id, AttendanceStatus::Absent)
            .await
            .unwrap();
        assert_eq!(amended.status, AttendanceStatus::Absent);
        assert_eq!(amended.evidence, AttendanceEvidence::default());
        assert_eq!(rekap.count_absent, 1);
        assert_eq!(rekap.count_present, 0);

        let stored = storage
            .get_attendance_by_id_impl(attendance.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, amended);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_for_same_assistant() {
        let (storage, _dir) = file_storage(8).await;
        let storage = Arc::new(storage);
        let schedule_id = seed_schedule(&storage).await;

        let statuses = [
            AttendanceStatus::Present,
            AttendanceStatus::Excused,
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
            AttendanceStatus::Present,
            AttendanceStatus::Excused,
        ];
        let handles: Vec<_> = statuses
            .into_iter()
            .map(|status| {
                let storage = Arc::clone(&storage);
                tokio::spawn(async move {
                    storage
                        .record_attendance_impl(
                            21,
                            request(schedule_id, AttendanceKind::Primary, status),
                        )
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let rekap = assert_rekap_matches_replay(&storage, 21).await;
        assert_eq!(rekap.count_present, 3);
        assert_eq!(rekap.count_excused, 2);
        assert_eq!(rekap.count_absent, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_for_different_assistants() {
        let (storage, _dir) = file_storage(8).await;
        let storage = Arc::new(storage);
        let schedule_id = seed_schedule(&storage).await;
        storage.set_honor_tier_impl(3, "C").await.unwrap();

        let handles: Vec<_> = (1..=16)
            .map(|assistant_id| {
                let storage = Arc::clone(&storage);
                tokio::spawn(async move {
                    for _ in 0..5 {
                        storage
                            .record_attendance_impl(
                                assistant_id,
                                request(
                                    schedule_id,
                                    AttendanceKind::Substitute,
                                    AttendanceStatus::Present,
                                ),
                            )
                            .await?;
                    }
                    Ok::<_, RekapError>(())
                })
            })
            .collect();

        // 默认重试配置下所有写入都应成功，不出现 database is locked
        let mut failures = Vec::new();
        for handle in handles {
            if let Err(e) = handle.await.unwrap() {
                failures.push(e.to_string());
            }
        }
        assert!(failures.is_empty(), "failed submissions: {failures:?}");

        for assistant_id in 1..=16 {
            let rekap = assert_rekap_matches_replay(&storage, assistant_id).await;
            assert_eq!(rekap.count_substitute, 5);
        }
        let tiered = storage.get_rekap_by_assistant_impl(3).await.unwrap().unwrap();
        assert_eq!(tiered.total_honor, 5 * 16_500);
    }

    #[tokio::test]
    async fn test_failure_after_event_write_rolls_back_both() {
        let storage = memory_storage().await;
        let schedule_id = seed_schedule(&storage).await;

        // 汇总行的档位无法解析，考勤写入之后的重算必然失败
        let corrupted = RekapActiveModel {
            assistant_id: Set(31),
            count_present: Set(0),
            count_excused: Set(0),
            count_absent: Set(0),
            count_substitute: Set(0),
            honor_tier: Set(Some("Z".to_string())),
            rate_per_session: Set(0),
            total_honor: Set(0),
            updated_at: Set(0),
            ..Default::default()
        }
        .insert(&storage.db)
        .await
        .unwrap();

        let err = storage
            .record_attendance_impl(
                31,
                request(schedule_id, AttendanceKind::Primary, AttendanceStatus::Present),
            )
            .await
            .unwrap_err();
        assert!(!err.is_conflict());

        let events = Attendances::find()
            .filter(Column::AssistantId.eq(31))
            .count(&storage.db)
            .await
            .unwrap();
        assert_eq!(events, 0);

        let row = Rekaps::find_by_id(corrupted.id)
            .one(&storage.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row, corrupted);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let storage = memory_storage().await;
        let schedule_id = seed_schedule(&storage).await;
        for (assistant_id, status) in [
            (1, AttendanceStatus::Present),
            (1, AttendanceStatus::Absent),
            (2, AttendanceStatus::Present),
        ] {
            storage
                .record_attendance_impl(
                    assistant_id,
                    request(schedule_id, AttendanceKind::Primary, status),
                )
                .await
                .unwrap();
        }

        let own = storage
            .list_attendances_with_pagination_impl(AttendanceListQuery {
                assistant_id: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(own.pagination.total, 2);
        assert!(own.items.iter().all(|a| a.assistant_id == 1));

        let present = storage
            .list_attendances_with_pagination_impl(AttendanceListQuery {
                status: Some(AttendanceStatus::Present),
                schedule_id: Some(schedule_id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(present.pagination.total, 2);

        let paged = storage
            .list_attendances_with_pagination_impl(AttendanceListQuery {
                page: Some(2),
                size: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(paged.items.len(), 1);
        assert_eq!(paged.pagination.total_pages, 2);
    }
}
