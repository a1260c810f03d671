//! 课表查询（课表由外部目录维护，这里只读）

use crate::entity::schedules::Entity as Schedules;
use crate::errors::{RekapError, Result};
use crate::models::schedules::entities::Schedule;
use sea_orm::{ConnectionTrait, EntityTrait};

/// 按 ID 查找课表；考勤写入时在同一事务内调用
pub(crate) async fn find_schedule_in<C: ConnectionTrait>(
    conn: &C,
    schedule_id: i64,
) -> Result<Option<Schedule>> {
    let result = Schedules::find_by_id(schedule_id)
        .one(conn)
        .await
        .map_err(|e| RekapError::from_db("查询课表失败", e))?;

    Ok(result.map(|m| m.into_schedule()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::{memory_storage, seed_schedule};

    #[tokio::test]
    async fn test_find_schedule() {
        let storage = memory_storage().await;
        let id = seed_schedule(&storage).await;

        let schedule = find_schedule_in(&storage.db, id).await.unwrap().unwrap();
        assert_eq!(schedule.course_name, "Algorithms");
        assert_eq!(schedule.start_time, "08:00");
        assert!(find_schedule_in(&storage.db, id + 1).await.unwrap().is_none());
    }
}
