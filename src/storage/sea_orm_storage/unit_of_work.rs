//! 一致性协调
//!
//! 每次考勤写入都在一个工作单元内完成：先取得该助教的进程内互斥锁，再开启数据库事务，
//! 事务内锁定汇总行、修改考勤、重放并写回汇总，最后提交。
//! 不同助教使用不同的锁，互不阻塞。工作单元未提交即被丢弃时事务自动回滚。
//!
//! SQLite 同一时刻只允许一个写事务，且延迟事务由读升级为写时不等待 `busy_timeout`，
//! 因此 SQLite 下所有工作单元还要经过一个进程级写入闸门。PostgreSQL 与 MySQL 不设闸门。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

use super::SeaOrmStorage;
use crate::errors::{RekapError, Result};

/// 按助教分片的互斥锁表
///
/// 表项在最后一个持有者释放后移除，表的大小只取决于当前活跃的助教数。
#[derive(Debug, Default)]
pub struct AssistantLocks {
    inner: Arc<DashMap<i64, Arc<Mutex<()>>>>,
    writer: Option<Arc<Mutex<()>>>,
}

impl AssistantLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 额外串行化所有写入者（SQLite 使用）
    pub fn with_writer_gate() -> Self {
        Self {
            inner: Arc::default(),
            writer: Some(Arc::default()),
        }
    }

    /// 等待并持有指定助教的锁
    pub async fn acquire(&self, assistant_id: i64) -> AssistantGuard {
        // 分片引用必须在 await 之前释放
        let lock = Arc::clone(self.inner.entry(assistant_id).or_default().value());
        let guard = lock.lock_owned().await;
        AssistantGuard {
            guard: Some(guard),
            table: Arc::clone(&self.inner),
            assistant_id,
        }
    }

    /// 等待写入闸门；未启用时立即返回
    async fn acquire_writer(&self) -> Option<OwnedMutexGuard<()>> {
        match &self.writer {
            Some(writer) => Some(Arc::clone(writer).lock_owned().await),
            None => None,
        }
    }
}

/// 助教锁的持有凭证，释放时清理无人等待的表项
#[derive(Debug)]
pub struct AssistantGuard {
    guard: Option<OwnedMutexGuard<()>>,
    table: Arc<DashMap<i64, Arc<Mutex<()>>>>,
    assistant_id: i64,
}

impl Drop for AssistantGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // 计数为 1 说明只剩表本身持有，没有等待者；与 acquire 共用分片锁
        self.table
            .remove_if(&self.assistant_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// 单个助教的工作单元
///
/// 字段顺序保证丢弃时先回滚事务，再释放写入闸门，最后释放助教锁。
pub struct UnitOfWork {
    txn: DatabaseTransaction,
    _writer: Option<OwnedMutexGuard<()>>,
    _guard: AssistantGuard,
}

impl UnitOfWork {
    /// 加锁顺序固定为助教锁在前、写入闸门在后
    pub async fn begin(
        db: &DatabaseConnection,
        locks: &AssistantLocks,
        assistant_id: i64,
    ) -> Result<Self> {
        let guard = locks.acquire(assistant_id).await;
        let writer = locks.acquire_writer().await;
        let txn = db
            .begin()
            .await
            .map_err(|e| RekapError::from_db("开启事务失败", e))?;

        Ok(Self {
            txn,
            _writer: writer,
            _guard: guard,
        })
    }

    pub fn txn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// 提交事务；失败时整个工作单元视为未发生
    pub async fn commit(self) -> Result<()> {
        self.txn
            .commit()
            .await
            .map_err(|e| RekapError::from_db("提交事务失败", e))
    }
}

impl SeaOrmStorage {
    /// 冲突时重试整个工作单元
    ///
    /// 每次重试都重新执行 `attempt`，由其重新读取全部状态，不重放旧的计算结果。
    pub(crate) async fn with_conflict_retry<T, F, Fut>(
        &self,
        operation: &'static str,
        assistant_id: Option<i64>,
        mut attempt: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retries = 0u32;
        loop {
            match attempt().await {
                Err(e) if e.is_conflict() && retries < self.retry.conflict_retries => {
                    retries += 1;
                    warn!(
                        operation,
                        assistant_id,
                        retries,
                        "并发冲突，重试工作单元: {}",
                        e.message()
                    );
                    let backoff = self.retry.retry_backoff_ms * u64::from(retries);
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
                result => return result,
            }
        }
    }
}
