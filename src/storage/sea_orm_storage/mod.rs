//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod attendances;
mod disputes;
mod rekaps;
mod schedules;
mod unit_of_work;

pub use unit_of_work::{AssistantGuard, AssistantLocks, UnitOfWork};

use crate::config::{AppConfig, AttendanceConfig, DatabaseConfig};
use crate::errors::{RekapError, Result};
use crate::models::rekaps::entities::HonorRates;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
    pub(crate) honor: HonorRates,
    pub(crate) retry: AttendanceConfig,
    pub(crate) locks: Arc<AssistantLocks>,
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(
            &config.database,
            HonorRates::from(&config.honor),
            config.attendance.clone(),
        )
        .await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(
        database: &DatabaseConfig,
        honor: HonorRates,
        retry: AttendanceConfig,
    ) -> Result<Self> {
        let db_url = Self::build_database_url(&database.url)?;

        // 根据数据库类型选择连接方式；SQLite 的写入者还要经过写入闸门
        let (db, locks) = if db_url.starts_with("sqlite:") {
            (
                Self::connect_sqlite(&db_url, database).await?,
                AssistantLocks::with_writer_gate(),
            )
        } else {
            (
                Self::connect_generic(&db_url, database).await?,
                AssistantLocks::new(),
            )
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| RekapError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self {
            db,
            honor,
            retry,
            locks: Arc::new(locks),
        })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, database: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| RekapError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| RekapError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, database: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(database.timeout))
            .acquire_timeout(Duration::from_secs(database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| RekapError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(RekapError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    attendances::{
        entities::{Attendance, AttendanceStatus},
        requests::{AttendanceListQuery, CreateAttendanceRequest},
        responses::AttendanceListResponse,
    },
    disputes::{
        entities::Dispute,
        requests::{CreateDisputeRequest, DisputeListQuery},
        responses::DisputeListResponse,
    },
    rekaps::{entities::Rekap, requests::RekapListQuery, responses::RekapListResponse},
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 考勤模块
    async fn record_attendance(
        &self,
        assistant_id: i64,
        req: CreateAttendanceRequest,
    ) -> Result<(Attendance, Rekap)> {
        self.record_attendance_impl(assistant_id, req).await
    }

    async fn amend_attendance(
        &self,
        attendance_id: i64,
        status: AttendanceStatus,
    ) -> Result<(Attendance, Rekap)> {
        self.amend_attendance_impl(attendance_id, status).await
    }

    async fn remove_attendance(&self, attendance_id: i64) -> Result<Rekap> {
        self.remove_attendance_impl(attendance_id).await
    }

    async fn get_attendance_by_id(&self, attendance_id: i64) -> Result<Option<Attendance>> {
        self.get_attendance_by_id_impl(attendance_id).await
    }

    async fn list_attendances_with_pagination(
        &self,
        query: AttendanceListQuery,
    ) -> Result<AttendanceListResponse> {
        self.list_attendances_with_pagination_impl(query).await
    }

    // 汇总模块
    async fn get_or_create_rekap(&self, assistant_id: i64) -> Result<Rekap> {
        self.get_or_create_rekap_impl(assistant_id).await
    }

    async fn set_honor_tier(&self, assistant_id: i64, tier: &str) -> Result<Rekap> {
        self.set_honor_tier_impl(assistant_id, tier).await
    }

    async fn recompute_rekap(&self, assistant_id: i64) -> Result<Rekap> {
        self.recompute_rekap_impl(assistant_id).await
    }

    async fn get_rekap_by_id(&self, rekap_id: i64) -> Result<Option<Rekap>> {
        self.get_rekap_by_id_impl(rekap_id).await
    }

    async fn get_rekap_by_assistant(&self, assistant_id: i64) -> Result<Option<Rekap>> {
        self.get_rekap_by_assistant_impl(assistant_id).await
    }

    async fn list_rekaps_with_pagination(
        &self,
        query: RekapListQuery,
    ) -> Result<RekapListResponse> {
        self.list_rekaps_with_pagination_impl(query).await
    }

    async fn delete_rekap(&self, rekap_id: i64) -> Result<bool> {
        self.delete_rekap_impl(rekap_id).await
    }

    // 申诉模块
    async fn create_dispute(&self, req: CreateDisputeRequest) -> Result<Dispute> {
        self.create_dispute_impl(req).await
    }

    async fn get_dispute_by_id(&self, dispute_id: i64) -> Result<Option<Dispute>> {
        self.get_dispute_by_id_impl(dispute_id).await
    }

    async fn list_disputes_with_pagination(
        &self,
        query: DisputeListQuery,
    ) -> Result<DisputeListResponse> {
        self.list_disputes_with_pagination_impl(query).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::entity::schedules::ActiveModel as ScheduleActiveModel;
    use sea_orm::{ActiveModelTrait, Set};

    /// 单连接内存数据库（内存库每个连接独立，连接池必须为 1）
    pub(crate) async fn memory_storage() -> SeaOrmStorage {
        let database = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool_size: 1,
            timeout: 10,
        };
        SeaOrmStorage::connect(&database, HonorRates::default(), AttendanceConfig::default())
            .await
            .expect("in-memory storage should start")
    }

    /// 文件数据库，多连接连接池（与生产配置一致）
    ///
    /// 返回的 `TempDir` 需与存储同生命周期。
    pub(crate) async fn file_storage(pool_size: u32) -> (SeaOrmStorage, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("rekap.db");
        let database = DatabaseConfig {
            url: path.to_string_lossy().into_owned(),
            pool_size,
            timeout: 10,
        };
        let storage =
            SeaOrmStorage::connect(&database, HonorRates::default(), AttendanceConfig::default())
                .await
                .expect("file storage should start");
        (storage, dir)
    }

    pub(crate) async fn seed_schedule(storage: &SeaOrmStorage) -> i64 {
        let model = ScheduleActiveModel {
            course_name: Set("Algorithms".to_string()),
            day: Set("Monday".to_string()),
            start_time: Set("08:00".to_string()),
            end_time: Set("09:40".to_string()),
            room: Set(Some("Lab 2".to_string())),
            class_name: Set(Some("IF-A".to_string())),
            semester: Set(3),
            ..Default::default()
        };
        model
            .insert(&storage.db)
            .await
            .expect("schedule should be inserted")
            .id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("sqlite::memory:").unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("rekap.db").unwrap(),
            "sqlite://rekap.db?mode=rwc"
        );
        assert!(SeaOrmStorage::build_database_url("postgres://localhost/rekap").is_ok());
        assert!(SeaOrmStorage::build_database_url("ftp://nowhere").is_err());
    }

    #[tokio::test]
    async fn test_sqlite_storage_gates_writers() {
        let (storage, _dir) = test_support::file_storage(4).await;
        let _first = UnitOfWork::begin(&storage.db, &storage.locks, 1).await.unwrap();

        // 连接池仍有空闲连接，但其他助教的工作单元要等写入闸门
        let second = tokio::time::timeout(
            Duration::from_millis(50),
            UnitOfWork::begin(&storage.db, &storage.locks, 2),
        )
        .await;
        assert!(second.is_err());
    }
}
