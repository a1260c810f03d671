use crate::config::AppConfig;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
}

/// 检查会导致请求全部失败的配置
fn check_config(config: &AppConfig) {
    if config.jwt.secret.is_empty() {
        warn!("JWT secret is empty, every authenticated request will be rejected");
    }

    let rates = [
        config.honor.a,
        config.honor.b,
        config.honor.c,
        config.honor.d,
        config.honor.e,
    ];
    if rates.iter().any(|rate| *rate < 0) {
        warn!("Honor rate table contains negative values: {:?}", rates);
    }
    debug!(
        "Honor rates A-E: {:?}, conflict retries: {}",
        rates, config.attendance.conflict_retries
    );
}

/// 准备服务器启动的上下文
/// 包括存储连接与数据库迁移
pub async fn prepare_server_startup() -> StartupContext {
    check_config(AppConfig::get());

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    StartupContext { storage }
}
