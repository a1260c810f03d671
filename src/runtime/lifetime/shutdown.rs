use tokio::signal;
use tracing::{error, warn};

/// 等待 Ctrl+C 或 SIGTERM
///
/// 正在进行的工作单元随请求一同结束，未提交的事务在丢弃时回滚。
pub async fn listen_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("Ctrl+C received, initiating graceful shutdown..."),
        _ = terminate => warn!("SIGTERM received, initiating graceful shutdown..."),
    }
}
