use once_cell::sync::Lazy;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// 进程级关闭信号，进行中的批量写入以其子令牌作为取消源
static SHUTDOWN: Lazy<CancellationToken> = Lazy::new(CancellationToken::new);

pub fn shutdown_token() -> &'static CancellationToken {
    &SHUTDOWN
}

pub async fn listen_for_shutdown() {
    // 等待 Ctrl+C 信号
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        return;
    }
    warn!("Shutdown signal received, initiating graceful shutdown...");
    SHUTDOWN.cancel();
}
