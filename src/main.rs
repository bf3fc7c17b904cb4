//! # Ghost-Oxide 服务入口
//!
//! Ghost-Oxide WebDriver 服务器的入口点，通过 Chrome DevTools Protocol 执行 JSON Wire Protocol 元素命令。
//!
//! ## 主要功能
//! - 加载配置并初始化日志
//! - 连接 Chrome 调试端点并创建窗口工厂
//! - 启动 HTTP 服务器处理会话与元素命令
//! - 定期清理空闲会话，实现优雅关闭
//!
//! ## 架构
//! 服务由以下核心组件构成：
//! - **CDP 层**: 与 Chrome/Chromium 浏览器的 WebSocket 通信
//! - **会话管理**: 管理会话与窗口的生命周期
//! - **元素命令层**: 路由、原子调用、导航感知执行与结果转换
//! - **HTTP 服务层**: 实现 JSON Wire Protocol 接口
//!
//! ## 环境变量
//! - `GHOST_CONFIG`: TOML 配置文件路径（可选）
//! - `GHOST_HOST`: 服务器监听地址（默认: 127.0.0.1）
//! - `GHOST_PORT`: 服务器监听端口（默认: 8910）
//! - `GHOST_CDP_ENDPOINT`: CDP 端点（默认: ws://localhost:9222）
//! - `GHOST_NATIVE_EVENTS`: 是否使用原生输入事件（默认: true）

use anyhow::Context;
use ghost_oxide::{
    cdp::{CdpBrowser, CdpBrowserImpl, CdpWindowFactory},
    config::Config,
    server::{ServerState, WebDriverServer},
    session::{LocalFileSystem, SessionManager, SessionManagerImpl},
    webdriver::HandlerOptions,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Interval between idle session sweeps
const CLEANUP_INTERVAL_SECS: u64 = 300;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load().context("loading configuration")?;

    // Initialize tracing - RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Ghost-Oxide Server v{}", ghost_oxide::VERSION);
    info!(
        "Configuration loaded: host={}, port={}, cdp={}",
        config.host, config.port, config.cdp_endpoint
    );

    // Connect to the browser
    let browser = Arc::new(CdpBrowserImpl::new(config.cdp_endpoint.clone()));
    match browser.get_version().await {
        Ok(version) => info!(
            "Connected to {} (protocol {})",
            version.product, version.protocol_version
        ),
        Err(e) => warn!("Browser not reachable yet: {}", e),
    }

    let window_factory = Arc::new(CdpWindowFactory::new(
        browser.clone(),
        config.navigation_settle(),
    ));

    // Create session manager
    let session_manager: Arc<dyn SessionManager> = Arc::new(
        SessionManagerImpl::new(window_factory).with_native_events(config.native_events),
    );
    info!("Session manager initialized");

    let options = HandlerOptions {
        native_events: config.native_events,
        load_timeout: config.load_timeout(),
        file_system: Arc::new(LocalFileSystem),
    };

    let server = WebDriverServer::new(ServerState::new(session_manager.clone(), options));
    let addr = server
        .start(config.bind_addr()?)
        .await
        .context("starting HTTP server")?;
    info!("WebDriver server ready on {}", addr);

    // Start cleanup task
    let session_manager_cleanup = session_manager.clone();
    let session_timeout = config.session_timeout;
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(tokio::time::Duration::from_secs(CLEANUP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            match session_manager_cleanup.cleanup(session_timeout).await {
                Ok(removed) => info!(
                    "Session cleanup completed. Removed: {}, active sessions: {}",
                    removed,
                    session_manager_cleanup.session_count()
                ),
                Err(e) => warn!("Session cleanup failed: {}", e),
            }
        }
    });

    shutdown_signal().await;
    info!("Shutdown signal received, stopping server...");
    server.stop().await;

    // Close every remaining session
    info!("Cleaning up all sessions...");
    if let Err(e) = session_manager.cleanup(0).await {
        error!("Failed to cleanup sessions: {}", e);
    }
    if let Err(e) = browser.close().await {
        error!("Failed to close browser connections: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM signal"),
                    _ = sigint.recv() => info!("Received SIGINT signal"),
                }
            }
            _ => {
                warn!("Failed to install signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl+C signal");
    }
}
