use std::time::Duration;

use anyhow::{Context, Result};
use flint_core::AppConfig;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::Application;
use crate::shutdown::ShutdownManager;

/// 通用的应用启动配置
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub config_path: Option<String>,
    pub log_level: String,
    pub log_format: String,
    pub workers: Option<u32>,
}

/// 初始化日志系统
pub fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        "pretty" => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
        _ => {
            return Err(anyhow::anyhow!("不支持的日志格式: {log_format}"));
        }
    }

    Ok(())
}

/// 加载应用配置，命令行参数优先于配置文件和环境变量
pub fn load_config(startup_config: &StartupConfig) -> Result<AppConfig> {
    let mut config = AppConfig::load(startup_config.config_path.as_deref()).with_context(|| {
        match &startup_config.config_path {
            Some(path) => format!("加载配置文件失败: {path}"),
            None => "加载配置失败".to_string(),
        }
    })?;

    if let Some(workers) = startup_config.workers {
        config.cluster.num_workers = workers;
        config.validate()?;
    }

    Ok(config)
}

/// 启动嵌入式集群并运行到收到关闭信号
pub async fn start_application(startup_config: StartupConfig) -> Result<()> {
    init_logging(&startup_config.log_level, &startup_config.log_format)?;

    info!("启动 flint 计算集群");
    if let Some(ref path) = startup_config.config_path {
        info!("配置文件: {}", path);
    }

    let config = load_config(&startup_config)?;
    let shutdown_manager = ShutdownManager::new();

    let app = Application::new(config, shutdown_manager.token()).await?;
    app.await_workers().await?;
    app.smoke_test().await;

    let shutdown_rx = shutdown_manager.subscribe().await;
    let mut app_handle = tokio::spawn(async move { app.serve(shutdown_rx).await });

    tokio::select! {
        _ = wait_for_shutdown_signal() => {
            info!("收到关闭信号，开始优雅关闭...");
        }
        joined = &mut app_handle => {
            // 服务提前退出
            return match joined {
                Ok(result) => result,
                Err(e) => Err(anyhow::anyhow!("应用任务异常退出: {e}")),
            };
        }
    }

    shutdown_manager.shutdown().await;

    match tokio::time::timeout(Duration::from_secs(30), app_handle).await {
        Ok(Ok(Ok(()))) => info!("应用已优雅关闭"),
        Ok(Ok(Err(e))) => error!("应用关闭时发生错误: {e:#}"),
        Ok(Err(e)) => error!("应用任务异常退出: {e}"),
        Err(_) => warn!("应用关闭超时，强制退出"),
    }

    info!("flint 计算集群已退出");
    Ok(())
}

/// 等待关闭信号
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}
