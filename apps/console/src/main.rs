//! # Telemetry Console
//!
//! 在控制台显示电池包遥测：每收齐一轮模块电压/温度就打印一次汇总面板。
//!
//! ```bash
//! # 监控默认接口（配置文件或 vcan0）
//! telemetry-console monitor
//!
//! # 指定接口并打开调试日志
//! telemetry-console --log-level debug monitor --interface can0
//!
//! # 查看生效配置
//! telemetry-console config show
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod layout;
mod render;

use config::{ConfigCommand, ConsoleConfig};

/// Telemetry Console - 电池包遥测监控工具
#[derive(Parser, Debug)]
#[command(name = "telemetry-console")]
#[command(about = "Console monitor for battery-pack telemetry", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 <config_dir>/telemetry/console.toml）
    #[arg(short = 'c', long = "config", global = true)]
    config_path: Option<PathBuf>,

    /// 日志级别（覆盖默认的 telemetry_console=info）
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 监控 CAN 总线并打印轮次报告
    Monitor {
        /// CAN 接口名称（覆盖配置文件）
        #[arg(short, long)]
        interface: Option<String>,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn init_tracing(log_level: Option<&str>) -> Result<()> {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("telemetry_console=info".parse()?);

    if let Some(level) = log_level {
        filter = filter.add_directive(
            level
                .parse()
                .with_context(|| format!("无效的日志级别: {}", level))?,
        );
    }

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Monitor { interface } => {
            let mut config = ConsoleConfig::load(cli.config_path.as_deref())?;
            if let Some(interface) = interface {
                config.interface = interface;
            }
            monitor(config)
        },

        Commands::Config(cmd) => cmd.execute(cli.config_path.as_deref()),
    }
}

#[cfg(target_os = "linux")]
fn monitor(config: ConsoleConfig) -> Result<()> {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use telemetry_can::SocketCanAdapter;
    use telemetry_driver::TelemetryPipeline;

    let mut pipeline =
        TelemetryPipeline::new(config.pipeline.clone()).context("创建遥测流水线失败")?;

    let mut adapter = SocketCanAdapter::new(&config.interface)
        .with_context(|| format!("打开 CAN 接口失败: {}", config.interface))?;
    adapter
        .set_read_timeout(Duration::from_millis(config.receive_timeout_ms))
        .context("设置接收超时失败")?;

    tracing::info!(
        "Monitoring {} ({} modules), press Ctrl+C to stop",
        config.interface,
        config.pipeline.module_count
    );

    // 设置 Ctrl+C 处理
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::Release);
    })
    .context("设置 Ctrl+C 处理器失败")?;

    let mut renderer = render::ConsoleRenderer::new(std::io::stdout().lock());
    telemetry_driver::run(&mut adapter, &mut pipeline, &mut renderer, &running)?;

    let round = pipeline.round_state();
    if !round.is_empty() && !round.is_completed() {
        tracing::info!(
            "Incomplete round at shutdown: {} of {} modules since module {:?}",
            round.voltage_sample_count(),
            config.pipeline.module_count,
            round.started_at_module()
        );
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn monitor(_config: ConsoleConfig) -> Result<()> {
    anyhow::bail!("SocketCAN monitoring is only supported on Linux")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_monitor() {
        let cli = Cli::try_parse_from([
            "telemetry-console",
            "--log-level",
            "debug",
            "monitor",
            "--interface",
            "can1",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::Monitor { interface } => assert_eq!(interface.as_deref(), Some("can1")),
            other => panic!("Expected Monitor, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_config_show_with_global_flag() {
        let cli =
            Cli::try_parse_from(["telemetry-console", "config", "show", "--config", "/tmp/x.toml"])
                .unwrap();
        assert_eq!(cli.config_path, Some(PathBuf::from("/tmp/x.toml")));
        assert!(matches!(cli.command, Commands::Config(ConfigCommand::Show)));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["telemetry-console"]).is_err());
    }
}
