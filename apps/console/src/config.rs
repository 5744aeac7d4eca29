//! 控制台配置
//!
//! 从 TOML 文件加载接口名称、接收超时和流水线参数。
//! 文件不存在时使用默认值。

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use telemetry_driver::PipelineConfig;

/// 默认 CAN 接口
pub const DEFAULT_INTERFACE: &str = "vcan0";

/// 默认接收超时（毫秒）
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 100;

/// 默认配置文件路径：`<config_dir>/telemetry/console.toml`
pub fn default_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("无法确定配置目录")?;
    path.push("telemetry");
    path.push("console.toml");
    Ok(path)
}

/// 控制台配置
///
/// ```toml
/// interface = "can0"
/// receive_timeout_ms = 100
///
/// [pipeline]
/// module_count = 36
/// temp_threshold_c = 1.0
/// excluded_ids = [25]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// CAN 接口名称
    pub interface: String,
    /// 接收超时（毫秒），决定 Ctrl-C 的响应延迟
    pub receive_timeout_ms: u64,
    pub pipeline: PipelineConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            interface: DEFAULT_INTERFACE.to_string(),
            receive_timeout_ms: DEFAULT_RECEIVE_TIMEOUT_MS,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl ConsoleConfig {
    /// 从指定文件加载
    ///
    /// 文件不存在时返回默认配置；存在但无法解析时报错。
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;

        config
            .pipeline
            .validate()
            .with_context(|| format!("配置无效: {}", path.display()))?;

        Ok(config)
    }

    /// 加载配置：显式路径优先，否则使用默认路径
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load_from(&default_config_path()?),
        }
    }

    /// 序列化为 TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置失败")
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 打印生效的配置
    Show,

    /// 打印默认配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                let config = ConsoleConfig::load(config_path)?;
                print!("{}", config.to_toml()?);
            },
            ConfigCommand::Path => {
                println!("{}", default_config_path()?.display());
            },
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConsoleConfig::load_from(&dir.path().join("console.toml")).unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.interface, "vcan0");
        assert_eq!(config.pipeline.module_count, 36);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let file = write_config(
            r#"
interface = "can1"

[pipeline]
module_count = 12
"#,
        );
        let config = ConsoleConfig::load_from(file.path()).unwrap();
        assert_eq!(config.interface, "can1");
        assert_eq!(config.receive_timeout_ms, DEFAULT_RECEIVE_TIMEOUT_MS);
        assert_eq!(config.pipeline.module_count, 12);
        assert_eq!(config.pipeline.temp_threshold_c, 1.0);
        assert_eq!(config.pipeline.excluded_ids, vec![25]);
    }

    #[test]
    fn test_invalid_pipeline_rejected() {
        let file = write_config("[pipeline]\nmodule_count = 0\n");
        let err = ConsoleConfig::load_from(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("module_count must be > 0"));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let file = write_config("interface = [");
        assert!(ConsoleConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ConsoleConfig {
            interface: "can0".to_string(),
            receive_timeout_ms: 250,
            pipeline: PipelineConfig {
                excluded_ids: vec![25, 1450],
                ..PipelineConfig::default()
            },
        };
        let text = config.to_toml().unwrap();
        let parsed: ConsoleConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_default_config_path_layout() {
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with("telemetry/console.toml"));
        }
    }
}
