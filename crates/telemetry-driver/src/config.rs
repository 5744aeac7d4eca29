//! 流水线配置

use crate::DriverError;
use telemetry_protocol::ID_UNIDENTIFIED;

/// 电池包模块总数
pub const DEFAULT_MODULE_COUNT: usize = 36;

/// 温度噪声下限（°C），不高于该值的温度读数不参与聚合
pub const DEFAULT_TEMP_THRESHOLD_C: f64 = 1.0;

/// Pipeline 配置
///
/// # Example
///
/// ```
/// use telemetry_driver::PipelineConfig;
///
/// // 默认配置：36 个模块，温度阈值 1°C，排除 ID 25
/// let config = PipelineConfig::default();
/// assert_eq!(config.module_count, 36);
///
/// // 自定义配置
/// let config = PipelineConfig {
///     module_count: 12,
///     ..PipelineConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    /// 每轮期望的模块数 N（模块编号 1..=N）
    pub module_count: usize,
    /// 温度噪声下限（°C）
    pub temp_threshold_c: f64,
    /// 从不解码的 CAN ID
    pub excluded_ids: Vec<u32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            module_count: DEFAULT_MODULE_COUNT,
            temp_threshold_c: DEFAULT_TEMP_THRESHOLD_C,
            excluded_ids: vec![ID_UNIDENTIFIED],
        }
    }
}

impl PipelineConfig {
    /// 校验配置
    ///
    /// 模块索引在线上是 u16，因此模块数不能超过 65536。
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.module_count == 0 {
            return Err(DriverError::InvalidConfig(
                "module_count must be > 0".to_string(),
            ));
        }

        if self.module_count > u16::MAX as usize + 1 {
            return Err(DriverError::InvalidConfig(format!(
                "module_count {} exceeds the wire index range",
                self.module_count
            )));
        }

        if !self.temp_threshold_c.is_finite() {
            return Err(DriverError::InvalidConfig(format!(
                "temp_threshold_c must be finite, got {}",
                self.temp_threshold_c
            )));
        }

        Ok(())
    }
}
