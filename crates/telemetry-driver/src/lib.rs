//! # Telemetry Driver
//!
//! 电池包遥测处理层，包括：
//! - 帧路由（排除列表与电池帧门控）
//! - 轮次聚合（最小/最大/平均电压与温度及所属模块）
//! - 模块存储（每个模块最近一次读数，跨轮次保留）
//! - 辅助遥测状态与轮次报告
//!
//! # 使用场景
//!
//! [`TelemetryPipeline`] 可以直接逐帧驱动（测试、回放），
//! 也可以配合 [`run`] 与任意 [`telemetry_can::CanAdapter`] 组成接收循环。

pub mod config;
mod error;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod round;
pub mod router;
pub mod state;
pub mod store;

pub use config::{DEFAULT_MODULE_COUNT, DEFAULT_TEMP_THRESHOLD_C, PipelineConfig};
pub use error::DriverError;
pub use metrics::PipelineStats;
pub use pipeline::{FrameOutcome, TelemetryPipeline, run};
pub use report::{PackReport, ReportSink};
pub use round::{Extremum, ModuleSample, RoundAggregator, RoundState, RoundSummary, SignalStats};
pub use router::{FrameDisposition, FrameRouter};
pub use state::{
    AuxDcdcState, AuxiliaryTelemetry, DriverControls, LightsStatus, MotorControllerState,
    PackAggregate,
};
pub use store::{ModuleReading, ModuleSnapshot, ModuleStore};
