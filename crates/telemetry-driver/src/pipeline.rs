//! 遥测流水线
//!
//! 单线程按到达顺序处理帧：路由 → 解码 → 更新模块存储/轮次聚合/辅助状态。
//! 一轮完成后报告进入待消费状态，消费前后续电池 VT 帧一律丢弃。

use crate::config::PipelineConfig;
use crate::error::DriverError;
use crate::metrics::PipelineStats;
use crate::report::{PackReport, ReportSink};
use crate::round::{ModuleSample, RoundAggregator, RoundState};
use crate::router::{FrameDisposition, FrameRouter};
use crate::state::AuxiliaryTelemetry;
use crate::store::ModuleStore;
use std::sync::atomic::{AtomicBool, Ordering};
use telemetry_can::{CanAdapter, CanError};
use telemetry_protocol::{
    BatteryVt, FaultFrame, FrameDecoder, FrameKind, StaticDecoder, TelemetryFrame,
    TelemetryMessage,
};
use tracing::{debug, error, info, trace, warn};

/// 单帧处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// ID 在排除列表中
    Excluded,
    /// 没有处理器
    Ignored,
    /// 报告未消费，电池帧被丢弃
    Gated,
    /// 故障帧，原样透传
    Fault(FaultFrame),
    /// 已更新对应状态
    Applied(FrameKind),
    /// 本帧使一轮完成，报告待消费
    RoundCompleted,
}

/// 遥测流水线
///
/// 独占全部处理状态：轮次聚合器、模块存储、辅助遥测和待消费报告。
///
/// # Example
///
/// ```
/// use telemetry_driver::{FrameOutcome, PipelineConfig, TelemetryPipeline};
/// use telemetry_protocol::{ID_BATTERY_VT, TelemetryFrame};
///
/// let config = PipelineConfig {
///     module_count: 1,
///     ..PipelineConfig::default()
/// };
/// let mut pipeline = TelemetryPipeline::new(config).unwrap();
///
/// // 模块 1：3.7V，25°C
/// let frame = TelemetryFrame::new_standard(
///     ID_BATTERY_VT as u16,
///     &[0x00, 0x00, 0x88, 0x90, 0xA8, 0x61],
/// );
/// assert_eq!(pipeline.process_frame(&frame).unwrap(), FrameOutcome::RoundCompleted);
///
/// let report = pipeline.take_report().unwrap();
/// assert_eq!(report.summary.voltage_sample_count, 1);
/// assert!(!pipeline.is_round_pending());
/// ```
#[derive(Debug)]
pub struct TelemetryPipeline<D: FrameDecoder = StaticDecoder> {
    config: PipelineConfig,
    decoder: D,
    router: FrameRouter,
    aggregator: RoundAggregator,
    store: ModuleStore,
    auxiliary: AuxiliaryTelemetry,
    pending: Option<PackReport>,
    stats: PipelineStats,
}

impl TelemetryPipeline<StaticDecoder> {
    /// 使用内置解码器创建流水线
    ///
    /// # 错误
    /// - `DriverError::InvalidConfig`: 配置校验失败
    pub fn new(config: PipelineConfig) -> Result<Self, DriverError> {
        Self::with_decoder(config, StaticDecoder)
    }
}

impl<D: FrameDecoder> TelemetryPipeline<D> {
    /// 使用自定义解码器创建流水线
    pub fn with_decoder(config: PipelineConfig, decoder: D) -> Result<Self, DriverError> {
        config.validate()?;

        debug!(
            "Creating telemetry pipeline: {} modules, temp threshold {} °C, excluded {:?}",
            config.module_count, config.temp_threshold_c, config.excluded_ids
        );

        Ok(Self {
            decoder,
            router: FrameRouter::new(config.excluded_ids.clone()),
            aggregator: RoundAggregator::new(config.module_count, config.temp_threshold_c),
            store: ModuleStore::new(config.module_count),
            auxiliary: AuxiliaryTelemetry::default(),
            pending: None,
            stats: PipelineStats::default(),
            config,
        })
    }

    /// 处理一帧
    ///
    /// # 错误
    /// - `DriverError::Protocol`: 已识别的 ID 但数据无法解码，状态不变
    /// - `DriverError::ModuleIndexOutOfRange`: 电池帧模块索引越界，状态不变
    pub fn process_frame(&mut self, frame: &TelemetryFrame) -> Result<FrameOutcome, DriverError> {
        self.stats.frames_received += 1;

        let kind = match self.router.classify(frame.id, self.pending.is_some()) {
            FrameDisposition::Excluded => {
                self.stats.frames_excluded += 1;
                trace!("Excluded frame 0x{:X}", frame.id);
                return Ok(FrameOutcome::Excluded);
            },
            FrameDisposition::Gated => {
                self.stats.gated_drops += 1;
                trace!("Dropping battery frame while round report is pending");
                return Ok(FrameOutcome::Gated);
            },
            FrameDisposition::Unhandled => {
                self.stats.frames_ignored += 1;
                trace!("No handler for frame 0x{:X}", frame.id);
                return Ok(FrameOutcome::Ignored);
            },
            FrameDisposition::Dispatch(kind) => kind,
        };

        let message = match self.decoder.decode(frame) {
            Ok(Some(message)) => message,
            Ok(None) => {
                self.stats.frames_ignored += 1;
                trace!("Decoder has no layout for {:?} frame 0x{:X}", kind, frame.id);
                return Ok(FrameOutcome::Ignored);
            },
            Err(e) => {
                self.stats.decode_errors += 1;
                warn!("Failed to decode {:?} frame: {}", kind, e);
                return Err(e.into());
            },
        };

        self.apply(message)
    }

    fn apply(&mut self, message: TelemetryMessage) -> Result<FrameOutcome, DriverError> {
        let kind = message.kind();

        match message {
            TelemetryMessage::Fault(fault) => {
                self.stats.faults += 1;
                warn!("Fault frame: {:02X?}", fault.data_slice());
                return Ok(FrameOutcome::Fault(fault));
            },
            TelemetryMessage::BatteryVt(vt) => return self.apply_battery(&vt),
            TelemetryMessage::DriveOutput(frame) => self.auxiliary.apply_drive_output(&frame),
            TelemetryMessage::CruiseTarget(frame) => self.auxiliary.apply_cruise_target(&frame),
            TelemetryMessage::LightsState(frame) => self.auxiliary.apply_lights(&frame),
            TelemetryMessage::BatteryAggregate(frame) => {
                self.auxiliary.apply_pack_aggregate(&frame)
            },
            TelemetryMessage::MotorController(frame) => {
                self.auxiliary.apply_motor_controller(&frame)
            },
            TelemetryMessage::MotorVelocity(frame) => self.auxiliary.apply_motor_velocity(&frame),
            TelemetryMessage::AuxDcdc(frame) => self.auxiliary.apply_aux_dcdc(&frame),
        }

        Ok(FrameOutcome::Applied(kind))
    }

    fn apply_battery(&mut self, vt: &BatteryVt) -> Result<FrameOutcome, DriverError> {
        let sample = ModuleSample::new(
            vt.module_index as usize,
            vt.voltage(),
            vt.temperature(),
            self.config.module_count,
        )
        .inspect_err(|e| {
            self.stats.out_of_range += 1;
            warn!("Dropping battery frame: {}", e);
        })?;

        self.store
            .update(sample.module_index(), sample.voltage(), sample.temperature())?;

        let Some(summary) = self.aggregator.ingest(&sample)? else {
            return Ok(FrameOutcome::Applied(FrameKind::BatteryVt));
        };

        self.stats.rounds_completed += 1;
        self.pending = Some(PackReport {
            summary,
            modules: self.store.snapshot(),
            auxiliary: self.auxiliary,
        });
        // 驾驶控制事件已计入本次报告，之后到达的事件归入下一份报告
        self.auxiliary.reset_events();

        Ok(FrameOutcome::RoundCompleted)
    }

    /// 取走待消费报告
    ///
    /// 取走后清除门控标志。没有待消费报告时返回 `None`。
    pub fn take_report(&mut self) -> Option<PackReport> {
        self.pending.take()
    }

    /// 待消费报告（不清除门控）
    pub fn pending_report(&self) -> Option<&PackReport> {
        self.pending.as_ref()
    }

    /// 是否有报告等待消费
    pub fn is_round_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 当前轮次状态
    pub fn round_state(&self) -> &RoundState {
        self.aggregator.state()
    }

    pub fn modules(&self) -> &ModuleStore {
        &self.store
    }

    pub fn auxiliary(&self) -> &AuxiliaryTelemetry {
        &self.auxiliary
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub(crate) fn record_timeout(&mut self) {
        self.stats.rx_timeouts += 1;
    }
}

/// 运行接收循环
///
/// 从 `adapter` 拉取帧交给 `pipeline`，完成的报告立即发布给 `sink` 并消费。
/// 单帧错误只记录日志，不中断循环。
///
/// # 退出条件
/// - `running` 被清除（例如 Ctrl-C 处理器），返回 `Ok(())`
/// - 超时以外的 CAN 错误，返回该错误
pub fn run<A, D, S>(
    adapter: &mut A,
    pipeline: &mut TelemetryPipeline<D>,
    sink: &mut S,
    running: &AtomicBool,
) -> Result<(), DriverError>
where
    A: CanAdapter + ?Sized,
    D: FrameDecoder,
    S: ReportSink + ?Sized,
{
    info!("Telemetry pipeline started");

    let result = loop {
        // Acquire: 看到 false 时同时看到停止方之前的写入
        if !running.load(Ordering::Acquire) {
            trace!("running flag cleared, exiting");
            break Ok(());
        }

        let frame = match adapter.receive() {
            Ok(frame) => frame,
            Err(CanError::Timeout) => {
                pipeline.record_timeout();
                continue;
            },
            Err(e) => {
                error!("CAN receive error: {}", e);
                break Err(DriverError::from(e));
            },
        };

        match pipeline.process_frame(&frame) {
            Ok(FrameOutcome::Fault(fault)) => sink.on_fault(&fault),
            Ok(FrameOutcome::RoundCompleted) => {
                if let Some(report) = pipeline.take_report() {
                    sink.publish(&report);
                }
            },
            Ok(_) => {},
            Err(e) if e.is_per_frame() => {
                debug!("Frame 0x{:X} dropped: {}", frame.id, e);
            },
            Err(e) => break Err(e),
        }
    };

    info!("Telemetry pipeline stopped: {}", pipeline.stats());
    result
}
