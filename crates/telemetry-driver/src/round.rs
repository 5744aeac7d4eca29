//! 轮次聚合
//!
//! 逐个消费模块电压/温度样本，维护当前轮次的最小/最大/平均值，
//! 并在收齐一轮样本时生成一次 [`RoundSummary`]。
//!
//! # 轮次边界
//!
//! 收到以下任一样本时开始新一轮（重置状态，并以该样本作为唯一数据点）：
//! - 模块编号为 1（正常的第一帧）
//! - 当前轮次尚无电压数据（启动时，或中途接入、1 号模块已经错过）
//! - 上一轮已经完成
//! - 当前轮次已经累计了 N 个电压样本（保证计数不超过 N）
//!
//! # 完成条件
//!
//! 模块编号等于 N，且本轮电压样本数恰好为 N。
//! 样本不足时轮次保持打开，不会超时强制提交。

use crate::DriverError;
use std::time::SystemTime;
use tracing::{debug, trace};

/// 单个模块样本
///
/// `module_index` 是线上的 0 起索引，`module_number()` 是 1 起编号。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleSample {
    module_index: usize,
    voltage: f64,
    temperature: f64,
}

impl ModuleSample {
    /// 创建样本并做边界检查
    pub fn new(
        module_index: usize,
        voltage: f64,
        temperature: f64,
        module_count: usize,
    ) -> Result<Self, DriverError> {
        if module_index >= module_count {
            return Err(DriverError::ModuleIndexOutOfRange {
                index: module_index,
                module_count,
            });
        }

        Ok(Self {
            module_index,
            voltage,
            temperature,
        })
    }

    pub fn module_index(&self) -> usize {
        self.module_index
    }

    /// 1 起模块编号
    pub fn module_number(&self) -> usize {
        self.module_index + 1
    }

    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

/// 极值及其所属模块编号
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extremum {
    pub value: f64,
    /// 1 起模块编号
    pub module: usize,
}

/// 单一信号（电压或温度）的运行统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalStats {
    min: Option<Extremum>,
    max: Option<Extremum>,
    total: f64,
    count: usize,
}

impl SignalStats {
    /// 记录一个值
    ///
    /// 最小值和最大值独立判断，严格小于/大于才替换，相等时保留先到的模块。
    fn record(&mut self, value: f64, module: usize) {
        self.total += value;
        self.count += 1;

        if self.min.is_none_or(|min| value < min.value) {
            self.min = Some(Extremum { value, module });
        }
        if self.max.is_none_or(|max| value > max.value) {
            self.max = Some(Extremum { value, module });
        }
    }

    pub fn min(&self) -> Option<Extremum> {
        self.min
    }

    pub fn max(&self) -> Option<Extremum> {
        self.max
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// 平均值，无样本时为 `None`
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total / self.count as f64)
    }
}

/// 当前轮次状态
///
/// 可在轮次未完成时读取，用于诊断。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundState {
    voltage: SignalStats,
    temperature: SignalStats,
    /// 开启本轮的模块编号
    started_at_module: Option<usize>,
    /// 最近一个样本的模块编号
    last_module: Option<usize>,
    completed: bool,
}

impl RoundState {
    pub fn voltage(&self) -> &SignalStats {
        &self.voltage
    }

    pub fn temperature(&self) -> &SignalStats {
        &self.temperature
    }

    pub fn min_voltage(&self) -> Option<Extremum> {
        self.voltage.min
    }

    pub fn max_voltage(&self) -> Option<Extremum> {
        self.voltage.max
    }

    pub fn min_temp(&self) -> Option<Extremum> {
        self.temperature.min
    }

    pub fn max_temp(&self) -> Option<Extremum> {
        self.temperature.max
    }

    pub fn voltage_sample_count(&self) -> usize {
        self.voltage.count
    }

    pub fn temp_sample_count(&self) -> usize {
        self.temperature.count
    }

    /// 本轮尚未收到任何样本
    pub fn is_empty(&self) -> bool {
        self.voltage.count == 0
    }

    /// 开启本轮的模块编号（中途接入时大于 1）
    pub fn started_at_module(&self) -> Option<usize> {
        self.started_at_module
    }

    pub fn last_module(&self) -> Option<usize> {
        self.last_module
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

/// 一轮完成后的汇总
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundSummary {
    pub min_voltage: Extremum,
    pub max_voltage: Extremum,
    pub avg_voltage: f64,
    /// 没有温度样本超过阈值时为 `None`
    pub min_temp: Option<Extremum>,
    pub max_temp: Option<Extremum>,
    /// 没有温度样本超过阈值时为 0
    pub avg_temp: f64,
    pub voltage_sample_count: usize,
    pub temp_sample_count: usize,
    pub completed_at: SystemTime,
}

impl RoundSummary {
    /// 电压极差（V）
    pub fn voltage_discrepancy(&self) -> f64 {
        self.max_voltage.value - self.min_voltage.value
    }

    /// 温度极差（°C）
    pub fn temp_discrepancy(&self) -> Option<f64> {
        match (self.min_temp, self.max_temp) {
            (Some(min), Some(max)) => Some(max.value - min.value),
            _ => None,
        }
    }
}

/// 轮次聚合器
#[derive(Debug, Clone)]
pub struct RoundAggregator {
    module_count: usize,
    temp_threshold_c: f64,
    state: RoundState,
}

impl RoundAggregator {
    pub fn new(module_count: usize, temp_threshold_c: f64) -> Self {
        Self {
            module_count,
            temp_threshold_c,
            state: RoundState::default(),
        }
    }

    /// 当前（可能未完成的）轮次状态
    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn module_count(&self) -> usize {
        self.module_count
    }

    /// 消费一个样本
    ///
    /// # 返回值
    /// - `Ok(Some(summary))`: 本样本使轮次完成
    /// - `Ok(None)`: 轮次仍在进行
    ///
    /// # 错误
    /// - `DriverError::ModuleIndexOutOfRange`: 样本索引超出本聚合器的模块数，状态不变
    pub fn ingest(&mut self, sample: &ModuleSample) -> Result<Option<RoundSummary>, DriverError> {
        if sample.module_index >= self.module_count {
            return Err(DriverError::ModuleIndexOutOfRange {
                index: sample.module_index,
                module_count: self.module_count,
            });
        }

        let module = sample.module_number();

        if self.is_round_boundary(module) {
            if !self.state.is_empty() && !self.state.completed {
                debug!(
                    "Abandoning incomplete round: started at module {:?}, {} of {} samples",
                    self.state.started_at_module,
                    self.state.voltage.count,
                    self.module_count
                );
            }
            self.state = RoundState {
                started_at_module: Some(module),
                ..RoundState::default()
            };
            trace!("New round started at module {}", module);
        }

        self.state.voltage.record(sample.voltage, module);
        if sample.temperature > self.temp_threshold_c {
            self.state.temperature.record(sample.temperature, module);
        }
        self.state.last_module = Some(module);

        if module == self.module_count && self.state.voltage.count == self.module_count {
            self.state.completed = true;
            let summary = self.summarize();
            if let Some(summary) = &summary {
                debug!(
                    "Round complete: avg {:.3} V, avg {:.3} °C, {} temp samples",
                    summary.avg_voltage, summary.avg_temp, summary.temp_sample_count
                );
            }
            return Ok(summary);
        }

        Ok(None)
    }

    fn is_round_boundary(&self, module: usize) -> bool {
        module == 1
            || self.state.voltage.min.is_none()
            || self.state.completed
            || self.state.voltage.count >= self.module_count
    }

    fn summarize(&self) -> Option<RoundSummary> {
        let voltage = &self.state.voltage;
        let temperature = &self.state.temperature;

        Some(RoundSummary {
            min_voltage: voltage.min?,
            max_voltage: voltage.max?,
            avg_voltage: voltage.average()?,
            min_temp: temperature.min,
            max_temp: temperature.max,
            avg_temp: temperature.average().unwrap_or(0.0),
            voltage_sample_count: voltage.count,
            temp_sample_count: temperature.count,
            completed_at: SystemTime::now(),
        })
    }
}
