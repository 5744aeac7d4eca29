//! 轮次报告
//!
//! 一轮完成时，把轮次汇总、模块存储快照和辅助遥测组合成一份不可变报告，
//! 交给展示层。

use crate::round::RoundSummary;
use crate::state::AuxiliaryTelemetry;
use crate::store::ModuleSnapshot;
use telemetry_protocol::FaultFrame;

/// 一轮的完整报告
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackReport {
    pub summary: RoundSummary,
    /// 完成时刻的模块存储（包含之前轮次留下的值）
    pub modules: ModuleSnapshot,
    pub auxiliary: AuxiliaryTelemetry,
}

/// 报告接收端（展示层边界）
///
/// 对闭包 `FnMut(&PackReport)` 自动实现。
pub trait ReportSink {
    /// 发布一份报告
    fn publish(&mut self, report: &PackReport);

    /// 收到故障帧（可选，默认忽略）
    fn on_fault(&mut self, _fault: &FaultFrame) {}
}

impl<F> ReportSink for F
where
    F: FnMut(&PackReport),
{
    fn publish(&mut self, report: &PackReport) {
        self(report)
    }
}
