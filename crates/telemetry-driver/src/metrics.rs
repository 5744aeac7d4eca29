//! 流水线计数器
//!
//! 流水线单线程独占，计数器使用普通整数。

use std::fmt;

/// 流水线处理统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineStats {
    /// 收到的帧总数
    pub frames_received: u64,
    /// 命中排除列表的帧
    pub frames_excluded: u64,
    /// 无处理器（未知或未实现）的帧
    pub frames_ignored: u64,
    /// 解码失败的帧
    pub decode_errors: u64,
    /// 模块索引越界的帧
    pub out_of_range: u64,
    /// 报告未消费期间丢弃的电池帧
    pub gated_drops: u64,
    /// 故障帧
    pub faults: u64,
    /// 完成的轮次
    pub rounds_completed: u64,
    /// 接收超时次数
    pub rx_timeouts: u64,
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received={} excluded={} ignored={} decode_errors={} out_of_range={} \
             gated_drops={} faults={} rounds={} timeouts={}",
            self.frames_received,
            self.frames_excluded,
            self.frames_ignored,
            self.decode_errors,
            self.out_of_range,
            self.gated_drops,
            self.faults,
            self.rounds_completed,
            self.rx_timeouts
        )
    }
}
