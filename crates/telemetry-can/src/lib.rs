//! # Telemetry CAN Adapter Layer
//!
//! CAN 硬件抽象层，为遥测流水线提供统一的帧来源接口。

use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

// 重新导出 telemetry-protocol 中的 TelemetryFrame
pub use telemetry_protocol::TelemetryFrame;

#[cfg(target_os = "linux")]
pub mod socketcan;

#[cfg(target_os = "linux")]
pub use crate::socketcan::SocketCanAdapter;

/// CAN 适配层统一错误类型
#[derive(Error, Debug)]
pub enum CanError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(String),
    #[error("Read timeout")]
    Timeout,
    #[error("Bus off")]
    BusOff,
}

impl CanError {
    /// 是否可以重试（超时属于正常情况）
    pub fn is_retryable(&self) -> bool {
        matches!(self, CanError::Timeout)
    }
}

/// 帧来源
///
/// 阻塞式逐帧拉取。遥测流水线只接收不发送。
pub trait CanAdapter {
    /// 接收一帧（阻塞直到收到数据帧或超时）
    fn receive(&mut self) -> Result<TelemetryFrame, CanError>;

    /// 设置接收超时
    fn set_receive_timeout(&mut self, _timeout: Duration) {}

    /// 带超时的接收
    fn receive_timeout(&mut self, timeout: Duration) -> Result<TelemetryFrame, CanError> {
        self.set_receive_timeout(timeout);
        self.receive()
    }

    /// 非阻塞接收
    fn try_receive(&mut self) -> Result<Option<TelemetryFrame>, CanError> {
        match self.receive_timeout(Duration::ZERO) {
            Ok(frame) => Ok(Some(frame)),
            Err(CanError::Timeout) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<A: CanAdapter + ?Sized> CanAdapter for &mut A {
    fn receive(&mut self) -> Result<TelemetryFrame, CanError> {
        (**self).receive()
    }

    fn set_receive_timeout(&mut self, timeout: Duration) {
        (**self).set_receive_timeout(timeout)
    }
}

/// 用户空间接收时间戳（Unix 纪元微秒）
pub fn userspace_timestamp_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
