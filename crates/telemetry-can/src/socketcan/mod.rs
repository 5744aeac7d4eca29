//! SocketCAN CAN 适配器实现
//!
//! Linux 平台下基于内核 SocketCAN 子系统的帧来源。
//!
//! ## 特性
//!
//! - 支持标准帧和扩展帧
//! - 自动过滤错误帧（Bus Off 除外，会作为错误返回）
//! - 用户空间接收时间戳
//!
//! ## 限制
//!
//! - **仅限 Linux 平台**
//! - **接口配置**：波特率等配置由系统工具（`ip link`）完成，不在应用层设置

use crate::{CanAdapter, CanError, TelemetryFrame, userspace_timestamp_us};
use socketcan::{
    CanError as SocketCanError, CanErrorFrame, CanFrame, CanSocket, EmbeddedFrame, Frame, Socket,
};
use std::io;
use std::time::Duration;
use tracing::{error, trace, warn};

mod interface_check;

use interface_check::check_interface_status;

/// 默认读超时，保证接收循环能及时响应退出信号
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// SocketCAN 适配器
///
/// # 示例
///
/// ```no_run
/// use telemetry_can::{CanAdapter, SocketCanAdapter};
///
/// let mut adapter = SocketCanAdapter::new("vcan0").unwrap();
/// let frame = adapter.receive().unwrap();
/// println!("0x{:X}", frame.id);
/// ```
#[derive(Debug)]
pub struct SocketCanAdapter {
    socket: CanSocket,
    /// 接口名称（如 "can0"）
    interface: String,
    /// 读超时时间
    read_timeout: Duration,
}

impl SocketCanAdapter {
    /// 打开 CAN 接口
    ///
    /// 打开前会检查接口是否存在且处于 UP 状态，并给出修复提示。
    ///
    /// # 错误
    /// - `CanError::Device`: 接口不存在、未启动或无法打开
    /// - `CanError::Io`: 设置超时失败
    pub fn new(interface: impl Into<String>) -> Result<Self, CanError> {
        let interface = interface.into();

        if !check_interface_status(&interface)? {
            return Err(CanError::Device(format!(
                "CAN interface '{}' exists but is not UP. Please start it first:\n  sudo ip link set up {}",
                interface, interface
            )));
        }

        let socket = CanSocket::open(&interface).map_err(|e| {
            CanError::Device(format!("Failed to open CAN interface '{}': {}", interface, e))
        })?;

        let mut adapter = Self {
            socket,
            interface,
            read_timeout: DEFAULT_READ_TIMEOUT,
        };
        adapter.set_read_timeout(DEFAULT_READ_TIMEOUT)?;

        trace!("SocketCAN interface '{}' opened", adapter.interface);
        Ok(adapter)
    }

    /// 获取接口名称
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// 获取读超时时间
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// 设置读超时
    ///
    /// 内核把 0 视为无限阻塞，因此零超时会被提升为 1µs。
    pub fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), CanError> {
        let effective = timeout.max(Duration::from_micros(1));
        self.socket.set_read_timeout(effective).map_err(CanError::Io)?;
        self.read_timeout = timeout;
        Ok(())
    }

    fn read_data_frame(&mut self) -> Result<CanFrame, CanError> {
        loop {
            let can_frame = match self.socket.read_frame() {
                Ok(frame) => frame,
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                    return Err(CanError::Timeout);
                },
                Err(e) => return Err(CanError::Io(e)),
            };

            if !can_frame.is_error_frame() {
                return Ok(can_frame);
            }

            if let Ok(error_frame) = CanErrorFrame::try_from(can_frame) {
                let socketcan_error = SocketCanError::from(error_frame);
                if matches!(socketcan_error, SocketCanError::BusOff) {
                    error!("CAN Bus Off error detected on '{}'", self.interface);
                    return Err(CanError::BusOff);
                }
                warn!("CAN error frame: {}, ignoring", socketcan_error);
            }
        }
    }
}

impl CanAdapter for SocketCanAdapter {
    fn receive(&mut self) -> Result<TelemetryFrame, CanError> {
        let can_frame = self.read_data_frame()?;

        let frame_data = can_frame.data();
        let len = frame_data.len().min(8);
        let mut data = [0u8; 8];
        data[..len].copy_from_slice(&frame_data[..len]);

        let frame = TelemetryFrame {
            id: can_frame.raw_id(),
            data,
            len: len as u8,
            is_extended: can_frame.is_extended(),
            timestamp_us: userspace_timestamp_us(),
        };

        trace!(
            "Received CAN frame: ID=0x{:X}, len={}, timestamp_us={}",
            frame.id, frame.len, frame.timestamp_us
        );
        Ok(frame)
    }

    fn set_receive_timeout(&mut self, timeout: Duration) {
        if let Err(e) = self.set_read_timeout(timeout) {
            warn!("Failed to set receive timeout: {}", e);
        }
    }

    fn receive_timeout(&mut self, timeout: Duration) -> Result<TelemetryFrame, CanError> {
        let old_timeout = self.read_timeout;
        self.set_read_timeout(timeout)?;
        let result = self.receive();
        let _ = self.set_read_timeout(old_timeout);
        result
    }
}
