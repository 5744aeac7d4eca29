//! # Telemetry Protocol
//!
//! 车辆遥测 CAN 总线协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `ids`: CAN ID 常量定义与分类
//! - `frames`: 各类遥测帧的结构体与解析
//! - `decoder`: 帧解码器（`FrameDecoder` trait 与内置实现）
//!
//! ## 字节序
//!
//! 所有多字节信号均为 Intel (LSB) 低位在前（小端字节序）。

pub mod decoder;
pub mod frames;
pub mod ids;

// 重新导出常用类型
pub use decoder::*;
pub use frames::*;
pub use ids::*;

use thiserror::Error;

/// CAN 2.0 标准帧的统一抽象
///
/// 协议层与硬件层之间的中间类型：
///
/// ```text
/// Protocol Layer (telemetry-protocol)
///     ↓ TryFrom<TelemetryFrame> 解析
/// TelemetryFrame (此类型)
///     ↓ 转换逻辑在 CAN 层实现
/// CAN Layer (telemetry-can)
///     ↓ SocketCAN 适配器
/// Hardware
/// ```
///
/// # 示例
///
/// ```rust
/// use telemetry_protocol::TelemetryFrame;
///
/// let frame = TelemetryFrame::new_standard(0x401, &[1, 2, 3, 4]);
/// assert_eq!(frame.id(), 0x401);
/// assert_eq!(frame.data_slice(), &[1, 2, 3, 4]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelemetryFrame {
    /// CAN ID（标准帧或扩展帧）
    pub id: u32,

    /// 帧数据（固定 8 字节，未使用部分为 0）
    pub data: [u8; 8],

    /// 有效数据长度 (0-8)
    pub len: u8,

    /// 是否为扩展帧（29-bit ID）
    pub is_extended: bool,

    /// 接收时间戳（微秒），0 表示不可用
    pub timestamp_us: u64,
}

impl TelemetryFrame {
    /// 创建标准帧
    pub fn new_standard(id: u16, data: &[u8]) -> Self {
        Self::new(id as u32, data, false)
    }

    /// 创建扩展帧
    pub fn new_extended(id: u32, data: &[u8]) -> Self {
        Self::new(id, data, true)
    }

    fn new(id: u32, data: &[u8], is_extended: bool) -> Self {
        let mut fixed_data = [0u8; 8];
        let len = data.len().min(8);
        fixed_data[..len].copy_from_slice(&data[..len]);

        Self {
            id,
            data: fixed_data,
            len: len as u8,
            is_extended,
            timestamp_us: 0,
        }
    }

    /// 设置接收时间戳
    pub fn with_timestamp(mut self, timestamp_us: u64) -> Self {
        self.timestamp_us = timestamp_us;
        self
    }

    /// 获取数据切片（只包含有效数据）
    pub fn data_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// 获取 CAN ID
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid frame length for CAN ID 0x{id:X}: expected {expected}, got {actual}")]
    InvalidLength {
        id: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid CAN ID: 0x{id:X}")]
    InvalidCanId { id: u32 },
}

/// 小端字节序转 u16
pub fn bytes_to_u16_le(bytes: [u8; 2]) -> u16 {
    u16::from_le_bytes(bytes)
}

/// 小端字节序转 i16
pub fn bytes_to_i16_le(bytes: [u8; 2]) -> i16 {
    i16::from_le_bytes(bytes)
}

/// 小端字节序转 u32
pub fn bytes_to_u32_le(bytes: [u8; 4]) -> u32 {
    u32::from_le_bytes(bytes)
}

/// 小端字节序转 i32
pub fn bytes_to_i32_le(bytes: [u8; 4]) -> i32 {
    i32::from_le_bytes(bytes)
}
