//! 遥测帧结构体定义
//!
//! 每种 CAN ID 对应一个强类型记录，提供从 `TelemetryFrame` 解析的方法
//! 和物理量转换方法。字段在解析时一次性确定，不依赖信号名称匹配。

use crate::ids::{
    ID_AUX_DCDC_VC, ID_BATTERY_AGGREGATE_VC, ID_BATTERY_VT, ID_CRUISE_TARGET, ID_DRIVE_OUTPUT,
    ID_FAULT, ID_LIGHTS_STATE, ID_MOTOR_CONTROLLER_VC, ID_MOTOR_VELOCITY,
};
use crate::{
    ProtocolError, TelemetryFrame, bytes_to_i16_le, bytes_to_i32_le, bytes_to_u16_le,
    bytes_to_u32_le,
};
use bilge::prelude::*;
use num_enum::{FromPrimitive, IntoPrimitive};

/// 验证 CAN ID 和最小数据长度
fn check_frame(frame: &TelemetryFrame, id: u32, min_len: usize) -> Result<(), ProtocolError> {
    if frame.id != id {
        return Err(ProtocolError::InvalidCanId { id: frame.id });
    }

    if (frame.len as usize) < min_len {
        return Err(ProtocolError::InvalidLength {
            id: frame.id,
            expected: min_len,
            actual: frame.len as usize,
        });
    }

    Ok(())
}

fn u16_at(frame: &TelemetryFrame, offset: usize) -> u16 {
    bytes_to_u16_le([frame.data[offset], frame.data[offset + 1]])
}

fn i16_at(frame: &TelemetryFrame, offset: usize) -> i16 {
    bytes_to_i16_le([frame.data[offset], frame.data[offset + 1]])
}

// ============================================================================
// 驾驶控制
// ============================================================================

/// 行驶方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum DriveDirection {
    /// 空挡
    Neutral = 0x00,
    /// 前进
    Forward = 0x01,
    /// 倒车
    Reverse = 0x02,
    /// 其它（未定义值）
    #[num_enum(default)]
    Other = 0x03,
}

impl Default for DriveDirection {
    fn default() -> Self {
        DriveDirection::Neutral
    }
}

impl DriveDirection {
    /// 显示名称
    pub fn as_str(&self) -> &'static str {
        match self {
            DriveDirection::Neutral => "NEUTRAL",
            DriveDirection::Forward => "FORWARD",
            DriveDirection::Reverse => "REVERSE",
            DriveDirection::Other => "Other",
        }
    }
}

/// 驾驶输出状态位域（Byte 3）
///
/// - Bit 0: 定速巡航（0：关 1：开）
/// - Bit 1: 机械刹车（0：松开 1：踩下）
/// - Bit 2-7: 保留
#[bitsize(8)]
#[derive(FromBits, DebugBits, Clone, Copy, Default)]
pub struct DriveOutputFlags {
    pub cruise_control: bool,   // Bit 0: 定速巡航
    pub mechanical_brake: bool, // Bit 1: 机械刹车
    pub reserved: u6,           // Bit 2-7: 保留
}

/// 驾驶输出 (0x248)
#[derive(Debug, Clone, Copy, Default)]
pub struct DriveOutput {
    pub throttle: u16,             // Byte 0-1: 油门原始值
    pub direction: DriveDirection, // Byte 2: 行驶方向
    pub flags: DriveOutputFlags,   // Byte 3: 状态位
}

impl DriveOutput {
    /// 定速巡航是否开启
    pub fn cruise_control(&self) -> bool {
        self.flags.cruise_control()
    }

    /// 机械刹车是否踩下
    pub fn mechanical_brake(&self) -> bool {
        self.flags.mechanical_brake()
    }
}

impl TryFrom<TelemetryFrame> for DriveOutput {
    type Error = ProtocolError;

    fn try_from(frame: TelemetryFrame) -> Result<Self, Self::Error> {
        check_frame(&frame, ID_DRIVE_OUTPUT, 4)?;

        Ok(Self {
            throttle: u16_at(&frame, 0),
            direction: DriveDirection::from(frame.data[2]),
            flags: DriveOutputFlags::from(u8::new(frame.data[3])),
        })
    }
}

/// 定速巡航目标 (0x268)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CruiseTarget {
    pub target_speed: i16, // Byte 0-1: 目标速度
}

impl TryFrom<TelemetryFrame> for CruiseTarget {
    type Error = ProtocolError;

    fn try_from(frame: TelemetryFrame) -> Result<Self, Self::Error> {
        check_frame(&frame, ID_CRUISE_TARGET, 2)?;

        Ok(Self {
            target_speed: i16_at(&frame, 0),
        })
    }
}

/// 灯光状态 (0x308)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightsState {
    pub light_id: u8,    // Byte 0: 灯光编号
    pub light_state: u8, // Byte 1: 灯光状态
}

impl TryFrom<TelemetryFrame> for LightsState {
    type Error = ProtocolError;

    fn try_from(frame: TelemetryFrame) -> Result<Self, Self::Error> {
        check_frame(&frame, ID_LIGHTS_STATE, 2)?;

        Ok(Self {
            light_id: frame.data[0],
            light_state: frame.data[1],
        })
    }
}

// ============================================================================
// 电池
// ============================================================================

/// 电池模块电压/温度 (0x401)
///
/// 电压单位 100µV，温度单位 0.001°C。模块索引从 0 开始。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatteryVt {
    pub module_index: u16,    // Byte 0-1: 模块索引（0 起）
    pub voltage_raw: u16,     // Byte 2-3: 电压，单位 100µV
    pub temperature_raw: u16, // Byte 4-5: 温度，单位 0.001°C
}

impl BatteryVt {
    /// 模块电压（V）
    pub fn voltage(&self) -> f64 {
        self.voltage_raw as f64 / 10_000.0
    }

    /// 模块温度（°C）
    pub fn temperature(&self) -> f64 {
        self.temperature_raw as f64 / 1_000.0
    }
}

impl TryFrom<TelemetryFrame> for BatteryVt {
    type Error = ProtocolError;

    fn try_from(frame: TelemetryFrame) -> Result<Self, Self::Error> {
        check_frame(&frame, ID_BATTERY_VT, 6)?;

        Ok(Self {
            module_index: u16_at(&frame, 0),
            voltage_raw: u16_at(&frame, 2),
            temperature_raw: u16_at(&frame, 4),
        })
    }
}

/// 电池包总电压/总电流 (0x421)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatteryAggregateVc {
    pub voltage_raw: u32, // Byte 0-3: 总电压，单位 100µV
    pub current_raw: i32, // Byte 4-7: 总电流，单位 µA
}

impl BatteryAggregateVc {
    /// 总电压（V）
    pub fn voltage(&self) -> f64 {
        self.voltage_raw as f64 / 10_000.0
    }

    /// 总电流（A）
    pub fn current(&self) -> f64 {
        self.current_raw as f64 / 1_000_000.0
    }
}

impl TryFrom<TelemetryFrame> for BatteryAggregateVc {
    type Error = ProtocolError;

    fn try_from(frame: TelemetryFrame) -> Result<Self, Self::Error> {
        check_frame(&frame, ID_BATTERY_AGGREGATE_VC, 8)?;

        let voltage_bytes = [frame.data[0], frame.data[1], frame.data[2], frame.data[3]];
        let current_bytes = [frame.data[4], frame.data[5], frame.data[6], frame.data[7]];

        Ok(Self {
            voltage_raw: bytes_to_u32_le(voltage_bytes),
            current_raw: bytes_to_i32_le(current_bytes),
        })
    }
}

// ============================================================================
// 动力系统
// ============================================================================

/// 电机控制器电压/电流 (0x467)
///
/// 两路控制器的原始值，不做单位换算。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorControllerVc {
    pub voltage_1: u16, // Byte 0-1
    pub current_1: u16, // Byte 2-3
    pub voltage_2: u16, // Byte 4-5
    pub current_2: u16, // Byte 6-7
}

impl TryFrom<TelemetryFrame> for MotorControllerVc {
    type Error = ProtocolError;

    fn try_from(frame: TelemetryFrame) -> Result<Self, Self::Error> {
        check_frame(&frame, ID_MOTOR_CONTROLLER_VC, 8)?;

        Ok(Self {
            voltage_1: u16_at(&frame, 0),
            current_1: u16_at(&frame, 2),
            voltage_2: u16_at(&frame, 4),
            current_2: u16_at(&frame, 6),
        })
    }
}

/// 电机转速 (0x487)
///
/// 左右轮车速，单位 cm/s。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotorVelocity {
    pub left: i16,  // Byte 0-1
    pub right: i16, // Byte 2-3
}

impl MotorVelocity {
    /// cm/s → km/h
    pub const CM_PER_S_TO_KMH: f64 = 0.036;

    /// 平均车速（km/h）
    pub fn speed_kmh(&self) -> f64 {
        (self.left as f64 + self.right as f64) / 2.0 * Self::CM_PER_S_TO_KMH
    }
}

impl TryFrom<TelemetryFrame> for MotorVelocity {
    type Error = ProtocolError;

    fn try_from(frame: TelemetryFrame) -> Result<Self, Self::Error> {
        check_frame(&frame, ID_MOTOR_VELOCITY, 4)?;

        Ok(Self {
            left: i16_at(&frame, 0),
            right: i16_at(&frame, 2),
        })
    }
}

/// 辅助电源/DCDC 电压电流 (0x563)
///
/// 所有信号单位均为 0.001（mV / mA）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuxDcdcVc {
    pub aux_voltage_raw: u16,  // Byte 0-1
    pub aux_current_raw: u16,  // Byte 2-3
    pub dcdc_voltage_raw: u16, // Byte 4-5
    pub dcdc_current_raw: u16, // Byte 6-7
}

impl AuxDcdcVc {
    pub fn aux_voltage(&self) -> f64 {
        self.aux_voltage_raw as f64 / 1_000.0
    }

    pub fn aux_current(&self) -> f64 {
        self.aux_current_raw as f64 / 1_000.0
    }

    pub fn dcdc_voltage(&self) -> f64 {
        self.dcdc_voltage_raw as f64 / 1_000.0
    }

    pub fn dcdc_current(&self) -> f64 {
        self.dcdc_current_raw as f64 / 1_000.0
    }
}

impl TryFrom<TelemetryFrame> for AuxDcdcVc {
    type Error = ProtocolError;

    fn try_from(frame: TelemetryFrame) -> Result<Self, Self::Error> {
        check_frame(&frame, ID_AUX_DCDC_VC, 8)?;

        Ok(Self {
            aux_voltage_raw: u16_at(&frame, 0),
            aux_current_raw: u16_at(&frame, 2),
            dcdc_voltage_raw: u16_at(&frame, 4),
            dcdc_current_raw: u16_at(&frame, 6),
        })
    }
}

// ============================================================================
// 故障通道
// ============================================================================

/// 故障帧 (0x023)
///
/// 只做原样透传，供诊断显示，不解释其内容。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultFrame {
    pub data: [u8; 8],
    pub len: u8,
    pub timestamp_us: u64,
}

impl FaultFrame {
    /// 有效数据
    pub fn data_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

impl TryFrom<TelemetryFrame> for FaultFrame {
    type Error = ProtocolError;

    fn try_from(frame: TelemetryFrame) -> Result<Self, Self::Error> {
        check_frame(&frame, ID_FAULT, 0)?;

        Ok(Self {
            data: frame.data,
            len: frame.len,
            timestamp_us: frame.timestamp_us,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(id: u32, data: &[u8]) -> TelemetryFrame {
        TelemetryFrame::new_standard(id as u16, data)
    }

    #[test]
    fn test_drive_direction_from_u8() {
        assert_eq!(DriveDirection::from(0x00), DriveDirection::Neutral);
        assert_eq!(DriveDirection::from(0x01), DriveDirection::Forward);
        assert_eq!(DriveDirection::from(0x02), DriveDirection::Reverse);
        assert_eq!(DriveDirection::from(0x03), DriveDirection::Other);
        // 未定义值落入 Other
        assert_eq!(DriveDirection::from(0xFF), DriveDirection::Other);
        assert_eq!(DriveDirection::default(), DriveDirection::Neutral);
        assert_eq!(u8::from(DriveDirection::Reverse), 0x02);
    }

    #[test]
    fn test_drive_output_parse() {
        // throttle = 0x0190 (400), FORWARD, 巡航开 + 刹车踩下
        let f = frame(ID_DRIVE_OUTPUT, &[0x90, 0x01, 0x01, 0b0000_0011]);
        let out = DriveOutput::try_from(f).unwrap();
        assert_eq!(out.throttle, 400);
        assert_eq!(out.direction, DriveDirection::Forward);
        assert!(out.cruise_control());
        assert!(out.mechanical_brake());
    }

    #[test]
    fn test_drive_output_flags_independent() {
        let f = frame(ID_DRIVE_OUTPUT, &[0x00, 0x00, 0x00, 0b0000_0010]);
        let out = DriveOutput::try_from(f).unwrap();
        assert!(!out.cruise_control());
        assert!(out.mechanical_brake());
    }

    #[test]
    fn test_drive_output_short_frame() {
        let f = frame(ID_DRIVE_OUTPUT, &[0x00, 0x00]);
        let err = DriveOutput::try_from(f).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::InvalidLength {
                id: ID_DRIVE_OUTPUT,
                expected: 4,
                actual: 2,
            }
        );
    }

    #[test]
    fn test_wrong_id_rejected() {
        let f = frame(ID_CRUISE_TARGET, &[0; 8]);
        assert!(matches!(
            BatteryVt::try_from(f),
            Err(ProtocolError::InvalidCanId { id: ID_CRUISE_TARGET })
        ));
    }

    #[test]
    fn test_cruise_target_parse_negative() {
        let f = frame(ID_CRUISE_TARGET, &(-5i16).to_le_bytes());
        assert_eq!(CruiseTarget::try_from(f).unwrap().target_speed, -5);
    }

    #[test]
    fn test_battery_vt_scaling() {
        let mut data = Vec::new();
        data.extend_from_slice(&4u16.to_le_bytes()); // 模块索引 4（第 5 号模块）
        data.extend_from_slice(&38_000u16.to_le_bytes()); // 3.8 V
        data.extend_from_slice(&25_500u16.to_le_bytes()); // 25.5 °C
        let vt = BatteryVt::try_from(frame(ID_BATTERY_VT, &data)).unwrap();
        assert_eq!(vt.module_index, 4);
        assert!((vt.voltage() - 3.8).abs() < 1e-9);
        assert!((vt.temperature() - 25.5).abs() < 1e-9);
    }

    #[test]
    fn test_battery_vt_short_frame() {
        let f = frame(ID_BATTERY_VT, &[0, 0, 0, 0]);
        assert!(matches!(
            BatteryVt::try_from(f),
            Err(ProtocolError::InvalidLength { expected: 6, actual: 4, .. })
        ));
    }

    #[test]
    fn test_battery_aggregate_scaling() {
        let mut data = Vec::new();
        data.extend_from_slice(&1_368_000u32.to_le_bytes()); // 136.8 V
        data.extend_from_slice(&(-2_500_000i32).to_le_bytes()); // -2.5 A
        let agg = BatteryAggregateVc::try_from(frame(ID_BATTERY_AGGREGATE_VC, &data)).unwrap();
        assert!((agg.voltage() - 136.8).abs() < 1e-9);
        assert!((agg.current() + 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_motor_controller_raw_values() {
        let data = [1, 0, 2, 0, 3, 0, 4, 0];
        let mc = MotorControllerVc::try_from(frame(ID_MOTOR_CONTROLLER_VC, &data)).unwrap();
        assert_eq!(
            mc,
            MotorControllerVc {
                voltage_1: 1,
                current_1: 2,
                voltage_2: 3,
                current_2: 4,
            }
        );
    }

    #[test]
    fn test_motor_velocity_speed() {
        let mut data = Vec::new();
        data.extend_from_slice(&1000i16.to_le_bytes());
        data.extend_from_slice(&2000i16.to_le_bytes());
        let mv = MotorVelocity::try_from(frame(ID_MOTOR_VELOCITY, &data)).unwrap();
        // (1000 + 2000) / 2 * 0.036 = 54 km/h
        assert!((mv.speed_kmh() - 54.0).abs() < 1e-9);
    }

    #[test]
    fn test_aux_dcdc_scaling() {
        let mut data = Vec::new();
        for raw in [12_500u16, 1_200, 13_800, 3_000] {
            data.extend_from_slice(&raw.to_le_bytes());
        }
        let aux = AuxDcdcVc::try_from(frame(ID_AUX_DCDC_VC, &data)).unwrap();
        assert!((aux.aux_voltage() - 12.5).abs() < 1e-9);
        assert!((aux.aux_current() - 1.2).abs() < 1e-9);
        assert!((aux.dcdc_voltage() - 13.8).abs() < 1e-9);
        assert!((aux.dcdc_current() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_lights_state_parse() {
        let lights = LightsState::try_from(frame(ID_LIGHTS_STATE, &[3, 1])).unwrap();
        assert_eq!(
            lights,
            LightsState {
                light_id: 3,
                light_state: 1,
            }
        );
    }

    #[test]
    fn test_fault_frame_passthrough() {
        let f = frame(ID_FAULT, &[0xDE, 0xAD]).with_timestamp(99);
        let fault = FaultFrame::try_from(f).unwrap();
        assert_eq!(fault.data_slice(), &[0xDE, 0xAD]);
        assert_eq!(fault.timestamp_us, 99);
    }
}
