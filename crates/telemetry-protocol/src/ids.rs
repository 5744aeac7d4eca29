//! CAN ID 常量定义和枚举
//!
//! 定义系统 CAN 总线上所有遥测帧的 ID，并提供 ID 分类功能。

// ============================================================================
// 诊断帧 ID 常量
// ============================================================================

/// 未识别的帧（默认排除列表，从不解码）
pub const ID_UNIDENTIFIED: u32 = 0x019; // 25

/// 故障通道（原样透传，不做结构化解析）
pub const ID_FAULT: u32 = 0x023; // 35

// ============================================================================
// 驾驶控制帧 ID 常量（事件驱动）
// ============================================================================

/// 驾驶输出（油门、方向、定速巡航、机械刹车）
pub const ID_DRIVE_OUTPUT: u32 = 0x248; // 584

/// 定速巡航目标速度
pub const ID_CRUISE_TARGET: u32 = 0x268; // 616

/// 灯光状态
pub const ID_LIGHTS_STATE: u32 = 0x308; // 776

// ============================================================================
// 电池帧 ID 常量
// ============================================================================

/// 电池模块电压/温度（驱动轮次聚合）
pub const ID_BATTERY_VT: u32 = 0x401; // 1025

/// 电池包总电压/总电流
pub const ID_BATTERY_AGGREGATE_VC: u32 = 0x421; // 1057

// ============================================================================
// 动力系统帧 ID 常量
// ============================================================================

/// 电机控制器电压/电流
pub const ID_MOTOR_CONTROLLER_VC: u32 = 0x467; // 1127

/// 电机转速（左/右轮车速）
pub const ID_MOTOR_VELOCITY: u32 = 0x487; // 1159

/// 辅助电源/DCDC 电压电流
pub const ID_AUX_DCDC_VC: u32 = 0x563; // 1379

// ============================================================================
// 太阳能阵列帧 ID 常量（已识别，当前流水线不处理）
// ============================================================================

/// 前阵列模块数据
pub const ID_SOLAR_DATA_FRONT: u32 = 0x5AA; // 1450

/// 后阵列模块数据
pub const ID_SOLAR_DATA_REAR: u32 = 0x5CB; // 1483

// ============================================================================
// ID 分类枚举
// ============================================================================

/// CAN 帧类型分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameKind {
    /// 故障通道
    Fault,
    /// 驾驶输出
    DriveOutput,
    /// 定速巡航目标
    CruiseTarget,
    /// 灯光状态
    LightsState,
    /// 电池模块电压/温度
    BatteryVt,
    /// 电池包总电压/电流
    BatteryAggregate,
    /// 电机控制器电压/电流
    MotorController,
    /// 电机转速
    MotorVelocity,
    /// 辅助电源/DCDC
    AuxDcdc,
    /// 前太阳能阵列
    SolarFront,
    /// 后太阳能阵列
    SolarRear,
    /// 未知类型
    Unknown,
}

impl FrameKind {
    /// 根据 CAN ID 判断帧类型
    pub fn from_id(id: u32) -> Self {
        match id {
            ID_FAULT => FrameKind::Fault,
            ID_DRIVE_OUTPUT => FrameKind::DriveOutput,
            ID_CRUISE_TARGET => FrameKind::CruiseTarget,
            ID_LIGHTS_STATE => FrameKind::LightsState,
            ID_BATTERY_VT => FrameKind::BatteryVt,
            ID_BATTERY_AGGREGATE_VC => FrameKind::BatteryAggregate,
            ID_MOTOR_CONTROLLER_VC => FrameKind::MotorController,
            ID_MOTOR_VELOCITY => FrameKind::MotorVelocity,
            ID_AUX_DCDC_VC => FrameKind::AuxDcdc,
            ID_SOLAR_DATA_FRONT => FrameKind::SolarFront,
            ID_SOLAR_DATA_REAR => FrameKind::SolarRear,
            _ => FrameKind::Unknown,
        }
    }

    /// 当前流水线是否为该类型注册了处理器
    ///
    /// 太阳能阵列帧虽然可以识别，但没有处理器。
    pub fn is_handled(&self) -> bool {
        !matches!(
            self,
            FrameKind::SolarFront | FrameKind::SolarRear | FrameKind::Unknown
        )
    }
}
