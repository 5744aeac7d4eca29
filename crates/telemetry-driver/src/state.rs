//! 辅助遥测状态
//!
//! 保存与电池轮次无关的最新车辆遥测：驾驶控制、灯光、电池包总电压/电流、
//! 电机控制器和辅助/DCDC 电源。每条记录只保留最近一次的值。

use telemetry_protocol::{
    AuxDcdcVc, BatteryAggregateVc, CruiseTarget, DriveDirection, DriveOutput, LightsState,
    MotorControllerVc, MotorVelocity,
};

/// 驾驶控制事件状态
///
/// 报告发出后重置为默认值（空挡、无油门、巡航与刹车关闭）。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriverControls {
    /// 油门原始值
    pub throttle: u16,
    pub direction: DriveDirection,
    pub cruise_control: bool,
    pub mechanical_brake: bool,
    /// 巡航目标速度原始值
    pub cruise_target: i16,
    /// 车速（km/h）
    pub velocity_kmh: f64,
}

/// 电池包总电压/电流
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackAggregate {
    /// 总电压（V）
    pub voltage: f64,
    /// 总电流（A）
    pub current: f64,
}

/// 电机控制器原始读数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorControllerState {
    pub voltage_1: u16,
    pub current_1: u16,
    pub voltage_2: u16,
    pub current_2: u16,
}

/// 辅助电源与 DCDC
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuxDcdcState {
    pub aux_voltage: f64,
    pub aux_current: f64,
    pub dcdc_voltage: f64,
    pub dcdc_current: f64,
}

/// 最近一次灯光状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightsStatus {
    pub light_id: u8,
    pub light_state: u8,
}

/// 辅助遥测汇总
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuxiliaryTelemetry {
    pub controls: DriverControls,
    /// 尚未收到灯光帧时为 `None`
    pub lights: Option<LightsStatus>,
    pub pack: PackAggregate,
    pub motor_controller: MotorControllerState,
    pub aux_dcdc: AuxDcdcState,
}

impl AuxiliaryTelemetry {
    pub fn apply_drive_output(&mut self, frame: &DriveOutput) {
        self.controls.throttle = frame.throttle;
        self.controls.direction = frame.direction;
        self.controls.cruise_control = frame.cruise_control();
        self.controls.mechanical_brake = frame.mechanical_brake();
    }

    pub fn apply_cruise_target(&mut self, frame: &CruiseTarget) {
        self.controls.cruise_target = frame.target_speed;
    }

    pub fn apply_motor_velocity(&mut self, frame: &MotorVelocity) {
        self.controls.velocity_kmh = frame.speed_kmh();
    }

    pub fn apply_lights(&mut self, frame: &LightsState) {
        self.lights = Some(LightsStatus {
            light_id: frame.light_id,
            light_state: frame.light_state,
        });
    }

    pub fn apply_pack_aggregate(&mut self, frame: &BatteryAggregateVc) {
        self.pack = PackAggregate {
            voltage: frame.voltage(),
            current: frame.current(),
        };
    }

    pub fn apply_motor_controller(&mut self, frame: &MotorControllerVc) {
        self.motor_controller = MotorControllerState {
            voltage_1: frame.voltage_1,
            current_1: frame.current_1,
            voltage_2: frame.voltage_2,
            current_2: frame.current_2,
        };
    }

    pub fn apply_aux_dcdc(&mut self, frame: &AuxDcdcVc) {
        self.aux_dcdc = AuxDcdcState {
            aux_voltage: frame.aux_voltage(),
            aux_current: frame.aux_current(),
            dcdc_voltage: frame.dcdc_voltage(),
            dcdc_current: frame.dcdc_current(),
        };
    }

    /// 重置驾驶控制事件状态
    ///
    /// 电源、电机控制器和灯光读数保持不变。
    pub fn reset_events(&mut self) {
        self.controls = DriverControls::default();
    }
}
