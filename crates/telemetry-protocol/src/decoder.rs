//! 帧解码器
//!
//! `FrameDecoder` 是 CAN 层原始帧与上层强类型记录之间的边界。
//! 内置的 [`StaticDecoder`] 按固定帧布局解析；需要从外部 schema 加载布局时，
//! 可以自行实现该 trait 并注入到驱动层流水线中。

use crate::frames::*;
use crate::ids::FrameKind;
use crate::{ProtocolError, TelemetryFrame};

/// 已解码的遥测消息
///
/// 每个变体对应一个已注册处理器的 CAN ID。
#[derive(Debug, Clone, Copy)]
pub enum TelemetryMessage {
    Fault(FaultFrame),
    DriveOutput(DriveOutput),
    CruiseTarget(CruiseTarget),
    LightsState(LightsState),
    BatteryVt(BatteryVt),
    BatteryAggregate(BatteryAggregateVc),
    MotorController(MotorControllerVc),
    MotorVelocity(MotorVelocity),
    AuxDcdc(AuxDcdcVc),
}

impl TelemetryMessage {
    /// 消息对应的帧类型
    pub fn kind(&self) -> FrameKind {
        match self {
            TelemetryMessage::Fault(_) => FrameKind::Fault,
            TelemetryMessage::DriveOutput(_) => FrameKind::DriveOutput,
            TelemetryMessage::CruiseTarget(_) => FrameKind::CruiseTarget,
            TelemetryMessage::LightsState(_) => FrameKind::LightsState,
            TelemetryMessage::BatteryVt(_) => FrameKind::BatteryVt,
            TelemetryMessage::BatteryAggregate(_) => FrameKind::BatteryAggregate,
            TelemetryMessage::MotorController(_) => FrameKind::MotorController,
            TelemetryMessage::MotorVelocity(_) => FrameKind::MotorVelocity,
            TelemetryMessage::AuxDcdc(_) => FrameKind::AuxDcdc,
        }
    }
}

/// 帧解码器
pub trait FrameDecoder {
    /// 解码一帧
    ///
    /// # 返回值
    /// - `Ok(Some(msg))`: 已识别并解码
    /// - `Ok(None)`: 该 ID 没有对应的布局
    /// - `Err(_)`: 已识别但数据无法解码
    fn decode(&self, frame: &TelemetryFrame) -> Result<Option<TelemetryMessage>, ProtocolError>;
}

/// 固定帧布局解码器
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDecoder;

impl FrameDecoder for StaticDecoder {
    fn decode(&self, frame: &TelemetryFrame) -> Result<Option<TelemetryMessage>, ProtocolError> {
        let frame = *frame;
        let message = match FrameKind::from_id(frame.id) {
            FrameKind::Fault => TelemetryMessage::Fault(FaultFrame::try_from(frame)?),
            FrameKind::DriveOutput => TelemetryMessage::DriveOutput(DriveOutput::try_from(frame)?),
            FrameKind::CruiseTarget => {
                TelemetryMessage::CruiseTarget(CruiseTarget::try_from(frame)?)
            },
            FrameKind::LightsState => TelemetryMessage::LightsState(LightsState::try_from(frame)?),
            FrameKind::BatteryVt => TelemetryMessage::BatteryVt(BatteryVt::try_from(frame)?),
            FrameKind::BatteryAggregate => {
                TelemetryMessage::BatteryAggregate(BatteryAggregateVc::try_from(frame)?)
            },
            FrameKind::MotorController => {
                TelemetryMessage::MotorController(MotorControllerVc::try_from(frame)?)
            },
            FrameKind::MotorVelocity => {
                TelemetryMessage::MotorVelocity(MotorVelocity::try_from(frame)?)
            },
            FrameKind::AuxDcdc => TelemetryMessage::AuxDcdc(AuxDcdcVc::try_from(frame)?),
            FrameKind::SolarFront | FrameKind::SolarRear | FrameKind::Unknown => return Ok(None),
        };

        Ok(Some(message))
    }
}
