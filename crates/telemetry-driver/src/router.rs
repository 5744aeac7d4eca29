//! 帧路由
//!
//! 按 CAN ID 决定一帧的去向。路由本身无状态，
//! 电池帧的门控标志由流水线传入。

use telemetry_protocol::FrameKind;

/// 路由结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDisposition {
    /// 在排除列表中，不解码
    Excluded,
    /// 电池帧，上一轮报告尚未消费，丢弃
    Gated,
    /// 无处理器，静默忽略
    Unhandled,
    /// 交给对应处理器
    Dispatch(FrameKind),
}

/// 帧路由器
#[derive(Debug, Clone, Default)]
pub struct FrameRouter {
    excluded_ids: Vec<u32>,
}

impl FrameRouter {
    pub fn new(excluded_ids: Vec<u32>) -> Self {
        Self { excluded_ids }
    }

    pub fn excluded_ids(&self) -> &[u32] {
        &self.excluded_ids
    }

    pub fn is_excluded(&self, id: u32) -> bool {
        self.excluded_ids.contains(&id)
    }

    /// 分类一帧
    ///
    /// 排除列表优先于其他规则。`round_pending` 为真时电池 VT 帧被门控。
    pub fn classify(&self, id: u32, round_pending: bool) -> FrameDisposition {
        if self.is_excluded(id) {
            return FrameDisposition::Excluded;
        }

        match FrameKind::from_id(id) {
            FrameKind::BatteryVt if round_pending => FrameDisposition::Gated,
            kind if kind.is_handled() => FrameDisposition::Dispatch(kind),
            _ => FrameDisposition::Unhandled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry_protocol::{
        ID_AUX_DCDC_VC, ID_BATTERY_VT, ID_FAULT, ID_SOLAR_DATA_FRONT, ID_UNIDENTIFIED,
    };

    #[test]
    fn test_excluded_id() {
        let router = FrameRouter::new(vec![ID_UNIDENTIFIED]);
        assert_eq!(
            router.classify(ID_UNIDENTIFIED, false),
            FrameDisposition::Excluded
        );
    }

    #[test]
    fn test_exclusion_wins_over_handler() {
        let router = FrameRouter::new(vec![ID_AUX_DCDC_VC]);
        assert_eq!(
            router.classify(ID_AUX_DCDC_VC, false),
            FrameDisposition::Excluded
        );
    }

    #[test]
    fn test_battery_gate() {
        let router = FrameRouter::new(vec![]);
        assert_eq!(
            router.classify(ID_BATTERY_VT, false),
            FrameDisposition::Dispatch(FrameKind::BatteryVt)
        );
        assert_eq!(router.classify(ID_BATTERY_VT, true), FrameDisposition::Gated);
        // 门控只影响电池帧
        assert_eq!(
            router.classify(ID_FAULT, true),
            FrameDisposition::Dispatch(FrameKind::Fault)
        );
    }

    #[test]
    fn test_unhandled_ids() {
        let router = FrameRouter::default();
        assert_eq!(router.classify(0x7FF, false), FrameDisposition::Unhandled);
        assert_eq!(
            router.classify(ID_SOLAR_DATA_FRONT, false),
            FrameDisposition::Unhandled
        );
        // 未排除时 ID 25 也只是没有处理器
        assert_eq!(
            router.classify(ID_UNIDENTIFIED, false),
            FrameDisposition::Unhandled
        );
    }
}
