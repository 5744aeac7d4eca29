//! 驱动层错误类型定义

use telemetry_can::CanError;
use telemetry_protocol::ProtocolError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// CAN 驱动错误
    #[error("CAN driver error: {0}")]
    Can(#[from] CanError),

    /// 协议解析错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 模块索引越界
    ///
    /// 拒绝而不是截断或回绕，避免写坏其他模块的状态。
    #[error("Module index {index} out of range (module count: {module_count})")]
    ModuleIndexOutOfRange { index: usize, module_count: usize },

    /// 配置无效
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl DriverError {
    /// 是否只影响当前帧（丢弃该帧后可继续处理）
    pub fn is_per_frame(&self) -> bool {
        matches!(
            self,
            DriverError::Protocol(_) | DriverError::ModuleIndexOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::DriverError;
    use telemetry_can::CanError;
    use telemetry_protocol::ProtocolError;

    #[test]
    fn test_driver_error_display() {
        let driver_error = DriverError::Can(CanError::Timeout);
        let msg = format!("{}", driver_error);
        assert!(msg.contains("Read timeout"), "Can error message: {}", msg);

        let driver_error = DriverError::Protocol(ProtocolError::InvalidLength {
            id: 0x401,
            expected: 6,
            actual: 4,
        });
        let msg = format!("{}", driver_error);
        assert!(
            msg.contains("Invalid frame length"),
            "Protocol error message: {}",
            msg
        );

        let driver_error = DriverError::ModuleIndexOutOfRange {
            index: 36,
            module_count: 36,
        };
        assert_eq!(
            driver_error.to_string(),
            "Module index 36 out of range (module count: 36)"
        );

        let driver_error = DriverError::InvalidConfig("module_count must be > 0".to_string());
        assert_eq!(
            driver_error.to_string(),
            "Invalid config: module_count must be > 0"
        );
    }

    #[test]
    fn test_from_protocol_error() {
        let driver_error: DriverError = ProtocolError::InvalidCanId { id: 0x123 }.into();
        match driver_error {
            DriverError::Protocol(ProtocolError::InvalidCanId { id }) => assert_eq!(id, 0x123),
            other => panic!("Expected Protocol variant, got {:?}", other),
        }
    }

    #[test]
    fn test_is_per_frame() {
        assert!(
            DriverError::ModuleIndexOutOfRange {
                index: 40,
                module_count: 36
            }
            .is_per_frame()
        );
        assert!(DriverError::Protocol(ProtocolError::InvalidCanId { id: 0x7FF }).is_per_frame());
        assert!(!DriverError::Can(CanError::BusOff).is_per_frame());
        assert!(!DriverError::InvalidConfig("x".into()).is_per_frame());
    }
}
