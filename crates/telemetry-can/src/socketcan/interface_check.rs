//! CAN 接口状态检查
//!
//! 通过 sysfs（`/sys/class/net/<iface>/flags`）检查接口是否存在且已启动，
//! 只读操作，不需要特殊权限。

use crate::CanError;
use std::fs;
use std::path::Path;
use tracing::trace;

/// IFF_UP 标志位
const IFF_UP: u32 = 0x1;

/// ifr_name 最大长度（IFNAMSIZ - 1）
const MAX_IFACE_NAME_LEN: usize = 15;

/// 检查 CAN 接口是否存在且处于 UP 状态
///
/// # 返回值
/// - `Ok(true)`: 接口存在且 IFF_UP 置位
/// - `Ok(false)`: 接口存在但处于 DOWN 状态
/// - `Err(CanError::Device)`: 接口名无效或接口不存在
/// - `Err(CanError::Io)`: 读取 sysfs 失败
pub fn check_interface_status(interface: &str) -> Result<bool, CanError> {
    check_interface_status_in(Path::new("/sys/class/net"), interface)
}

fn check_interface_status_in(sysfs_net: &Path, interface: &str) -> Result<bool, CanError> {
    if interface.is_empty() || interface.len() > MAX_IFACE_NAME_LEN {
        return Err(CanError::Device(format!(
            "Invalid interface name '{}' (1-{} characters)",
            interface, MAX_IFACE_NAME_LEN
        )));
    }

    if interface.contains(['/', '\0']) {
        return Err(CanError::Device(format!(
            "Invalid interface name '{}'",
            interface
        )));
    }

    let iface_dir = sysfs_net.join(interface);
    if !iface_dir.exists() {
        return Err(CanError::Device(format!(
            "CAN interface '{}' does not exist. Please create it first:\n  sudo ip link add dev {} type vcan",
            interface, interface
        )));
    }

    let raw = fs::read_to_string(iface_dir.join("flags"))?;
    let flags = parse_flags(&raw).ok_or_else(|| {
        CanError::Device(format!(
            "Unexpected flags value for '{}': {:?}",
            interface,
            raw.trim()
        ))
    })?;

    let is_up = flags & IFF_UP != 0;
    trace!(
        "Interface '{}' flags=0x{:X}, up={}",
        interface, flags, is_up
    );
    Ok(is_up)
}

/// 解析 sysfs 中形如 `0x1003` 的标志值
fn parse_flags(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))?;
    u32::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_sysfs(name: &str, flags: &str) -> TempDir {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(name);
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("flags"), flags).unwrap();
        root
    }

    #[test]
    fn test_parse_flags() {
        assert_eq!(parse_flags("0x1003\n"), Some(0x1003));
        assert_eq!(parse_flags("0X80"), Some(0x80));
        assert_eq!(parse_flags("1003"), None);
        assert_eq!(parse_flags("0xZZ"), None);
    }

    #[test]
    fn test_interface_up() {
        let root = fake_sysfs("vcanup", "0xc1\n");
        assert!(check_interface_status_in(root.path(), "vcanup").unwrap());
    }

    #[test]
    fn test_interface_down() {
        let root = fake_sysfs("vcandown", "0x80\n");
        assert!(!check_interface_status_in(root.path(), "vcandown").unwrap());
    }

    #[test]
    fn test_interface_missing() {
        let root = fake_sysfs("present", "0x1");
        let err = check_interface_status_in(root.path(), "absent0").unwrap_err();
        assert!(matches!(err, CanError::Device(msg) if msg.contains("does not exist")));
    }

    #[test]
    fn test_unexpected_flags_value() {
        let root = fake_sysfs("vcanbad", "up\n");
        let err = check_interface_status_in(root.path(), "vcanbad").unwrap_err();
        assert!(matches!(err, CanError::Device(msg) if msg.contains("Unexpected flags")));
    }

    #[test]
    fn test_interface_name_too_long() {
        let err = check_interface_status("a_really_long_interface_name").unwrap_err();
        assert!(matches!(err, CanError::Device(_)));
    }

    #[test]
    fn test_interface_name_with_slash() {
        let err = check_interface_status("../etc").unwrap_err();
        assert!(matches!(err, CanError::Device(_)));
    }
}
