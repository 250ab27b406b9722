//! 値の表示形式
//!
//! アドレスとフラグは固定幅の16進、個数とサイズは10進、
//! 列挙値は名前で表示する。既知の集合に含まれない列挙値は `(null)` になる。

use std::fmt;
use vivwrap_proto::{CacheOperation, HardwareType, Pool, PowerState, SurfaceType, UserSignalCommand};

/// 列挙値が既知の集合に含まれないときの表示
pub const NULL_MARKER: &str = "(null)";

/// 32bit値を `0x%08X` で表示する
#[derive(Debug, Clone, Copy)]
pub struct Hex32(pub u32);

impl fmt::Display for Hex32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// 64bit値（ポインタ、ハンドル）を `0x%016X` で表示する
#[derive(Debug, Clone, Copy)]
pub struct Hex64(pub u64);

impl fmt::Display for Hex64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

pub fn hardware_name(raw: u32) -> &'static str {
    HardwareType::from_raw(raw).map_or(NULL_MARKER, HardwareType::name)
}

pub fn pool_name(raw: u32) -> &'static str {
    Pool::from_raw(raw).map_or(NULL_MARKER, Pool::name)
}

pub fn surface_name(raw: u32) -> &'static str {
    SurfaceType::from_raw(raw).map_or(NULL_MARKER, SurfaceType::name)
}

pub fn user_signal_name(raw: u32) -> &'static str {
    UserSignalCommand::from_raw(raw).map_or(NULL_MARKER, UserSignalCommand::name)
}

pub fn power_state_name(raw: u32) -> &'static str {
    PowerState::from_raw(raw).map_or(NULL_MARKER, PowerState::name)
}

pub fn cache_operation_name(raw: u32) -> &'static str {
    CacheOperation::from_raw(raw).map_or(NULL_MARKER, CacheOperation::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_widths() {
        assert_eq!(Hex32(0x1f).to_string(), "0x0000001F");
        assert_eq!(Hex32(u32::MAX).to_string(), "0xFFFFFFFF");
        assert_eq!(Hex64(0xdead_beef).to_string(), "0x00000000DEADBEEF");
    }

    #[test]
    fn test_enum_names_fall_back_to_null_marker() {
        assert_eq!(hardware_name(1), "3D");
        assert_eq!(hardware_name(0), NULL_MARKER);
        assert_eq!(pool_name(6), "SYSTEM");
        assert_eq!(pool_name(42), NULL_MARKER);
        assert_eq!(surface_name(4), "RENDER_TARGET");
        assert_eq!(surface_name(0x100), NULL_MARKER);
        assert_eq!(user_signal_name(3), "WAIT");
        assert_eq!(user_signal_name(6), NULL_MARKER);
        assert_eq!(power_state_name(2), "IDLE");
        assert_eq!(cache_operation_name(0x03), "FLUSH");
        assert_eq!(cache_operation_name(0), NULL_MARKER);
    }
}
