//! galcore カーネルドライバのHALインターフェースのワイヤフォーマット
//!
//! ベンダーヘッダ（gc_hal_driver.h / gc_hal_enum.h）で定義される構造体と
//! 列挙型をRust側で固定スキーマとして再現する。
//! ポインタやハンドルはすべて64bit整数として運ばれるため、32bit/64bitの
//! どちらのユーザーランドでもレイアウトは同一になる。

#[macro_use]
mod macros;

pub mod hal;
pub mod interface;
pub mod ioctl;
pub mod payload;

pub use hal::{CacheOperation, HalCommand, HardwareType, Pool, PowerState, SurfaceType, UserSignalCommand};
pub use interface::{DriverArgs, HalInterface, ENVELOPE_SIZE, PAYLOAD_WORDS};
pub use ioctl::{carries_arg, ioc_size, IOCTL_GCHAL_INTERFACE};
pub use payload::Payload;

/// ドライバのデバイスノード
pub const DEVICE_PATH: &str = "/dev/galcore";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports_accessible() {
        let _ = HalCommand::QueryVideoMemory;
        let _ = HardwareType::Hw3D;
        let _ = IOCTL_GCHAL_INTERFACE;
        assert_eq!(DEVICE_PATH, "/dev/galcore");
    }
}
