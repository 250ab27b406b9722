//! ioctl リクエストコードの解析

use libc::c_ulong;

/// galcore の唯一の多重化 ioctl
pub const IOCTL_GCHAL_INTERFACE: c_ulong = 30000;

const IOC_SIZESHIFT: u32 = 16;
const IOC_SIZEMASK: c_ulong = 0x3FFF;

/// 別系統（フレームバッファ系）のプロトコルで、サイズ欄がなくても
/// ポインタ引数を持つリクエストを見分けるためのビットパターン
const FB_ARG_MASK: c_ulong = 0xC000_FF00;
const FB_ARG_MATCH: c_ulong = 0x4000_F700;

/// リクエストコードに埋め込まれたペイロードサイズ（_IOC_SIZE）
pub fn ioc_size(request: c_ulong) -> u32 {
    ((request >> IOC_SIZESHIFT) & IOC_SIZEMASK) as u32
}

/// 追跡対象外の ioctl がポインタ引数を伴うかどうか
pub fn carries_arg(request: c_ulong) -> bool {
    ioc_size(request) != 0 || (request & FB_ARG_MASK) == FB_ARG_MATCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gchal_interface_has_no_size() {
        assert_eq!(ioc_size(IOCTL_GCHAL_INTERFACE), 0);
        assert!(!carries_arg(IOCTL_GCHAL_INTERFACE));
    }

    #[test]
    fn test_ioc_size() {
        // _IOWR('F', 0x10, 24)
        let request: c_ulong = 0xC018_4610;
        assert_eq!(ioc_size(request), 24);
        assert!(carries_arg(request));
        // FIONREAD (0x541B) はサイズを持たない
        assert_eq!(ioc_size(0x541B), 0);
        assert!(!carries_arg(0x541B));
    }

    #[test]
    fn test_framebuffer_pattern() {
        assert!(carries_arg(0x4000_F701));
        assert!(carries_arg(0x4000_F7FF));
        assert!(!carries_arg(0x0000_F701));
    }
}
