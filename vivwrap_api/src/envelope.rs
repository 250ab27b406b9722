//! HALエンベロープの検証

use libc::{c_ulong, c_void};
use std::ptr;
use thiserror::Error;
use vivwrap_decode::{lookup, Command};
use vivwrap_proto::{DriverArgs, HalInterface, HardwareType, ENVELOPE_SIZE, IOCTL_GCHAL_INTERFACE};

/// エンベロープが不正
///
/// どの場合も本物の ioctl は発行されない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("unexpected request code {0:#x} on the galcore descriptor")]
    WrongRequest(c_ulong),
    #[error("null driver arguments")]
    NullArgs,
    #[error("null interface buffer")]
    NullBuffer,
    #[error("input buffer size {0} does not match interface size {}", ENVELOPE_SIZE)]
    InputSize(u64),
    #[error("output buffer size {0} does not match interface size {}", ENVELOPE_SIZE)]
    OutputSize(u64),
    #[error("input buffer {input:#x} differs from output buffer {output:#x}")]
    BufferMismatch { input: u64, output: u64 },
    #[error("unknown hardware type {0}")]
    HardwareType(u32),
    #[error("command id {0} is out of range")]
    UnknownCommand(u32),
}

/// 検証済みのエンベロープ
#[derive(Debug)]
pub struct Envelope {
    pub command: &'static Command,
    pub hardware: HardwareType,
    interface: *mut HalInterface,
}

impl Envelope {
    /// インターフェースの現在の内容を読む
    ///
    /// ドライバが書き換えた後の内容を得るには呼び出し後に読み直す。
    ///
    /// # Safety
    ///
    /// 呼び出し元のバッファがまだ有効でなければならない。
    pub unsafe fn snapshot(&self) -> HalInterface {
        ptr::read_unaligned(self.interface)
    }
}

/// ioctl の引数を検証する
///
/// # Safety
///
/// `arg` が NULL でなければ、`DriverArgs` とそれが指すバッファは読み取り可能でなければならない。
pub unsafe fn validate(request: c_ulong, arg: *mut c_void) -> Result<Envelope, EnvelopeError> {
    if request != IOCTL_GCHAL_INTERFACE {
        return Err(EnvelopeError::WrongRequest(request));
    }
    if arg.is_null() {
        return Err(EnvelopeError::NullArgs);
    }
    let args = ptr::read_unaligned(arg as *const DriverArgs);

    if args.input_buffer == 0 {
        return Err(EnvelopeError::NullBuffer);
    }
    if args.input_buffer_size != ENVELOPE_SIZE as u64 {
        return Err(EnvelopeError::InputSize(args.input_buffer_size));
    }
    if args.output_buffer_size != ENVELOPE_SIZE as u64 {
        return Err(EnvelopeError::OutputSize(args.output_buffer_size));
    }
    if args.input_buffer != args.output_buffer {
        return Err(EnvelopeError::BufferMismatch {
            input: args.input_buffer,
            output: args.output_buffer,
        });
    }

    let interface = args.input_buffer as usize as *mut HalInterface;
    let head = ptr::read_unaligned(interface);
    let hardware = HardwareType::from_raw(head.hardware_type)
        .ok_or(EnvelopeError::HardwareType(head.hardware_type))?;
    let command = lookup(head.command).ok_or(EnvelopeError::UnknownCommand(head.command))?;

    Ok(Envelope {
        command,
        hardware,
        interface,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vivwrap_proto::HalCommand;

    fn check(args: &mut DriverArgs) -> Result<Envelope, EnvelopeError> {
        unsafe { validate(IOCTL_GCHAL_INTERFACE, args as *mut DriverArgs as *mut c_void) }
    }

    #[test]
    fn test_accepts_well_formed_envelope() {
        let mut iface = HalInterface::new(HalCommand::Version, HardwareType::Hw2D);
        let ptr: *mut HalInterface = &mut iface;
        let mut args = DriverArgs::for_interface(ptr);

        let envelope = check(&mut args).unwrap();
        assert_eq!(envelope.command.id, HalCommand::Version);
        assert_eq!(envelope.hardware, HardwareType::Hw2D);
        assert_eq!(unsafe { envelope.snapshot() }, unsafe { *ptr });

        // 読み直すとドライバ側の書き換えが見える
        unsafe { (*ptr).status = -3 };
        assert_eq!(unsafe { envelope.snapshot() }.status, -3);
    }

    #[test]
    fn test_wrong_request() {
        let mut iface = HalInterface::new(HalCommand::Stall, HardwareType::Hw3D);
        let mut args = DriverArgs::for_interface(&mut iface);
        let err = unsafe { validate(30001, &mut args as *mut DriverArgs as *mut c_void) };
        assert_eq!(err.unwrap_err(), EnvelopeError::WrongRequest(30001));
    }

    #[test]
    fn test_null_pointers() {
        let err = unsafe { validate(IOCTL_GCHAL_INTERFACE, ptr::null_mut()) };
        assert_eq!(err.unwrap_err(), EnvelopeError::NullArgs);

        let mut args = DriverArgs {
            input_buffer_size: ENVELOPE_SIZE as u64,
            output_buffer_size: ENVELOPE_SIZE as u64,
            ..DriverArgs::default()
        };
        assert_eq!(check(&mut args).unwrap_err(), EnvelopeError::NullBuffer);
    }

    #[test]
    fn test_size_mismatch() {
        let mut iface = HalInterface::new(HalCommand::Stall, HardwareType::Hw3D);
        let mut args = DriverArgs::for_interface(&mut iface);
        args.input_buffer_size -= 8;
        assert_eq!(
            check(&mut args).unwrap_err(),
            EnvelopeError::InputSize(ENVELOPE_SIZE as u64 - 8)
        );

        let mut args = DriverArgs::for_interface(&mut iface);
        args.output_buffer_size = 0;
        assert_eq!(check(&mut args).unwrap_err(), EnvelopeError::OutputSize(0));
    }

    #[test]
    fn test_buffer_mismatch() {
        let mut iface = HalInterface::new(HalCommand::Stall, HardwareType::Hw3D);
        let mut other = iface;
        let mut args = DriverArgs::for_interface(&mut iface);
        args.output_buffer = &mut other as *mut HalInterface as u64;
        assert!(matches!(
            check(&mut args).unwrap_err(),
            EnvelopeError::BufferMismatch { .. }
        ));
    }

    #[test]
    fn test_hardware_type() {
        for raw in [0, 5, u32::MAX] {
            let mut iface = HalInterface::new(HalCommand::Stall, HardwareType::Hw3D);
            iface.hardware_type = raw;
            let mut args = DriverArgs::for_interface(&mut iface);
            assert_eq!(check(&mut args).unwrap_err(), EnvelopeError::HardwareType(raw));
        }
    }

    #[test]
    fn test_command_out_of_range() {
        let mut iface = HalInterface::new(HalCommand::Stall, HardwareType::VG);
        iface.command = HalCommand::COUNT as u32;
        let mut args = DriverArgs::for_interface(&mut iface);
        assert_eq!(
            check(&mut args).unwrap_err(),
            EnvelopeError::UnknownCommand(HalCommand::COUNT as u32)
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            EnvelopeError::InputSize(280).to_string(),
            "input buffer size 280 does not match interface size 288"
        );
        assert_eq!(
            EnvelopeError::WrongRequest(0x7531).to_string(),
            "unexpected request code 0x7531 on the galcore descriptor"
        );
    }
}
