use crate::hal::{HalCommand, HardwareType};
use crate::payload::Payload;
use std::mem::size_of;

/// ペイロード領域の大きさ（u64単位）
pub const PAYLOAD_WORDS: usize = 32;

/// ioctl の引数（DRIVER_ARGS）
///
/// 入力バッファと出力バッファは同じ `HalInterface` を指していなければならない。
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverArgs {
    pub input_buffer: u64,
    pub input_buffer_size: u64,
    pub output_buffer: u64,
    pub output_buffer_size: u64,
}

impl DriverArgs {
    /// 1つのインターフェースを入出力の両方に使う引数を作る
    pub fn for_interface(interface: *mut HalInterface) -> Self {
        Self {
            input_buffer: interface as u64,
            input_buffer_size: ENVELOPE_SIZE as u64,
            output_buffer: interface as u64,
            output_buffer_size: ENVELOPE_SIZE as u64,
        }
    }
}

/// HALインターフェース（gcsHAL_INTERFACE）
///
/// ドライバはこの構造体をその場で書き換えて応答を返す。
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalInterface {
    pub command: u32,
    pub hardware_type: u32,
    pub status: i32,
    pub reserved: u32,
    pub handle: u64,
    pub pid: u64,
    pub u: [u64; PAYLOAD_WORDS],
}

/// エンベロープのサイズ（DRIVER_ARGS の InputBufferSize/OutputBufferSize と一致すべき値）
pub const ENVELOPE_SIZE: usize = size_of::<HalInterface>();

const _: () = assert!(ENVELOPE_SIZE == 288);
const _: () = assert!(size_of::<DriverArgs>() == 32);

impl HalInterface {
    /// 指定したコマンドとハードウェアで初期化されたインターフェース
    pub fn new(command: HalCommand, hardware: HardwareType) -> Self {
        Self {
            command: command.raw(),
            hardware_type: hardware.raw(),
            ..Self::default()
        }
    }

    /// ペイロード領域を型付きで参照する
    pub fn payload<T: Payload>(&self) -> &T {
        // Payload の実装はサイズとアラインメントが検証済み
        unsafe { &*(self.u.as_ptr() as *const T) }
    }

    /// ペイロード領域を型付きで書き換える
    pub fn payload_mut<T: Payload>(&mut self) -> &mut T {
        unsafe { &mut *(self.u.as_mut_ptr() as *mut T) }
    }

    /// ペイロードを設定したインターフェースを返す
    pub fn with_payload<T: Payload>(mut self, payload: T) -> Self {
        *self.payload_mut::<T>() = payload;
        self
    }
}
