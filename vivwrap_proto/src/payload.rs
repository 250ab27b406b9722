//! コマンドごとのペイロード構造体（gcsHAL_INTERFACE の union u の各メンバ）

use crate::interface::PAYLOAD_WORDS;

/// `HalInterface` のペイロード領域として読み書きできる型
///
/// # Safety
///
/// 実装型は整数フィールドのみからなる `#[repr(C)]` 構造体で、
/// サイズがペイロード領域以下、アラインメントが8以下でなければならない。
/// どのビットパターンも有効な値である必要がある。
pub unsafe trait Payload: Copy {}

macro_rules! payloads {
    ($($ty:ident),+ $(,)?) => {
        $(
            unsafe impl Payload for $ty {}
            const _: () = assert!(
                std::mem::size_of::<$ty>() <= PAYLOAD_WORDS * 8
                    && std::mem::align_of::<$ty>() <= 8
            );
        )+
    };
}

/// QUERY_VIDEO_MEMORY
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryVideoMemory {
    pub internal_physical: u64,
    pub internal_size: u64,
    pub external_physical: u64,
    pub external_size: u64,
    pub contiguous_physical: u64,
    pub contiguous_size: u64,
}

/// QUERY_CHIP_IDENTITY
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryChipIdentity {
    pub chip_model: u32,
    pub chip_revision: u32,
    pub chip_features: u32,
    pub chip_minor_features: u32,
    pub chip_minor_features1: u32,
    pub chip_minor_features2: u32,
    pub chip_minor_features3: u32,
    pub chip_minor_features4: u32,
    pub stream_count: u32,
    pub register_max: u32,
    pub thread_count: u32,
    pub shader_core_count: u32,
    pub vertex_cache_size: u32,
    pub vertex_output_buffer_size: u32,
    pub pixel_pipes: u32,
    pub instruction_count: u32,
    pub num_constants: u32,
    pub buffer_size: u32,
    pub varying_count: u32,
    pub super_tile_mode: u32,
}

/// ALLOCATE/FREE_NON_PAGED_MEMORY と ALLOCATE/FREE_CONTIGUOUS_MEMORY で共通
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemMemory {
    pub bytes: u64,
    pub physical: u64,
    pub logical: u64,
}

/// ALLOCATE_VIDEO_MEMORY
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocateVideoMemory {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub format: u32,
    pub surface_type: u32,
    pub pool: u32,
    pub node: u64,
}

/// ALLOCATE_LINEAR_VIDEO_MEMORY
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocateLinearVideoMemory {
    pub bytes: u32,
    pub alignment: u32,
    pub surface_type: u32,
    pub flag: u32,
    pub pool: u32,
    pub reserved: u32,
    pub node: u64,
}

/// RELEASE_VIDEO_MEMORY
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseVideoMemory {
    pub node: u64,
}

/// MAP_MEMORY / UNMAP_MEMORY
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapMemory {
    pub physical: u64,
    pub bytes: u64,
    pub logical: u64,
}

/// MAP_USER_MEMORY / UNMAP_USER_MEMORY
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserMemory {
    pub memory: u64,
    pub physical: u32,
    pub size: u32,
    pub info: u64,
    pub address: u32,
    pub reserved: u32,
}

/// LOCK_VIDEO_MEMORY
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockVideoMemory {
    pub node: u64,
    pub cacheable: u32,
    pub address: u32,
    pub memory: u64,
}

/// UNLOCK_VIDEO_MEMORY
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnlockVideoMemory {
    pub node: u64,
    pub surface_type: u32,
    pub asynchroneous: u32,
}

/// EVENT_COMMIT
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCommit {
    pub queue: u64,
}

/// USER_SIGNAL
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserSignal {
    pub command: u32,
    pub id: i32,
    pub manual_reset: u32,
    pub wait: u32,
    pub state: u32,
    pub reserved: u32,
}

/// WRITE_DATA
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteData {
    pub address: u32,
    pub data: u32,
}

/// COMMIT
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Commit {
    pub context: u64,
    pub command_buffer: u64,
    pub delta: u64,
    pub queue: u64,
}

/// READ_REGISTER / WRITE_REGISTER
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Register {
    pub address: u32,
    pub data: u32,
}

/// SET/QUERY_POWER_MANAGEMENT_STATE
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowerManagementState {
    pub state: u32,
    pub is_idle: u32,
}

/// GET_BASE_ADDRESS
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetBaseAddress {
    pub base_address: u32,
}

/// QUERY_KERNEL_SETTINGS
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryKernelSettings {
    pub real_time: u32,
}

/// CACHE
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cache {
    pub operation: u32,
    pub reserved: u32,
    pub process: u64,
    pub logical: u64,
    pub bytes: u64,
    pub node: u64,
}

/// TIMESTAMP
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeStamp {
    pub timer: u32,
    pub request: u32,
    pub time_delta: i32,
    pub reserved: u32,
}

/// VERSION
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Version {
    pub major: i32,
    pub minor: i32,
    pub patch: i32,
    pub build: u32,
}

/// CHIP_INFO に載るチップの最大数
pub const MAX_CHIPS: usize = 8;

/// CHIP_INFO
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChipInfo {
    pub count: u32,
    pub types: [u32; MAX_CHIPS],
}

/// ATTACH
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attach {
    pub context: u64,
    pub state_count: u64,
}

/// DETACH
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Detach {
    pub context: u64,
}

payloads!(
    QueryVideoMemory,
    QueryChipIdentity,
    SystemMemory,
    AllocateVideoMemory,
    AllocateLinearVideoMemory,
    ReleaseVideoMemory,
    MapMemory,
    UserMemory,
    LockVideoMemory,
    UnlockVideoMemory,
    EventCommit,
    UserSignal,
    WriteData,
    Commit,
    Register,
    PowerManagementState,
    GetBaseAddress,
    QueryKernelSettings,
    Cache,
    TimeStamp,
    Version,
    ChipInfo,
    Attach,
    Detach,
);
