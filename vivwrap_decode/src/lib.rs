//! HALコマンドのデコードテーブル
//!
//! コマンドIDごとに表示名と2つのデコード処理（呼び出し前・呼び出し後）を持つ。
//! 呼び出し前の処理はリクエスト部分 `NAME(HW, field=value, ...)` を、
//! 呼び出し後の処理は ` = result;` と応答の詳細行を書き出す。
//!
//! # 使用例
//!
//! ```
//! use vivwrap_decode::lookup;
//! use vivwrap_proto::{HalCommand, HalInterface, HardwareType};
//!
//! let iface = HalInterface::new(HalCommand::Stall, HardwareType::Hw3D);
//! let command = lookup(iface.command).unwrap();
//! let mut text = String::new();
//! command.pre(HardwareType::Hw3D, &iface, &mut text).unwrap();
//! command.post(HardwareType::Hw3D, &iface, 0, &mut text).unwrap();
//! assert_eq!(text, "STALL(3D) = 0;\n");
//! ```

use libc::c_int;
use std::fmt;
use vivwrap_proto::{HalCommand, HalInterface, HardwareType, Payload};

mod commands;
pub mod format;

use commands::*;

/// デコード処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// ペイロードのスキーマが実装されていないコマンド
    #[error("unsupported command {0}")]
    Unsupported(&'static str),
    #[error("failed to format record")]
    Format(#[from] fmt::Error),
}

/// デコード対象の1回の呼び出し
pub struct Call<'a> {
    pub name: &'static str,
    pub hardware: HardwareType,
    pub interface: &'a HalInterface,
}

impl Call<'_> {
    pub fn payload<T: Payload>(&self) -> &T {
        self.interface.payload::<T>()
    }
}

/// コマンドごとのデコード処理
///
/// オーバーライドしないメソッドは `unknown` になり、そのコマンドは
/// 未対応として扱われる（呼び出しはドライバに転送されない）。
pub trait Decode: Sync {
    /// 呼び出し前（リクエスト）
    fn pre(&self, call: &Call<'_>, out: &mut dyn fmt::Write) -> Result<(), DecodeError> {
        let _ = out;
        unknown(call)
    }

    /// 呼び出し後（リクエスト＋応答）
    fn post(
        &self,
        call: &Call<'_>,
        result: c_int,
        out: &mut dyn fmt::Write,
    ) -> Result<(), DecodeError> {
        let _ = (result, out);
        unknown(call)
    }
}

/// 常に失敗する既定のデコード処理
pub fn unknown(call: &Call<'_>) -> Result<(), DecodeError> {
    Err(DecodeError::Unsupported(call.name))
}

/// 何も書かずに成功するデコード処理
pub fn empty() -> Result<(), DecodeError> {
    Ok(())
}

/// デコード処理を持たないコマンド
pub struct Unknown;

impl Decode for Unknown {}

/// コマンド記述子
pub struct Command {
    pub id: HalCommand,
    pub name: &'static str,
    decoder: &'static dyn Decode,
}

impl Command {
    const fn new(id: HalCommand, decoder: &'static dyn Decode) -> Self {
        Self {
            id,
            name: id.name(),
            decoder,
        }
    }

    pub fn pre(
        &self,
        hardware: HardwareType,
        interface: &HalInterface,
        out: &mut dyn fmt::Write,
    ) -> Result<(), DecodeError> {
        let call = self.call(hardware, interface);
        self.decoder.pre(&call, out)
    }

    pub fn post(
        &self,
        hardware: HardwareType,
        interface: &HalInterface,
        result: c_int,
        out: &mut dyn fmt::Write,
    ) -> Result<(), DecodeError> {
        let call = self.call(hardware, interface);
        self.decoder.post(&call, result, out)
    }

    fn call<'a>(&self, hardware: HardwareType, interface: &'a HalInterface) -> Call<'a> {
        Call {
            name: self.name,
            hardware,
            interface,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

static COMMANDS: [Command; HalCommand::COUNT] = [
    Command::new(HalCommand::QueryVideoMemory, &QueryVideoMemory),
    Command::new(HalCommand::QueryChipIdentity, &QueryChipIdentity),
    Command::new(HalCommand::AllocateNonPagedMemory, &AllocateSystemMemory),
    Command::new(HalCommand::FreeNonPagedMemory, &FreeSystemMemory),
    Command::new(HalCommand::AllocateContiguousMemory, &AllocateSystemMemory),
    Command::new(HalCommand::FreeContiguousMemory, &FreeSystemMemory),
    Command::new(HalCommand::AllocateVideoMemory, &AllocateVideoMemory),
    Command::new(HalCommand::AllocateLinearVideoMemory, &AllocateLinearVideoMemory),
    Command::new(HalCommand::ReleaseVideoMemory, &ReleaseVideoMemory),
    Command::new(HalCommand::MapMemory, &MapMemory),
    Command::new(HalCommand::UnmapMemory, &UnmapMemory),
    Command::new(HalCommand::MapUserMemory, &MapUserMemory),
    Command::new(HalCommand::UnmapUserMemory, &UnmapUserMemory),
    Command::new(HalCommand::LockVideoMemory, &LockVideoMemory),
    Command::new(HalCommand::UnlockVideoMemory, &UnlockVideoMemory),
    Command::new(HalCommand::EventCommit, &EventCommit),
    Command::new(HalCommand::UserSignal, &UserSignal),
    Command::new(HalCommand::Signal, &Unknown),
    Command::new(HalCommand::WriteData, &WriteData),
    Command::new(HalCommand::Commit, &Commit),
    Command::new(HalCommand::Stall, &Stall),
    Command::new(HalCommand::ReadRegister, &ReadRegister),
    Command::new(HalCommand::WriteRegister, &WriteRegister),
    Command::new(HalCommand::GetProfileSetting, &Unknown),
    Command::new(HalCommand::SetProfileSetting, &Unknown),
    Command::new(HalCommand::ReadAllProfileRegisters, &Unknown),
    Command::new(HalCommand::ProfileRegisters2D, &Unknown),
    Command::new(HalCommand::ReadProfilerRegisterSetting, &Unknown),
    Command::new(HalCommand::SetPowerManagementState, &SetPowerManagementState),
    Command::new(HalCommand::QueryPowerManagementState, &QueryPowerManagementState),
    Command::new(HalCommand::GetBaseAddress, &GetBaseAddress),
    Command::new(HalCommand::SetIdle, &Unknown),
    Command::new(HalCommand::QueryKernelSettings, &QueryKernelSettings),
    Command::new(HalCommand::Reset, &Unknown),
    Command::new(HalCommand::MapPhysical, &Unknown),
    Command::new(HalCommand::Debug, &Unknown),
    Command::new(HalCommand::Cache, &Cache),
    Command::new(HalCommand::Timestamp, &TimeStamp),
    Command::new(HalCommand::Database, &Unknown),
    Command::new(HalCommand::Version, &Version),
    Command::new(HalCommand::ChipInfo, &ChipInfo),
    Command::new(HalCommand::Attach, &Attach),
    Command::new(HalCommand::Detach, &Detach),
    Command::new(HalCommand::Compose, &Unknown),
    Command::new(HalCommand::SetTimeout, &Unknown),
    Command::new(HalCommand::GetFrameInfo, &Unknown),
    Command::new(HalCommand::GetSharedInfo, &Unknown),
    Command::new(HalCommand::SetSharedInfo, &Unknown),
    Command::new(HalCommand::QueryCommandBuffer, &Unknown),
    Command::new(HalCommand::CommitDone, &Unknown),
    Command::new(HalCommand::DumpGpuState, &Unknown),
    Command::new(HalCommand::DumpEvent, &Unknown),
    Command::new(HalCommand::AllocateVirtualCommandBuffer, &Unknown),
    Command::new(HalCommand::FreeVirtualCommandBuffer, &Unknown),
    Command::new(HalCommand::SetFscaleValue, &Unknown),
    Command::new(HalCommand::GetFscaleValue, &Unknown),
    Command::new(HalCommand::NameVideoMemory, &Unknown),
    Command::new(HalCommand::ImportVideoMemory, &Unknown),
    Command::new(HalCommand::QueryResetTimeStamp, &Unknown),
    Command::new(HalCommand::ReadRegisterEx, &Unknown),
    Command::new(HalCommand::WriteRegisterEx, &Unknown),
    Command::new(HalCommand::SyncPoint, &Unknown),
];

/// コマンドIDから記述子を引く（範囲外は `None`）
pub fn lookup(id: u32) -> Option<&'static Command> {
    COMMANDS.get(usize::try_from(id).ok()?)
}

/// すべての記述子（ID順）
pub fn commands() -> &'static [Command] {
    &COMMANDS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_is_indexed_by_id() {
        for (i, command) in commands().iter().enumerate() {
            assert_eq!(command.id.raw() as usize, i, "{} out of place", command.name);
        }
        assert_eq!(commands().len(), HalCommand::COUNT);
    }

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = commands().iter().map(|c| c.name).collect();
        assert_eq!(names.len(), commands().len());
    }

    #[test]
    fn test_lookup_bounds() {
        assert_eq!(lookup(0).unwrap().name, "QUERY_VIDEO_MEMORY");
        assert_eq!(lookup(61).unwrap().name, "SYNC_POINT");
        assert!(lookup(62).is_none());
        assert!(lookup(u32::MAX).is_none());
    }

    #[test]
    fn test_unknown_command_fails_both_phases() {
        let command = lookup(HalCommand::Signal.raw()).unwrap();
        let iface = HalInterface::new(HalCommand::Signal, HardwareType::Hw3D);
        let mut text = String::new();

        assert_eq!(
            command.pre(HardwareType::Hw3D, &iface, &mut text),
            Err(DecodeError::Unsupported("SIGNAL"))
        );
        assert_eq!(
            command.post(HardwareType::Hw3D, &iface, 0, &mut text),
            Err(DecodeError::Unsupported("SIGNAL"))
        );
        assert!(text.is_empty());
    }

    #[test]
    fn test_unsupported_error_names_command() {
        let err = DecodeError::Unsupported("SET_IDLE");
        assert_eq!(err.to_string(), "unsupported command SET_IDLE");
    }

    #[test]
    fn test_bespoke_decoder_count() {
        let iface = HalInterface::default();
        let supported = commands()
            .iter()
            .filter(|c| c.pre(HardwareType::Hw3D, &iface, &mut String::new()).is_ok())
            .count();
        assert_eq!(supported, 32);
    }
}
