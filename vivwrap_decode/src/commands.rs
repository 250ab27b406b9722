//! コマンドごとのデコード処理
//!
//! 呼び出し前は `NAME(HW, ...)` まで、呼び出し後は ` = result;` と
//! 応答の詳細行 `\t/* ... */` を書く。呼び出し前に書くものがない
//! コマンドは呼び出し後に行全体を書く。

use crate::format::{
    cache_operation_name, hardware_name, pool_name, power_state_name, surface_name,
    user_signal_name, Hex32, Hex64,
};
use crate::{empty, Call, Decode, DecodeError};
use libc::c_int;
use std::fmt::Write;
use vivwrap_proto::payload as p;
use vivwrap_proto::UserSignalCommand;

/// 引数なしの呼び出し行 `NAME(HW)`
fn bare(call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
    write!(out, "{}({})", call.name, call.hardware)?;
    Ok(())
}

/// ` = result;` とステータス
fn result(call: &Call<'_>, result: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
    writeln!(out, " = {};", result)?;
    if call.interface.status != 0 {
        writeln!(out, "\t/* status = {} */", call.interface.status)?;
    }
    Ok(())
}

pub struct QueryVideoMemory;

impl Decode for QueryVideoMemory {
    fn pre(&self, _call: &Call<'_>, _out: &mut dyn Write) -> Result<(), DecodeError> {
        empty()
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let m = call.payload::<p::QueryVideoMemory>();
        bare(call, out)?;
        result(call, ret, out)?;
        writeln!(
            out,
            "\t/* internal: physical = {}, bytes = {} */",
            Hex64(m.internal_physical),
            m.internal_size
        )?;
        writeln!(
            out,
            "\t/* external: physical = {}, bytes = {} */",
            Hex64(m.external_physical),
            m.external_size
        )?;
        writeln!(
            out,
            "\t/* contiguous: physical = {}, bytes = {} */",
            Hex64(m.contiguous_physical),
            m.contiguous_size
        )?;
        Ok(())
    }
}

pub struct QueryChipIdentity;

impl Decode for QueryChipIdentity {
    fn pre(&self, _call: &Call<'_>, _out: &mut dyn Write) -> Result<(), DecodeError> {
        empty()
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let c = call.payload::<p::QueryChipIdentity>();
        bare(call, out)?;
        result(call, ret, out)?;
        writeln!(
            out,
            "\t/* model = {}, revision = {} */",
            Hex32(c.chip_model),
            Hex32(c.chip_revision)
        )?;
        writeln!(
            out,
            "\t/* features = {}, minor = {} {} {} {} {} */",
            Hex32(c.chip_features),
            Hex32(c.chip_minor_features),
            Hex32(c.chip_minor_features1),
            Hex32(c.chip_minor_features2),
            Hex32(c.chip_minor_features3),
            Hex32(c.chip_minor_features4)
        )?;
        writeln!(
            out,
            "\t/* streams = {}, registers = {}, threads = {}, shader cores = {} */",
            c.stream_count, c.register_max, c.thread_count, c.shader_core_count
        )?;
        writeln!(
            out,
            "\t/* vertex cache = {}, vertex output buffer = {}, pixel pipes = {} */",
            c.vertex_cache_size, c.vertex_output_buffer_size, c.pixel_pipes
        )?;
        writeln!(
            out,
            "\t/* instructions = {}, constants = {}, buffer = {}, varyings = {}, super tile = {} */",
            c.instruction_count, c.num_constants, c.buffer_size, c.varying_count, c.super_tile_mode
        )?;
        Ok(())
    }
}

/// ALLOCATE_NON_PAGED_MEMORY / ALLOCATE_CONTIGUOUS_MEMORY
pub struct AllocateSystemMemory;

impl Decode for AllocateSystemMemory {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let m = call.payload::<p::SystemMemory>();
        write!(out, "{}({}, bytes={})", call.name, call.hardware, m.bytes)?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let m = call.payload::<p::SystemMemory>();
        result(call, ret, out)?;
        writeln!(
            out,
            "\t/* bytes = {}, physical = {}, logical = {} */",
            m.bytes,
            Hex64(m.physical),
            Hex64(m.logical)
        )?;
        Ok(())
    }
}

/// FREE_NON_PAGED_MEMORY / FREE_CONTIGUOUS_MEMORY
pub struct FreeSystemMemory;

impl Decode for FreeSystemMemory {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let m = call.payload::<p::SystemMemory>();
        write!(
            out,
            "{}({}, bytes={}, physical={}, logical={})",
            call.name,
            call.hardware,
            m.bytes,
            Hex64(m.physical),
            Hex64(m.logical)
        )?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        result(call, ret, out)
    }
}

pub struct AllocateVideoMemory;

impl Decode for AllocateVideoMemory {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let v = call.payload::<p::AllocateVideoMemory>();
        write!(
            out,
            "{}({}, width={}, height={}, depth={}, format={}, type={}, pool={})",
            call.name,
            call.hardware,
            v.width,
            v.height,
            v.depth,
            v.format,
            surface_name(v.surface_type),
            pool_name(v.pool)
        )?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let v = call.payload::<p::AllocateVideoMemory>();
        result(call, ret, out)?;
        writeln!(out, "\t/* node = {} */", Hex64(v.node))?;
        Ok(())
    }
}

pub struct AllocateLinearVideoMemory;

impl Decode for AllocateLinearVideoMemory {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let v = call.payload::<p::AllocateLinearVideoMemory>();
        write!(
            out,
            "{}({}, bytes={}, alignment={}, type={}, flag={}, pool={})",
            call.name,
            call.hardware,
            v.bytes,
            v.alignment,
            surface_name(v.surface_type),
            Hex32(v.flag),
            pool_name(v.pool)
        )?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let v = call.payload::<p::AllocateLinearVideoMemory>();
        result(call, ret, out)?;
        writeln!(
            out,
            "\t/* node = {}, bytes = {}, pool = {} */",
            Hex64(v.node),
            v.bytes,
            pool_name(v.pool)
        )?;
        Ok(())
    }
}

pub struct ReleaseVideoMemory;

impl Decode for ReleaseVideoMemory {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let v = call.payload::<p::ReleaseVideoMemory>();
        write!(out, "{}({}, node={})", call.name, call.hardware, Hex64(v.node))?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        result(call, ret, out)
    }
}

pub struct MapMemory;

impl Decode for MapMemory {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let m = call.payload::<p::MapMemory>();
        write!(
            out,
            "{}({}, physical={}, bytes={})",
            call.name,
            call.hardware,
            Hex64(m.physical),
            m.bytes
        )?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let m = call.payload::<p::MapMemory>();
        result(call, ret, out)?;
        writeln!(out, "\t/* logical = {} */", Hex64(m.logical))?;
        Ok(())
    }
}

pub struct UnmapMemory;

impl Decode for UnmapMemory {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let m = call.payload::<p::MapMemory>();
        write!(
            out,
            "{}({}, physical={}, bytes={}, logical={})",
            call.name,
            call.hardware,
            Hex64(m.physical),
            m.bytes,
            Hex64(m.logical)
        )?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        result(call, ret, out)
    }
}

pub struct MapUserMemory;

impl Decode for MapUserMemory {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let m = call.payload::<p::UserMemory>();
        write!(
            out,
            "{}({}, memory={}, physical={}, size={})",
            call.name,
            call.hardware,
            Hex64(m.memory),
            Hex32(m.physical),
            m.size
        )?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let m = call.payload::<p::UserMemory>();
        result(call, ret, out)?;
        writeln!(
            out,
            "\t/* info = {}, address = {} */",
            Hex64(m.info),
            Hex32(m.address)
        )?;
        Ok(())
    }
}

pub struct UnmapUserMemory;

impl Decode for UnmapUserMemory {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let m = call.payload::<p::UserMemory>();
        write!(
            out,
            "{}({}, memory={}, size={}, info={}, address={})",
            call.name,
            call.hardware,
            Hex64(m.memory),
            m.size,
            Hex64(m.info),
            Hex32(m.address)
        )?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        result(call, ret, out)
    }
}

pub struct LockVideoMemory;

impl Decode for LockVideoMemory {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let l = call.payload::<p::LockVideoMemory>();
        write!(
            out,
            "{}({}, node={}, cacheable={})",
            call.name,
            call.hardware,
            Hex64(l.node),
            l.cacheable
        )?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let l = call.payload::<p::LockVideoMemory>();
        result(call, ret, out)?;
        writeln!(
            out,
            "\t/* address = {}, memory = {} */",
            Hex32(l.address),
            Hex64(l.memory)
        )?;
        Ok(())
    }
}

pub struct UnlockVideoMemory;

impl Decode for UnlockVideoMemory {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let u = call.payload::<p::UnlockVideoMemory>();
        write!(
            out,
            "{}({}, node={}, type={}, asynchroneous={})",
            call.name,
            call.hardware,
            Hex64(u.node),
            surface_name(u.surface_type),
            u.asynchroneous
        )?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let u = call.payload::<p::UnlockVideoMemory>();
        result(call, ret, out)?;
        // ドライバが遅延アンロックを要求すると1になる
        writeln!(out, "\t/* asynchroneous = {} */", u.asynchroneous)?;
        Ok(())
    }
}

pub struct EventCommit;

impl Decode for EventCommit {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let e = call.payload::<p::EventCommit>();
        write!(out, "{}({}, queue={})", call.name, call.hardware, Hex64(e.queue))?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        result(call, ret, out)
    }
}

pub struct UserSignal;

impl Decode for UserSignal {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let s = call.payload::<p::UserSignal>();
        write!(
            out,
            "{}({}, command={}",
            call.name,
            call.hardware,
            user_signal_name(s.command)
        )?;
        match UserSignalCommand::from_raw(s.command) {
            Some(UserSignalCommand::Create) => write!(out, ", manual_reset={}", s.manual_reset)?,
            Some(UserSignalCommand::Signal) => write!(out, ", id={}, state={}", s.id, s.state)?,
            Some(UserSignalCommand::Wait) => write!(out, ", id={}, wait={}", s.id, s.wait)?,
            _ => write!(out, ", id={}", s.id)?,
        }
        write!(out, ")")?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let s = call.payload::<p::UserSignal>();
        result(call, ret, out)?;
        if s.command == UserSignalCommand::Create.raw() {
            writeln!(out, "\t/* id = {} */", s.id)?;
        }
        Ok(())
    }
}

pub struct WriteData;

impl Decode for WriteData {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let w = call.payload::<p::WriteData>();
        write!(
            out,
            "{}({}, address={}, data={})",
            call.name,
            call.hardware,
            Hex32(w.address),
            Hex32(w.data)
        )?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        result(call, ret, out)
    }
}

pub struct Commit;

impl Decode for Commit {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let c = call.payload::<p::Commit>();
        write!(
            out,
            "{}({}, context={}, command_buffer={}, delta={}, queue={})",
            call.name,
            call.hardware,
            Hex64(c.context),
            Hex64(c.command_buffer),
            Hex64(c.delta),
            Hex64(c.queue)
        )?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        result(call, ret, out)
    }
}

pub struct Stall;

impl Decode for Stall {
    fn pre(&self, _call: &Call<'_>, _out: &mut dyn Write) -> Result<(), DecodeError> {
        empty()
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        bare(call, out)?;
        result(call, ret, out)
    }
}

pub struct ReadRegister;

impl Decode for ReadRegister {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let r = call.payload::<p::Register>();
        write!(out, "{}({}, address={})", call.name, call.hardware, Hex32(r.address))?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let r = call.payload::<p::Register>();
        result(call, ret, out)?;
        writeln!(out, "\t/* data = {} */", Hex32(r.data))?;
        Ok(())
    }
}

pub struct WriteRegister;

impl Decode for WriteRegister {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let r = call.payload::<p::Register>();
        write!(
            out,
            "{}({}, address={}, data={})",
            call.name,
            call.hardware,
            Hex32(r.address),
            Hex32(r.data)
        )?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        result(call, ret, out)
    }
}

pub struct SetPowerManagementState;

impl Decode for SetPowerManagementState {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let s = call.payload::<p::PowerManagementState>();
        write!(
            out,
            "{}({}, state={})",
            call.name,
            call.hardware,
            power_state_name(s.state)
        )?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        result(call, ret, out)
    }
}

pub struct QueryPowerManagementState;

impl Decode for QueryPowerManagementState {
    fn pre(&self, _call: &Call<'_>, _out: &mut dyn Write) -> Result<(), DecodeError> {
        empty()
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let s = call.payload::<p::PowerManagementState>();
        bare(call, out)?;
        result(call, ret, out)?;
        writeln!(
            out,
            "\t/* state = {}, idle = {} */",
            power_state_name(s.state),
            s.is_idle
        )?;
        Ok(())
    }
}

pub struct GetBaseAddress;

impl Decode for GetBaseAddress {
    fn pre(&self, _call: &Call<'_>, _out: &mut dyn Write) -> Result<(), DecodeError> {
        empty()
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let b = call.payload::<p::GetBaseAddress>();
        bare(call, out)?;
        result(call, ret, out)?;
        writeln!(out, "\t/* base_address = {} */", Hex32(b.base_address))?;
        Ok(())
    }
}

pub struct QueryKernelSettings;

impl Decode for QueryKernelSettings {
    fn pre(&self, _call: &Call<'_>, _out: &mut dyn Write) -> Result<(), DecodeError> {
        empty()
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let k = call.payload::<p::QueryKernelSettings>();
        bare(call, out)?;
        result(call, ret, out)?;
        writeln!(out, "\t/* real_time = {} */", k.real_time)?;
        Ok(())
    }
}

pub struct Cache;

impl Decode for Cache {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let c = call.payload::<p::Cache>();
        write!(
            out,
            "{}({}, operation={}, process={}, logical={}, bytes={}, node={})",
            call.name,
            call.hardware,
            cache_operation_name(c.operation),
            Hex64(c.process),
            Hex64(c.logical),
            c.bytes,
            Hex64(c.node)
        )?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        result(call, ret, out)
    }
}

pub struct TimeStamp;

impl Decode for TimeStamp {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let t = call.payload::<p::TimeStamp>();
        write!(
            out,
            "{}({}, timer={}, request={})",
            call.name, call.hardware, t.timer, t.request
        )?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let t = call.payload::<p::TimeStamp>();
        result(call, ret, out)?;
        writeln!(out, "\t/* time_delta = {} */", t.time_delta)?;
        Ok(())
    }
}

pub struct Version;

impl Decode for Version {
    fn pre(&self, _call: &Call<'_>, _out: &mut dyn Write) -> Result<(), DecodeError> {
        empty()
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let v = call.payload::<p::Version>();
        bare(call, out)?;
        result(call, ret, out)?;
        writeln!(
            out,
            "\t/* version = {}.{}.{}, build = {} */",
            v.major, v.minor, v.patch, v.build
        )?;
        Ok(())
    }
}

pub struct ChipInfo;

impl Decode for ChipInfo {
    fn pre(&self, _call: &Call<'_>, _out: &mut dyn Write) -> Result<(), DecodeError> {
        empty()
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let c = call.payload::<p::ChipInfo>();
        bare(call, out)?;
        result(call, ret, out)?;
        write!(out, "\t/* count = {}, types =", c.count)?;
        let count = (c.count as usize).min(p::MAX_CHIPS);
        for (i, ty) in c.types[..count].iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(out, "{}{}", sep, hardware_name(*ty))?;
        }
        writeln!(out, " */")?;
        Ok(())
    }
}

pub struct Attach;

impl Decode for Attach {
    fn pre(&self, _call: &Call<'_>, _out: &mut dyn Write) -> Result<(), DecodeError> {
        empty()
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        let a = call.payload::<p::Attach>();
        bare(call, out)?;
        result(call, ret, out)?;
        writeln!(
            out,
            "\t/* context = {}, state_count = {} */",
            Hex64(a.context),
            a.state_count
        )?;
        Ok(())
    }
}

pub struct Detach;

impl Decode for Detach {
    fn pre(&self, call: &Call<'_>, out: &mut dyn Write) -> Result<(), DecodeError> {
        let d = call.payload::<p::Detach>();
        write!(out, "{}({}, context={})", call.name, call.hardware, Hex64(d.context))?;
        Ok(())
    }

    fn post(&self, call: &Call<'_>, ret: c_int, out: &mut dyn Write) -> Result<(), DecodeError> {
        result(call, ret, out)
    }
}
