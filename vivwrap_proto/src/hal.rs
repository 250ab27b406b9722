//! HALの列挙型（gceHAL_COMMAND_CODES ほか）

hal_enum! {
    /// HALコマンドコード
    ///
    /// 0から始まる密な列挙で、デコードテーブルはこの値で直接引かれる。
    pub enum HalCommand {
        QueryVideoMemory = 0 => "QUERY_VIDEO_MEMORY",
        QueryChipIdentity = 1 => "QUERY_CHIP_IDENTITY",
        AllocateNonPagedMemory = 2 => "ALLOCATE_NON_PAGED_MEMORY",
        FreeNonPagedMemory = 3 => "FREE_NON_PAGED_MEMORY",
        AllocateContiguousMemory = 4 => "ALLOCATE_CONTIGUOUS_MEMORY",
        FreeContiguousMemory = 5 => "FREE_CONTIGUOUS_MEMORY",
        AllocateVideoMemory = 6 => "ALLOCATE_VIDEO_MEMORY",
        AllocateLinearVideoMemory = 7 => "ALLOCATE_LINEAR_VIDEO_MEMORY",
        ReleaseVideoMemory = 8 => "RELEASE_VIDEO_MEMORY",
        MapMemory = 9 => "MAP_MEMORY",
        UnmapMemory = 10 => "UNMAP_MEMORY",
        MapUserMemory = 11 => "MAP_USER_MEMORY",
        UnmapUserMemory = 12 => "UNMAP_USER_MEMORY",
        LockVideoMemory = 13 => "LOCK_VIDEO_MEMORY",
        UnlockVideoMemory = 14 => "UNLOCK_VIDEO_MEMORY",
        EventCommit = 15 => "EVENT_COMMIT",
        UserSignal = 16 => "USER_SIGNAL",
        Signal = 17 => "SIGNAL",
        WriteData = 18 => "WRITE_DATA",
        Commit = 19 => "COMMIT",
        Stall = 20 => "STALL",
        ReadRegister = 21 => "READ_REGISTER",
        WriteRegister = 22 => "WRITE_REGISTER",
        GetProfileSetting = 23 => "GET_PROFILE_SETTING",
        SetProfileSetting = 24 => "SET_PROFILE_SETTING",
        ReadAllProfileRegisters = 25 => "READ_ALL_PROFILE_REGISTERS",
        ProfileRegisters2D = 26 => "PROFILE_REGISTERS_2D",
        ReadProfilerRegisterSetting = 27 => "READ_PROFILER_REGISTER_SETTING",
        SetPowerManagementState = 28 => "SET_POWER_MANAGEMENT_STATE",
        QueryPowerManagementState = 29 => "QUERY_POWER_MANAGEMENT_STATE",
        GetBaseAddress = 30 => "GET_BASE_ADDRESS",
        SetIdle = 31 => "SET_IDLE",
        QueryKernelSettings = 32 => "QUERY_KERNEL_SETTINGS",
        Reset = 33 => "RESET",
        MapPhysical = 34 => "MAP_PHYSICAL",
        Debug = 35 => "DEBUG",
        Cache = 36 => "CACHE",
        Timestamp = 37 => "TIMESTAMP",
        Database = 38 => "DATABASE",
        Version = 39 => "VERSION",
        ChipInfo = 40 => "CHIP_INFO",
        Attach = 41 => "ATTACH",
        Detach = 42 => "DETACH",
        Compose = 43 => "COMPOSE",
        SetTimeout = 44 => "SET_TIMEOUT",
        GetFrameInfo = 45 => "GET_FRAME_INFO",
        GetSharedInfo = 46 => "GET_SHARED_INFO",
        SetSharedInfo = 47 => "SET_SHARED_INFO",
        QueryCommandBuffer = 48 => "QUERY_COMMAND_BUFFER",
        CommitDone = 49 => "COMMIT_DONE",
        DumpGpuState = 50 => "DUMP_GPU_STATE",
        DumpEvent = 51 => "DUMP_EVENT",
        AllocateVirtualCommandBuffer = 52 => "ALLOCATE_VIRTUAL_COMMAND_BUFFER",
        FreeVirtualCommandBuffer = 53 => "FREE_VIRTUAL_COMMAND_BUFFER",
        SetFscaleValue = 54 => "SET_FSCALE_VALUE",
        GetFscaleValue = 55 => "GET_FSCALE_VALUE",
        NameVideoMemory = 56 => "NAME_VIDEO_MEMORY",
        ImportVideoMemory = 57 => "IMPORT_VIDEO_MEMORY",
        QueryResetTimeStamp = 58 => "QUERY_RESET_TIME_STAMP",
        ReadRegisterEx = 59 => "READ_REGISTER_EX",
        WriteRegisterEx = 60 => "WRITE_REGISTER_EX",
        SyncPoint = 61 => "SYNC_POINT",
    }
}

impl HalCommand {
    /// コマンド数（= 最大ID + 1）
    pub const COUNT: usize = HalCommand::ALL.len();
}

hal_enum! {
    /// ハードウェアユニット（gceHARDWARE_TYPE）
    pub enum HardwareType {
        Hw3D = 0x01 => "3D",
        Hw2D = 0x02 => "2D",
        Hw3D2D = 0x03 => "3D2D",
        VG = 0x04 => "VG",
    }
}

hal_enum! {
    /// メモリプール（gcePOOL）
    pub enum Pool {
        Unknown = 0 => "UNKNOWN",
        Default = 1 => "DEFAULT",
        Local = 2 => "LOCAL",
        LocalInternal = 3 => "LOCAL_INTERNAL",
        LocalExternal = 4 => "LOCAL_EXTERNAL",
        Unified = 5 => "UNIFIED",
        System = 6 => "SYSTEM",
        Virtual = 7 => "VIRTUAL",
        User = 8 => "USER",
        Contiguous = 9 => "CONTIGUOUS",
    }
}

hal_enum! {
    /// サーフェス種別（gceSURFACE_TYPE）
    pub enum SurfaceType {
        Unknown = 0 => "UNKNOWN",
        Index = 1 => "INDEX",
        Vertex = 2 => "VERTEX",
        Texture = 3 => "TEXTURE",
        RenderTarget = 4 => "RENDER_TARGET",
        Depth = 5 => "DEPTH",
        Bitmap = 6 => "BITMAP",
        TileStatus = 7 => "TILE_STATUS",
        Image = 8 => "IMAGE",
        Mask = 9 => "MASK",
        Scissor = 10 => "SCISSOR",
        HierarchicalDepth = 11 => "HIERARCHICAL_DEPTH",
    }
}

hal_enum! {
    /// USER_SIGNAL のサブコマンド（gceUSER_SIGNAL_COMMAND_CODES）
    pub enum UserSignalCommand {
        Create = 0 => "CREATE",
        Destroy = 1 => "DESTROY",
        Signal = 2 => "SIGNAL",
        Wait = 3 => "WAIT",
        Map = 4 => "MAP",
        Unmap = 5 => "UNMAP",
    }
}

hal_enum! {
    /// 電源状態（gceCHIPPOWERSTATE）
    pub enum PowerState {
        On = 0 => "ON",
        Off = 1 => "OFF",
        Idle = 2 => "IDLE",
        Suspend = 3 => "SUSPEND",
        SuspendAtPowerOn = 4 => "SUSPEND_ATPOWERON",
        OffAtPowerOn = 5 => "OFF_ATPOWERON",
        IdleBroadcast = 6 => "IDLE_BROADCAST",
        SuspendBroadcast = 7 => "SUSPEND_BROADCAST",
        OffBroadcast = 8 => "OFF_BROADCAST",
        OffTimeout = 9 => "OFF_TIMEOUT",
        OnAuto = 10 => "ON_AUTO",
    }
}

hal_enum! {
    /// キャッシュ操作（gceCACHEOPERATION）
    pub enum CacheOperation {
        Clean = 0x01 => "CLEAN",
        Invalidate = 0x02 => "INVALIDATE",
        Flush = 0x03 => "FLUSH",
        MemoryBarrier = 0x04 => "MEMORY_BARRIER",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_ids_are_dense() {
        for (i, command) in HalCommand::ALL.iter().enumerate() {
            assert_eq!(command.raw() as usize, i);
            assert_eq!(HalCommand::from_raw(i as u32), Some(*command));
        }
        assert_eq!(HalCommand::COUNT, 62);
    }

    #[test]
    fn test_from_raw_out_of_range() {
        assert_eq!(HalCommand::from_raw(HalCommand::COUNT as u32), None);
        assert_eq!(HalCommand::from_raw(u32::MAX), None);
        assert_eq!(HardwareType::from_raw(0), None);
        assert_eq!(HardwareType::from_raw(5), None);
        assert_eq!(Pool::from_raw(10), None);
    }

    #[test]
    fn test_hardware_names() {
        assert_eq!(HardwareType::Hw3D.name(), "3D");
        assert_eq!(HardwareType::Hw2D.name(), "2D");
        assert_eq!(HardwareType::Hw3D2D.name(), "3D2D");
        assert_eq!(HardwareType::VG.to_string(), "VG");
    }

    #[test]
    fn test_signal_is_distinct_from_user_signal() {
        assert_eq!(HalCommand::Signal.raw(), 17);
        assert_eq!(HalCommand::UserSignal.raw(), 16);
        assert_eq!(UserSignalCommand::Signal.name(), "SIGNAL");
    }
}
