use std::os::fd::RawFd;
use std::sync::atomic::{AtomicI32, Ordering};
use tracing::warn;

const NO_SESSION: RawFd = -1;

/// デバイスノードに結び付いたファイルディスクリプタ
///
/// スロットは1つだけで、同じデバイスを二度開くと後から開いた方が残る。
#[derive(Debug)]
pub struct DeviceSession {
    fd: AtomicI32,
}

impl Default for DeviceSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceSession {
    pub const fn new() -> Self {
        Self {
            fd: AtomicI32::new(NO_SESSION),
        }
    }

    /// open に成功したディスクリプタを記録する
    ///
    /// 上書きされた以前のディスクリプタがあれば返す。
    pub fn bind(&self, fd: RawFd) -> Option<RawFd> {
        let previous = self.fd.swap(fd, Ordering::SeqCst);
        if previous == NO_SESSION || previous == fd {
            return None;
        }
        warn!(
            previous,
            fd, "device opened again without close; fd {} is no longer traced", previous
        );
        Some(previous)
    }

    /// 記録中のディスクリプタなら解除する
    ///
    /// 別のディスクリプタを閉じてもスロットは変わらない。
    pub fn unbind(&self, fd: RawFd) -> bool {
        fd != NO_SESSION
            && self
                .fd
                .compare_exchange(fd, NO_SESSION, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
    }

    pub fn is_tracked(&self, fd: RawFd) -> bool {
        fd != NO_SESSION && self.fd.load(Ordering::SeqCst) == fd
    }

    pub fn current(&self) -> Option<RawFd> {
        match self.fd.load(Ordering::SeqCst) {
            NO_SESSION => None,
            fd => Some(fd),
        }
    }
}
