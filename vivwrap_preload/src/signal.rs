//! SIGINT でトレースログをフラッシュする

use crate::TRACER;
use libc::c_int;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, Ordering};

static FLUSHED: AtomicBool = AtomicBool::new(false);

/// 最初の1回だけフラッシュする（フラッシュを試みたら true）
fn flush_once() -> bool {
    if FLUSHED.swap(true, Ordering::SeqCst) {
        return false;
    }
    if let Some(tracer) = TRACER.get() {
        tracer.logger().try_flush();
    }
    true
}

/// 既定の動作に戻す
fn restore_default() -> nix::Result<()> {
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
    unsafe { signal::sigaction(Signal::SIGINT, &default) }.map(|_| ())
}

extern "C" fn on_sigint(_signum: c_int) {
    flush_once();
    // 既定の動作に戻して再送する
    let _ = restore_default();
    let _ = signal::raise(Signal::SIGINT);
}

pub fn install() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_sigint),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    unsafe { signal::sigaction(Signal::SIGINT, &action) }.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current_handler() -> SigHandler {
        // 読み出しのために一度置き換えて戻す
        let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
        let previous = unsafe { signal::sigaction(Signal::SIGINT, &ignore) }.unwrap();
        unsafe { signal::sigaction(Signal::SIGINT, &previous) }.unwrap();
        previous.handler()
    }

    #[test]
    fn test_handler_install_and_restore() {
        install().unwrap();
        assert!(matches!(current_handler(), SigHandler::Handler(_)));

        restore_default().unwrap();
        assert_eq!(current_handler(), SigHandler::SigDfl);

        install().unwrap();
    }

    #[test]
    fn test_flush_happens_once() {
        assert!(flush_once());
        assert!(!flush_once());
        assert!(!flush_once());
    }
}
