//! LD_PRELOAD で読み込むトレーサ
//!
//! ```text
//! LD_PRELOAD=libvivwrap_preload.so VIV_WRAP_LOG=/tmp/gpu.log ./app
//! ```
//!
//! `open` / `close` / `ioctl` を横取りして `vivwrap_api::Tracer` に渡す。

mod signal;

use ctor::ctor;
use libc::{c_char, c_int, c_uint, c_ulong, c_void};
use std::sync::{Once, OnceLock};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use vivwrap_api::{
    HookGuard, LibcCalls, NativeCalls, TraceConfig, Tracer, DEFAULT_DEBUG_FILTER, ENV_DEBUG,
};

static INIT_ONCE: Once = Once::new();

/// プロセス全体で1つのトレーサ
static TRACER: OnceLock<Tracer<LibcCalls>> = OnceLock::new();

/// 再入した呼び出しの転送先
static NATIVE: LibcCalls = LibcCalls::new();

fn tracer() -> &'static Tracer<LibcCalls> {
    TRACER.get_or_init(|| Tracer::new(TraceConfig::from_env(), LibcCalls::new()))
}

fn diagnostics_filter() -> EnvFilter {
    EnvFilter::try_from_env(ENV_DEBUG).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DEBUG_FILTER))
}

fn init_diagnostics() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(diagnostics_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .try_init();
}

/// LD_PRELOADによってロードされた際に自動的に呼ばれる初期化関数
#[ctor]
fn vivwrap_init() {
    INIT_ONCE.call_once(|| {
        init_diagnostics();

        if let Err(e) = signal::install() {
            warn!("failed to install SIGINT handler: {}", e);
        }

        let tracer = tracer();
        debug!(
            log = %tracer.logger().path().display(),
            "vivwrap initialised"
        );
    });
}

/// `mode` は O_CREAT か O_TMPFILE のときだけ渡される
fn takes_mode(flags: c_int) -> bool {
    flags & libc::O_CREAT != 0 || flags & libc::O_TMPFILE == libc::O_TMPFILE
}

#[no_mangle]
pub unsafe extern "C" fn open(path: *const c_char, flags: c_int, mode: c_uint) -> c_int {
    let mode = if takes_mode(flags) { mode } else { 0 };
    match HookGuard::enter() {
        Some(_guard) => tracer().open(path, flags, mode),
        None => NATIVE.open(path, flags, mode),
    }
}

#[no_mangle]
pub extern "C" fn close(fd: c_int) -> c_int {
    match HookGuard::enter() {
        Some(_guard) => tracer().close(fd),
        None => NATIVE.close(fd),
    }
}

#[no_mangle]
pub unsafe extern "C" fn ioctl(fd: c_int, request: c_ulong, arg: *mut c_void) -> c_int {
    match HookGuard::enter() {
        Some(_guard) => tracer().ioctl(fd, request, arg),
        None => NATIVE.ioctl_with_arg(fd, request, arg),
    }
}

#[no_mangle]
pub extern "C" fn vivwrap_get_version() -> *const c_char {
    concat!("vivwrap ", env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use vivwrap_api::Logger;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_filter_reports_destination() {
        let captured = Capture::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(DEFAULT_DEBUG_FILTER))
            .with_writer(move || writer.clone())
            .with_target(false)
            .with_ansi(false)
            .finish();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viv_wrap.log");
        tracing::subscriber::with_default(subscriber, || {
            Logger::new(&path).write("/* OPEN */\n").unwrap();
            debug!("not shown");
        });

        let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains(&format!("dumping to {}", path.display())), "{}", text);
        assert!(!text.contains("not shown"));
    }

    #[test]
    fn test_version() {
        let version = unsafe { CStr::from_ptr(vivwrap_get_version()) };
        assert!(version.to_str().unwrap().starts_with("vivwrap "));
    }

    #[test]
    fn test_takes_mode() {
        assert!(takes_mode(libc::O_CREAT | libc::O_WRONLY));
        assert!(takes_mode(libc::O_TMPFILE | libc::O_RDWR));
        assert!(!takes_mode(libc::O_RDWR));
        // O_DIRECTORY だけでは O_TMPFILE にならない
        assert!(!takes_mode(libc::O_DIRECTORY));
    }

    #[test]
    fn test_exports_pass_through() {
        let fd = unsafe { open(c"/dev/null".as_ptr(), libc::O_RDONLY, 0) };
        assert!(fd >= 0);
        assert!(!tracer().session().is_tracked(fd));
        assert_eq!(close(fd), 0);
    }
}
