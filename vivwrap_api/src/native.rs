//! 本物の libc 実装の解決
//!
//! 割り込んだ関数は最終的に libc の `open` / `close` / `ioctl` を呼ぶ。
//! シンボルは初回使用時に一度だけ解決され、以降はキャッシュが返される。

use libc::{c_char, c_int, c_uint, c_ulong, c_void};
use std::ffi::{CStr, CString};
use std::sync::OnceLock;
use thiserror::Error;

/// シンボル解決のエラー
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to dlopen {library}: {reason}")]
    LibraryNotFound { library: &'static str, reason: String },
    #[error("failed to find {symbol} in {library}: {reason}")]
    SymbolNotFound {
        symbol: String,
        library: &'static str,
        reason: String,
    },
}

/// 割り込み対象の本物の呼び出し
///
/// 可変長引数の ioctl は、ポインタ引数の有無で2つの呼び出しに分けてある。
pub trait NativeCalls: Send + Sync {
    /// open(2)
    ///
    /// # Safety
    ///
    /// `path` は NUL 終端された文字列を指していなければならない。
    unsafe fn open(&self, path: *const c_char, flags: c_int, mode: c_uint) -> c_int;

    /// close(2)
    fn close(&self, fd: c_int) -> c_int;

    /// ポインタ引数つきの ioctl(2)
    ///
    /// # Safety
    ///
    /// `arg` はリクエストが要求する領域を指していなければならない。
    unsafe fn ioctl_with_arg(&self, fd: c_int, request: c_ulong, arg: *mut c_void) -> c_int;

    /// 引数なしの ioctl(2)
    fn ioctl_without_arg(&self, fd: c_int, request: c_ulong) -> c_int;
}

type OpenFn = unsafe extern "C" fn(*const c_char, c_int, ...) -> c_int;
type CloseFn = unsafe extern "C" fn(c_int) -> c_int;
type IoctlFn = unsafe extern "C" fn(c_int, c_ulong, ...) -> c_int;

const LIBC_NAME: &str = "libc.so.6";

/// dlopen したハンドル（usize で保持）
static LIBC_HANDLE: OnceLock<Result<usize, String>> = OnceLock::new();

fn dlerror_string() -> String {
    let err = unsafe { libc::dlerror() };
    if err.is_null() {
        "Unknown error".to_string()
    } else {
        unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned()
    }
}

fn libc_handle() -> Result<*mut c_void, ResolveError> {
    let handle = LIBC_HANDLE.get_or_init(|| {
        let name = CString::new(LIBC_NAME).map_err(|e| e.to_string())?;
        let handle = unsafe { libc::dlopen(name.as_ptr(), libc::RTLD_LAZY) };
        if handle.is_null() {
            Err(dlerror_string())
        } else {
            Ok(handle as usize)
        }
    });

    match handle {
        Ok(handle) => Ok(*handle as *mut c_void),
        Err(reason) => Err(ResolveError::LibraryNotFound {
            library: LIBC_NAME,
            reason: reason.clone(),
        }),
    }
}

/// シンボルのアドレスを解決する
///
/// まず `RTLD_NEXT`（このライブラリの次にロードされた実装）を探し、
/// 見つからなければ libc を明示的に dlopen して探す。
pub fn resolve(symbol: &CStr) -> Result<*mut c_void, ResolveError> {
    let next = unsafe { libc::dlsym(libc::RTLD_NEXT, symbol.as_ptr()) };
    if !next.is_null() {
        return Ok(next);
    }

    let func = unsafe { libc::dlsym(libc_handle()?, symbol.as_ptr()) };
    if func.is_null() {
        return Err(ResolveError::SymbolNotFound {
            symbol: symbol.to_string_lossy().into_owned(),
            library: LIBC_NAME,
            reason: dlerror_string(),
        });
    }
    Ok(func)
}

/// 解決に失敗したら診断を出してプロセスを終了する
fn resolve_or_exit<F: Copy>(symbol: &CStr) -> F {
    match resolve(symbol) {
        Ok(ptr) => {
            debug_assert_eq!(std::mem::size_of::<F>(), std::mem::size_of::<*mut c_void>());
            unsafe { std::mem::transmute_copy(&ptr) }
        }
        Err(e) => {
            eprintln!("[vivwrap] FATAL: {}", e);
            std::process::exit(1);
        }
    }
}

/// libc の実装を呼ぶ `NativeCalls`
#[derive(Debug, Default)]
pub struct LibcCalls {
    open: OnceLock<OpenFn>,
    close: OnceLock<CloseFn>,
    ioctl: OnceLock<IoctlFn>,
}

impl LibcCalls {
    pub const fn new() -> Self {
        Self {
            open: OnceLock::new(),
            close: OnceLock::new(),
            ioctl: OnceLock::new(),
        }
    }

    fn open_fn(&self) -> OpenFn {
        *self.open.get_or_init(|| resolve_or_exit(c"open"))
    }

    fn close_fn(&self) -> CloseFn {
        *self.close.get_or_init(|| resolve_or_exit(c"close"))
    }

    fn ioctl_fn(&self) -> IoctlFn {
        *self.ioctl.get_or_init(|| resolve_or_exit(c"ioctl"))
    }
}

impl NativeCalls for LibcCalls {
    unsafe fn open(&self, path: *const c_char, flags: c_int, mode: c_uint) -> c_int {
        (self.open_fn())(path, flags, mode)
    }

    fn close(&self, fd: c_int) -> c_int {
        unsafe { (self.close_fn())(fd) }
    }

    unsafe fn ioctl_with_arg(&self, fd: c_int, request: c_ulong, arg: *mut c_void) -> c_int {
        (self.ioctl_fn())(fd, request, arg)
    }

    fn ioctl_without_arg(&self, fd: c_int, request: c_ulong) -> c_int {
        unsafe { (self.ioctl_fn())(fd, request) }
    }
}
