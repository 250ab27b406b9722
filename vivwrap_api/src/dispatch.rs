//! 割り込んだ呼び出しの振り分け

use crate::config::TraceConfig;
use crate::envelope::{validate, Envelope};
use crate::logger::{Logger, RecordGuard};
use crate::native::NativeCalls;
use crate::session::DeviceSession;
use libc::{c_char, c_int, c_uint, c_ulong, c_void};
use nix::errno::Errno;
use std::ffi::{CStr, CString};
use std::io::Write;
use tracing::{debug, warn};
use vivwrap_decode::DecodeError;
use vivwrap_proto::carries_arg;

const OPEN_MARKER: &str = "/* OPEN */\n";
const CLOSE_MARKER: &str = "/* CLOSE */\n";

/// 呼び出しを失敗させる（-1 と EINVAL）
fn fail() -> c_int {
    Errno::EINVAL.set();
    -1
}

/// トレーサ本体
///
/// セッション、ロガー、本物の呼び出しをまとめて持つ。
pub struct Tracer<N> {
    native: N,
    session: DeviceSession,
    logger: Logger,
    device_path: CString,
}

impl<N: NativeCalls> Tracer<N> {
    pub fn new(config: TraceConfig, native: N) -> Self {
        Self {
            native,
            session: DeviceSession::new(),
            logger: Logger::new(config.log_path),
            device_path: config.device_path,
        }
    }

    pub fn native(&self) -> &N {
        &self.native
    }

    pub fn session(&self) -> &DeviceSession {
        &self.session
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// open(2)
    ///
    /// デバイスノードを開いたときはディスクリプタを記録して `/* OPEN */` を書く。
    ///
    /// # Safety
    ///
    /// `path` は NULL か NUL 終端された文字列でなければならない。
    pub unsafe fn open(&self, path: *const c_char, flags: c_int, mode: c_uint) -> c_int {
        if path.is_null() || CStr::from_ptr(path) != self.device_path.as_c_str() {
            return self.native.open(path, flags, mode);
        }

        let mut record = self.logger.begin_record();
        let fd = self.native.open(path, flags, mode);
        if fd >= 0 {
            let saved = Errno::last_raw();
            self.session.bind(fd);
            debug!(fd, "galcore opened");
            emit(&mut record, OPEN_MARKER);
            Errno::set_raw(saved);
        }
        fd
    }

    /// close(2)
    ///
    /// 記録中のディスクリプタなら解除して `/* CLOSE */` を書く。
    /// 本物の close は常に呼ぶ。
    pub fn close(&self, fd: c_int) -> c_int {
        if self.session.unbind(fd) {
            debug!(fd, "galcore closed");
            emit(&mut self.logger.begin_record(), CLOSE_MARKER);
        }
        self.native.close(fd)
    }

    /// ioctl(2)
    ///
    /// # Safety
    ///
    /// `arg` はリクエストが要求する領域を指していなければならない。
    pub unsafe fn ioctl(&self, fd: c_int, request: c_ulong, arg: *mut c_void) -> c_int {
        if self.session.is_tracked(fd) {
            return self.protocol_call(fd, request, arg);
        }
        if carries_arg(request) {
            self.native.ioctl_with_arg(fd, request, arg)
        } else {
            self.native.ioctl_without_arg(fd, request)
        }
    }

    /// デバイスへの HAL 呼び出し
    ///
    /// レコードのロックは呼び出し前の出力から呼び出し後の出力まで保持する。
    unsafe fn protocol_call(&self, fd: c_int, request: c_ulong, arg: *mut c_void) -> c_int {
        let envelope = match validate(request, arg) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(fd, "rejected galcore ioctl: {}", e);
                return fail();
            }
        };

        let mut record = self.logger.begin_record();
        let mut text = String::new();

        if let Err(e) = pre(&envelope, &mut text) {
            report(&envelope, e);
            return fail();
        }
        emit(&mut record, &text);

        let ret = self.native.ioctl_with_arg(fd, request, arg);
        let saved = Errno::last_raw();

        text.clear();
        if let Err(e) = post(&envelope, ret, &mut text) {
            report(&envelope, e);
            return fail();
        }
        emit(&mut record, &text);

        Errno::set_raw(saved);
        ret
    }
}

unsafe fn pre(envelope: &Envelope, out: &mut String) -> Result<(), DecodeError> {
    let interface = envelope.snapshot();
    envelope.command.pre(envelope.hardware, &interface, out)
}

/// ドライバが書き換えた後の内容で呼び出し後の出力を作る
unsafe fn post(envelope: &Envelope, ret: c_int, out: &mut String) -> Result<(), DecodeError> {
    let interface = envelope.snapshot();
    envelope.command.post(envelope.hardware, &interface, ret, out)
}

fn report(envelope: &Envelope, e: DecodeError) {
    warn!(
        command = envelope.command.name,
        hardware = %envelope.hardware,
        "galcore ioctl not forwarded: {}",
        e
    );
}

fn emit(record: &mut RecordGuard<'_>, text: &str) {
    if let Err(e) = record.write_all(text.as_bytes()) {
        warn!("failed to write trace record: {}", e);
    }
}

impl<N> std::fmt::Debug for Tracer<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("session", &self.session)
            .field("logger", &self.logger)
            .field("device_path", &self.device_path)
            .finish()
    }
}
