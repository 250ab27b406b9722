//! galcore トレーサの本体
//!
//! `Tracer` が open / close / ioctl を受け取り、`/dev/galcore` に結び付いた
//! ディスクリプタへの HAL 呼び出しをデコードしてトレースログに書く。
//! プリロードライブラリはこのクレートの `Tracer` を1つだけ持つ。

use std::cell::Cell;
use std::marker::PhantomData;

pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod logger;
pub mod native;
pub mod session;

pub use config::{TraceConfig, DEFAULT_DEBUG_FILTER, DEFAULT_LOG_PATH, ENV_DEBUG, ENV_LOG};
pub use dispatch::Tracer;
pub use envelope::{validate, Envelope, EnvelopeError};
pub use logger::{Destination, Logger, RecordGuard, SinkError};
pub use native::{resolve, LibcCalls, NativeCalls, ResolveError};
pub use session::DeviceSession;

// TLSによる再入ガード
thread_local! {
    static IN_HOOK: Cell<bool> = const { Cell::new(false) };
}

/// フック実行中であることを示すガード
///
/// フックの中から再び割り込まれた呼び出し（ログ出力や診断出力が libc を
/// 呼ぶ場合など）は、ガードが取れないので本物の実装に直接渡す。
pub struct HookGuard {
    // スレッドをまたいで破棄されないようにする
    _not_send: PhantomData<*const ()>,
}

impl HookGuard {
    /// ガードを取る（すでにフック中なら `None`）
    ///
    /// スレッド終了中で TLS が使えないときも `None` を返す。
    pub fn enter() -> Option<Self> {
        let entered = IN_HOOK
            .try_with(|in_hook| {
                if in_hook.get() {
                    false
                } else {
                    in_hook.set(true);
                    true
                }
            })
            .unwrap_or(false);

        // 失敗時にガードを作ると Drop が外側のフラグを落としてしまう
        entered.then(|| Self {
            _not_send: PhantomData,
        })
    }
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        // フラグをリセット
        let _ = IN_HOOK.try_with(|in_hook| in_hook.set(false));
    }
}

/// 便利な関数: 再入ガードの状態を取得
pub fn is_in_hook() -> bool {
    IN_HOOK.try_with(|in_hook| in_hook.get()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reentry_guard() {
        assert!(!is_in_hook());
        {
            let guard = HookGuard::enter();
            assert!(guard.is_some());
            assert!(is_in_hook());
            assert!(HookGuard::enter().is_none());
            // 内側の失敗はフラグを落とさない
            assert!(is_in_hook());
        }
        assert!(!is_in_hook());
        assert!(HookGuard::enter().is_some());
    }

    #[test]
    fn test_nested_calls_stay_outside() {
        let _outer = HookGuard::enter().unwrap();
        assert!(HookGuard::enter().is_none());
        assert!(HookGuard::enter().is_none());
        assert!(is_in_hook());
    }

    #[test]
    fn test_guard_is_per_thread() {
        let _guard = HookGuard::enter().unwrap();
        std::thread::spawn(|| {
            assert!(!is_in_hook());
            assert!(HookGuard::enter().is_some());
        })
        .join()
        .unwrap();
    }
}
