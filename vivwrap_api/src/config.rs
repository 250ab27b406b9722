use std::ffi::CString;
use std::path::PathBuf;
use vivwrap_proto::DEVICE_PATH;

/// トレースログの出力先を指定する環境変数
pub const ENV_LOG: &str = "VIV_WRAP_LOG";
/// 診断出力（tracing）のフィルタを指定する環境変数
pub const ENV_DEBUG: &str = "VIV_WRAP_DEBUG";
/// `VIV_WRAP_DEBUG` が未設定のときのフィルタ
///
/// 出力先の通知だけは既定で表示する。
pub const DEFAULT_DEBUG_FILTER: &str = "warn,vivwrap_api::logger=info";
/// `VIV_WRAP_LOG` が未設定のときの出力先
pub const DEFAULT_LOG_PATH: &str = "/home/root/viv_wrap.log";

/// トレース設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceConfig {
    /// トレースログのパス
    pub log_path: PathBuf,
    /// 追跡するデバイスノードのパス
    pub device_path: CString,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            device_path: CString::new(DEVICE_PATH).unwrap_or_default(),
        }
    }
}

impl TraceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 環境変数から設定を読む
    pub fn from_env() -> Self {
        let mut config = Self::default();
        match std::env::var_os(ENV_LOG) {
            Some(path) if !path.is_empty() => config.log_path = PathBuf::from(path),
            _ => {}
        }
        config
    }

    /// ログの出力先を設定
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// 追跡するデバイスノードを設定
    pub fn device_path(mut self, path: CString) -> Self {
        self.device_path = path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = TraceConfig::new();
        assert_eq!(config.log_path, PathBuf::from("/home/root/viv_wrap.log"));
        assert_eq!(config.device_path.as_bytes(), b"/dev/galcore");
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var(ENV_LOG, "/tmp/galcore-trace.log");
        let config = TraceConfig::from_env();
        assert_eq!(config.log_path, PathBuf::from("/tmp/galcore-trace.log"));

        std::env::set_var(ENV_LOG, "");
        assert_eq!(TraceConfig::from_env().log_path, PathBuf::from(DEFAULT_LOG_PATH));

        std::env::remove_var(ENV_LOG);
        assert_eq!(TraceConfig::from_env().log_path, PathBuf::from(DEFAULT_LOG_PATH));
    }

    #[test]
    fn test_builder() {
        let config = TraceConfig::new()
            .log_path("/tmp/x.log")
            .device_path(CString::new("/tmp/fake-galcore").unwrap());
        assert_eq!(config.log_path, PathBuf::from("/tmp/x.log"));
        assert_eq!(config.device_path.as_bytes(), b"/tmp/fake-galcore");
    }
}
