//! トレースログの出力先
//!
//! 1回の呼び出しの記録（呼び出し前の行、実際の ioctl、呼び出し後の行）は
//! `RecordGuard` を保持している間ロックされ、他のスレッドの記録と混ざらない。

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, TryLockError};
use thiserror::Error;
use tracing::{info, warn};

/// 出力先を開けなかった
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open trace log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 実際に使われている出力先
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    File(PathBuf),
    Stdout,
    Writer,
}

struct Sink {
    out: Box<dyn Write + Send>,
    destination: Destination,
}

impl Sink {
    fn open(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path).map_err(|source| SinkError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            out: Box::new(file),
            destination: Destination::File(path.to_path_buf()),
        })
    }

    fn open_or_stdout(path: &Path) -> Self {
        match Self::open(path) {
            Ok(sink) => {
                info!("dumping to {}", path.display());
                sink
            }
            Err(e) => {
                warn!("{}; falling back to stdout", e);
                Self {
                    out: Box::new(io::stdout()),
                    destination: Destination::Stdout,
                }
            }
        }
    }
}

/// レコード単位で書き込むロガー
pub struct Logger {
    path: PathBuf,
    sink: Mutex<Option<Sink>>,
}

impl Logger {
    /// 最初の書き込みで `path` を開くロガー
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sink: Mutex::new(None),
        }
    }

    /// 任意の書き込み先を使うロガー
    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            path: PathBuf::new(),
            sink: Mutex::new(Some(Sink {
                out: writer,
                destination: Destination::Writer,
            })),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Option<Sink>> {
        self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// レコードを開始する
    ///
    /// 返されたガードを破棄するまで他のレコードは書き込めない。
    pub fn begin_record(&self) -> RecordGuard<'_> {
        let mut sink = self.lock();
        if sink.is_none() {
            *sink = Some(Sink::open_or_stdout(&self.path));
        }
        RecordGuard { sink }
    }

    /// 1つのレコードとして文字列を書き込む
    pub fn write(&self, text: &str) -> io::Result<()> {
        self.begin_record().write_all(text.as_bytes())
    }

    pub fn flush(&self) -> io::Result<()> {
        match self.lock().as_mut() {
            Some(sink) => sink.out.flush(),
            None => Ok(()),
        }
    }

    /// ロックが取れたときだけフラッシュする
    ///
    /// シグナルハンドラから呼ばれるので、記録中のスレッドを待たない。
    pub fn try_flush(&self) -> bool {
        let mut sink = match self.sink.try_lock() {
            Ok(sink) => sink,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return false,
        };
        match sink.as_mut() {
            Some(sink) => sink.out.flush().is_ok(),
            None => true,
        }
    }

    /// 出力先（まだ開いていなければ `None`）
    pub fn destination(&self) -> Option<Destination> {
        self.lock().as_ref().map(|sink| sink.destination.clone())
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").field("path", &self.path).finish()
    }
}

/// 書き込み中のレコード
///
/// 書き込みのたびにフラッシュする。
pub struct RecordGuard<'a> {
    sink: MutexGuard<'a, Option<Sink>>,
}

impl RecordGuard<'_> {
    fn out(&mut self) -> io::Result<&mut Box<dyn Write + Send>> {
        match self.sink.as_mut() {
            Some(sink) => Ok(&mut sink.out),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "trace sink is not open",
            )),
        }
    }
}

impl Write for RecordGuard<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let out = self.out()?;
        out.write_all(buf)?;
        out.flush()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out()?.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lazy_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.log");
        let logger = Logger::new(&path);

        assert_eq!(logger.destination(), None);
        assert!(!path.exists());

        logger.write("/* OPEN */\n").unwrap();
        assert_eq!(logger.destination(), Some(Destination::File(path.clone())));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "/* OPEN */\n");
    }

    #[test]
    fn test_fallback_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(dir.path().join("missing").join("trace.log"));
        let _ = logger.begin_record();
        assert_eq!(logger.destination(), Some(Destination::Stdout));
    }

    #[test]
    fn test_records_are_flushed_per_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.log");
        let logger = Logger::new(&path);

        let mut record = logger.begin_record();
        record.write_all(b"STALL(3D)").unwrap();
        // ガードを保持したままでもファイルには書かれている
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "STALL(3D)");
        record.write_all(b" = 0;\n").unwrap();
        drop(record);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "STALL(3D) = 0;\n");
        assert!(logger.try_flush());
    }

    #[test]
    fn test_try_flush_skips_while_recording() {
        let logger = Logger::from_writer(Box::new(SharedBuf::default()));
        let record = logger.begin_record();
        assert!(!logger.try_flush());
        drop(record);
        assert!(logger.try_flush());
    }

    #[test]
    fn test_records_do_not_interleave() {
        let buf = SharedBuf::default();
        let logger = Arc::new(Logger::from_writer(Box::new(buf.clone())));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let logger = Arc::clone(&logger);
                thread::spawn(move || {
                    for _ in 0..50 {
                        let mut record = logger.begin_record();
                        write!(record, "<{}", i).unwrap();
                        thread::yield_now();
                        writeln!(record, "{}>", i).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let text = buf.text();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 400);
        for line in lines {
            let inner = line.trim_start_matches('<').trim_end_matches('>');
            let (a, b) = inner.split_at(inner.len() / 2);
            assert_eq!(a, b, "interleaved record: {}", line);
        }
    }
}
