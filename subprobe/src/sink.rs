use std::path::{Path, PathBuf};

use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};
use tracing::debug;

use crate::Error;

/// Append-only result file shared by every writer of a run.
///
/// Each `append` is a single write performed while holding the lock, so lines
/// from concurrent writers never interleave. The lock belongs to the instance:
/// every writer of one output path must share the same `Sink` (behind an `Arc`
/// or a reference), never a second `Sink::new` on that path.
#[derive(Debug)]
pub struct Sink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Sink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Sink {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Creates `dir` if needed and returns a sink for `dir/file_name`.
    pub async fn in_dir(dir: &Path, file_name: &str) -> Result<Self, Error> {
        tokio::fs::create_dir_all(dir).await?;
        Ok(Sink::new(dir.join(file_name)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append<I, S>(&self, lines: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut buffer = String::new();
        for line in lines {
            buffer.push_str(line.as_ref());
            buffer.push('\n');
        }
        if buffer.is_empty() {
            return Ok(());
        }

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(buffer.as_bytes()).await?;
        file.flush().await?;
        debug!("{}: appended {} bytes", self.path.display(), buffer.len());

        Ok(())
    }
}
