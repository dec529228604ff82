use std::io::{self, Write};

use indicatif::{MultiProgress, ProgressBar};
use once_cell::sync::Lazy;

static PROGRESS: Lazy<MultiProgress> = Lazy::new(MultiProgress::new);

/// Attaches `bar` to the terminal area the log writer clears around each line.
pub fn register(bar: ProgressBar) -> ProgressBar {
    PROGRESS.add(bar)
}

pub fn release(bar: &ProgressBar) {
    PROGRESS.remove(bar);
}

/// Stderr writer for log output that hides live progress lines while it writes.
pub struct LogWriter;

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        PROGRESS.suspend(|| io::stderr().write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

pub fn log_writer() -> LogWriter {
    LogWriter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_lines_are_written_whole() {
        let bar = register(ProgressBar::new(10));
        bar.set_message("Progress: 1/10");

        let line = b"WARN subprobe: slow host\n";
        assert_eq!(log_writer().write(line).unwrap(), line.len());
        log_writer().flush().unwrap();

        bar.finish_and_clear();
        release(&bar);
    }
}
