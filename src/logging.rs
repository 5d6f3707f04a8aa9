//! `tracing` output for the browser console.

use std::io;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Buffers one formatted event and hands it to `console.log` when dropped.
pub struct ConsoleWriter {
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        #[cfg(target_arch = "wasm32")]
        web_sys::console::log_1(&line.into());
        #[cfg(not(target_arch = "wasm32"))]
        eprintln!("{line}");
        self.buf.clear();
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter { buf: Vec::new() }
    }
}

/// Installs the global subscriber. Safe to call more than once.
///
/// There is no process environment in the browser, so the filter comes from the baked-in
/// `LOG_LEVEL` rather than `RUST_LOG`.
pub fn init(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));

    // wasm32-unknown-unknown has no clock for the default timer.
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(ConsoleMakeWriter)
        .without_time()
        .with_target(true)
        .try_init();

    if result.is_ok() {
        tracing::debug!(directive, "logging initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_writer_buffers_until_flush() {
        let mut w = ConsoleMakeWriter.make_writer();
        w.write_all(b"hello ").unwrap();
        w.write_all(b"world\n").unwrap();
        assert_eq!(w.buf, b"hello world\n");
        w.flush().unwrap();
        assert!(w.buf.is_empty());
    }

    #[test]
    fn test_init_tolerates_bad_directive_and_repeat_calls() {
        init("not a [valid directive");
        init("debug");
    }
}
