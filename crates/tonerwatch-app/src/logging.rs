// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Logging setup: stderr plus an appended log file, one filter for both.
// Rotation of the file is left to the host (logrotate or similar).

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Open `path` for appending, creating it if needed.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(log_file: &Path, verbose: bool) -> io::Result<()> {
    let file = open_log_file(log_file)?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose))),
        )
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    #[test]
    fn verbose_lowers_the_default_level() {
        assert_eq!(default_directive(false), "info");
        assert_eq!(default_directive(true), "debug");
    }

    #[test]
    fn log_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tonerwatch.log");

        writeln!(open_log_file(&path).unwrap(), "first run").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second run").unwrap();

        let mut text = String::new();
        File::open(&path).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "first run\nsecond run\n");
    }
}
