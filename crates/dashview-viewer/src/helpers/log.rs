// crates/dashview-viewer/src/helpers/log.rs
//
// Logger setup for the viewer binary. Library code only uses the `log` macros
// with a bracketed tag ("[scan]", "[playback]", ...); this decides where the
// lines end up.
//
// A windowed launch has no console, so `to_file` routes everything to
// %TEMP%\dashview.log (append-only) instead of stderr.

use std::fs::OpenOptions;
use std::path::PathBuf;

use env_logger::{Builder, Env, Target};

pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("dashview.log")
}

/// Install the global logger. Filter comes from `RUST_LOG`, default `info`.
/// Calling it twice is harmless; the second call is ignored.
pub fn init_logging(to_file: bool) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    if to_file {
        match OpenOptions::new().create(true).append(true).open(log_file_path()) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            // Still have stderr; keep going.
            Err(e) => eprintln!("[log] cannot open {}: {e}", log_file_path().display()),
        }
    }

    let _ = builder.try_init();
}
