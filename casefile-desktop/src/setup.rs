use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use env_logger::{Builder, Target};

use casefile_core::config::SystemConfig;

use crate::config_gen;

pub fn init(config_path: &str, quiet: bool) {
    if let Err(e) = config_gen::ensure_config_exists(config_path) {
        eprintln!("Config generation warning: {:#}", e);
    }

    if let Err(e) = casefile_shared::config::init(config_path) {
        eprintln!("Config load warning: {}", e);
    }

    init_logger(quiet);
}

struct TeeWriter<W1, W2>(W1, W2);

impl<W1: Write, W2: Write> Write for TeeWriter<W1, W2> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.0.write(buf)?;
        self.1.write_all(&buf[..n])?;
        Ok(n)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()?;
        self.1.flush()?;
        Ok(())
    }
}

/// Logs go to `casefile.log` under the configured directory and, unless
/// `quiet`, to stdout as well.
fn init_logger(quiet: bool) {
    let sys_cfg: SystemConfig = casefile_shared::config::get("system");
    if let Err(e) = fs::create_dir_all(&sys_cfg.log_path) {
        eprintln!("Failed to create log dir: {}", e);
    }

    let log_file_path = Path::new(&sys_cfg.log_path).join("casefile.log");
    let log_file = OpenOptions::new().create(true).append(true).open(&log_file_path);

    let mut builder =
        Builder::from_env(env_logger::Env::default().default_filter_or(&sys_cfg.log_level));
    match (log_file, quiet) {
        (Ok(file), true) => {
            builder.target(Target::Pipe(Box::new(file)));
        }
        (Ok(file), false) => {
            builder.target(Target::Pipe(Box::new(TeeWriter(std::io::stdout(), file))));
        }
        (Err(e), _) => {
            eprintln!("Failed to open log file {:?}: {}", log_file_path, e);
            builder.target(Target::Stderr);
        }
    }

    builder.init();
}
