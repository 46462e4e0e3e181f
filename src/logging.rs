use crate::error::{Error, Result};
use chrono::Local;
use env_logger::{Builder, Env, Target};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;

/// Sets up `env_logger` for the relay.
///
/// `RUST_LOG` still wins when set. Without it the level is Info, or Debug
/// when `debug` is on. When `log_file` is given, lines are appended to that
/// file instead of stderr.
pub fn init(debug: bool, log_file: Option<&str>) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));

    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] {}: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    // teloxide is chatty at debug
    builder.filter_module("teloxide", LevelFilter::Info);
    builder.filter_module("reqwest", LevelFilter::Warn);

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .map_err(|e| Error::InternalError(format!("logger already set: {}", e)))
}
