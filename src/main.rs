use std::io::Write;

use env_logger::{Builder, Env, Target, WriteStyle};

const LOG_ENV: &str = "SUPRANOVA_LOG";

/// Logs go to stderr; stdout carries protocol output only.
fn init_logging() {
    let env = if std::env::var_os(LOG_ENV).is_some() {
        Env::new().filter(LOG_ENV)
    } else {
        Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "warn")
    };
    Builder::from_env(env)
        .format(|buf, record| {
            writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
        })
        .write_style(WriteStyle::Never)
        .target(Target::Stderr)
        .init();
}

fn main() {
    init_logging();
    if let Err(e) = supranova::uci::run_uci_loop() {
        log::error!("fatal: {e}");
        std::process::exit(1);
    }
}
