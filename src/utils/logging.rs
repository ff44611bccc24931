use std::str::FromStr;
use tracing::Level;

// setup_tracing installs the JSON subscriber once per process; unknown levels fall back to INFO.
pub fn setup_tracing(level: &str) {
    let max_level = Level::from_str(level).unwrap_or(Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(max_level)
        // disable printing the name of the module in every log line.
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .json()
        .try_init();
}
