use env_logger::Env;
use std::sync::OnceLock;

static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Install the env_logger backend once; `RUST_LOG` overrides the `info` default
pub fn init() {
    LOGGER_INIT.get_or_init(|| {
        if let Err(e) = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
            .format_timestamp_millis()
            .try_init()
        {
            eprintln!("failed to initialize logging: {e}");
        }
    });
}
