use std::fs::File;
use std::sync::Mutex;

use anyhow::{anyhow, Context};
use tracing_subscriber::EnvFilter;

use crate::config::ViewerConfig;

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`
/// level. The terminal view owns stdout and stderr, so there logs go to
/// `--log-file` or nowhere.
pub fn init(config: &ViewerConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let result = if config.headless {
        builder.with_writer(std::io::stderr).try_init()
    } else if let Some(path) = &config.log_file {
        let file = File::create(path).with_context(|| format!("could not create log file {}", path.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
    } else {
        builder.with_writer(std::io::sink).try_init()
    };

    result.map_err(|e| anyhow!("could not install logger: {e}"))
}
