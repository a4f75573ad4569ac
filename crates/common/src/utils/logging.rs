use std::io;

use configs::LogFormat;
use tracing_subscriber::{fmt, EnvFilter};

/// Directives used when `RUST_LOG` is unset. JSON output is meant for
/// collected logs, so it also keeps the question service's debug events.
fn default_directives(format: LogFormat) -> &'static str {
    match format {
        LogFormat::Compact => "info,sqlx=warn",
        LogFormat::Json => "info,service::question=debug,sqlx=warn",
    }
}

fn env_filter(format: LogFormat) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(format)))
}

/// Install the global subscriber for `format`, writing to stdout.
/// Later calls are no-ops once a subscriber is set.
pub fn init_logging(format: LogFormat) {
    let builder = fmt().with_env_filter(env_filter(format)).with_target(false).with_writer(io::stdout);
    // 已初始化时 try_init 返回 Err，忽略即可
    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
