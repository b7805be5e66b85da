#![forbid(unsafe_code)]

//! Log file setup.
//!
//! Stdout belongs to the screen, so diagnostics go to a file instead.
//! Logging is off unless `KED_LOG` is set; its value is an `EnvFilter`
//! directive (`debug`, `ked_core=trace`, ...).

use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "ked.log";

/// Install the file subscriber when `KED_LOG` is set.
pub fn init() {
    let Ok(directives) = std::env::var("KED_LOG") else {
        return;
    };
    let Ok(file) = File::create(LOG_FILE) else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
}
