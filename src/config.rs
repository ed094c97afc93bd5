use std::path::{Path, PathBuf};

/// Application-level constants
pub const APP_NAME: &str = "Labtrack";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Overrides the data directory when set to a non-empty path.
pub const DATA_DIR_ENV: &str = "LABTRACK_DATA_DIR";
/// Standard `EnvFilter` directives, e.g. `labtrack=debug`.
pub const LOG_ENV: &str = "LABTRACK_LOG";
pub const DATABASE_FILE: &str = "labtrack.db";

/// Pick the data directory: explicit override first, then the platform
/// data dir, then the working directory.
pub fn resolve_data_dir(override_dir: Option<&Path>) -> PathBuf {
    match override_dir {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => dirs::data_dir()
            .map(|d| d.join(APP_NAME))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_NAME)),
    }
}

/// Get the application data directory
pub fn app_data_dir() -> PathBuf {
    let override_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
    resolve_data_dir(override_dir.as_deref())
}

pub fn database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE)
}

/// Filter used when neither `LABTRACK_LOG` nor `RUST_LOG` is set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "labtrack=debug,warn"
    } else {
        "labtrack=info,warn"
    }
}
