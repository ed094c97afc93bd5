pub mod config;
pub mod db;
pub mod interpret;
pub mod logging;
pub mod models;

/// Start-up: logging, data directory, schema.
pub fn run() -> Result<(), db::DatabaseError> {
    logging::init();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let path = config::database_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let conn = db::sqlite::open_database(&path)?;
    let tables = db::sqlite::count_tables(&conn)?;
    tracing::info!(path = %path.display(), tables, "Database ready");
    Ok(())
}
