use std::path::PathBuf;

/// Returns the base data directory: `~/Documents/practistics/`
/// (falls back to the current directory when no home is available).
pub fn get_data_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("practistics")
}

/// Returns the default match output directory: `<data_dir>/matches/`
pub fn get_matches_dir() -> PathBuf {
    get_data_dir().join("matches")
}

/// Returns the error-log directory: `<data_dir>/error_logs/`
pub fn get_error_logs_dir() -> PathBuf {
    get_data_dir().join("error_logs")
}

/// Returns the reference-list cache directory: `~/.practistics/cache/`
pub fn get_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".practistics")
        .join("cache")
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_matches_dir())?;
    std::fs::create_dir_all(get_error_logs_dir())?;
    std::fs::create_dir_all(get_cache_dir())?;
    Ok(())
}
