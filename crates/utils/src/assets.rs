use std::path::PathBuf;

use directories::ProjectDirs;

const PROJECT_ROOT: &str = env!("CARGO_MANIFEST_DIR");

/// Base data directory for the application.
///
/// Respects the `GALLERIA_DATA_DIR` environment variable; in debug builds
/// defaults to a `dev_assets` directory inside the repository so local runs
/// never touch the real data dir.
pub fn asset_dir() -> PathBuf {
    if let Ok(path) = std::env::var("GALLERIA_DATA_DIR") {
        let path = PathBuf::from(path);
        ensure_dir(&path);
        return path;
    }

    let path = if cfg!(debug_assertions) {
        PathBuf::from(PROJECT_ROOT).join("../../dev_assets")
    } else {
        ProjectDirs::from("se", "galleria", "galleria")
            .expect("OS didn't give us a home directory")
            .data_dir()
            .to_path_buf()
    };

    ensure_dir(&path);
    path
}

/// Get the database file path.
///
/// Respects the `GALLERIA_DATABASE_PATH` environment variable.
pub fn database_path() -> PathBuf {
    if let Ok(path) = std::env::var("GALLERIA_DATABASE_PATH") {
        return PathBuf::from(path);
    }
    asset_dir().join("db.sqlite")
}

/// Root of the permanent image storage tree (one subdirectory per gallery).
///
/// Respects the `GALLERIA_STORAGE_DIR` environment variable.
pub fn storage_dir() -> PathBuf {
    let path = std::env::var("GALLERIA_STORAGE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| asset_dir().join("images"));
    ensure_dir(&path);
    path
}

/// Directory multipart uploads are staged in before ingestion moves them
/// into the permanent tree.
///
/// Respects the `GALLERIA_TEMP_DIR` environment variable.
pub fn temp_upload_dir() -> PathBuf {
    let path = std::env::var("GALLERIA_TEMP_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| asset_dir().join("tmp"));
    ensure_dir(&path);
    path
}

fn ensure_dir(path: &PathBuf) {
    if !path.exists() {
        std::fs::create_dir_all(path).expect("Failed to create asset directory");
    }
}
