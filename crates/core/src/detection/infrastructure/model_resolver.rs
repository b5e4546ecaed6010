use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure to make the face model available. Fatal for startup.
#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("model {name} not found (searched: {})", display_paths(searched))]
    NotFound { name: String, searched: Vec<PathBuf> },
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("could not determine cache directory")]
    NoCacheDir,
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load model session from {path}: {message}")]
    Session { path: PathBuf, message: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Progress callback: `(bytes_downloaded, total_bytes)`, total is 0 when
/// the server sends no Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Where to look for a model file.
#[derive(Clone, Debug, Default)]
pub struct ModelSource {
    /// Static asset directory shipped next to the application.
    pub asset_dir: Option<PathBuf>,
    /// Fetched into the user cache when the file is found nowhere else.
    pub download_url: Option<String>,
}

/// Resolve a model file by name.
///
/// Resolution order:
/// 1. Asset directory
/// 2. User cache directory (platform-specific)
/// 3. Download from `download_url` into the cache
pub fn resolve(
    name: &str,
    source: &ModelSource,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelLoadError> {
    let mut searched = Vec::new();

    if let Some(dir) = &source.asset_dir {
        let asset_path = dir.join(name);
        if asset_path.is_file() {
            log::debug!("Using bundled model {}", asset_path.display());
            return Ok(asset_path);
        }
        searched.push(asset_path);
    }

    let cache_dir = model_cache_dir()?;
    let cached_path = cache_dir.join(name);
    if cached_path.is_file() {
        log::debug!("Using cached model {}", cached_path.display());
        return Ok(cached_path);
    }
    searched.push(cached_path.clone());

    let Some(url) = source.download_url.as_deref() else {
        return Err(ModelLoadError::NotFound {
            name: name.to_string(),
            searched,
        });
    };

    log::info!("Downloading {name} from {url}");
    fs::create_dir_all(&cache_dir).map_err(ModelLoadError::CacheDir)?;
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/FaceCam/models/`
/// - Linux: `$XDG_CACHE_HOME/FaceCam/models/` or `~/.cache/FaceCam/models/`
/// - Windows: `%LOCALAPPDATA%/FaceCam/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelLoadError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("FaceCam").join("models"))
            .ok_or(ModelLoadError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("FaceCam").join("models"))
            .ok_or(ModelLoadError::NoCacheDir)
    }
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelLoadError> {
    let temp_path = dest.with_extension("part");
    let result = download_to(url, dest, &temp_path, progress);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn download_to(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ModelLoadError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelLoadError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let write_err = |e| ModelLoadError::Write {
        path: temp_path.to_path_buf(),
        source: e,
    };
    let mut file = fs::File::create(temp_path).map_err(write_err)?;

    let mut buf = vec![0u8; 256 * 1024];
    let mut downloaded: u64 = 0;
    loop {
        let n = response.read(&mut buf).map_err(write_err)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(write_err)?;
        downloaded += n as u64;
        if let Some(cb) = &progress {
            cb(downloaded, total);
        }
    }
    file.flush().map_err(write_err)?;
    drop(file);

    fs::rename(temp_path, dest).map_err(|e| ModelLoadError::Write {
        path: dest.to_path_buf(),
        source: e,
    })
}
