//! Dataset download and extraction.
//!
//! The cache directory doubles as the download marker: when it already
//! exists the whole acquisition step is skipped. The cache contents are not
//! validated, so a partially extracted tree must be deleted manually to
//! force a fresh download.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::utils::error::{Error, Result};

/// Remote archive with the CIFAR-10 dataset as JPEG files
pub const CIFAR10_URL: &str =
    "https://github.com/YoongiKim/CIFAR-10-images/archive/refs/heads/master.zip";

/// File name of the downloaded archive inside the cache directory
const ARCHIVE_NAME: &str = "cifar10.zip";

/// Default cache directory: `<temp>/cifar`
pub fn default_data_dir() -> PathBuf {
    std::env::temp_dir().join("cifar")
}

/// Whether the acquisition step needs to run for this cache directory
pub fn needs_download(data_dir: &Path) -> bool {
    !data_dir.exists()
}

/// Download and extract the dataset unless the cache directory exists.
///
/// On a fresh run this creates `data_dir`, downloads the archive into it,
/// and extracts the archive in place. On later runs it returns immediately.
pub fn ensure_dataset(data_dir: &Path) -> Result<()> {
    if !needs_download(data_dir) {
        info!("Dataset cache exists at {:?}, skipping download", data_dir);
        return Ok(());
    }

    fs::create_dir_all(data_dir)?;

    let archive_path = data_dir.join(ARCHIVE_NAME);
    download_archive(CIFAR10_URL, &archive_path)?;
    extract_archive(&archive_path, data_dir)?;

    Ok(())
}

/// Download `url` to `dest` with a progress bar
fn download_archive(url: &str, dest: &Path) -> Result<()> {
    info!("Downloading {} to {:?}", url, dest);

    let response = reqwest::blocking::get(url)?;
    if !response.status().is_success() {
        return Err(Error::Download(format!(
            "GET {} returned status {}",
            url,
            response.status()
        )));
    }

    let progress = match response.content_length() {
        Some(len) => {
            let bar = ProgressBar::new(len);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .unwrap()
                    .progress_chars("=>-"),
            );
            bar
        }
        None => ProgressBar::new_spinner(),
    };

    let mut reader = progress.wrap_read(response);
    let mut file = File::create(dest)?;
    std::io::copy(&mut reader, &mut file)?;
    progress.finish_with_message("Download complete");

    Ok(())
}

/// Extract a zip archive into `dest`
fn extract_archive(archive_path: &Path, dest: &Path) -> Result<()> {
    info!("Extracting {:?} to {:?}", archive_path, dest);

    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    archive.extract(dest)?;

    info!("Extracted {} entries", archive.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_download_for_missing_dir() {
        let missing = std::env::temp_dir().join("cifar-classifier-test-missing-cache");
        assert!(needs_download(&missing));
    }

    #[test]
    fn test_needs_download_for_existing_dir() {
        // The temp dir itself always exists
        assert!(!needs_download(&std::env::temp_dir()));
    }

    #[test]
    fn test_default_data_dir() {
        let dir = default_data_dir();
        assert!(dir.ends_with("cifar"));
    }
}
