use anyhow::{anyhow, Context, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Fetches a file and only places it at `dest` once its checksum matches.
#[allow(async_fn_in_trait)]
pub trait Downloader {
    async fn download_with_checksum(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Downloads over HTTPS and verifies against the `<url>.sha256` file
/// published next to each binary.
pub struct HttpDownloader {
    client: reqwest::Client,
    show_progress: bool,
}

impl HttpDownloader {
    pub fn new(show_progress: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            show_progress,
        }
    }

    async fn fetch_checksum(&self, url: &str) -> Result<String> {
        let checksum_url = format!("{}.sha256", url);
        tracing::debug!("Fetching checksum from {}", checksum_url);

        let response = self.client.get(&checksum_url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "Unable to download checksum from {} (Status {})",
                checksum_url,
                response.status()
            ));
        }

        let text = response.text().await?;
        parse_expected_checksum(&text)
            .ok_or_else(|| anyhow!("No valid SHA-256 checksum found at {}", checksum_url))
    }

    async fn download_to(&self, url: &str, file: &mut fs::File, name: &str) -> Result<()> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "Unable to download {} (Status {})",
                url,
                response.status()
            ));
        }

        let total_size = response.content_length().unwrap_or(0);
        let pb = if self.show_progress {
            ProgressBar::new(total_size)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
                .progress_chars("#>-"),
        );
        pb.set_message(format!("Downloading {}", name));

        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }
        file.flush()?;

        pb.finish_and_clear();
        tracing::debug!("Downloaded {} bytes from {}", downloaded, url);
        Ok(())
    }
}

impl Downloader for HttpDownloader {
    async fn download_with_checksum(&self, url: &str, dest: &Path) -> Result<()> {
        let parent = dest
            .parent()
            .ok_or_else(|| anyhow!("Invalid download destination {}", dest.display()))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;

        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| url.to_string());

        let expected = self.fetch_checksum(url).await?;

        // Staged next to the destination so the final rename stays on one filesystem
        let mut staged = NamedTempFile::new_in(parent)?;
        self.download_to(url, staged.as_file_mut(), &name).await?;

        let actual = sha256_file(staged.path())?;
        if !actual.eq_ignore_ascii_case(&expected) {
            return Err(anyhow!(
                "Checksum mismatch for {}: expected {}, got {}",
                url,
                expected,
                actual
            ));
        }
        tracing::debug!("Checksum verified for {}", name);

        staged
            .persist(dest)
            .map_err(|e| anyhow!("Could not move download to {}: {}", dest.display(), e.error))?;
        make_executable(dest)?;
        Ok(())
    }
}

/// First field of a `sha256sum`-style line, if it looks like a SHA-256 digest.
pub fn parse_expected_checksum(text: &str) -> Option<String> {
    let hash = text.split_whitespace().next()?;
    (hash.len() == 64 && hash.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| hash.to_ascii_lowercase())
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)
        .with_context(|| format!("Could not open {} for checksum", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Writes `contents` to the destination, or fails without touching it.
    pub(crate) struct FakeDownloader {
        pub contents: Option<String>,
        pub urls: RefCell<Vec<String>>,
    }

    impl FakeDownloader {
        pub fn serving(contents: &str) -> Self {
            Self {
                contents: Some(contents.to_string()),
                urls: RefCell::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                contents: None,
                urls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Downloader for FakeDownloader {
        async fn download_with_checksum(&self, url: &str, dest: &Path) -> Result<()> {
            self.urls.borrow_mut().push(url.to_string());
            let contents = self
                .contents
                .as_ref()
                .ok_or_else(|| anyhow!("Checksum mismatch for {}", url))?;
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(dest, contents)?;
            make_executable(dest)
        }
    }

    #[test]
    fn test_parse_expected_checksum() {
        let digest = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
        assert_eq!(
            parse_expected_checksum(&format!("{}  docker-1.10.0\n", digest)).as_deref(),
            Some(digest)
        );
        assert_eq!(
            parse_expected_checksum(&digest.to_uppercase()).as_deref(),
            Some(digest)
        );
        assert_eq!(parse_expected_checksum("<html>Not Found</html>"), None);
        assert_eq!(parse_expected_checksum(""), None);
    }

    #[test]
    fn test_sha256_file_returns_known_digest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("payload");
        fs::write(&path, "test").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_make_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docker");
        fs::write(&path, "#!/bin/sh\n").unwrap();
        make_executable(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
