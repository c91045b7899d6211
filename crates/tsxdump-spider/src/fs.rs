use crate::Result;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::trace;

/// Page bodies keyed by the SHA-256 of their URL, one file per page.
///
/// A cached page is never refetched; delete the directory to collect fresh data.
#[derive(Clone, Debug)]
pub struct PageCache {
    dir: PathBuf,
}

impl PageCache {
    /// Open the cache at `dir`, creating the directory as necessary.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        trace!("checking cache directory: {:?}", dir);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path(&self, url: &str) -> PathBuf {
        self.dir.join(hex::encode(Sha256::digest(url.as_bytes())))
    }

    /// Reads the cached body for `url`; `None` when the page was never stored.
    pub async fn read(&self, url: &str) -> Result<Option<String>> {
        let path = self.path(url);
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => {
                trace!("cache hit for {url} at {path:?}");
                Ok(Some(body))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn write(&self, url: &str, body: &str) -> Result<()> {
        let path = self.path(url);
        trace!("caching {url} to {path:?}");
        tokio::fs::write(path, body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_reads_back_pages() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::open(dir.path().join("cache")).await.unwrap();
        let url = "https://www.tsx.com/json/company-directory/search/tsx/A";

        assert_eq!(cache.read(url).await.unwrap(), None);

        cache.write(url, r#"{"results":[]}"#).await.unwrap();
        assert_eq!(
            cache.read(url).await.unwrap().as_deref(),
            Some(r#"{"results":[]}"#)
        );
        assert_eq!(
            cache
                .read("https://www.tsx.com/json/company-directory/search/tsx/B")
                .await
                .unwrap(),
            None
        );
    }
}
