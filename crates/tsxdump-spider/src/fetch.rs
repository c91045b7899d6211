use crate::config::Config;
use crate::fs::PageCache;
use crate::http::HttpClient;
use crate::{Error, Result};
use std::future::Future;
use tracing::{debug, error, trace};

/// Anything that turns a URL into a page body.
///
/// The scrape steps are generic over this, so runs can be driven from fixtures as easily as from
/// the network.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>>;
}

/// Fetches pages over HTTP, reading through the [`PageCache`] when one is configured.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: HttpClient,
    cache: Option<PageCache>,
}

impl HttpFetcher {
    pub async fn new(config: &Config) -> Result<Self> {
        let client = std_client_build(&config.user_agent)?;
        let cache = match &config.cache {
            Some(dir) => Some(PageCache::open(dir).await?),
            None => None,
        };
        Ok(Self { client, cache })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        if let Some(cache) = &self.cache {
            if let Some(body) = cache.read(url).await? {
                return Ok(body);
            }
        }

        debug!("retrieving {url}");
        let response = self.client.get(url).send().await.map_err(|err| {
            error!("failed to fetch {url}, error({err})");
            Error::Network {
                url: url.to_string(),
                source: err,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("{url} responded with {status}");
            return Err(Error::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|err| Error::Network {
            url: url.to_string(),
            source: err,
        })?;
        trace!("{} bytes received from {url}", body.len());

        if let Some(cache) = &self.cache {
            cache.write(url, &body).await?;
        }

        Ok(body)
    }
}

pub(crate) fn std_client_build(user_agent: &str) -> Result<HttpClient> {
    reqwest::ClientBuilder::new()
        .user_agent(user_agent)
        .build()
        .map_err(Error::Client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Sources;

    #[tokio::test]
    async fn cached_pages_skip_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database: dir.path().join("tsxdump.db"),
            cache: Some(dir.path().join("cache")),
            user_agent: "tsxdump-test".to_string(),
            sources: Sources::default(),
        };

        // an unroutable URL only resolves if the body comes from the cache
        let url = "http://127.0.0.1:9/listing/A";
        PageCache::open(dir.path().join("cache"))
            .await
            .unwrap()
            .write(url, r#"{"results":[]}"#)
            .await
            .unwrap();

        let fetcher = HttpFetcher::new(&config).await.unwrap();
        assert_eq!(fetcher.fetch(url).await.unwrap(), r#"{"results":[]}"#);
    }
}
