use crate::config::ConfigError;
use rand::Rng;
use reqwest::Url;

/// The catalog worker replicas a search can be routed to.
///
/// Built once at startup and never modified afterwards. Selection is
/// uniformly random per call; a dead replica is only noticed when the call
/// routed to it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerPool {
    endpoints: Vec<String>,
}

impl WorkerPool {
    pub fn new<I, S>(endpoints: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let endpoints: Vec<String> = endpoints
            .into_iter()
            .map(|endpoint| endpoint.as_ref().trim().trim_end_matches('/').to_string())
            .filter(|endpoint| !endpoint.is_empty())
            .collect();

        if endpoints.is_empty() {
            return Err(ConfigError::NoWorkers);
        }

        if let Some(bad) = endpoints.iter().find(|endpoint| !is_http_base(endpoint)) {
            return Err(ConfigError::InvalidValue {
                name: "WORKER_HOSTS",
                value: bad.clone(),
            });
        }

        Ok(Self { endpoints })
    }

    /// Parses a comma separated endpoint list such as `WORKER_HOSTS`.
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        Self::new(list.split(','))
    }

    pub fn pick(&self) -> &str {
        let index = rand::thread_rng().gen_range(0..self.endpoints.len());
        &self.endpoints[index]
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }
}

/// An absolute http(s) URL with a host, e.g. `http://worker:3000`.
fn is_http_base(endpoint: &str) -> bool {
    match Url::parse(endpoint) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}
