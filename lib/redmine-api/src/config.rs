//! Client configuration types.

use std::time::Duration;

use redmine_api_core::Charset;

/// Server default page size for list endpoints.
pub const DEFAULT_OBJECTS_PER_PAGE: usize = 25;

/// Page-count limit for one full listing.
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Configuration for the HTTP client and the listing engine.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout duration.
    pub timeout: Duration,
    /// Connection timeout duration.
    pub connect_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_idle_per_host: usize,
    /// Idle connection timeout.
    pub pool_idle_timeout: Duration,
    /// Page size requested by full listings.
    pub objects_per_page: usize,
    /// Maximum number of pages one full listing may need; more is an error.
    pub max_pages: usize,
    /// Charset used to encode `login:password` for Basic credentials that do
    /// not name their own.
    pub auth_charset: Charset,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            objects_per_page: DEFAULT_OBJECTS_PER_PAGE,
            max_pages: DEFAULT_MAX_PAGES,
            auth_charset: Charset::Utf8,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
    objects_per_page: Option<usize>,
    max_pages: Option<usize>,
    auth_charset: Option<Charset>,
}

impl ClientConfigBuilder {
    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.pool_idle_per_host = Some(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Set the page size used by full listings. Zero is treated as one.
    #[must_use]
    pub const fn objects_per_page(mut self, count: usize) -> Self {
        self.objects_per_page = Some(count);
        self
    }

    /// Set the page-count limit for full listings.
    #[must_use]
    pub const fn max_pages(mut self, count: usize) -> Self {
        self.max_pages = Some(count);
        self
    }

    /// Set the Basic-authentication charset.
    #[must_use]
    pub const fn auth_charset(mut self, charset: Charset) -> Self {
        self.auth_charset = Some(charset);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            pool_idle_per_host: self
                .pool_idle_per_host
                .unwrap_or(defaults.pool_idle_per_host),
            pool_idle_timeout: self.pool_idle_timeout.unwrap_or(defaults.pool_idle_timeout),
            objects_per_page: self
                .objects_per_page
                .unwrap_or(defaults.objects_per_page)
                .max(1),
            max_pages: self.max_pages.unwrap_or(defaults.max_pages),
            auth_charset: self.auth_charset.unwrap_or(defaults.auth_charset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.pool_idle_per_host, 32);
        assert_eq!(config.objects_per_page, 25);
        assert_eq!(config.max_pages, 10_000);
        assert_eq!(config.auth_charset, Charset::Utf8);
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .objects_per_page(100)
            .auth_charset(Charset::Latin1)
            .build();

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.objects_per_page, 100);
        assert_eq!(config.auth_charset, Charset::Latin1);
        assert_eq!(config.pool_idle_per_host, 32);
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let config = ClientConfig::builder().objects_per_page(0).build();
        assert_eq!(config.objects_per_page, 1);
    }
}
