use clap::ValueEnum;
use reqwest::header::HeaderMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_INTERVAL_MS: u64 = 500;
pub const DEFAULT_MAX_TRANSPORT_RETRIES: u32 = 3;
pub const RESULTS_MAX_ATTEMPTS: u32 = 50;

/// Which results page is being driven.
///
/// The two pages poll different endpoints and read different SUCCESS payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Variant {
    /// Full job results: SUCCESS carries a table, polling is capped.
    #[default]
    Results,
    /// File-processing task: SUCCESS carries a reference path, polling is unbounded.
    Task,
}

impl Variant {
    pub fn status_path(&self) -> &'static str {
        match self {
            Variant::Results => "/check-status/",
            Variant::Task => "/check-task-status/",
        }
    }

    pub fn default_max_attempts(&self) -> Option<u32> {
        match self {
            Variant::Results => Some(RESULTS_MAX_ATTEMPTS),
            Variant::Task => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Variant::Results => "Job Results",
            Variant::Task => "File Processing",
        }
    }
}

/// Resolved settings for one polling loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub variant: Variant,
    pub url: String,
    pub headers: HeaderMap,
    pub interval: Duration,
    /// `None` polls until a terminal status is observed.
    pub max_attempts: Option<u32>,
    /// Consecutive transport failures tolerated before giving up.
    pub max_transport_retries: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::for_variant(Variant::default(), DEFAULT_BASE_URL)
    }
}

impl PollConfig {
    pub fn for_variant(variant: Variant, base_url: &str) -> Self {
        Self {
            variant,
            url: join_url(base_url, variant.status_path()),
            headers: HeaderMap::new(),
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            max_attempts: variant.default_max_attempts(),
            max_transport_retries: DEFAULT_MAX_TRANSPORT_RETRIES,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// `0` is treated as "no cap".
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = (max_attempts > 0).then_some(max_attempts);
        self
    }

    pub fn with_max_transport_retries(mut self, retries: u32) -> Self {
        self.max_transport_retries = retries;
        self
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
