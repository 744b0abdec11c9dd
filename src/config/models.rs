use crate::humanize::HumanDuration;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub document: DocumentConfig,
}

/// Remote and local content fetching
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Maximum simultaneous remote fetches (0 = unlimited)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Delay applied before every remote request
    #[serde(default = "default_min_interval")]
    pub min_interval: HumanDuration,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    /// Attempts per remote fetch (1 = no retry)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            min_interval: default_min_interval(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_max_concurrent() -> usize {
    5
}

fn default_min_interval() -> HumanDuration {
    HumanDuration::from_millis(200)
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(10)
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(60)
}

fn default_max_retries() -> u32 {
    1
}

fn default_user_agent() -> String {
    concat!("zipline/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Document scanning conventions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentConfig {
    /// Lines starting with this prefix are never treated as directives
    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,
    /// Prefix that introduces a directive line (`.zip file.rs`)
    #[serde(default = "default_directive_marker")]
    pub directive_marker: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            comment_prefix: default_comment_prefix(),
            directive_marker: default_directive_marker(),
        }
    }
}

fn default_comment_prefix() -> String {
    "//".to_string()
}

fn default_directive_marker() -> String {
    ".".to_string()
}
