//! Query limits and server configuration.

use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::page::{Order, PageRequest};

/// Page size bounds applied to list requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryLimits {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 1000,
        }
    }
}

impl QueryLimits {
    /// Checks that the limits are usable.
    ///
    /// # Errors
    /// Returns [`FilterError::InvalidPage`] if either size is zero or the
    /// default exceeds the maximum.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(FilterError::InvalidPage {
                reason: "page sizes must be at least 1".to_string(),
            });
        }
        if self.default_page_size > self.max_page_size {
            return Err(FilterError::InvalidPage {
                reason: format!(
                    "default page size {} exceeds maximum {}",
                    self.default_page_size, self.max_page_size
                ),
            });
        }
        Ok(())
    }

    /// Builds a page request, filling in defaults.
    ///
    /// # Errors
    /// Returns [`FilterError::InvalidPage`] if `size` is zero or above the
    /// maximum.
    pub fn page_request(
        &self,
        page: Option<usize>,
        size: Option<usize>,
        sort: Vec<Order>,
    ) -> Result<PageRequest, FilterError> {
        let size = size.unwrap_or(self.default_page_size);
        if size > self.max_page_size {
            return Err(FilterError::InvalidPage {
                reason: format!("size {size} exceeds maximum {}", self.max_page_size),
            });
        }
        Ok(PageRequest::new(page.unwrap_or(0), size)?.with_sort(sort))
    }
}

#[cfg(feature = "server")]
pub use server::ServerConfig;

#[cfg(feature = "server")]
mod server {
    use std::net::SocketAddr;
    use std::path::PathBuf;

    use clap::Parser;

    use super::QueryLimits;

    /// Command line and environment configuration for `curation-server`.
    #[derive(Parser, Debug, Clone)]
    #[command(name = "curation-server")]
    #[command(about = "Read-only curation REST API")]
    pub struct ServerConfig {
        /// Address to listen on
        #[arg(long, env = "CURATION_BIND", default_value = "127.0.0.1:8080")]
        pub bind: SocketAddr,

        /// JSON dataset loaded at startup
        #[arg(long, env = "CURATION_SEED")]
        pub seed: Option<PathBuf>,

        /// Page size when a request names none
        #[arg(long, env = "CURATION_DEFAULT_PAGE_SIZE", default_value_t = 20)]
        pub default_page_size: usize,

        /// Largest page size a request may ask for
        #[arg(long, env = "CURATION_MAX_PAGE_SIZE", default_value_t = 1000)]
        pub max_page_size: usize,

        /// Enable verbose debug logging
        #[arg(short, long, env = "CURATION_VERBOSE")]
        pub verbose: bool,
    }

    impl ServerConfig {
        #[must_use]
        pub const fn limits(&self) -> QueryLimits {
            QueryLimits {
                default_page_size: self.default_page_size,
                max_page_size: self.max_page_size,
            }
        }
    }
}
