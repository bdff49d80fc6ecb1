//! TruScope Cache
//!
//! Shared response cache for provider lookups and synthesized verdicts.
//!
//! # Overview
//!
//! - **Content addressing**: keys are the SHA-256 of the operation class and
//!   the normalized query (lowercased, trimmed, whitespace collapsed)
//! - **Per-class TTLs**: entries are never returned after they expire
//! - **Capacity bound**: on overflow, expired entries are purged and then the
//!   least recently accessed entries evicted
//! - **Snapshots**: contents can be saved to and restored from any
//!   [`DurablePersistence`](truscope_domain::DurablePersistence) backend with
//!   checksum verification
//!
//! ## TTLs
//!
//! | Class | Default TTL |
//! |-------|-------------|
//! | claim-review | 24 hours |
//! | web-search | 1 hour |
//! | news | 12 hours |
//! | synthesis | 6 hours |
//!
//! # Configuration
//!
//! ```toml
//! [cache]
//! claim_review_ttl_minutes = 1440
//! web_search_ttl_minutes = 60
//! news_ttl_minutes = 720
//! synthesis_ttl_minutes = 360
//! max_entries = 1000
//! snapshot_key = "cache:snapshot"
//! ```
//!
//! # Snapshots
//!
//! ```no_run
//! use truscope_cache::{CacheConfig, JsonFilePersistence, ResponseCache};
//!
//! # async fn run() -> Result<(), truscope_cache::CacheError> {
//! let cache = ResponseCache::new(CacheConfig::default());
//! let store = JsonFilePersistence::new("/tmp/truscope");
//!
//! match cache.restore_snapshot(&store).await {
//!     Ok(n) => println!("restored {} entries", n),
//!     Err(e) if e.is_corruption() => println!("starting cold: {}", e),
//!     Err(e) => return Err(e),
//! }
//!
//! // ... serve requests ...
//!
//! cache.save_snapshot(&store).await?;
//! println!("{}", cache.metrics().summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod cache;
mod clock;
mod config;
mod error;
mod key;
mod metrics;
mod persistence;
mod snapshot;

pub use cache::ResponseCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::CacheError;
pub use key::{normalize_query, CacheKey, OperationClass};
pub use metrics::CacheMetrics;
pub use persistence::{JsonFilePersistence, MemoryPersistence};
