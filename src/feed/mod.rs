//! Feed retrieval and parsing.
//!
//! - [`parser`] - Low-level RSS/Atom parsing using the `feed-rs` crate,
//!   flattening entries into [`FeedEntry`] records
//! - [`fetcher`] - Bounded HTTP retrieval of the feed document
//!
//! The fetcher performs no retries: a failed poll is simply retried by the
//! external scheduler on its next invocation.

mod fetcher;
mod parser;

pub use fetcher::{fetch_feed, FetchError};
pub use parser::{parse_feed, FeedEntry};
