//! herald — single-pass RSS-to-webhook notifier for YouTube channel feeds.
//!
//! One invocation fetches the configured feed, compares its entries
//! against a persisted set of already-notified identifiers, and posts a
//! Discord-style embed to a webhook for each new entry, oldest first.
//! Repeat polling is the job of an external scheduler (cron or similar)
//! running the binary again.
//!
//! Delivery semantics are at-least-once: identifiers are committed to the
//! seen set independent of delivery outcome (configurable), and a run
//! killed mid-pass may notify without persisting.

pub mod config;
pub mod enrich;
pub mod feed;
pub mod notify;
pub mod novelty;
pub mod run;
pub mod store;
