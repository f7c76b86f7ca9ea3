//! Webhook notification: embed payload rendering and delivery.
//!
//! - [`payload`] - Discord-style embed payload built from a normalized
//!   entry, plus magnitude formatting for counts
//! - [`webhook`] - The single POST, with the dev-mode dry-run gate

mod payload;
mod webhook;

pub use payload::{build_payload, format_count, WebhookPayload};
pub use webhook::{deliver, NotifyError};
