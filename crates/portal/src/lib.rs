//! REST client for an ArcGIS Online style content portal.
//!
//! Wraps the portal endpoints the audit needs (token generation, item
//! search, item data, item details) using [`reqwest`]. Every data request
//! carries the current token and is retried once after a token refresh
//! when the portal reports the token as expired.

pub mod client;
pub mod error;
pub mod retry;
pub mod token;
pub mod wire;

pub use client::{PortalClient, PortalOptions};
pub use error::PortalError;
pub use retry::RetryPolicy;
pub use token::Credentials;
