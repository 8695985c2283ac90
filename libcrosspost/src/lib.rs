//! Crosspost - one command line, every platform
//!
//! This library provides the core functionality for posting text, photo,
//! video, and document content to ten social platforms through a single
//! upstream API: parameter resolution, capability validation, request
//! building, the HTTP transport, and response classification.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod media;
pub mod outcome;
pub mod platform;
pub mod request;
pub mod resolve;
pub mod transport;
pub mod validate;

// Re-export commonly used types
pub use client::{CrosspostClient, PollOptions, PollOutcome};
pub use config::Config;
pub use error::{CrosspostError, Result};
pub use outcome::{PlatformResult, PostOutcome};
pub use platform::{ContentType, Platform, PlatformField, ALL_PLATFORMS};
pub use request::{ContentInput, PostRequest};
pub use resolve::{Flags, ResolvedParams, Resolver};
