//! Carousel Host
//!
//! Mounts a carousel on a headless page and drives it from protocol signals.
//!
//! - [`config`]: TOML configuration with defaults for every field
//! - [`session`]: the document, the mounted carousel and signal dispatch

pub mod config;
pub mod session;

pub use config::Config;
pub use session::Session;
