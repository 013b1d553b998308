//! # EMS Shipment Tracker
//!
//! An async Rust client for the EMS (China Post express) partner tracking API.
//!
//! A lookup sends one authenticated GET request, decodes the XML reply and
//! returns the shipment's history as a [`Shipment`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ems_tracker::EmsTracker;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tracker = EmsTracker::new("your_authenticate_token", "en")?;
//!
//!     let shipment = tracker.track("LX123456789CN").await?;
//!     for event in shipment.events() {
//!         println!("{} {} {}", event.date(), event.location(), event.description());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Transports
//!
//! Requests go through an [`HttpTransport`]. The default is
//! [`ReqwestTransport`]; use [`EmsTracker::with_transport`] to plug in
//! anything else, such as a canned transport in tests.

pub mod error;
pub mod tracker;
pub mod transport;
pub mod types;

pub use error::{EmsTrackerError, Result};
pub use tracker::{EmsTracker, TrackerConfig};
pub use transport::{HttpTransport, ReqwestTransport, TransportConfig};
pub use types::{ErrorField, Language, Shipment, ShipmentEvent, TrackResponse, TraceRecord};

/// Endpoint template for EMS tracking queries
pub const TRACKING_ENDPOINT: &str =
    "http://shipping.ems.com.cn/partner/api/public/p/track/query/{language}/{trackingNumber}";

/// Default value of the `version` request header
pub const DEFAULT_VERSION: &str = "international_eub_us_1.1";

/// Default user agent string for requests
pub const DEFAULT_USER_AGENT: &str = concat!("ems-tracker-rs/", env!("CARGO_PKG_VERSION"));
