//! Track a single EMS shipment and print its history as JSON.
//!
//! Usage:
//! ```
//! EMS_AUTHENTICATE=your_token cargo run --example track_shipment -- LX123456789CN [en|cn]
//! ```

use ems_tracker::{EmsTracker, EmsTrackerError};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let authenticate =
        env::var("EMS_AUTHENTICATE").expect("EMS_AUTHENTICATE environment variable must be set");

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <tracking number> [en|cn]", args[0]);
        std::process::exit(1);
    }
    let tracking_number = &args[1];
    let language = args.get(2).map(String::as_str).unwrap_or("en");

    let tracker = EmsTracker::new(authenticate, language)?;

    match tracker.track(tracking_number).await {
        Ok(shipment) => {
            println!("{}", serde_json::to_string_pretty(&shipment)?);
        }
        Err(EmsTrackerError::Track { message }) => {
            eprintln!("Tracking {} failed: {}", tracking_number, message);
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
