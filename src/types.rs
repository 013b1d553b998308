//! Type definitions for EMS responses and normalized shipments.

use crate::error::{EmsTrackerError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Formats EMS has been seen to use for `acceptTime`
const ACCEPT_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y/%m/%d %H:%M:%S"];

/// Language of the event descriptions returned by EMS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Chinese
    Cn,
}

impl Language {
    /// The path segment used in the endpoint URL
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Cn => "cn",
        }
    }
}

impl AsRef<str> for Language {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = EmsTrackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "en" => Ok(Language::En),
            "cn" => Ok(Language::Cn),
            other => Err(EmsTrackerError::invalid_argument(format!(
                "Invalid language, expect \"cn\" or \"en\", giving \"{}\"",
                other
            ))),
        }
    }
}

/// Root of an EMS tracking response.
///
/// Error responses carry `code` and `description`, successful ones carry a
/// `trace` element per event. Anything else in the document is ignored.
/// Text content is trimmed of surrounding whitespace while decoding.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename = "response")]
pub struct TrackResponse {
    /// Error code (error responses only)
    #[serde(rename = "code", default)]
    pub code: Option<ErrorField>,

    /// Error description (error responses only)
    #[serde(rename = "description", default)]
    pub description: Option<ErrorField>,

    /// Tracking events, in the order EMS returned them
    #[serde(rename = "trace", default)]
    pub trace: Vec<TraceRecord>,

    /// Number of top-level `trace` elements seen in the document
    #[serde(skip)]
    pub(crate) trace_elements: usize,
}

impl TrackResponse {
    /// Whether the document contained any `trace` element, even an empty one
    pub fn has_trace(&self) -> bool {
        self.trace_elements > 0 || !self.trace.is_empty()
    }

    /// Error code, or an empty string when absent
    pub fn error_code(&self) -> &str {
        self.code.as_ref().map(ErrorField::as_str).unwrap_or_default()
    }

    /// Error description, or an empty string when absent
    pub fn error_description(&self) -> &str {
        self.description
            .as_ref()
            .map(ErrorField::as_str)
            .unwrap_or_default()
    }
}

/// Text of an error element; nested child elements are ignored
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorField {
    #[serde(rename = "$text", default)]
    text: String,
}

impl ErrorField {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// One `trace` element of a tracking response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TraceRecord {
    /// When the event was recorded
    #[serde(rename = "acceptTime", default)]
    pub accept_time: String,

    /// Where the event was recorded
    #[serde(rename = "acceptAddress", default)]
    pub accept_address: String,

    /// Free-text status
    #[serde(rename = "remark", default)]
    pub remark: String,
}

impl TraceRecord {
    /// An empty `<trace/>` element decodes to a record with no content
    pub fn is_empty(&self) -> bool {
        self.accept_time.is_empty() && self.accept_address.is_empty() && self.remark.is_empty()
    }
}

/// A single status update in a shipment's history
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ShipmentEvent {
    location: String,
    description: String,
    date: String,
}

impl ShipmentEvent {
    pub fn new(
        location: impl Into<String>,
        description: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            description: description.into(),
            date: date.into(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The event time as EMS reported it, without surrounding whitespace
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Try to interpret the reported time as a local timestamp
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        let date = self.date.trim();
        ACCEPT_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(date, format).ok())
    }
}

impl From<TraceRecord> for ShipmentEvent {
    fn from(record: TraceRecord) -> Self {
        Self {
            location: record.accept_address,
            description: record.remark,
            date: record.accept_time,
        }
    }
}

/// A shipment's history as returned by one lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    events: Vec<ShipmentEvent>,
    delivered_at: Option<String>,
    is_delivered: Option<bool>,
}

impl Shipment {
    /// Create a shipment from events in API order
    pub fn new(events: Vec<ShipmentEvent>) -> Self {
        Self {
            events,
            delivered_at: None,
            is_delivered: None,
        }
    }

    pub fn events(&self) -> &[ShipmentEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<ShipmentEvent> {
        self.events
    }

    pub fn delivered_at(&self) -> Option<&str> {
        self.delivered_at.as_deref()
    }

    pub fn set_delivered_at(&mut self, date: impl Into<String>) -> &mut Self {
        self.delivered_at = Some(date.into());
        self
    }

    /// Explicit delivery flag; `None` unless someone set it
    pub fn is_delivered(&self) -> Option<bool> {
        self.is_delivered
    }

    pub fn set_delivered(&mut self, delivered: bool) -> &mut Self {
        self.is_delivered = Some(delivered);
        self
    }
}
