//! EMS tracking client implementation.

use crate::error::{EmsTrackerError, Result};
use crate::transport::{HttpTransport, ReqwestTransport, TransportConfig};
use crate::types::{Language, Shipment, ShipmentEvent, TrackResponse};
use crate::{DEFAULT_VERSION, TRACKING_ENDPOINT};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for the EMS tracker
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Endpoint template containing `{language}` and `{trackingNumber}`
    pub endpoint: String,
    /// Value sent in the `version` header
    pub version: String,
    /// Settings for the default reqwest transport
    pub transport: TransportConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            endpoint: TRACKING_ENDPOINT.to_string(),
            version: DEFAULT_VERSION.to_string(),
            transport: TransportConfig::default(),
        }
    }
}

/// Tracks EMS shipments by tracking number
pub struct EmsTracker {
    /// HTTP transport
    transport: Arc<dyn HttpTransport>,
    /// Credential sent in the `authenticate` header
    authenticate: String,
    /// Language of returned event descriptions
    language: Language,
    /// Tracker configuration
    config: TrackerConfig,
}

impl EmsTracker {
    /// Create a new tracker with default configuration
    pub fn new(authenticate: impl Into<String>, language: impl AsRef<str>) -> Result<Self> {
        Self::with_config(authenticate, language, TrackerConfig::default())
    }

    /// Create a new tracker with custom configuration
    pub fn with_config(
        authenticate: impl Into<String>,
        language: impl AsRef<str>,
        config: TrackerConfig,
    ) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.transport)?;
        Self::build(authenticate, language, config, Arc::new(transport))
    }

    /// Create a new tracker that sends requests through `transport`
    pub fn with_transport(
        authenticate: impl Into<String>,
        language: impl AsRef<str>,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        Self::build(authenticate, language, TrackerConfig::default(), transport)
    }

    fn build(
        authenticate: impl Into<String>,
        language: impl AsRef<str>,
        config: TrackerConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        Ok(Self {
            transport,
            authenticate: authenticate.into(),
            language: language.as_ref().parse()?,
            config,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Change the language; only `en` and `cn` are accepted
    pub fn set_language(&mut self, language: impl AsRef<str>) -> Result<&mut Self> {
        self.language = language.as_ref().parse()?;
        Ok(self)
    }

    pub fn authenticate(&self) -> &str {
        &self.authenticate
    }

    pub fn set_authenticate(&mut self, authenticate: impl Into<String>) -> &mut Self {
        self.authenticate = authenticate.into();
        self
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.config.version = version.into();
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Look up the history of one shipment
    pub async fn track(&self, tracking_number: &str) -> Result<Shipment> {
        let url = format_endpoint(&self.config.endpoint, self.language, tracking_number);
        debug!("Tracking shipment {} via {}", tracking_number, url);

        let headers = [
            ("version", self.config.version.as_str()),
            ("authenticate", self.authenticate.as_str()),
        ];
        let body = self.transport.get(&url, &headers).await?;
        debug!("Received XML response: {}", body);

        let response = parse_response(&body)?;
        if !response.has_trace() {
            warn!(
                "EMS returned error code {:?} for {}",
                response.error_code(),
                tracking_number
            );
            return Err(EmsTrackerError::track(format!(
                "Bad response, code: \"{}\", message: \"{}\"",
                response.error_code(),
                response.error_description()
            )));
        }

        let shipment = build_shipment(response);
        info!(
            "Tracked shipment {}: {} events",
            tracking_number,
            shipment.events().len()
        );
        Ok(shipment)
    }
}

/// Substitute `{language}` and `{trackingNumber}` in `template`.
///
/// The tracking number is inserted as-is, without percent-encoding.
pub fn format_endpoint(template: &str, language: Language, tracking_number: &str) -> String {
    template
        .replacen("{language}", language.as_str(), 1)
        .replacen("{trackingNumber}", tracking_number, 1)
}

/// Decode a response body, rejecting anything that is not a single well-formed document
pub fn parse_response(body: &str) -> Result<TrackResponse> {
    let invalid = || EmsTrackerError::track(format!("Invalid xml response \"{}\"", body));

    let trace_elements = match count_trace_elements(body) {
        Some(count) => count,
        None => {
            warn!("Response is not well-formed XML");
            return Err(invalid());
        }
    };

    let mut response: TrackResponse = quick_xml::de::from_str(body).map_err(|e| {
        warn!("Failed to decode XML response: {}", e);
        invalid()
    })?;
    response.trace_elements = trace_elements;
    Ok(response)
}

/// Map trace records to events and mark the first event's date as `delivered_at`.
///
/// Empty `<trace/>` elements carry no event and are skipped.
pub fn build_shipment(response: TrackResponse) -> Shipment {
    let events: Vec<ShipmentEvent> = response
        .trace
        .into_iter()
        .filter(|record| !record.is_empty())
        .map(ShipmentEvent::from)
        .collect();
    let first_date = events.first().map(|event| event.date().to_string());

    let mut shipment = Shipment::new(events);
    if let Some(date) = first_date {
        shipment.set_delivered_at(date);
    }
    shipment
}

/// Count `trace` children of the root element, or `None` if the document is malformed
fn count_trace_elements(xml: &str) -> Option<usize> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut roots = 0usize;
    let mut traces = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                match depth {
                    0 => roots += 1,
                    1 if start.name().as_ref() == b"trace" => traces += 1,
                    _ => {}
                }
                depth += 1;
            }
            Ok(Event::Empty(empty)) => match depth {
                0 => roots += 1,
                1 if empty.name().as_ref() == b"trace" => traces += 1,
                _ => {}
            },
            Ok(Event::End(_)) => depth = depth.checked_sub(1)?,
            Ok(Event::Text(text)) if depth == 0 => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    return None;
                }
            }
            Ok(Event::CData(_)) if depth == 0 => return None,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(_) => return None,
        }
    }

    (roots == 1 && depth == 0).then_some(traces)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERROR_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
  <code>S01</code>
  <description>Invalid tracking number</description>
</response>"#;

    #[test]
    fn test_tracker_creation() {
        let tracker = EmsTracker::new("foo", "en").unwrap();
        assert_eq!(tracker.language(), Language::En);
        assert_eq!(tracker.authenticate(), "foo");
        assert_eq!(tracker.version(), DEFAULT_VERSION);

        let err = EmsTracker::new("foo", "fr").err().unwrap();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_setters() {
        let mut tracker = EmsTracker::new("foo", "en").unwrap();
        tracker.set_language("cn").unwrap();
        tracker.set_authenticate("bar");
        assert_eq!(tracker.language(), Language::Cn);
        assert_eq!(tracker.authenticate(), "bar");

        tracker.set_language(Language::En).unwrap();
        assert_eq!(tracker.language(), Language::En);

        let err = tracker.set_language("es").err().unwrap();
        assert!(err.is_invalid_argument());
        assert_eq!(tracker.language(), Language::En);
    }

    #[test]
    fn test_version_is_per_instance() {
        let mut first = EmsTracker::new("foo", "en").unwrap();
        let second = EmsTracker::new("foo", "en").unwrap();

        first.set_version("international_eub_us_1.2");
        assert_eq!(first.version(), "international_eub_us_1.2");
        assert_eq!(second.version(), DEFAULT_VERSION);
    }

    #[test]
    fn test_format_endpoint() {
        let url = format_endpoint(TRACKING_ENDPOINT, Language::En, "1234");
        assert_eq!(
            url,
            "http://shipping.ems.com.cn/partner/api/public/p/track/query/en/1234"
        );

        let url = format_endpoint(TRACKING_ENDPOINT, Language::Cn, "LX123 456");
        assert!(url.ends_with("/query/cn/LX123 456"));
    }

    #[test]
    fn test_parse_error_response() {
        let response = parse_response(ERROR_RESPONSE).unwrap();
        assert!(!response.has_trace());
        assert_eq!(response.error_code(), "S01");
        assert_eq!(response.error_description(), "Invalid tracking number");
    }

    #[test]
    fn test_parse_rejects_malformed_xml() {
        for body in ["", "not xml at all", "<response><trace>", "<a></b>", "<a/><b/>"] {
            let err = parse_response(body).unwrap_err();
            assert!(err.is_track_failure());
            assert!(err.message().contains(&format!("\"{}\"", body)));
        }
    }

    #[test]
    fn test_build_shipment_keeps_api_order() {
        let response = parse_response(
            r#"<response>
                 <trace><acceptTime>2017-05-24 08:00:00</acceptTime><acceptAddress>NEW YORK</acceptAddress><remark>Delivered</remark></trace>
                 <trace><acceptTime>2017-05-20 12:00:00</acceptTime><acceptAddress>SHANGHAI</acceptAddress><remark>Posted</remark></trace>
               </response>"#,
        )
        .unwrap();

        let shipment = build_shipment(response);
        let events = shipment.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].location(), "NEW YORK");
        assert_eq!(events[1].description(), "Posted");
        assert_eq!(shipment.delivered_at(), Some("2017-05-24 08:00:00"));
        assert_eq!(shipment.is_delivered(), None);
    }

    #[test]
    fn test_build_shipment_without_events() {
        let shipment = build_shipment(TrackResponse::default());
        assert!(shipment.events().is_empty());
        assert_eq!(shipment.delivered_at(), None);
    }

    #[test]
    fn test_empty_trace_element_yields_empty_shipment() {
        for body in ["<response><trace/></response>", "<response><trace></trace></response>"] {
            let response = parse_response(body).unwrap();
            assert!(response.has_trace());

            let shipment = build_shipment(response);
            assert!(shipment.events().is_empty());
            assert_eq!(shipment.delivered_at(), None);
        }
    }

    #[test]
    fn test_nested_trace_elements_are_not_counted() {
        let response = parse_response("<response><data><trace/></data></response>").unwrap();
        assert!(!response.has_trace());
    }

    #[test]
    fn test_error_fields_with_child_elements() {
        let response = parse_response(
            "<response><code><x>1</x></code><description>Denied</description></response>",
        )
        .unwrap();
        assert!(!response.has_trace());
        assert_eq!(response.error_code(), "");
        assert_eq!(response.error_description(), "Denied");
    }

    #[test]
    fn test_text_is_trimmed() {
        let response = parse_response(
            "<response><trace><acceptTime> 2017-05-24 08:00:00 </acceptTime><acceptAddress>  NEW YORK  </acceptAddress><remark>Delivered</remark></trace></response>",
        )
        .unwrap();

        let shipment = build_shipment(response);
        assert_eq!(shipment.events()[0].location(), "NEW YORK");
        assert_eq!(shipment.delivered_at(), Some("2017-05-24 08:00:00"));
    }
}
