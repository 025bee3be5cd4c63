use serde::{Deserialize, Serialize};

use crmpilot_core::SuiteError;

use crate::browser::BrowserSession;

/// One entry from the page's resource timing buffer. Field names follow the
/// PerformanceResourceTiming attributes so the JSON round-trips untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkRecord {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "initiatorType", default)]
    pub initiator_type: String,
    #[serde(rename = "startTime", default)]
    pub start_time: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(rename = "transferSize", default)]
    pub transfer_size: u64,
    #[serde(rename = "responseStatus", default)]
    pub response_status: u16,
}

/// Snapshot the requests the current page has made so far.
pub fn capture_network_records(
    session: &BrowserSession,
) -> Result<Vec<NetworkRecord>, SuiteError> {
    let value = session
        .evaluate_value("JSON.stringify(performance.getEntriesByType('resource'))")?;
    let Some(raw) = value.and_then(|v| v.as_str().map(str::to_string)) else {
        return Ok(Vec::new());
    };
    serde_json::from_str(&raw).map_err(|e| SuiteError::Transport(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resource_timing_entries() {
        let raw = r#"[
            {"name": "https://x.test/api/login", "initiatorType": "fetch",
             "startTime": 12.5, "duration": 140.2,
             "transferSize": 812, "responseStatus": 200},
            {"name": "https://x.test/logo.svg", "initiatorType": "img",
             "startTime": 3.0, "duration": 20.0}
        ]"#;

        let records: Vec<NetworkRecord> = serde_json::from_str(raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].response_status, 200);
        assert_eq!(records[0].initiator_type, "fetch");
        // Missing attributes fall back to zero values.
        assert_eq!(records[1].transfer_size, 0);
        assert_eq!(records[1].response_status, 0);
    }
}
