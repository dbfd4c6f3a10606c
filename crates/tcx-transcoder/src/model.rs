use std::fmt;

use serde::{Deserialize, Serialize};

/// Human-readable summary of the first activity in a document.
///
/// Every field is independently optional; a field is `None` when the source
/// element is absent, empty, or cannot be interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_datetime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_distance_km: Option<String>,
}

impl SummaryRecord {
    pub fn is_empty(&self) -> bool {
        self.activity_datetime.is_none()
            && self.total_time.is_none()
            && self.total_distance_km.is_none()
    }
}

impl fmt::Display for SummaryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        if let Some(datetime) = &self.activity_datetime {
            lines.push(format!("Activity Date & Time: {datetime}"));
        }
        if let Some(total_time) = &self.total_time {
            lines.push(format!("Total Time: {total_time}"));
        }
        if let Some(distance) = &self.total_distance_km {
            lines.push(format!("Total Distance: {distance} km"));
        }
        f.write_str(&lines.join("\n"))
    }
}

/// Result of one successful transcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcoded {
    pub output: Vec<u8>,
    pub summary: SummaryRecord,
}

impl Transcoded {
    pub fn into_parts(self) -> (Vec<u8>, SummaryRecord) {
        (self.output, self.summary)
    }
}
