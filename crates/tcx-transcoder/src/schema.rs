/// Namespace bindings shared by the input and output documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespaces {
    pub core: &'static str,
    pub extension: &'static str,
    pub extension_prefix: &'static str,
    pub schema_instance: &'static str,
    pub schema_location: &'static str,
}

pub const TCX_NAMESPACES: Namespaces = Namespaces {
    core: "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2",
    extension: "http://www.garmin.com/xmlschemas/ActivityExtension/v2",
    extension_prefix: "ns2",
    schema_instance: "http://www.w3.org/2001/XMLSchema-instance",
    schema_location: "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2 http://www.garmin.com/xmlschemas/TrainingCenterDatabasev2.xsd",
};

pub const ROOT: &str = "TrainingCenterDatabase";
pub const ACTIVITIES: &str = "Activities";
pub const ACTIVITY: &str = "Activity";
pub const ACTIVITY_ID: &str = "Id";
pub const LAP: &str = "Lap";
pub const TRACK: &str = "Track";
pub const TRACKPOINT: &str = "Trackpoint";
pub const HEART_RATE: &str = "HeartRateBpm";
pub const HEART_RATE_VALUE: &str = "Value";
pub const CADENCE: &str = "Cadence";
pub const EXTENSIONS: &str = "Extensions";
pub const TPX: &str = "TPX";

pub const SPORT_ATTRIBUTE: &str = "Sport";
pub const START_TIME_ATTRIBUTE: &str = "StartTime";

pub const TOTAL_TIME_SECONDS: &str = "TotalTimeSeconds";
pub const DISTANCE_METERS: &str = "DistanceMeters";

/// Scalar lap children, in output order.
pub const LAP_FIELDS: [&str; 5] = [
    TOTAL_TIME_SECONDS,
    DISTANCE_METERS,
    "Calories",
    "Intensity",
    "TriggerMethod",
];

pub const TRACKPOINT_FIELDS: [&str; 2] = ["Time", DISTANCE_METERS];

/// `TPX` children in the extension namespace, in output order.
pub const TPX_FIELDS: [&str; 2] = ["Speed", "Watts"];
