use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use crate::errors::TranscodeError;
use crate::model::SummaryRecord;
use crate::schema::TCX_NAMESPACES;
use crate::tree::parse_document;
use crate::{transcode, TcxTranscoder};

fn fixture(path: &str) -> Vec<u8> {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn document(activities: &str) -> Vec<u8> {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2" "#,
            r#"xmlns:ns3="http://www.garmin.com/xmlschemas/ActivityExtension/v2">"#,
            "<Activities>{}</Activities></TrainingCenterDatabase>"
        ),
        activities
    )
    .into_bytes()
}

fn output_text(input: &[u8]) -> String {
    let transcoded = transcode(input).expect("transcode failed");
    String::from_utf8(transcoded.output).expect("output is not UTF-8")
}

#[test]
fn transcodes_garmin_running_export() {
    let input = fixture("running_single_lap.tcx");
    let expected = String::from_utf8(fixture("running_single_lap.expected.tcx"))
        .expect("expected fixture is not UTF-8");

    let (output, summary) = transcode(&input)
        .expect("running export transcode failed")
        .into_parts();

    assert_eq!(
        String::from_utf8(output).expect("output is not UTF-8"),
        expected.trim_end()
    );
    assert_eq!(
        summary,
        SummaryRecord {
            activity_datetime: Some("07 Mar @ 14:05 UTC".to_string()),
            total_time: Some("1:02:05".to_string()),
            total_distance_km: Some("5.03".to_string()),
        }
    );
}

#[test]
fn transcoding_output_again_is_a_no_op() {
    for name in ["running_single_lap.tcx", "cycling_two_activities.tcx"] {
        let first = transcode(&fixture(name)).expect("first pass failed");
        let second = transcode(&first.output).expect("second pass failed");

        assert_eq!(first.output, second.output, "{name} changed on second pass");
        assert_eq!(first.summary, second.summary);
    }
}

#[test]
fn output_names_come_from_the_whitelist() {
    let allowed_elements: HashSet<&str> = [
        "Activities",
        "Activity",
        "Id",
        "Lap",
        "TotalTimeSeconds",
        "DistanceMeters",
        "Calories",
        "Intensity",
        "TriggerMethod",
        "Track",
        "Trackpoint",
        "Time",
        "HeartRateBpm",
        "Value",
        "Cadence",
        "Extensions",
        "TPX",
        "Speed",
        "Watts",
    ]
    .into_iter()
    .collect();

    for name in ["running_single_lap.tcx", "cycling_two_activities.tcx"] {
        let transcoded = transcode(&fixture(name)).expect("transcode failed");
        let root = parse_document(&transcoded.output).expect("output is not well-formed");

        assert!(root.is(TCX_NAMESPACES.core, "TrainingCenterDatabase"));
        for element in root.descendants() {
            assert!(
                allowed_elements.contains(element.local_name.as_str()),
                "unexpected element {} in {name}",
                element.local_name
            );
            let expected_namespace = match element.local_name.as_str() {
                "TPX" | "Speed" | "Watts" => TCX_NAMESPACES.extension,
                _ => TCX_NAMESPACES.core,
            };
            assert_eq!(element.namespace.as_deref(), Some(expected_namespace));
            for attr in &element.attributes {
                assert!(
                    ["Sport", "StartTime"].contains(&attr.local_name.as_str()),
                    "unexpected attribute {} in {name}",
                    attr.local_name
                );
            }
        }
    }
}

#[test]
fn multiple_activities_keep_order_and_summary_uses_first() {
    let transcoded = transcode(&fixture("cycling_two_activities.tcx")).expect("transcode failed");
    let root = parse_document(&transcoded.output).expect("output is not well-formed");

    let sports: Vec<&str> = root
        .find_all(TCX_NAMESPACES.core, "Activity")
        .filter_map(|activity| activity.attribute("Sport"))
        .collect();
    assert_eq!(sports, vec!["Biking", "Other"]);

    let laps = root.find_all(TCX_NAMESPACES.core, "Lap").count();
    assert_eq!(laps, 3);

    assert_eq!(
        transcoded.summary,
        SummaryRecord {
            activity_datetime: Some("01 Jun @ 07:30 UTC".to_string()),
            total_time: Some("0:30:00".to_string()),
            total_distance_km: Some("15.00".to_string()),
        }
    );
}

#[test]
fn extension_blocks_copy_only_present_fields() {
    let output = output_text(&fixture("cycling_two_activities.tcx"));

    assert!(output.contains(
        "<Trackpoint><Time>2024-06-01T05:30:00Z</Time><Cadence>88</Cadence>\
         <Extensions><ns2:TPX><ns2:Watts>185</ns2:Watts></ns2:TPX></Extensions></Trackpoint>"
    ));
    assert!(output.contains(
        "<Trackpoint><Time>2024-06-01T06:00:00Z</Time><Extensions><ns2:TPX/></Extensions></Trackpoint>"
    ));
    assert!(output.contains(
        "<Activity Sport=\"Other\"><Lap StartTime=\"2024-06-02T18:00:00Z\">\
         <TotalTimeSeconds>600</TotalTimeSeconds><Track/></Lap></Activity>"
    ));
}

#[test]
fn trackpoint_without_extensions_emits_none() {
    let output = output_text(&document(
        r#"<Activity Sport="Running"><Lap StartTime="t0"><Track>
             <Trackpoint><Time>t1</Time><Extensions><Other/></Extensions></Trackpoint>
             <Trackpoint><Time>t2</Time></Trackpoint>
           </Track></Lap></Activity>"#,
    ));

    assert!(!output.contains("Extensions"));
    assert!(output.contains(
        "<Track><Trackpoint><Time>t1</Time></Trackpoint><Trackpoint><Time>t2</Time></Trackpoint></Track>"
    ));
}

#[test]
fn heart_rate_wrapper_requires_a_value() {
    let output = output_text(&document(
        r#"<Activity Sport="Running"><Lap StartTime="t0"><Track>
             <Trackpoint><HeartRateBpm/></Trackpoint>
             <Trackpoint><HeartRateBpm><Value>99</Value></HeartRateBpm></Trackpoint>
           </Track></Lap></Activity>"#,
    ));

    assert!(output.contains(
        "<Track><Trackpoint/><Trackpoint><HeartRateBpm><Value>99</Value></HeartRateBpm></Trackpoint></Track>"
    ));
}

#[test]
fn empty_lap_fields_are_still_copied() {
    let output = output_text(&document(
        r#"<Activity Sport="Running"><Id></Id><Lap StartTime="t0"><Calories></Calories><Intensity>  </Intensity></Lap></Activity>"#,
    ));

    assert!(output.contains(
        "<Activity Sport=\"Running\"><Id/><Lap StartTime=\"t0\"><Calories/><Intensity>  </Intensity><Track/></Lap></Activity>"
    ));
}

#[test]
fn missing_optional_fields_only_drop_their_summary_key() {
    let without_id = transcode(&document(
        r#"<Activity Sport="Running"><Lap StartTime="t0"><TotalTimeSeconds>45</TotalTimeSeconds><DistanceMeters>100</DistanceMeters></Lap></Activity>"#,
    ))
    .expect("transcode without Id failed");
    assert_eq!(without_id.summary.activity_datetime, None);
    assert_eq!(without_id.summary.total_time.as_deref(), Some("0:00:45"));
    assert_eq!(without_id.summary.total_distance_km.as_deref(), Some("0.10"));

    let without_time = transcode(&document(
        r#"<Activity Sport="Running"><Id>2024-01-02T03:04:05Z</Id><Lap StartTime="t0"><DistanceMeters>100</DistanceMeters></Lap></Activity>"#,
    ))
    .expect("transcode without TotalTimeSeconds failed");
    assert_eq!(
        without_time.summary.activity_datetime.as_deref(),
        Some("02 Jan @ 03:04 UTC")
    );
    assert_eq!(without_time.summary.total_time, None);
    assert!(without_time.summary.total_distance_km.is_some());

    let without_distance = transcode(&document(
        r#"<Activity Sport="Running"><Id>2024-01-02T03:04:05Z</Id><Lap StartTime="t0"><TotalTimeSeconds>45</TotalTimeSeconds></Lap></Activity>"#,
    ))
    .expect("transcode without DistanceMeters failed");
    assert!(without_distance.summary.activity_datetime.is_some());
    assert!(without_distance.summary.total_time.is_some());
    assert_eq!(without_distance.summary.total_distance_km, None);
}

#[test]
fn summary_skips_empty_and_unparseable_values() {
    let transcoded = transcode(&document(
        r#"<Activity Sport="Running"><Id>not a date</Id><Lap StartTime="t0"><TotalTimeSeconds></TotalTimeSeconds><DistanceMeters>far</DistanceMeters></Lap></Activity>"#,
    ))
    .expect("transcode failed");

    assert!(transcoded.summary.is_empty());
}

#[test]
fn document_without_activities_has_empty_summary() {
    let transcoded = transcode(&document("")).expect("transcode failed");

    assert!(transcoded.summary.is_empty());
    assert!(String::from_utf8(transcoded.output)
        .expect("output is not UTF-8")
        .ends_with("<Activities/></TrainingCenterDatabase>"));
}

#[test]
fn root_attributes_keep_declared_order() {
    let output = output_text(&document(""));
    let root_tag = output
        .lines()
        .nth(1)
        .and_then(|line| line.split('>').next())
        .expect("root start tag present");

    let names: Vec<&str> = root_tag
        .split_whitespace()
        .filter_map(|token| token.split_once('=').map(|(name, _)| name))
        .collect();
    assert_eq!(
        names,
        vec!["xsi:schemaLocation", "xmlns:ns2", "xmlns", "xmlns:xsi"]
    );
}

#[test]
fn elements_outside_the_core_namespace_are_ignored() {
    let input = br#"<?xml version="1.0"?>
        <TrainingCenterDatabase>
          <Activities><Activity Sport="Running"><Id>2024-01-02T03:04:05Z</Id></Activity></Activities>
        </TrainingCenterDatabase>"#;

    let transcoded = transcode(input).expect("transcode failed");

    assert!(transcoded.summary.is_empty());
    assert!(!String::from_utf8(transcoded.output)
        .expect("output is not UTF-8")
        .contains("<Activity "));
}

#[test]
fn malformed_input_is_rejected() {
    match transcode(b"not xml") {
        Err(err @ TranscodeError::MalformedInput { .. }) => assert!(err.is_malformed_input()),
        other => panic!("expected MalformedInput error, got {other:?}"),
    }

    let truncated = fixture("running_single_lap.tcx");
    let truncated = &truncated[..truncated.len() / 2];
    match transcode(truncated) {
        Err(TranscodeError::MalformedInput { .. }) => {}
        other => panic!("expected MalformedInput error, got {other:?}"),
    }
}

#[test]
fn activity_without_sport_is_a_schema_mismatch() {
    match transcode(&document(r#"<Activity><Id>2024-01-02T03:04:05Z</Id></Activity>"#)) {
        Err(TranscodeError::SchemaMismatch { element, attribute }) => {
            assert_eq!(element, "Activity");
            assert_eq!(attribute, "Sport");
        }
        other => panic!("expected SchemaMismatch error, got {other:?}"),
    }
}

#[test]
fn lap_without_start_time_is_a_schema_mismatch() {
    let err = transcode(&document(
        r#"<Activity Sport="Running"><Lap><TotalTimeSeconds>1</TotalTimeSeconds></Lap></Activity>"#,
    ))
    .expect_err("lap without StartTime should fail");

    assert!(err.is_schema_mismatch());
    match err {
        TranscodeError::SchemaMismatch { element, attribute } => {
            assert_eq!(element, "Lap");
            assert_eq!(attribute, "StartTime");
        }
        other => panic!("expected SchemaMismatch error, got {other:?}"),
    }
}

#[test]
fn concurrent_transcodes_are_independent() {
    let running = fixture("running_single_lap.tcx");
    let cycling = fixture("cycling_two_activities.tcx");
    let transcoder = TcxTranscoder::default();
    let expected_running = transcoder.transcode(&running).expect("transcode failed");
    let expected_cycling = transcoder.transcode(&cycling).expect("transcode failed");

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|index| {
                let input = if index % 2 == 0 { &running } else { &cycling };
                scope.spawn(move || transcoder.transcode(input).expect("transcode failed"))
            })
            .collect();

        for (index, handle) in handles.into_iter().enumerate() {
            let result = handle.join().expect("worker panicked");
            let expected = if index % 2 == 0 {
                &expected_running
            } else {
                &expected_cycling
            };
            assert_eq!(&result, expected);
        }
    });
}
