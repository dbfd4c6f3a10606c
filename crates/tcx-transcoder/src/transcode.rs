use crate::errors::TranscodeError;
use crate::model::Transcoded;
use crate::schema::{self, Namespaces, TCX_NAMESPACES};
use crate::summary::extract_summary;
use crate::tree::{parse_document, Element};
use crate::writer::{to_bytes, OutElement};

/// Projects TCX documents onto the fixed output shape.
///
/// The transcoder holds only the namespace table, so one instance can be
/// shared freely between threads.
#[derive(Debug, Clone, Copy)]
pub struct TcxTranscoder {
    namespaces: &'static Namespaces,
}

impl Default for TcxTranscoder {
    fn default() -> Self {
        Self {
            namespaces: &TCX_NAMESPACES,
        }
    }
}

impl TcxTranscoder {
    pub fn transcode(&self, input: &[u8]) -> Result<Transcoded, TranscodeError> {
        let root = parse_document(input)?;
        let summary = extract_summary(&root, self.namespaces);
        let document = self.build_document(&root)?;
        let output = to_bytes(&document)?;
        Ok(Transcoded { output, summary })
    }

    fn build_document(&self, root: &Element) -> Result<OutElement, TranscodeError> {
        let ns = self.namespaces;
        let mut document = OutElement::new(schema::ROOT)
            .with_attribute("xsi:schemaLocation", ns.schema_location)
            .with_attribute(format!("xmlns:{}", ns.extension_prefix), ns.extension)
            .with_attribute("xmlns", ns.core)
            .with_attribute("xmlns:xsi", ns.schema_instance);

        let activities = document.push(OutElement::new(schema::ACTIVITIES));
        for activity in root.find_all(ns.core, schema::ACTIVITY) {
            activities.push(self.build_activity(activity)?);
        }

        Ok(document)
    }

    fn build_activity(&self, activity: &Element) -> Result<OutElement, TranscodeError> {
        let ns = self.namespaces;
        let sport = activity
            .attribute(schema::SPORT_ATTRIBUTE)
            .ok_or(TranscodeError::SchemaMismatch {
                element: schema::ACTIVITY,
                attribute: schema::SPORT_ATTRIBUTE,
            })?;

        let mut out = OutElement::new(schema::ACTIVITY)
            .with_attribute(schema::SPORT_ATTRIBUTE, capitalize(sport));

        if let Some(id) = activity.find(ns.core, schema::ACTIVITY_ID) {
            out.push(OutElement::new(schema::ACTIVITY_ID).with_text(id.text.as_deref()));
        }

        for lap in activity.find_all(ns.core, schema::LAP) {
            out.push(self.build_lap(lap)?);
        }

        Ok(out)
    }

    fn build_lap(&self, lap: &Element) -> Result<OutElement, TranscodeError> {
        let ns = self.namespaces;
        let start_time = lap
            .attribute(schema::START_TIME_ATTRIBUTE)
            .ok_or(TranscodeError::SchemaMismatch {
                element: schema::LAP,
                attribute: schema::START_TIME_ATTRIBUTE,
            })?;

        let mut out =
            OutElement::new(schema::LAP).with_attribute(schema::START_TIME_ATTRIBUTE, start_time);
        copy_fields(&mut out, lap, ns.core, &schema::LAP_FIELDS, None);

        let track = out.push(OutElement::new(schema::TRACK));
        for trackpoint in lap.find_all(ns.core, schema::TRACKPOINT) {
            track.push(self.build_trackpoint(trackpoint));
        }

        Ok(out)
    }

    fn build_trackpoint(&self, trackpoint: &Element) -> OutElement {
        let ns = self.namespaces;
        let mut out = OutElement::new(schema::TRACKPOINT);
        copy_fields(&mut out, trackpoint, ns.core, &schema::TRACKPOINT_FIELDS, None);

        let heart_rate = trackpoint
            .find(ns.core, schema::HEART_RATE)
            .and_then(|heart_rate| heart_rate.find(ns.core, schema::HEART_RATE_VALUE));
        if let Some(value) = heart_rate {
            out.push(OutElement::new(schema::HEART_RATE))
                .push(OutElement::new(schema::HEART_RATE_VALUE).with_text(value.text.as_deref()));
        }

        if let Some(cadence) = trackpoint.find(ns.core, schema::CADENCE) {
            out.push(OutElement::new(schema::CADENCE).with_text(cadence.text.as_deref()));
        }

        let tpx = trackpoint
            .find(ns.core, schema::EXTENSIONS)
            .and_then(|extensions| extensions.find(ns.extension, schema::TPX));
        if let Some(tpx) = tpx {
            let tpx_out = out
                .push(OutElement::new(schema::EXTENSIONS))
                .push(OutElement::new(prefixed(ns.extension_prefix, schema::TPX)));
            copy_fields(
                tpx_out,
                tpx,
                ns.extension,
                &schema::TPX_FIELDS,
                Some(ns.extension_prefix),
            );
        }

        out
    }
}

/// Copies each named descendant that exists, text included even when empty.
fn copy_fields(
    out: &mut OutElement,
    source: &Element,
    namespace: &str,
    fields: &[&str],
    prefix: Option<&str>,
) {
    for field in fields {
        if let Some(element) = source.find(namespace, field) {
            let name = match prefix {
                Some(prefix) => prefixed(prefix, field),
                None => (*field).to_string(),
            };
            out.push(OutElement::new(name).with_text(element.text.as_deref()));
        }
    }
}

fn prefixed(prefix: &str, local_name: &str) -> String {
    format!("{prefix}:{local_name}")
}

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Transcodes one document with the standard TCX namespaces.
pub fn transcode(input: &[u8]) -> Result<Transcoded, TranscodeError> {
    TcxTranscoder::default().transcode(input)
}
