use std::io::{Cursor, Read, Write};

use ::zip::{read::ZipFile, write::FileOptions, CompressionMethod, ZipArchive, ZipWriter};
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::ArchiveError;
use crate::input::converted_file_name;
use crate::model::SummaryRecord;
use crate::transcode::TcxTranscoder;

const TCX_EXTENSION: &str = ".tcx";

/// Decompressed size above which an archive member is rejected.
pub const DEFAULT_MAX_MEMBER_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Converted,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberReport {
    pub name: String,
    pub status: MemberStatus,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConvertedMember {
    pub source_name: String,
    pub output_name: String,
    pub output: Vec<u8>,
    pub summary: SummaryRecord,
}

#[derive(Debug, Default)]
pub struct ArchiveBatch {
    pub converted: Vec<ConvertedMember>,
    pub reports: Vec<MemberReport>,
}

impl ArchiveBatch {
    pub fn converted_count(&self) -> usize {
        self.converted.len()
    }

    pub fn failed_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|report| report.status == MemberStatus::Failed)
            .count()
    }

    fn fail(&mut self, name: String, message: String) {
        warn!(member = %name, error = %message, "archive member failed");
        self.reports.push(MemberReport {
            name,
            status: MemberStatus::Failed,
            message: Some(message),
        });
    }

    /// Packs every converted member into a new deflate-compressed archive.
    pub fn to_zip_archive(&self) -> Result<Vec<u8>, ArchiveError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for member in &self.converted {
            zip.start_file(member.output_name.as_str(), options)?;
            zip.write_all(&member.output)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

/// Transcodes every `.tcx` member of a ZIP archive.
///
/// Members are independent: a member that cannot be opened, is larger than
/// `max_member_bytes` once decompressed, or fails to transcode is reported as
/// failed and the rest of the archive is still processed. Only a container
/// that is not a readable ZIP fails the whole call.
pub fn transcode_archive(
    zip_bytes: &[u8],
    transcoder: &TcxTranscoder,
    output_prefix: &str,
    max_member_bytes: u64,
) -> Result<ArchiveBatch, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes))?;
    let mut batch = ArchiveBatch::default();

    for index in 0..archive.len() {
        // Raw access skips decompression and decryption.
        let (name, is_dir) = match archive.by_index_raw(index) {
            Ok(file) => (file.name().to_string(), file.is_dir()),
            Err(err) => {
                batch.fail(format!("#{index}"), format!("failed to open member: {err}"));
                continue;
            }
        };
        if is_dir || !name.ends_with(TCX_EXTENSION) {
            debug!(member = %name, "skipping non-TCX archive member");
            continue;
        }

        let content = match archive.by_index(index) {
            Ok(file) => read_member(file, max_member_bytes),
            Err(err) => Err(format!("failed to open member: {err}")),
        };
        let content = match content {
            Ok(content) => content,
            Err(message) => {
                batch.fail(name, message);
                continue;
            }
        };

        match transcoder.transcode(&content) {
            Ok(transcoded) => {
                debug!(member = %name, "converted archive member");
                batch.reports.push(MemberReport {
                    name: name.clone(),
                    status: MemberStatus::Converted,
                    message: None,
                });
                batch.converted.push(ConvertedMember {
                    output_name: converted_file_name(&name, output_prefix),
                    source_name: name,
                    output: transcoded.output,
                    summary: transcoded.summary,
                });
            }
            Err(err) => batch.fail(name, err.to_string()),
        }
    }

    Ok(batch)
}

/// Reads a member without trusting its declared size: at most
/// `max_bytes + 1` bytes are ever decompressed.
fn read_member(file: ZipFile<'_>, max_bytes: u64) -> Result<Vec<u8>, String> {
    let too_large = || format!("member exceeds the {max_bytes} byte limit");
    if file.size() > max_bytes {
        return Err(too_large());
    }
    let mut content = Vec::new();
    file.take(max_bytes.saturating_add(1))
        .read_to_end(&mut content)
        .map_err(|err| format!("failed to read member: {err}"))?;
    if content.len() as u64 > max_bytes {
        return Err(too_large());
    }
    Ok(content)
}
