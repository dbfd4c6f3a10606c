pub mod archive;
pub mod errors;
pub mod input;
pub mod model;
pub mod schema;
pub mod summary;
mod transcode;
pub mod tree;
pub mod writer;

pub use archive::{
    transcode_archive, ArchiveBatch, ConvertedMember, MemberReport, MemberStatus,
    DEFAULT_MAX_MEMBER_BYTES,
};
pub use errors::{ArchiveError, TranscodeError};
pub use input::{converted_file_name, looks_like_tcx, DEFAULT_OUTPUT_PREFIX};
pub use model::{SummaryRecord, Transcoded};
pub use schema::{Namespaces, TCX_NAMESPACES};
pub use transcode::{capitalize, transcode, TcxTranscoder};

#[cfg(test)]
mod tests;
