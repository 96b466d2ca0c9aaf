use thiserror::Error;

pub type Result<A, E = Error> = std::result::Result<A, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected end of stream")]
    EndOfStream,
    #[error("header mismatch: expected magic 0x{expected_magic:04X} version {expected_version}, got magic 0x{magic:04X} version {version}")]
    HeaderMismatch {
        magic: u16,
        version: u16,
        expected_magic: u16,
        expected_version: u16,
    },
    #[error("unknown tag 0x{0:02X}")]
    UnknownTag(u8),
    #[error("invalid field type code 0x{0:02X}")]
    InvalidTypeCode(u8),
    #[error("expected {expected} at this grammar position, found {actual}")]
    UnexpectedRecord {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("attempted to leave block-data mode with {0} unread byte(s) pending")]
    UnreadBlockData(usize),
    #[error("dangling handle {0}")]
    DanglingHandle(u32),
    #[error("invalid modified UTF-8 in string content")]
    InvalidModifiedUtf8,
    #[error("recursion limit of {0} exceeded")]
    RecursionLimitExceeded(usize),
}
