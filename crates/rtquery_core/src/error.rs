use thiserror::Error;

/// Errors raised while turning text (a dump record or a query) into
/// prefixes and entries. A parse error never touches already-loaded state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid address syntax: {0:?}")]
    InvalidAddress(String),
    #[error("prefix length {len:?} is out of range for {family} (0..={max})")]
    InvalidPrefixLength {
        len: String,
        family: &'static str,
        max: u8,
    },
    #[error("missing prefix length in {0:?}")]
    MissingPrefixLength(String),
    #[error("record for {0} has no attributes")]
    MissingAttributes(String),
    #[error("continuation line without a preceding record")]
    OrphanContinuation,
    #[error("malformed record: {0:?}")]
    Malformed(String),
}
