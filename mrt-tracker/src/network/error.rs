//! Network configuration errors.

use super::LineId;

/// Errors building the line tables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// Line-scoped station code without a numeric suffix
    #[error("invalid station code: {0}")]
    InvalidCode(String),

    /// A line must have at least one station
    #[error("line {0} has no stations")]
    EmptyLine(LineId),

    /// Unknown line name
    #[error("unknown line: {0}")]
    UnknownLine(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = NetworkError::InvalidCode("NSX".into());
        assert_eq!(err.to_string(), "invalid station code: NSX");

        let err = NetworkError::EmptyLine(LineId::Cg2);
        assert_eq!(err.to_string(), "line cg2 has no stations");

        let err = NetworkError::UnknownLine("dt1".into());
        assert_eq!(err.to_string(), "unknown line: dt1");
    }
}
