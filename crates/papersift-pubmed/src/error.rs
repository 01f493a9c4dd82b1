//! Extraction error type

/// The supplied document is not well-formed XML.
///
/// Missing elements are never an error; they become `None` or an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    Malformed {
        /// Byte offset where the problem was detected
        position: u64,
        message: String,
    },
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { position, message } => {
                write!(f, "malformed XML at byte {position}: {message}")
            }
        }
    }
}

impl std::error::Error for ExtractError {}

impl ExtractError {
    pub fn malformed(position: u64, message: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            message: message.into(),
        }
    }

    /// Document ended while `element` was still open.
    pub fn truncated(position: u64, element: &[u8]) -> Self {
        Self::malformed(
            position,
            format!(
                "unexpected end of document inside <{}>",
                String::from_utf8_lossy(element)
            ),
        )
    }
}
