use std::fmt;

/// Errors produced when reading a rule tree from DSL text or JSON.
#[derive(Debug)]
pub struct ParseError {
    message: String,
    offset: Option<usize>,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset: None,
        }
    }

    pub(crate) fn at(offset: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset: Some(offset),
        }
    }

    /// Byte offset into the DSL input where parsing stopped, if known.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ParseError::new("unexpected token");
        assert_eq!(err.to_string(), "parse error: unexpected token");
        assert_eq!(err.offset(), None);
    }

    #[test]
    fn error_with_offset() {
        let err = ParseError::at(7, "expected '=>'");
        assert_eq!(err.offset(), Some(7));
        assert_eq!(err.to_string(), "parse error: expected '=>'");
    }
}
