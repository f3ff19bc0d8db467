//! Text DSL for rule trees.
//!
//! ```text
//! # comments run to the end of the line
//! is_human {
//!     is_kind  => help_me_find_my_book
//!     is_smart => please_do_my_homework
//! }
//! default => please_do_my_homework
//! ```
//!
//! Each entry is a condition key followed by either `=> terminal_key` or a
//! braced nested block. Keys are identifiers (letters, digits, `_`, `-`,
//! `.`, not starting with a digit) or double-quoted strings. Entries may be
//! separated by newlines, spaces or commas. Order is preserved.

mod error;
mod grammar;

pub use error::ParseError;

use crate::RuleNode;

/// Parse a DSL input string into a [`RuleNode`].
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid DSL syntax.
pub fn parse(input: &str) -> Result<RuleNode, ParseError> {
    use winnow::Parser;
    grammar::parse_tree
        .parse(input)
        .map_err(|e| ParseError::at(e.offset(), e.to_string()))
}
