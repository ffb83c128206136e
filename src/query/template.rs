//! Query text templating.
//!
//! [`RawTemplate`] substitutes `%(name)s` placeholders verbatim: values are
//! neither quoted nor escaped. Callers that want to refuse anything but plain
//! identifiers go through [`checked_offset_query`] instead.

use sqlparser::dialect::HiveDialect;
use sqlparser::tokenizer::{Token, Tokenizer};

use crate::error::{HiveError, Result};

/// Groups a table by a column and the file each record came from, collecting
/// the byte offsets of those records inside the file.
pub const OFFSET_QUERY: &str = "SELECT %(col)s, INPUT__FILE__NAME,     \
COLLECT_SET(BLOCK__OFFSET__INSIDE__FILE) FROM %(table)s GROUP BY %(col)s, INPUT__FILE__NAME";

/// A query template with `%(name)s` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTemplate<'t> {
    text: &'t str,
}

impl<'t> RawTemplate<'t> {
    pub const fn new(text: &'t str) -> Self {
        Self { text }
    }

    /// Substitutes every placeholder with its value in a single pass.
    ///
    /// Substituted text is never scanned again, so a value containing
    /// `%(...)s` ends up in the output literally.
    pub fn render(&self, values: &[(&str, &str)]) -> Result<String> {
        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text;

        while let Some(start) = rest.find("%(") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find(")s").ok_or_else(|| {
                HiveError::invalid_query(format!("unterminated placeholder in template: {}", self.text))
            })?;

            let name = &after[..end];
            let value = values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .ok_or_else(|| {
                    HiveError::invalid_query(format!("no value for template placeholder '{name}'"))
                })?;

            out.push_str(value);
            rest = &after[end + 2..];
        }
        out.push_str(rest);

        Ok(out)
    }
}

/// Builds the offset query for `table` and `col` with raw substitution.
pub fn offset_query(table: &str, col: &str) -> Result<String> {
    RawTemplate::new(OFFSET_QUERY).render(&[("table", table), ("col", col)])
}

/// Builds the offset query after checking both names are plain identifiers.
pub fn checked_offset_query(table: &str, col: &str) -> Result<String> {
    validate_identifier("table", table)?;
    validate_identifier("column", col)?;
    offset_query(table, col)
}

/// Accepts a word or dot-separated words (`db.table`), quoted words included.
pub fn validate_identifier(kind: &str, ident: &str) -> Result<()> {
    let invalid = || HiveError::invalid_query(format!("{kind} '{ident}' is not a plain identifier"));

    let dialect = HiveDialect {};
    let tokens = Tokenizer::new(&dialect, ident)
        .tokenize()
        .map_err(|e| HiveError::invalid_query(format!("{kind} '{ident}': {e}")))?;

    let mut expect_word = true;
    for token in &tokens {
        match (token, expect_word) {
            (Token::Word(_), true) => expect_word = false,
            (Token::Period, false) => expect_word = true,
            _ => return Err(invalid()),
        }
    }

    // Empty input or a trailing period.
    if expect_word {
        return Err(invalid());
    }
    Ok(())
}
