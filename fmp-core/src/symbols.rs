//! Identifier (ticker, fund, index, pair) normalization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::FmpError;

/// Canonical, non-empty list of identifiers.
///
/// Built from a single identifier, a comma-delimited string, or a list of
/// either. Parts are trimmed, empty parts dropped, letters uppercased, and
/// duplicates removed keeping the first occurrence, so `"AAPL,msft"`,
/// `["AAPL", "MSFT"]` and `" aapl , MSFT,"` all normalize to `["AAPL", "MSFT"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbols(Vec<String>);

impl Symbols {
    /// Normalize identifiers from any list of string-like parts.
    ///
    /// # Errors
    /// Returns `InvalidArg` if nothing remains after normalization or a part
    /// contains whitespace or URL delimiters.
    pub fn parse<I, S>(parts: I) -> Result<Self, FmpError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for part in parts {
            for piece in part.as_ref().split(',') {
                let piece = piece.trim();
                if piece.is_empty() {
                    continue;
                }
                if let Some(bad) = piece
                    .chars()
                    .find(|c| c.is_whitespace() || c.is_control() || "/?&#".contains(*c))
                {
                    return Err(FmpError::InvalidArg(format!(
                        "identifier '{piece}' contains invalid character {bad:?}"
                    )));
                }
                let canonical = piece.to_ascii_uppercase();
                if !out.contains(&canonical) {
                    out.push(canonical);
                }
            }
        }
        if out.is_empty() {
            return Err(FmpError::InvalidArg("no identifiers given".into()));
        }
        Ok(Self(out))
    }

    /// Identifiers in order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterate identifiers in order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Number of identifiers (always >= 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The comma-joined form used by batch endpoints (`AAPL,MSFT`).
    #[must_use]
    pub fn joined(&self) -> String {
        self.0.join(",")
    }

    /// Consume into the inner list.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for Symbols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

impl<'a> IntoIterator for &'a Symbols {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Conversion into a normalized [`Symbols`] list.
pub trait IntoSymbols {
    /// Normalize `self` into identifiers.
    ///
    /// # Errors
    /// Returns `InvalidArg` when normalization leaves nothing or finds an invalid part.
    fn into_symbols(self) -> Result<Symbols, FmpError>;
}

impl IntoSymbols for Symbols {
    fn into_symbols(self) -> Result<Symbols, FmpError> {
        Ok(self)
    }
}

impl IntoSymbols for &Symbols {
    fn into_symbols(self) -> Result<Symbols, FmpError> {
        Ok(self.clone())
    }
}

impl IntoSymbols for &str {
    fn into_symbols(self) -> Result<Symbols, FmpError> {
        Symbols::parse([self])
    }
}

impl IntoSymbols for String {
    fn into_symbols(self) -> Result<Symbols, FmpError> {
        Symbols::parse([self])
    }
}

impl IntoSymbols for &String {
    fn into_symbols(self) -> Result<Symbols, FmpError> {
        Symbols::parse([self])
    }
}

impl<S: AsRef<str>> IntoSymbols for &[S] {
    fn into_symbols(self) -> Result<Symbols, FmpError> {
        Symbols::parse(self)
    }
}

impl<S: AsRef<str>> IntoSymbols for Vec<S> {
    fn into_symbols(self) -> Result<Symbols, FmpError> {
        Symbols::parse(self)
    }
}

impl<S: AsRef<str>, const N: usize> IntoSymbols for [S; N] {
    fn into_symbols(self) -> Result<Symbols, FmpError> {
        Symbols::parse(self)
    }
}
