//! Tokenizer for the compact dependency encoding.
//!
//! A dependency string is a `;`-separated list of tokens of the form
//! `<reference><relation>[<sign><integer>d]`, for example `2FS+2d;3SS-1d`.
//!
//! The relation code is located by testing `FS`, `SS`, `FF` and `SF` in that
//! fixed order and splitting the token at the first occurrence of the first
//! code present. A token with none of the codes is a bare reference with a
//! finish-to-start relation and no lag.
//!
//! # Known limitation
//!
//! The encoding is ambiguous by construction: a reference that itself
//! contains one of the codes (say `AFSB`) is split at that code. The scan
//! order above is the contract; nothing tries to be smarter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a successor's dates are tied to a predecessor's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// Successor starts after the predecessor finishes.
    #[serde(rename = "FS")]
    FinishToStart,
    /// Successor starts with the predecessor.
    #[serde(rename = "SS")]
    StartToStart,
    /// Successor finishes with the predecessor.
    #[serde(rename = "FF")]
    FinishToFinish,
    /// Successor finishes when the predecessor starts.
    #[serde(rename = "SF")]
    StartToFinish,
}

impl RelationKind {
    /// Order in which relation codes are searched for inside a token.
    pub const SCAN_ORDER: [Self; 4] = [
        Self::FinishToStart,
        Self::StartToStart,
        Self::FinishToFinish,
        Self::StartToFinish,
    ];

    /// Two-letter wire code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::FinishToStart => "FS",
            Self::StartToStart => "SS",
            Self::FinishToFinish => "FF",
            Self::StartToFinish => "SF",
        }
    }

    /// Link type code understood by the Gantt widget.
    #[must_use]
    pub const fn gantt_link_type(self) -> &'static str {
        match self {
            Self::FinishToStart => "0",
            Self::StartToStart => "1",
            Self::FinishToFinish => "2",
            Self::StartToFinish => "3",
        }
    }

    /// Whether the relation constrains the successor's start (otherwise its end).
    #[must_use]
    pub const fn constrains_start(self) -> bool {
        matches!(self, Self::FinishToStart | Self::StartToStart)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One parsed dependency, before its reference is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyToken {
    /// Sequence number (or unresolved literal) of the predecessor.
    pub reference: String,
    /// Relation between predecessor and successor.
    pub relation: RelationKind,
    /// Signed offset in days.
    pub lag_days: i32,
}

impl DependencyToken {
    /// Create a token.
    pub fn new(reference: impl Into<String>, relation: RelationKind, lag_days: i32) -> Self {
        Self {
            reference: reference.into(),
            relation,
            lag_days,
        }
    }

    /// Parse a single, already trimmed and non-empty token.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason when the reference is empty or the lag
    /// suffix is malformed.
    pub fn parse(token: &str) -> Result<Self, String> {
        let split = RelationKind::SCAN_ORDER
            .into_iter()
            .find_map(|kind| token.find(kind.code()).map(|pos| (kind, pos)));

        let Some((relation, pos)) = split else {
            return Ok(Self::new(token.trim(), RelationKind::FinishToStart, 0));
        };

        let reference = token[..pos].trim();
        if reference.is_empty() {
            return Err("missing task reference".to_string());
        }
        let lag_days = parse_lag(&token[pos + relation.code().len()..])?;

        Ok(Self::new(reference, relation, lag_days))
    }
}

impl fmt::Display for DependencyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.reference, self.relation)?;
        if self.lag_days != 0 {
            write!(f, "{:+}d", self.lag_days)?;
        }
        Ok(())
    }
}

fn parse_lag(suffix: &str) -> Result<i32, String> {
    let suffix = suffix.trim();
    if suffix.is_empty() {
        return Ok(0);
    }

    let (negative, rest) = match suffix.as_bytes()[0] {
        b'+' => (false, &suffix[1..]),
        b'-' => (true, &suffix[1..]),
        _ => return Err(format!("lag '{suffix}' must start with '+' or '-'")),
    };
    let Some(digits) = rest
        .trim()
        .strip_suffix('d')
        .or_else(|| rest.trim().strip_suffix('D'))
    else {
        return Err(format!("lag '{suffix}' must end with 'd'"));
    };
    let digits = digits.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("lag '{suffix}' is not a whole number of days"));
    }

    let magnitude: i64 = digits
        .parse()
        .map_err(|_| format!("lag '{suffix}' is out of range"))?;
    let signed = if negative { -magnitude } else { magnitude };
    i32::try_from(signed).map_err(|_| format!("lag '{suffix}' is out of range"))
}

/// A token that was dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedToken {
    /// The token text, trimmed.
    pub token: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Output of parsing one dependency string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedPredecessors {
    /// Well-formed tokens in string order.
    pub tokens: Vec<DependencyToken>,
    /// Malformed tokens in string order.
    pub rejected: Vec<RejectedToken>,
}

/// Parse a raw dependency string.
///
/// Empty tokens (including an empty string, `";;"` or whitespace) are
/// skipped without comment; malformed tokens land in
/// [`ParsedPredecessors::rejected`].
#[must_use]
pub fn parse_predecessors(raw: &str) -> ParsedPredecessors {
    let mut parsed = ParsedPredecessors::default();
    for token in split_tokens(raw) {
        match DependencyToken::parse(token) {
            Ok(parsed_token) => parsed.tokens.push(parsed_token),
            Err(reason) => parsed.rejected.push(RejectedToken {
                token: token.to_string(),
                reason,
            }),
        }
    }
    parsed
}

/// Iterate over the trimmed, non-empty tokens of a raw dependency string.
pub fn split_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';').map(str::trim).filter(|t| !t.is_empty())
}
