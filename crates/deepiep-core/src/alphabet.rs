//! Residue alphabet and the character-to-column map used by the one-hot encoder.
//!
//! A [`CharIndex`] is loaded once together with a model and then only read. Column indices must be
//! strictly smaller than the number of entries: the column right after the last residue is reserved
//! for padding.
use crate::error::{DeepIepError, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::CharIndices;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Twenty canonical residues plus `X` (unknown) and `Z` (alkylated cysteine).
pub const STANDARD_ALPHABET: [char; 22] = [
    'A', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W',
    'X', 'Y', 'Z',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum SpecialResidue {
    #[strum(serialize = "X")]
    Unknown,
    #[strum(serialize = "Z")]
    AlkylatedCysteine,
}

impl SpecialResidue {
    pub fn code(&self) -> char {
        match self {
            SpecialResidue::Unknown => 'X',
            SpecialResidue::AlkylatedCysteine => 'Z',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, usize>",
    into = "BTreeMap<String, usize>"
)]
pub struct CharIndex {
    columns: BTreeMap<char, usize>,
}

impl CharIndex {
    pub fn new(columns: BTreeMap<char, usize>) -> Result<Self> {
        if columns.is_empty() {
            return Err(DeepIepError::MetadataParse(
                "character index map is empty".to_string(),
            ));
        }
        let padding = columns.len();
        if let Some((c, idx)) = columns.iter().find(|(_, &idx)| idx >= padding) {
            return Err(DeepIepError::MetadataParse(format!(
                "column {idx} for '{c}' collides with the padding column ({padding})"
            )));
        }
        Ok(Self { columns })
    }

    /// Columns assigned in `STANDARD_ALPHABET` order.
    pub fn standard() -> Self {
        Self {
            columns: STANDARD_ALPHABET
                .iter()
                .enumerate()
                .map(|(idx, &c)| (c, idx))
                .collect(),
        }
    }

    /// Parse a serialized mapping literal such as `{'A': 0, u'C': 1}`.
    pub fn from_literal(literal: &str) -> Result<Self> {
        let columns = LiteralParser::new(literal).parse()?;
        Self::new(columns)
    }

    pub fn get(&self, c: char) -> Option<usize> {
        self.columns.get(&c).copied()
    }

    pub fn contains(&self, c: char) -> bool {
        self.columns.contains_key(&c)
    }

    /// Number of residue columns. The encoded width is `len() + 1`.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn padding_column(&self) -> usize {
        self.columns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, usize)> + '_ {
        self.columns.iter().map(|(&c, &idx)| (c, idx))
    }

    /// Special residues the map has no column for.
    pub fn missing_special(&self) -> Vec<SpecialResidue> {
        SpecialResidue::iter()
            .filter(|res| !self.contains(res.code()))
            .collect()
    }

    /// Residues in column order, e.g. for log output.
    pub fn residues(&self) -> String {
        self.columns
            .iter()
            .sorted_by_key(|(_, &idx)| idx)
            .map(|(&c, _)| c)
            .collect()
    }
}

impl TryFrom<BTreeMap<String, usize>> for CharIndex {
    type Error = DeepIepError;

    fn try_from(raw: BTreeMap<String, usize>) -> Result<Self> {
        let columns = raw
            .into_iter()
            .map(|(key, idx)| single_char(&key).map(|c| (c, idx)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        Self::new(columns)
    }
}

impl From<CharIndex> for BTreeMap<String, usize> {
    fn from(index: CharIndex) -> Self {
        index
            .columns
            .into_iter()
            .map(|(c, idx)| (c.to_string(), idx))
            .collect()
    }
}

fn single_char(key: &str) -> Result<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(DeepIepError::MetadataParse(format!(
            "map key {key:?} is not a single character"
        ))),
    }
}

struct LiteralParser<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> LiteralParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn parse(mut self) -> Result<BTreeMap<char, usize>> {
        let mut columns = BTreeMap::new();
        self.expect('{')?;
        loop {
            self.skip_whitespace();
            if self.eat('}') {
                break;
            }
            let key = self.key()?;
            self.expect(':')?;
            let idx = self.integer()?;
            if columns.insert(key, idx).is_some() {
                return Err(self.error(&format!("duplicate key '{key}'")));
            }
            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }
            self.expect('}')?;
            break;
        }
        self.skip_whitespace();
        if let Some((pos, c)) = self.chars.next() {
            return Err(DeepIepError::MetadataParse(format!(
                "unexpected '{c}' at offset {pos} after mapping literal"
            )));
        }
        Ok(columns)
    }

    fn key(&mut self) -> Result<char> {
        // python 2 reprs prefix keys with u'' or b''
        if matches!(self.chars.peek(), Some((_, 'u' | 'b'))) {
            self.chars.next();
        }
        let quote = match self.chars.next() {
            Some((_, q @ ('\'' | '"'))) => q,
            _ => return Err(self.error("expected a quoted key")),
        };
        let start = self.offset();
        while let Some((_, c)) = self.chars.peek() {
            if *c == quote {
                break;
            }
            self.chars.next();
        }
        let end = self.offset();
        if !self.eat(quote) {
            return Err(self.error("unterminated key"));
        }
        let source = self.source;
        single_char(&source[start..end])
    }

    fn integer(&mut self) -> Result<usize> {
        self.skip_whitespace();
        let start = self.offset();
        while matches!(self.chars.peek(), Some((_, c)) if c.is_ascii_digit()) {
            self.chars.next();
        }
        let source = self.source;
        let digits = &source[start..self.offset()];
        // python 2 longs carry an L suffix
        if matches!(self.chars.peek(), Some((_, 'L'))) {
            self.chars.next();
        }
        digits
            .parse()
            .map_err(|_| self.error("expected a non-negative integer column"))
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        self.skip_whitespace();
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{expected}'")))
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some((_, c)) if *c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(pos, _)| *pos)
            .unwrap_or(self.source.len())
    }

    fn error(&mut self, msg: &str) -> DeepIepError {
        let offset = self.offset();
        DeepIepError::MetadataParse(format!("{msg} at offset {offset} in mapping literal"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_alphabet() {
        let index = CharIndex::standard();
        assert_eq!(index.len(), 22);
        assert_eq!(index.padding_column(), 22);
        assert_eq!(index.get('A'), Some(0));
        assert_eq!(index.get('Z'), Some(21));
        assert!(index.missing_special().is_empty());
        assert_eq!(index.residues(), STANDARD_ALPHABET.iter().collect::<String>());
    }

    #[test]
    fn test_literal_python_repr() -> Result<()> {
        let index = CharIndex::from_literal("{'A': 0, 'B': 1, 'X': 2}")?;
        assert_eq!(index.len(), 3);
        assert_eq!(index.get('B'), Some(1));
        assert_eq!(index.missing_special(), vec![SpecialResidue::AlkylatedCysteine]);

        let index = CharIndex::from_literal("{u'A': 1L, \"C\" :0 ,}")?;
        assert_eq!(index.get('A'), Some(1));
        assert_eq!(index.get('C'), Some(0));

        let index = CharIndex::from_literal("  { 'Q':0 }  ")?;
        assert_eq!(index.residues(), "Q");
        Ok(())
    }

    #[test]
    fn test_literal_rejects_malformed() {
        let bad = [
            "",
            "[]",
            "{'A' 0}",
            "{'A': }",
            "{'AB': 0}",
            "{'A': 0, 'A': 0}",
            "{'A': -1}",
            "{A: 0}",
            "{'A': 0",
            "{'A': 0} trailing",
            "{}",
            "{'A': 0, 'B': 2}",
        ];
        for literal in bad {
            let err = CharIndex::from_literal(literal).unwrap_err();
            assert!(
                matches!(err, DeepIepError::MetadataParse(_)),
                "{literal:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_json_roundtrip_uses_string_keys() {
        let index = CharIndex::from_literal("{'A': 0, 'X': 1}").unwrap();
        let json = serde_json::to_string(&index).unwrap();
        assert_eq!(json, r#"{"A":0,"X":1}"#);
        let back: CharIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, index);

        let multi = serde_json::from_str::<CharIndex>(r#"{"AB":0}"#);
        assert!(multi.is_err());
    }

    #[test]
    fn test_special_residue_codes() {
        assert_eq!(SpecialResidue::Unknown.to_string(), "X");
        assert_eq!(
            "Z".parse::<SpecialResidue>().unwrap(),
            SpecialResidue::AlkylatedCysteine
        );
        assert_eq!(SpecialResidue::AlkylatedCysteine.code(), 'Z');
    }
}
