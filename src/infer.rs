//! Syntactic type inference for guard identifiers.
//!
//! Every identifier starts out as [`VarType::Boolean`]. It is reclassified as
//! [`VarType::Integer`] when any of the following usages is found anywhere in
//! the text:
//!
//! - (a) it is an operand of `+`/`-` whose other operand is an identifier or a literal;
//! - (b) it is compared against a (possibly negative) numeric literal;
//! - (c) it is compared against an enumerated constant;
//! - (d) it is a direct operand of any comparison operator.
//!
//! Enumerated constants themselves are always Integer.
//!
//! The result is the union of all evidence, so it does not depend on the
//! order in which usages are encountered, and a reclassification never reverts.
//! The scan is lenient: characters the tokenizer would reject are skipped here
//! and reported later by the tokenizer.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::config::Config;
use crate::types::VarType;

/// Why an identifier was classified as Integer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Evidence {
    EnumConstant,
    ArithOperand,
    ComparedWithLiteral,
    ComparedWithConstant,
    ComparisonOperand,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Inferred {
    pub ty: VarType,
    pub constant: bool,
    pub evidence: BTreeSet<Evidence>,
}

/// Mapping from identifier to inferred type.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TypeMap {
    entries: BTreeMap<String, Inferred>,
}

impl TypeMap {
    /// The inferred type of `name`; identifiers never seen are Boolean.
    pub fn ty(&self, name: &str) -> VarType {
        self.entries.get(name).map_or(VarType::Boolean, |e| e.ty)
    }

    pub fn is_constant(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|e| e.constant)
    }

    pub fn get(&self, name: &str) -> Option<&Inferred> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Inferred)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn mark(&mut self, name: &str, evidence: Evidence) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.ty = VarType::Integer;
            entry.evidence.insert(evidence);
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Lexeme<'a> {
    Ident(&'a str),
    Num,
    Plus,
    Minus,
    Cmp,
    Paren,
    Other,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

pub(crate) fn is_bool_literal(word: &str) -> bool {
    word.eq_ignore_ascii_case("true") || word.eq_ignore_ascii_case("false")
}

fn scan(text: &str) -> Vec<Lexeme<'_>> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        let two = text.get(i..i + 2).unwrap_or("");
        if c.is_ascii_whitespace() {
            i += 1;
        } else if is_ident_start(c) {
            let start = i;
            while i < bytes.len() && is_ident_char(bytes[i] as char) {
                i += 1;
            }
            let word = &text[start..i];
            out.push(if is_bool_literal(word) { Lexeme::Other } else { Lexeme::Ident(word) });
        } else if c.is_ascii_digit() {
            while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                i += 1;
            }
            out.push(Lexeme::Num);
        } else if matches!(two, "==" | "!=" | ">=" | "<=") {
            out.push(Lexeme::Cmp);
            i += 2;
        } else if matches!(two, "&&" | "||" | "->") {
            out.push(Lexeme::Other);
            i += 2;
        } else {
            out.push(match c {
                '>' | '<' | '=' => Lexeme::Cmp,
                '+' => Lexeme::Plus,
                '-' => Lexeme::Minus,
                '(' | ')' => Lexeme::Paren,
                _ => Lexeme::Other,
            });
            i += c.len_utf8();
        }
    }
    out
}

/// Classify every identifier in `text` (normally both expressions of a pair, joined).
pub fn infer_types(text: &str, config: &Config) -> TypeMap {
    let lexemes = scan(text);
    let mut map = TypeMap::default();

    for lexeme in &lexemes {
        if let Lexeme::Ident(name) = *lexeme {
            map.entries.entry(name.to_string()).or_insert_with(|| {
                let constant = config.is_enum_constant(name);
                Inferred {
                    ty: if constant { VarType::Integer } else { VarType::Boolean },
                    constant,
                    evidence: if constant { BTreeSet::from([Evidence::EnumConstant]) } else { BTreeSet::new() },
                }
            });
        }
    }

    let is_operand = |l: Option<&Lexeme>| matches!(l, Some(Lexeme::Ident(_) | Lexeme::Num));

    for (i, lexeme) in lexemes.iter().enumerate() {
        let Lexeme::Ident(name) = *lexeme else {
            continue;
        };
        if map.is_constant(name) {
            continue;
        }

        // (a) `name (+|-) operand` or `operand (+|-) name`
        let next = lexemes.get(i + 1);
        if matches!(next, Some(Lexeme::Plus | Lexeme::Minus)) {
            let mut j = i + 2;
            if lexemes.get(j) == Some(&Lexeme::Minus) {
                j += 1;
            }
            if is_operand(lexemes.get(j)) {
                map.mark(name, Evidence::ArithOperand);
            }
        }
        if i >= 2 && matches!(lexemes[i - 1], Lexeme::Plus | Lexeme::Minus) && is_operand(lexemes.get(i - 2)) {
            map.mark(name, Evidence::ArithOperand);
        }

        // (b), (c), (d): look through parentheses for an adjacent comparison.
        let after = (i + 1..lexemes.len()).find(|&j| lexemes[j] != Lexeme::Paren);
        if let Some(k) = after.filter(|&k| lexemes[k] == Lexeme::Cmp) {
            classify_comparison(&mut map, name, other_side_after(&lexemes, k), config);
        }
        let before = (0..i).rev().find(|&j| lexemes[j] != Lexeme::Paren);
        if let Some(k) = before.filter(|&k| lexemes[k] == Lexeme::Cmp) {
            classify_comparison(&mut map, name, other_side_before(&lexemes, k), config);
        }
    }

    for (name, entry) in map.iter() {
        debug!("infer: {} : {} {:?}", name, entry.ty, entry.evidence);
    }
    map
}

fn other_side_after<'a>(lexemes: &[Lexeme<'a>], cmp: usize) -> Option<Lexeme<'a>> {
    let mut j = cmp + 1;
    while lexemes.get(j) == Some(&Lexeme::Paren) {
        j += 1;
    }
    match lexemes.get(j) {
        Some(Lexeme::Minus) if lexemes.get(j + 1) == Some(&Lexeme::Num) => Some(Lexeme::Num),
        other => other.copied(),
    }
}

fn other_side_before<'a>(lexemes: &[Lexeme<'a>], cmp: usize) -> Option<Lexeme<'a>> {
    (0..cmp).rev().map(|j| lexemes[j]).find(|l| *l != Lexeme::Paren)
}

fn classify_comparison(map: &mut TypeMap, name: &str, other: Option<Lexeme<'_>>, config: &Config) {
    match other {
        Some(Lexeme::Num) => map.mark(name, Evidence::ComparedWithLiteral),
        Some(Lexeme::Ident(other)) if config.is_enum_constant(other) => map.mark(name, Evidence::ComparedWithConstant),
        _ => {}
    }
    map.mark(name, Evidence::ComparisonOperand);
}
