// Fri Oct 16 2026 - Alex

use crate::hierarchy::KnownTypesCatalog;
use crate::symbol::SymbolError;
use itertools::Itertools;
use regex::{Matches, Regex};
use std::fmt;

pub const DEFAULT_UPCAST_FUNCTION: &str = "CxxFFI::upcast";

/// One capture group alternating the escaped name of every known type.
/// Reusable by anything that needs to spot known type names in free text.
#[derive(Debug, Clone)]
pub struct KnownTypesPattern {
    source: String,
    regex: Regex,
}

impl KnownTypesPattern {
    pub fn new<'a, I>(names: I) -> Result<Self, SymbolError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let alternation = names
            .into_iter()
            .map(|name| format!("(?:{})", regex::escape(name)))
            .join("|");
        let source = format!("({})", alternation);
        let regex = Regex::new(&source)?;
        Ok(Self { source, regex })
    }

    pub fn from_catalog(catalog: &KnownTypesCatalog) -> Result<Self, SymbolError> {
        Self::new(catalog.names())
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        self.regex.find_iter(text)
    }
}

impl fmt::Display for KnownTypesPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// The four type captures of a demangled upcast instantiation,
/// `Ret* fn<Derived, Base>(Arg*)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcastCaptures {
    pub return_type: String,
    pub derived: String,
    pub base: String,
    pub argument: String,
}

impl UpcastCaptures {
    /// The return type must be the base argument and the parameter the derived one.
    pub fn is_consistent(&self) -> bool {
        self.return_type == self.base && self.argument == self.derived
    }
}

/// Full-string matcher for the demangled form of an upcast instantiation.
#[derive(Debug, Clone)]
pub struct UpcastPattern {
    source: String,
    regex: Regex,
}

impl UpcastPattern {
    pub fn new(known: &KnownTypesPattern, function: &str) -> Result<Self, SymbolError> {
        let k = known.as_str();
        let source = format!(
            "{k}{star}\\s+{open}{k}{comma}\\s*{k}\\s*{close}{k}{end}",
            k = k,
            star = regex::escape("*"),
            open = regex::escape(&format!("{}<", function)),
            comma = regex::escape(","),
            close = regex::escape(">("),
            end = regex::escape("*)"),
        );
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self { source, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn captures(&self, text: &str) -> Option<UpcastCaptures> {
        let caps = self.regex.captures(text)?;
        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();
        Some(UpcastCaptures {
            return_type: group(1),
            derived: group(2),
            base: group(3),
            argument: group(4),
        })
    }
}
