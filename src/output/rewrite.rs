// Sat Oct 17 2026 - Alex

use crate::hierarchy::{TypeId, TypeRegistry, TypeShape};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type RewriteFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// How the display name of a wrapper instantiation is derived from its raw name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapperRewrite {
    /// Replace the inner type argument with the inner type's own display name.
    Inner,
    /// As `Inner`, then collapse a leading `std::__1` to `std`.
    FlattenStdAbi,
}

/// Maps raw (demangled) type names to the names an API presents.
/// Identity unless a per-type override or a wrapper rule applies.
#[derive(Default)]
pub struct NameRewriter {
    overrides: HashMap<String, RewriteFn>,
    wrapper_rules: HashMap<String, WrapperRewrite>,
}

impl NameRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a rewrite for the type whose raw name is `name`.
    pub fn set_override<F>(&mut self, name: &str, rewrite: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.overrides.insert(name.to_string(), Box::new(rewrite));
    }

    pub fn with_override<F>(mut self, name: &str, rewrite: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.set_override(name, rewrite);
        self
    }

    /// Apply `rule` to every wrapper instantiated from `template`.
    pub fn set_wrapper_rule(&mut self, template: &str, rule: WrapperRewrite) {
        self.wrapper_rules.insert(template.to_string(), rule);
    }

    pub fn with_wrapper_rule(mut self, template: &str, rule: WrapperRewrite) -> Self {
        self.set_wrapper_rule(template, rule);
        self
    }

    pub fn rewrite(&self, registry: &TypeRegistry, id: TypeId) -> String {
        let entry = match registry.entry(id) {
            Ok(entry) => entry,
            Err(_) => return id.to_string(),
        };
        let name = entry.name();

        if let Some(rewrite) = self.overrides.get(name) {
            return rewrite(name);
        }

        let (template, inner) = match entry.shape() {
            TypeShape::Wrapper { template, inner } => (template, *inner),
            TypeShape::Plain => return name.to_string(),
        };
        let rule = match self.wrapper_rules.get(template) {
            Some(rule) => *rule,
            None => return name.to_string(),
        };

        let inner_raw = match registry.name(inner) {
            Ok(raw) => raw,
            Err(_) => return name.to_string(),
        };
        let inner_display = self.rewrite(registry, inner);

        let rewritten = rewrite_template_argument(name, inner_raw, &inner_display).unwrap_or_else(|| {
            log::debug!("Couldn't parse template {}, keeping it unchanged", name);
            name.to_string()
        });

        match rule {
            WrapperRewrite::Inner => rewritten,
            WrapperRewrite::FlattenStdAbi => flatten_std_abi(&rewritten).unwrap_or_else(|| {
                log::debug!("No std ABI namespace to flatten in {}", rewritten);
                rewritten
            }),
        }
    }
}

impl fmt::Debug for NameRewriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameRewriter")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .field("wrapper_rules", &self.wrapper_rules)
            .finish()
    }
}

/// `std::__1::foo<T>` becomes `std::foo<T>`. `None` if `name` is not in the
/// inline ABI namespace.
pub fn flatten_std_abi(name: &str) -> Option<String> {
    name.strip_prefix("std::__1")
        .filter(|rest| !rest.is_empty())
        .map(|rest| format!("std{}", rest))
}

/// Swap the single template argument `inner` of `name` for `replacement`,
/// e.g. `Handle<ns::impl::T>` to `Handle<T>`. `None` if `name` is not a unary
/// template instantiated with `inner`.
pub fn rewrite_template_argument(name: &str, inner: &str, replacement: &str) -> Option<String> {
    let pattern = format!(r"^([^<]+<\s*)({})\s*(>)$", regex::escape(inner));
    let regex = Regex::new(&pattern).ok()?;
    let caps = regex.captures(name)?;
    Some(format!("{}{}{}", &caps[1], replacement, &caps[3]))
}
