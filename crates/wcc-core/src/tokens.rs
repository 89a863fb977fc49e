use crate::config::SourceLayout;
use crate::loader::SourceFile;
use crate::resolver::{VarResolver, VENDOR_PREFIX};
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A declaration with its resolved value and how it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub property: String,
    /// Most literal value the resolver reached.
    pub value: String,
    /// Resolution chain, most reference-laden first. Empty when the declared
    /// value needed no resolution.
    pub values: Vec<String>,
}

impl Token {
    pub fn literal(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            values: Vec::new(),
        }
    }

    /// The value as declared upstream, before any resolution.
    pub fn declared(&self) -> &str {
        self.values.first().unwrap_or(&self.value)
    }
}

/// property -> token
pub type TokenDeclarations = IndexMap<String, Token>;
/// selector -> declarations
pub type TokenRules = IndexMap<String, TokenDeclarations>;
/// source file basename -> rules
pub type TokenComponents = IndexMap<String, TokenRules>;

pub fn to_json(components: &TokenComponents) -> crate::Result<String> {
    Ok(serde_json::to_string_pretty(components)?)
}

pub fn generate_tokens(
    sources: &[SourceFile],
    resolver: &VarResolver<'_>,
    layout: &SourceLayout,
) -> TokenComponents {
    let mut components = TokenComponents::new();

    for source in sources {
        let rules = file_tokens(source, resolver, layout);
        match components.entry(source.name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(rules);
            }
            Entry::Occupied(mut slot) => {
                // Same basename deeper in the tree: it only fills gaps.
                for (selector, declarations) in rules {
                    let existing = slot.get_mut().entry(selector).or_default();
                    for (property, token) in declarations {
                        existing.entry(property).or_insert(token);
                    }
                }
            }
        }
    }

    tracing::info!(
        "generated tokens for {} source files ({} rules)",
        components.len(),
        components.values().map(IndexMap::len).sum::<usize>()
    );
    components
}

fn file_tokens(source: &SourceFile, resolver: &VarResolver<'_>, layout: &SourceLayout) -> TokenRules {
    let mut rules = TokenRules::new();

    for rule in &source.stylesheet {
        if layout.is_dark_theme_rule(rule) {
            continue;
        }
        let selector = rule.first_selector();
        let declarations = rules.entry(selector.to_string()).or_default();

        for decl in &rule.declarations {
            let token = if decl.property.starts_with(VENDOR_PREFIX) {
                // Same level as the resolver's diagnostics, so they carry the location.
                let _declaration = tracing::warn_span!(
                    "declaration",
                    file = %source.path.display(),
                    at = %decl.span
                )
                .entered();
                let chain = resolver.chain(&decl.value, selector);
                let value = chain.last().cloned().unwrap_or_else(|| decl.value.clone());
                Token {
                    property: decl.property.clone(),
                    value,
                    values: if chain.len() > 1 { chain } else { Vec::new() },
                }
            } else {
                Token::literal(decl.property.as_str(), decl.value.as_str())
            };
            declarations.insert(decl.property.clone(), token);
        }
    }

    rules
}
