//! Generates component-scoped stylesheets from an upstream design system.
//!
//! The pipeline runs in two passes. [`tokens::generate_tokens`] scans the
//! upstream stylesheets and resolves every vendor custom property back to a
//! literal through the [`theme::Theme`] lookup tables. The
//! [`transform`] engine then reads one `*.wcc.yaml` spec per component and
//! writes its `:host` and `:root` stylesheets.

pub mod ast;
pub mod cleaner;
pub mod config;
pub mod emitter;
pub mod index;
pub mod loader;
pub mod matcher;
pub mod parser;
pub mod resolver;
pub mod theme;
pub mod tokens;
pub mod transform;

mod error;

pub use config::SourceLayout;
pub use error::{Error, Result, Span};
pub use resolver::VarResolver;
pub use theme::Theme;
pub use tokens::{Token, TokenComponents};

/// Load the upstream package described by `layout` and generate its tokens.
pub fn generate(layout: &SourceLayout) -> Result<TokenComponents> {
    let sources = loader::load_sources(layout)?;
    let theme = Theme::load(layout, &sources)?;
    let resolver = VarResolver::new(&theme);
    Ok(tokens::generate_tokens(&sources, &resolver, layout))
}
