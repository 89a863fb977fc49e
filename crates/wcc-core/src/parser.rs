use crate::ast::{Declaration, Rule, Stylesheet};
use crate::error::{Error, Result, Span};
use std::fs;
use std::path::Path;

/// Parse CSS text into flat rules.
///
/// Comments are dropped, at-rules (`@media`, `@supports`, `@import`, ...) are
/// skipped whole, and only top-level style rules are kept. Declarations with an
/// empty property or value, or without a colon, are filtered out.
pub fn parse(input: &str) -> Result<Stylesheet> {
    parse_named(input, Path::new("<inline>"))
}

pub fn parse_file(path: &Path) -> Result<Stylesheet> {
    let src = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_named(&src, path)
}

pub fn parse_named(input: &str, path: &Path) -> Result<Stylesheet> {
    let cleaned = strip_comments(input);
    let bytes = cleaned.as_bytes();
    let len = bytes.len();
    let mut rules = Vec::new();
    let mut pos = 0;

    while pos < len {
        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= len {
            break;
        }

        if bytes[pos] == b'@' {
            pos = skip_at_rule(&cleaned, pos, path)?;
            continue;
        }

        let open_idx = match find_top_level(&cleaned, pos, b"{") {
            Some(idx) => idx,
            None => {
                return Err(Error::parse(
                    path,
                    Span::locate(input, pos),
                    "expected '{' after selector",
                ))
            }
        };
        let close_idx = matching_brace(&cleaned, open_idx).ok_or_else(|| {
            Error::parse(path, Span::locate(input, open_idx), "unclosed block")
        })?;

        let selectors = split_selector_terms(&cleaned[pos..open_idx]);
        if selectors.is_empty() {
            return Err(Error::parse(
                path,
                Span::locate(input, open_idx),
                "missing selector before '{'",
            ));
        }

        let declarations = parse_declarations(&cleaned, open_idx + 1, close_idx, input, path);
        rules.push(Rule {
            selectors,
            declarations,
        });
        pos = close_idx + 1;
    }

    Ok(Stylesheet { rules })
}

/// Split a selector list on top-level commas, collapsing whitespace runs.
pub fn split_selector_terms(selector: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut start = 0;
    while let Some(comma) = find_top_level(selector, start, b",") {
        terms.push(&selector[start..comma]);
        start = comma + 1;
    }
    terms.push(&selector[start..]);

    terms
        .into_iter()
        .map(|term| term.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|term| !term.is_empty())
        .collect()
}

fn parse_declarations(
    cleaned: &str,
    start: usize,
    end: usize,
    original: &str,
    path: &Path,
) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    let mut pos = start;

    while pos < end {
        let stop = find_top_level(cleaned, pos, b";")
            .filter(|&idx| idx < end)
            .unwrap_or(end);
        let fragment = &cleaned[pos..stop];
        let trimmed = fragment.trim();

        if trimmed.contains('{') {
            // Nested rules are outside the flat subset this pipeline consumes.
            tracing::debug!("skipping nested block in {}", path.display());
            let open = pos + fragment.find('{').unwrap_or(0);
            let close = matching_brace(cleaned, open).unwrap_or(end);
            pos = close + 1;
            continue;
        }

        if !trimmed.is_empty() {
            let offset = pos + fragment.len() - fragment.trim_start().len();
            match trimmed.split_once(':') {
                Some((property, value)) => {
                    let property = property.trim();
                    let value = value.trim();
                    if property.is_empty() || value.is_empty() {
                        tracing::debug!(
                            "dropping malformed declaration '{}' in {}",
                            trimmed,
                            path.display()
                        );
                    } else {
                        declarations.push(Declaration {
                            property: property.to_string(),
                            value: value.to_string(),
                            span: Span::locate(original, offset),
                        });
                    }
                }
                None => tracing::warn!(
                    "dropping invalid declaration '{}' in {} at {}",
                    trimmed,
                    path.display(),
                    Span::locate(original, offset)
                ),
            }
        }
        pos = stop + 1;
    }

    declarations
}

fn skip_at_rule(src: &str, pos: usize, path: &Path) -> Result<usize> {
    match find_top_level(src, pos, b";{") {
        Some(idx) if src.as_bytes()[idx] == b';' => Ok(idx + 1),
        Some(idx) => matching_brace(src, idx)
            .map(|close| close + 1)
            .ok_or_else(|| Error::parse(path, Span::locate(src, idx), "unclosed at-rule block")),
        None => Ok(src.len()),
    }
}

/// First byte in `targets` at or after `from` that is outside strings,
/// parentheses and brackets.
fn find_top_level(src: &str, from: usize, targets: &[u8]) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = from;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 1;
            } else if b == q {
                quote = None;
            }
        } else {
            match b {
                b'"' | b'\'' => quote = Some(b),
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth = depth.saturating_sub(1),
                _ if depth == 0 && targets.contains(&b) => return Some(i),
                _ => {}
            }
        }
        i += 1;
    }
    None
}

fn matching_brace(src: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = open;
    loop {
        let idx = find_top_level(src, pos, b"{}")?;
        if src.as_bytes()[idx] == b'{' {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(idx);
            }
        }
        pos = idx + 1;
    }
}

/// Blank out `/* ... */` comments while keeping byte offsets stable.
fn strip_comments(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            out.push(b);
            if b == b'\\' && i + 1 < bytes.len() {
                out.push(bytes[i + 1]);
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        if b == b'/' && bytes.get(i + 1) == Some(&b'*') {
            let end = input[i + 2..]
                .find("*/")
                .map(|rel| i + 2 + rel + 2)
                .unwrap_or(bytes.len());
            for &c in &bytes[i..end] {
                out.push(if c == b'\n' { b'\n' } else { b' ' });
            }
            i = end;
            continue;
        }

        if b == b'"' || b == b'\'' {
            quote = Some(b);
        }
        out.push(b);
        i += 1;
    }

    // Only ASCII bytes inside comments were rewritten; the rest is copied verbatim.
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
