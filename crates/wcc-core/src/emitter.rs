use crate::ast::{Declaration, Rule, Stylesheet};

const INDENT: &str = "  ";

/// Serialize rules as formatted CSS: one selector per line, one declaration
/// per line, a blank line between rules.
pub fn emit_css(stylesheet: &Stylesheet) -> String {
    let mut out = String::new();

    for (i, rule) in stylesheet.into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        emit_rule(rule, &mut out);
    }
    out
}

fn emit_rule(rule: &Rule, out: &mut String) {
    out.push_str(&rule.selectors.join(",\n"));
    out.push_str(" {\n");

    for decl in &rule.declarations {
        emit_declaration(decl, out);
    }
    out.push_str("}\n");
}

fn emit_declaration(decl: &Declaration, out: &mut String) {
    out.push_str(INDENT);
    out.push_str(&decl.property);
    out.push_str(": ");
    out.push_str(&decl.value);
    out.push_str(";\n");
}
