//! Placeholder substitution for page, stylesheet and script templates.
//!
//! Rendering is a two-pass text transform rather than a template language:
//!
//! 1. `{{#NAME}}...{{/NAME}}` blocks are resolved. An opening tag pairs with
//!    the nearest closing tag of the same name. A truthy value keeps the
//!    inner text (whose own blocks are then resolved too); a falsy one drops
//!    the whole span. Nesting a block inside another block of the *same*
//!    name is not supported.
//! 2. `{{NAME}}` tokens are replaced in a single scan, so substituted text is
//!    never expanded again. Unknown names render as the empty string.
//!
//! Rendering never fails and is deterministic for a given template and map.

use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Variables available to a template, keyed by placeholder name
pub type TemplateVars = BTreeMap<String, Value>;

#[allow(clippy::expect_used)]
static BLOCK_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{#([A-Za-z_][A-Za-z0-9_]*)\}\}").expect("invalid block regex")
});

#[allow(clippy::expect_used)]
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}").expect("invalid token regex")
});

/// Renders `template` against `vars`.
#[must_use]
pub fn render(template: &str, vars: &TemplateVars) -> String {
    let resolved = resolve_blocks(template, vars);
    TOKEN
        .replace_all(&resolved, |caps: &Captures<'_>| {
            vars.get(&caps[1]).map(stringify).unwrap_or_default()
        })
        .into_owned()
}

fn resolve_blocks(template: &str, vars: &TemplateVars) -> String {
    let mut out = template.to_string();
    let mut cursor = 0;

    while let Some(caps) = BLOCK_OPEN.captures_at(&out, cursor) {
        let (open_start, open_end) = match caps.get(0) {
            Some(m) => (m.start(), m.end()),
            None => break,
        };
        let name = caps[1].to_string();
        let close_tag = format!("{{{{/{name}}}}}");

        let Some(offset) = out[open_end..].find(&close_tag) else {
            // Unterminated block: leave the tag as text and keep scanning
            cursor = open_end;
            continue;
        };
        let close_start = open_end + offset;
        let close_end = close_start + close_tag.len();

        if is_truthy(vars.get(&name)) {
            let inner = out[open_end..close_start].to_string();
            out.replace_range(open_start..close_end, &inner);
        } else {
            out.replace_range(open_start..close_end, "");
        }
        cursor = open_start;
    }

    out
}

/// Truthiness for conditional blocks: non-empty strings, `true`, non-zero
/// numbers and non-empty arrays or objects.
#[must_use]
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}

/// Text inserted for a `{{NAME}}` token.
#[must_use]
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Escapes text for use inside HTML element content or a quoted attribute.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
