use std::collections::HashSet;

use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase};

use crate::ir::NormalizedName;

/// Python keywords that cannot be used as identifiers.
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

pub fn is_python_keyword(name: &str) -> bool {
    PYTHON_KEYWORDS.contains(&name)
}

/// Create a `NormalizedName` from an arbitrary string, computing all casing variants.
pub fn normalize_name(name: &str) -> NormalizedName {
    let cleaned = replace_invalid(name, |_| false);

    NormalizedName {
        original: name.to_string(),
        pascal_case: cleaned.to_pascal_case(),
        camel_case: cleaned.to_lower_camel_case(),
        snake_case: to_snake_case(name),
        screaming_snake: cleaned.to_shouty_snake_case(),
    }
}

/// Convert an arbitrary spec string (operation id, parameter or property
/// name) to snake_case.
///
/// - characters outside `[A-Za-z0-9_]` become `_`
/// - `{name}` placeholders become `_name_`
/// - `_api_v<N>_` route noise is removed
/// - camelCase and PascalCase words are split
/// - a leading digit gets an `op_` prefix; an empty result becomes `operation`
pub fn to_snake_case(name: &str) -> String {
    let braced = replace_invalid(name, |c| c == '{' || c == '}');
    let unbraced = expand_placeholders(&braced);
    let trimmed = collapse_underscores(&strip_api_version(&unbraced));

    let mut split = String::with_capacity(trimmed.len() + 8);
    let chars: Vec<char> = trimmed.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if next_is_lower || prev.is_ascii_lowercase() || prev.is_ascii_digit() {
                split.push('_');
            }
        }
        split.push(c.to_ascii_lowercase());
    }

    let mut result = collapse_underscores(&split);
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result = format!("op_{result}");
    }
    if result.is_empty() {
        result = "operation".to_string();
    }
    result
}

/// Make a snake_case name safe to use as a Python identifier: keywords get a
/// trailing `_`, a leading digit gets a leading `_`.
pub fn sanitize_identifier(name: &str) -> String {
    if is_python_keyword(name) {
        return format!("{name}_");
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{name}");
    }
    name.to_string()
}

/// Turn one schema name segment into a valid class or folder name.
pub fn sanitize_model_name(name: &str) -> String {
    let mut sanitized = replace_invalid(name, |_| false);
    if sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        sanitized = format!("Model_{sanitized}");
    }
    let sanitized = collapse_underscores(&sanitized);
    if sanitized.is_empty() {
        return "Model".to_string();
    }
    if is_python_keyword(&sanitized) {
        return format!("{sanitized}_");
    }
    sanitized
}

/// Constant name for an enum value: upper-cased, separators turned into `_`.
pub fn enum_constant_name(value: &str) -> String {
    let upper = replace_invalid(&value.to_uppercase(), |_| false);
    let collapsed = collapse_underscores(&upper);
    if collapsed.is_empty() {
        return "EMPTY".to_string();
    }
    sanitize_identifier(&collapsed)
}

/// Derive a snake_case method name from HTTP verb + path literals.
///
/// Path parameters are dropped, and a leading `api`/`v<N>` prefix is skipped:
/// - `GET /a/b/{id}` → `get_a_b`
/// - `GET /api/v1/users` → `get_users`
/// - `POST /pets/{petId}/photos` → `post_pets_photos`
pub fn route_to_name(verb: &str, path: &str) -> String {
    let literals: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty() && !is_path_param(s))
        .collect();

    let skip = match literals.as_slice() {
        [api, version, ..] if api.eq_ignore_ascii_case("api") && is_version_segment(version) => 2,
        _ => 0,
    };

    let mut parts = vec![verb.to_ascii_lowercase()];
    parts.extend(literals[skip..].iter().map(|s| to_snake_case(s)));
    to_snake_case(&parts.join("_"))
}

/// Names of the `{param}` segments of a path, snake-cased.
pub fn path_param_names(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| is_path_param(s))
        .map(|s| to_snake_case(s.trim_start_matches('{').trim_end_matches('}')))
        .collect()
}

fn is_path_param(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}')
}

fn is_version_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(chars.next(), Some('v' | 'V')) && chars.all(|c| c.is_ascii_digit())
}

/// Hands out identifiers that are unique within one scope.
///
/// A taken candidate is first retried with the supplied disambiguating
/// suffix, then with `_2`, `_3`, ... which always terminates.
#[derive(Debug, Clone, Default)]
pub struct NameAllocator {
    taken: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An allocator with some names already unavailable.
    pub fn with_reserved<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: reserved.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    pub fn allocate(&mut self, candidate: &str) -> String {
        self.allocate_with(candidate, None)
    }

    pub fn allocate_with(&mut self, candidate: &str, suffix: Option<&str>) -> String {
        if self.taken.insert(candidate.to_string()) {
            return candidate.to_string();
        }
        if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
            let with_suffix = format!("{candidate}_{suffix}");
            if self.taken.insert(with_suffix.clone()) {
                return with_suffix;
            }
        }
        let mut n = 2;
        loop {
            let numbered = format!("{candidate}_{n}");
            if self.taken.insert(numbered.clone()) {
                return numbered;
            }
            n += 1;
        }
    }
}

/// Replace every character outside `[A-Za-z0-9_]` (and any `keep` character) with `_`.
fn replace_invalid(name: &str, keep: impl Fn(char) -> bool) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || keep(c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `{name}` → `_name_`; stray braces become `_`.
fn expand_placeholders(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut rest = name;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if close > 0 && !after[..close].contains('{') => {
                out.push('_');
                out.push_str(&after[..close]);
                out.push('_');
                rest = &after[close + 1..];
            }
            _ => {
                out.push('_');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out.replace('}', "_")
}

/// Remove `_api_v<N>_` sequences, keeping one separator.
fn strip_api_version(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(pos) = rest.find("_api_v") {
        let after = &rest[pos + "_api_v".len()..];
        let digits = after.chars().take_while(|c| c.is_ascii_digit()).count();
        if after[digits..].starts_with('_') {
            out.push_str(&rest[..pos]);
            out.push('_');
            rest = &after[digits + 1..];
        } else {
            out.push_str(&rest[..pos + 1]);
            rest = &rest[pos + 1..];
        }
    }
    out.push_str(rest);
    out
}

fn collapse_underscores(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}
