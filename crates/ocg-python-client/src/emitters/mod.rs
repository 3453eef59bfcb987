pub mod apis;
pub mod models;
pub mod scaffold;

use minijinja::Environment;
use ocg_core::GeneratorError;

/// Load every Python template into one environment.
pub(crate) fn environment() -> Result<Environment<'static>, GeneratorError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.add_filter("escape_docstring", escape_docstring);

    let templates: [(&'static str, &'static str); 5] = [
        ("model.py.j2", include_str!("../../templates/model.py.j2")),
        ("enum_model.py.j2", include_str!("../../templates/enum_model.py.j2")),
        ("models_init.py.j2", include_str!("../../templates/models_init.py.j2")),
        ("api.py.j2", include_str!("../../templates/api.py.j2")),
        ("package_init.py.j2", include_str!("../../templates/package_init.py.j2")),
    ];
    for (name, source) in templates {
        env.add_template(name, source)
            .map_err(|e| GeneratorError::Template(format!("{name}: {e}")))?;
    }
    Ok(env)
}

/// Render one template.
pub(crate) fn render(
    env: &Environment<'_>,
    name: &str,
    ctx: minijinja::Value,
) -> Result<String, GeneratorError> {
    env.get_template(name)
        .and_then(|tmpl| tmpl.render(ctx))
        .map_err(|e| GeneratorError::Template(format!("{name}: {e}")))
}

/// Escape text for use inside a `"""` docstring.
pub fn escape_docstring(value: String) -> String {
    value.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"")
}

/// Indented docstring block, or `None` when there is nothing to say.
pub(crate) fn docstring(lines: &[String], indent: &str) -> Option<String> {
    let mut lines: Vec<&str> = lines.iter().map(|l| l.trim_end()).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    if lines.is_empty() {
        return None;
    }
    if lines.len() == 1 {
        return Some(format!("{indent}\"\"\"{}\"\"\"", escape_docstring(lines[0].to_string())));
    }
    let mut out = format!("{indent}\"\"\"{}\n", escape_docstring(lines[0].to_string()));
    for line in &lines[1..] {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(&format!("{indent}{}\n", escape_docstring(line.to_string())));
        }
    }
    out.push_str(&format!("{indent}\"\"\""));
    Some(out)
}

/// Split free text into docstring lines.
pub(crate) fn text_lines(text: Option<&str>) -> Vec<String> {
    text.map(|t| t.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_docstring() {
        assert_eq!(escape_docstring(r#"say """hi""""#.to_string()), r#"say \"\"\"hi\"\"\""#);
        assert_eq!(escape_docstring(r"C:\path".to_string()), r"C:\\path");
    }

    #[test]
    fn test_docstring_block() {
        assert_eq!(docstring(&[], "    "), None);
        assert_eq!(
            docstring(&["One line.".to_string()], "    ").as_deref(),
            Some("    \"\"\"One line.\"\"\"")
        );
        let block = docstring(
            &[
                "Summary.".to_string(),
                String::new(),
                "Args:".to_string(),
                "    x: the x".to_string(),
                String::new(),
            ],
            "        ",
        )
        .unwrap();
        assert_eq!(
            block,
            "        \"\"\"Summary.\n\n        Args:\n            x: the x\n        \"\"\""
        );
    }

    #[test]
    fn test_templates_load() {
        assert!(environment().is_ok());
    }
}
