use minijinja::{Environment, context};
use ocg_core::ir::IrSpec;
use ocg_core::{GeneratedFile, GeneratorError};

use super::apis::ApiClass;
use super::render;
use crate::type_mapper::py_str_list;

/// Emit the support files every generated package ships with.
pub fn emit_base_files() -> Vec<GeneratedFile> {
    let files: [(&str, &str); 5] = [
        ("base/__init__.py", include_str!("../../templates/base_init.py.j2")),
        ("base/base_model.py", include_str!("../../templates/base_model.py.j2")),
        ("base/base_client.py", include_str!("../../templates/base_client.py.j2")),
        ("requirements.txt", include_str!("../../templates/requirements.txt.j2")),
        ("py.typed", ""),
    ];
    files
        .into_iter()
        .map(|(path, content)| GeneratedFile {
            path: path.to_string(),
            content: content.to_string(),
        })
        .collect()
}

/// Emit the package `__init__.py` exporting the API classes and `models`.
pub fn emit_package_init(
    env: &Environment<'_>,
    ir: &IrSpec,
    apis: &[ApiClass],
) -> Result<GeneratedFile, GeneratorError> {
    let apis_ctx: Vec<minijinja::Value> = apis
        .iter()
        .map(|api| {
            context! {
                module => api.module.clone(),
                class_name => api.class_name.clone(),
            }
        })
        .collect();
    let exported = apis
        .iter()
        .map(|api| api.class_name.as_str())
        .chain(["BaseClient", "BaseModel", "models"]);

    let content = render(
        env,
        "package_init.py.j2",
        context! {
            title => ir.info.title.clone(),
            apis => apis_ctx,
            all => py_str_list(exported),
        },
    )?;
    Ok(GeneratedFile {
        path: "__init__.py".to_string(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_files() {
        let files = emit_base_files();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "base/__init__.py",
                "base/base_model.py",
                "base/base_client.py",
                "requirements.txt",
                "py.typed",
            ]
        );
        let client = &files[2].content;
        for method in ["def get_headers", "def set_header", "def close", "def _make_request", "def _serialize"] {
            assert!(client.contains(method), "missing {method}");
        }
        let model = &files[1].content;
        for method in ["def to_dict", "def to_json", "def from_dict", "def from_json"] {
            assert!(model.contains(method), "missing {method}");
        }
    }
}
