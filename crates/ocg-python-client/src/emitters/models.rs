use minijinja::{Environment, context};
use ocg_core::ir::{IrEnumVariant, IrField, IrModel, IrModelKind, IrSpec};
use ocg_core::transform::namespace::FolderEntry;
use ocg_core::{GeneratedFile, GeneratorError};

use super::{docstring, render, text_lines};
use crate::type_mapper::{
    ImportTable, decode_expr, is_object_model, optional_type, py_str, py_str_list, python_literal,
    python_type,
};

/// Emit one file per model class plus an `__init__.py` for every model folder.
pub fn emit_models(
    env: &Environment<'_>,
    ir: &IrSpec,
    docstrings: bool,
) -> Result<Vec<GeneratedFile>, GeneratorError> {
    let mut files = Vec::with_capacity(ir.models.len());

    for model in &ir.models {
        let content = match &model.kind {
            IrModelKind::Object { fields } => emit_object(env, ir, model, fields, docstrings)?,
            IrModelKind::Enum { variants } => emit_enum(env, model, variants)?,
        };
        files.push(GeneratedFile {
            path: model.node.file_path(),
            content,
        });
    }

    for folder in ir.layout.folders() {
        files.push(GeneratedFile {
            path: folder.init_file_path(),
            content: emit_folder_init(env, folder)?,
        });
    }

    Ok(files)
}

fn emit_object(
    env: &Environment<'_>,
    ir: &IrSpec,
    model: &IrModel,
    fields: &[IrField],
    docstrings: bool,
) -> Result<String, GeneratorError> {
    let mut names = ImportTable::new();
    names.local(&model.schema_name, &model.node.class_name, true);
    for import in &model.imports {
        names.add(
            &import.schema_name,
            &import.module,
            &import.class_name,
            is_object_model(ir, &import.schema_name),
        );
    }

    let field_ctx: Vec<minijinja::Value> = fields
        .iter()
        .map(|field| field_to_ctx(field, model, &names, docstrings))
        .collect();

    let class_doc = if docstrings {
        docstring(&text_lines(model.description.as_deref()), "    ")
    } else {
        None
    };

    render(
        env,
        "model.py.j2",
        context! {
            class_name => model.node.class_name.clone(),
            base_model_import => model.node.base_model_import(),
            type_checking_imports => names.import_lines(),
            class_doc => class_doc,
            fields => field_ctx,
        },
    )
}

fn field_to_ctx(
    field: &IrField,
    model: &IrModel,
    names: &ImportTable,
    docstrings: bool,
) -> minijinja::Value {
    let annotation = if field.required {
        python_type(&field.field_type, names)
    } else {
        optional_type(&field.field_type, names)
    };

    // None is handled before decoding, so only the non-null shape matters.
    let decode = decode_expr(field.field_type.non_null(), "value", names);
    let runtime_imports: Vec<String> = if decode.is_some() {
        let mut lines: Vec<String> = field
            .field_type
            .referenced_models()
            .into_iter()
            .filter(|schema| *schema != model.schema_name && names.is_decodable(schema))
            .filter_map(|schema| names.import_line(schema))
            .collect();
        lines.sort();
        lines.dedup();
        lines
    } else {
        Vec::new()
    };

    let doc = if docstrings {
        docstring(&text_lines(field.description.as_deref()), "        ")
    } else {
        None
    };

    context! {
        attribute => field.attribute.clone(),
        key => py_str(&field.original_name),
        annotation => annotation,
        read_only => field.read_only,
        doc => doc,
        decode => decode,
        runtime_imports => runtime_imports,
    }
}

fn emit_enum(
    env: &Environment<'_>,
    model: &IrModel,
    variants: &[IrEnumVariant],
) -> Result<String, GeneratorError> {
    let mut lines = text_lines(model.description.as_deref());
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push("Possible values:".to_string());
    lines.extend(
        variants
            .iter()
            .map(|v| format!("    {} = {}", v.name, python_literal(&v.value))),
    );

    let variant_ctx: Vec<minijinja::Value> = variants
        .iter()
        .map(|v| {
            context! {
                name => v.name.clone(),
                value => python_literal(&v.value),
            }
        })
        .collect();

    render(
        env,
        "enum_model.py.j2",
        context! {
            class_name => model.node.class_name.clone(),
            base_model_import => model.node.base_model_import(),
            class_doc => docstring(&lines, "    "),
            variants => variant_ctx,
        },
    )
}

fn emit_folder_init(env: &Environment<'_>, folder: &FolderEntry) -> Result<String, GeneratorError> {
    let exported = folder.classes.iter().chain(folder.subfolders.iter());
    render(
        env,
        "models_init.py.j2",
        context! {
            classes => folder.classes.clone(),
            subfolders => folder.subfolders.clone(),
            all => py_str_list(exported),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::environment;
    use ocg_core::parse;
    use ocg_core::transform;

    fn emit(yaml: &str) -> Vec<GeneratedFile> {
        let doc = parse::from_yaml(yaml).unwrap();
        let ir = transform::transform(&doc).unwrap();
        emit_models(&environment().unwrap(), &ir, true).unwrap()
    }

    fn file<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
        &files
            .iter()
            .find(|f| f.path == path)
            .unwrap_or_else(|| panic!("should emit {path}"))
            .content
    }

    const SPEC: &str = r#"
openapi: 3.0.3
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Owner:
      type: object
      description: Someone who owns pets.
      required: [name]
      properties:
        name: { type: string }
        id: { type: integer, readOnly: true }
        pets:
          type: array
          items: { $ref: '#/components/schemas/zoo.Pet' }
        mood: { $ref: '#/components/schemas/Mood' }
    zoo.Pet:
      type: object
      properties:
        owner: { $ref: '#/components/schemas/Owner' }
    Mood:
      type: string
      enum: [happy, "sad face"]
    Empty:
      type: object
"#;

    #[test]
    fn test_object_model() {
        let files = emit(SPEC);
        let owner = file(&files, "models/Owner.py");
        assert!(owner.contains("from ..base.base_model import BaseModel"));
        assert!(owner.contains("class Owner(BaseModel):"));
        assert!(owner.contains("    \"\"\"Someone who owns pets.\"\"\""));
        assert!(owner.contains(
            "if TYPE_CHECKING:\n    from .Mood import Mood\n    from .zoo.Pet import Pet\n"
        ));
        assert!(owner.contains("    def name(self) -> str:"));
        assert!(owner.contains("    def pets(self) -> Optional[List[Pet]]:"));
        assert!(owner.contains("return [Pet.from_dict(item) for item in value]"));
        assert!(owner.contains("        from .zoo.Pet import Pet\n"));
        // enum values are returned as they are
        assert!(owner.contains("    def mood(self) -> Optional[Mood]:\n        return self._data.get(\"mood\")"));
        // read-only fields get no setter
        assert!(owner.contains("    def id(self) -> Optional[int]:"));
        assert!(!owner.contains("@id.setter"));
        assert!(owner.contains("@name.setter"));
    }

    #[test]
    fn test_nested_model_imports_upward() {
        let files = emit(SPEC);
        let pet = file(&files, "models/zoo/Pet.py");
        assert!(pet.contains("from ...base.base_model import BaseModel"));
        assert!(pet.contains("from ..Owner import Owner"));
        assert!(pet.contains("return Owner.from_dict(value)"));
    }

    #[test]
    fn test_enum_and_empty_models() {
        let files = emit(SPEC);
        let mood = file(&files, "models/Mood.py");
        assert!(mood.contains("class Mood(BaseModel):"));
        assert!(mood.contains("    HAPPY = \"happy\""));
        assert!(mood.contains("    SAD_FACE = \"sad face\""));
        assert!(mood.contains("Possible values:"));

        let empty = file(&files, "models/Empty.py");
        assert!(empty.contains("class Empty(BaseModel):\n    pass"));
    }

    #[test]
    fn test_folder_inits() {
        let files = emit(SPEC);
        let root = file(&files, "models/__init__.py");
        assert!(root.contains("from .Owner import Owner"));
        assert!(root.contains("from . import zoo"));
        assert!(root.contains(r#"__all__ = ["Empty", "Mood", "Owner", "zoo"]"#));
        let zoo = file(&files, "models/zoo/__init__.py");
        assert!(zoo.contains("from .Pet import Pet"));
    }
}
