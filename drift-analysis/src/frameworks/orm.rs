//! Generic ORM model detection, shared across languages: a class whose base
//! type or class decorator matches a known ORM marker becomes a
//! `ModelRecord`, with its class-body field names as `ModelFieldRecord`s —
//! the model/table/field extraction that feeds the Knowledge Store's
//! boundary detection.
//!
//! Unlike routing, ORM base classes are stable across a project once its
//! stack is chosen, so this middleware always runs — it is the one
//! exception to the "disabled unless the framework is detected" rule,
//! gated instead by matching nothing when no class qualifies.

use super::{location_overlaps, strip_quotes};
use crate::engine::file_index::{ClassRecord, FileIndex, LiteralKind, ModelFieldRecord, ModelRecord};

const DJANGO_BASES: &[&str] = &["models.Model", "Model"];
const SQLALCHEMY_BASES: &[&str] = &["Base", "db.Model"];

pub fn apply(index: &mut FileIndex) {
    let mut models = Vec::new();
    for class in &index.classes {
        if let Some(model) = detect_model(class, index) {
            models.push(model);
        }
    }
    index.models.extend(models);
}

fn detect_model(class: &ClassRecord, index: &FileIndex) -> Option<ModelRecord> {
    let entity_decorator = class.decorators.iter().find(|d| d.name == "Entity" || d.name == "Table");

    let framework = if class.base_types.iter().any(|b| DJANGO_BASES.contains(&b.as_str())) {
        "django"
    } else if class.base_types.iter().any(|b| SQLALCHEMY_BASES.contains(&b.as_str())) {
        "sqlalchemy"
    } else if entity_decorator.is_some() {
        "typeorm"
    } else {
        return None;
    };

    let table_name = entity_decorator
        .and_then(|d| d.arguments.first())
        .map(|a| strip_quotes(a).to_string())
        .or_else(|| {
            index
                .literals
                .iter()
                .find(|lit| {
                    lit.kind == LiteralKind::String
                        && lit.context == "assignment:__tablename__"
                        && location_overlaps(&class.location, &lit.location)
                })
                .map(|lit| lit.value.clone())
        });

    let fields = class
        .properties
        .iter()
        .map(|name| ModelFieldRecord { name: name.clone(), field_type: None })
        .collect();

    Some(ModelRecord {
        model_name: class.name.clone(),
        table_name,
        fields,
        framework: framework.to_string(),
        location: class.location.clone(),
    })
}
