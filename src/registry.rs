//! The project-wide model registry.
//!
//! Built in one pass over every unit before any conversion starts, so
//! that a type nested inside one declaration can be recognized as the
//! underlying type of another and referenced by name instead of being
//! expanded inline.

use crate::docs;
use crate::oracle::{Project, TypeId};

/// A declaration tagged for conversion.
#[derive(Clone, Debug)]
pub struct Model {
    /// The emitted name: the declaration identifier, or the export
    /// tag's payload when one was given.
    pub name: String,
    /// The declaration's underlying resolved type.
    pub ty: TypeId,
}

/// All tagged declarations across a project, in declaration order.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Vec<Model>,
}

impl ModelRegistry {
    /// Scans every unit and records each tagged declaration. Duplicate
    /// names are allowed; lookups go by type identity, not by name.
    pub fn build(project: &Project) -> Self {
        let mut models = Vec::new();
        for (_, unit) in project.units() {
            for declaration in &unit.declarations {
                if let Some(name) = docs::export_name(declaration) {
                    models.push(Model {
                        name: name.to_owned(),
                        ty: declaration.ty,
                    });
                }
            }
        }
        Self { models }
    }

    /// Returns the first registered model whose underlying type is
    /// identical to `ty`.
    pub fn lookup(&self, ty: TypeId) -> Option<&Model> {
        self.models.iter().find(|model| model.ty == ty)
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }
}
