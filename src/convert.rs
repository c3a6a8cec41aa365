//! The type conversion engine.
//!
//! Walks resolved types and renders them as TypeSpec syntax. Each
//! tagged declaration becomes either a `model` statement (structural
//! object shapes) or an `alias` statement (everything else). Nested
//! types that are themselves registered models are referenced by name
//! rather than expanded again.

use itertools::Itertools;

use crate::compose::{self, Scope, Snippet};
use crate::docs;
use crate::error::ConvertError;
use crate::oracle::{Declaration, Project, Property, TypeId, TypeNode, Unit};
use crate::registry::ModelRegistry;
use crate::snippet;

/// The result of converting a project's units.
#[derive(Debug)]
pub struct Conversion {
    /// The concatenated schema document.
    pub output: String,
    /// Units that could not be converted; the output omits them.
    pub errors: Vec<ConvertError>,
}

/// Converts the named units of a project into one schema document.
///
/// The registry pass runs over *all* units first, so a declaration in
/// one unit can reference a model declared in another. Units that are
/// missing from the project are reported in [`Conversion::errors`] and
/// skipped; the remaining units still convert.
pub fn convert_project(project: &Project, units: &[String]) -> Conversion {
    let registry = ModelRegistry::build(project);
    let converter = Converter::new(project, &registry);

    let mut rendered = Vec::new();
    let mut errors = Vec::new();
    for name in units {
        match project.unit(name) {
            Some(unit) => rendered.push(format!("// {name}\n{}", render_unit(&converter, unit))),
            None => errors.push(ConvertError::UnitNotFound { unit: name.clone() }),
        }
    }

    Conversion {
        output: rendered.join("\n\n"),
        errors,
    }
}

fn render_unit(converter: &Converter<'_>, unit: &Unit) -> String {
    let snippet = converter.convert_unit(unit);
    let mut scope = Scope::new();
    snippet.attach(&mut scope);
    let directives: String = scope
        .usings()
        .map(|path| format!("using {path};\n"))
        .collect();
    format!("{directives}{}", snippet.render(&scope))
}

/// Renders resolved types against a model registry.
#[derive(Debug)]
pub struct Converter<'a> {
    project: &'a Project,
    registry: &'a ModelRegistry,
}

impl<'a> Converter<'a> {
    pub fn new(project: &'a Project, registry: &'a ModelRegistry) -> Self {
        Self { project, registry }
    }

    /// Converts every tagged declaration of a unit, blank-line
    /// separated.
    pub fn convert_unit(&self, unit: &Unit) -> Snippet {
        compose::stanzas(
            unit.declarations
                .iter()
                .filter(|declaration| docs::export_name(declaration).is_some())
                .map(|declaration| self.convert_model(declaration)),
        )
    }

    /// Converts one tagged declaration into a complete statement, with
    /// its decorators on the preceding lines.
    pub fn convert_model(&self, declaration: &Declaration) -> Snippet {
        let name = docs::export_name(declaration).unwrap_or(&declaration.name);
        let generics = type_param_list(declaration.type_params);
        let body = self.convert_type(declaration.ty);
        let statement = if self.is_model_shape(declaration.ty) {
            snippet!("model {}{} {};", name, generics, body)
        } else {
            snippet!("alias {}{} = {};", name, generics, body)
        };

        let mut parts = docs::decorators(&declaration.docs);
        parts.push(statement);
        compose::lines(parts)
    }

    /// Renders a type as an inline expression.
    pub fn convert_type(&self, ty: TypeId) -> Snippet {
        match self.node(ty) {
            TypeNode::String => "string".into(),
            TypeNode::TemplateLiteral { head, spans } => {
                let mut parts = vec![Snippet::from(format!("\"{}", escape_fragment(head)))];
                for span in spans {
                    parts.push("${".into());
                    parts.push(self.reference_type(span.ty));
                    parts.push("}".into());
                    parts.push(escape_fragment(&span.literal).into());
                }
                parts.push("\"".into());
                compose::concat(parts)
            }
            TypeNode::Number => "float64".into(),
            TypeNode::Boolean => "boolean".into(),
            TypeNode::Array { element } => {
                compose::concat([self.reference_type(*element), "[]".into()])
            }
            TypeNode::Tuple { elements } => snippet!(
                "[{}]",
                compose::joined(", ", elements.iter().map(|e| self.reference_type(*e)))
            ),
            TypeNode::Object {
                symbol,
                type_arguments,
                properties,
            } => match (symbol.as_deref().unwrap_or_default(), &type_arguments[..]) {
                ("Array", [element, ..]) => {
                    compose::concat([self.reference_type(*element), "[]".into()])
                }
                // `Record` keeps only its value type; the key type has
                // no counterpart in the output language.
                ("Record", [.., value]) => snippet!("Record<{}>", self.reference_type(*value)),
                (base, arguments) if !arguments.is_empty() => snippet!(
                    "{}<{}>",
                    base,
                    compose::joined(", ", arguments.iter().map(|a| self.reference_type(*a)))
                ),
                _ if properties.is_empty() => "{}".into(),
                _ => self.object_body(properties),
            },
            TypeNode::Union { members } => {
                compose::union(members.iter().map(|m| self.reference_type(*m)))
            }
            TypeNode::Intersection { members } => {
                // Structural merge: every member's own properties,
                // flattened into one body. Members are inlined, never
                // referenced by name.
                self.object_body(members.iter().flat_map(|member| self.own_properties(*member)))
            }
            TypeNode::Opaque { display: opaque_text } => {
                tracing::debug!(text = %opaque_text, "passing a type through verbatim");
                opaque_text.as_str().into()
            }
        }
    }

    /// Renders a bare model name when the type is identical to a
    /// registered model's underlying type, or falls back to
    /// [`convert_type`][Self::convert_type].
    pub fn reference_type(&self, ty: TypeId) -> Snippet {
        match self.registry.lookup(ty) {
            Some(model) => model.name.as_str().into(),
            None => self.convert_type(ty),
        }
    }

    fn node(&self, ty: TypeId) -> &'a TypeNode {
        self.project.store().node(ty)
    }

    /// A declaration becomes a `model` statement only for plain object
    /// shapes; generic instantiations, arrays, and tuples stay aliases.
    fn is_model_shape(&self, ty: TypeId) -> bool {
        matches!(
            self.node(ty),
            TypeNode::Object { type_arguments, .. } if type_arguments.is_empty()
        )
    }

    fn own_properties(&self, ty: TypeId) -> &'a [Property] {
        match self.node(ty) {
            TypeNode::Object {
                type_arguments,
                properties,
                ..
            } if type_arguments.is_empty() => properties,
            _ => &[],
        }
    }

    fn object_body<'b>(&self, properties: impl IntoIterator<Item = &'b Property>) -> Snippet {
        let fields: Vec<Snippet> = properties
            .into_iter()
            .map(|property| self.field(property))
            .collect();
        if fields.is_empty() {
            return "{}".into();
        }
        snippet!("
            {{
              {}
            }}", compose::statements(fields))
    }

    fn field(&self, property: &Property) -> Snippet {
        let marker = if property.optional { "?" } else { "" };
        let line = snippet!(
            "{}{}: {}",
            property.name.as_str(),
            marker,
            self.reference_type(property.ty)
        );
        let mut parts = docs::decorators(&property.docs);
        parts.push(line);
        compose::lines(parts)
    }
}

/// Synthesizes positional type-parameter names for a generic
/// declaration head: `<T>` for one parameter, `<T1, .., TN>` otherwise.
fn type_param_list(count: usize) -> String {
    match count {
        0 => String::new(),
        1 => "<T>".to_owned(),
        n => format!("<{}>", (1..=n).map(|i| format!("T{i}")).join(", ")),
    }
}

fn escape_fragment(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
