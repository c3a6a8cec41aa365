//! Decorator extraction from structured documentation.
//!
//! A declaration opts into conversion with a `model` tag; `decorator`
//! tags are copied through verbatim. A non-empty free-text description
//! additionally synthesizes a `@doc(...)` decorator, which always comes
//! before the explicit ones.

use crate::compose::Snippet;
use crate::oracle::{Declaration, Docs};
use crate::snippet;

/// The tag that marks a declaration for conversion. Its payload, when
/// present, overrides the emitted name.
pub const EXPORT_TAG: &str = "model";

/// The tag whose payload is copied verbatim as a decorator.
pub const DECORATOR_TAG: &str = "decorator";

/// Single-line doc values longer than this render as a block.
const DOC_LINE_LIMIT: usize = 80;

/// Returns the name a tagged declaration exports under, or `None` when
/// the declaration is not tagged for conversion.
pub fn export_name(declaration: &Declaration) -> Option<&str> {
    let tag = declaration.docs.tag(EXPORT_TAG)?;
    let payload = tag.text.trim();
    Some(if payload.is_empty() {
        &declaration.name
    } else {
        payload
    })
}

/// Returns the decorators for a declaration or property: the
/// synthesized `@doc(...)` first, then each explicit decorator in
/// source order.
pub fn decorators(docs: &Docs) -> Vec<Snippet> {
    let mut decorators = Vec::new();
    if let Some(description) = docs.description() {
        decorators.push(doc_decorator(description));
    }
    decorators.extend(
        docs.tags
            .iter()
            .filter(|tag| tag.name == DECORATOR_TAG)
            .map(|tag| Snippet::from(format!("@{}", tag.text.trim()))),
    );
    decorators
}

/// Synthesizes a `@doc(...)` decorator from a free-text description.
///
/// Short one-line descriptions render as a quoted string; descriptions
/// with newlines, or whose quoted form would run past the line limit,
/// render as a triple-quoted block with their common indentation
/// stripped.
fn doc_decorator(description: &str) -> Snippet {
    let quoted = serde_json::to_string(description).unwrap();
    if description.contains('\n') || quoted.len() > DOC_LINE_LIMIT {
        let block = textwrap::dedent(description);
        snippet!(r#"
            @doc("""
            {}
            """)"#, block.trim_matches('\n'))
    } else {
        Snippet::from(format!("@doc({quoted})"))
    }
}
