//! Deferred text composition.
//!
//! Generated statements are assembled from [`Snippet`]s: immutable
//! descriptions of text that only render when asked. Rendering is split
//! into two phases. [`Snippet::attach`] walks the whole tree and lets
//! nested pieces register side effects on the shared [`Scope`] (for
//! example, a `using` directive the document header must carry);
//! [`Snippet::render`] then produces the text. Rendering is pure:
//! calling it twice with the same scope yields identical output, and
//! reordering sibling renders never changes the result.

use std::collections::BTreeSet;
use std::mem;

use itertools::Itertools;

/// A lazy, composable piece of generated text.
#[derive(Clone, Debug)]
pub struct Snippet(Repr);

#[derive(Clone, Debug)]
enum Repr {
    Lit(String),
    Join {
        sep: String,
        skip_empty: bool,
        parts: Vec<Snippet>,
    },
    /// Parts terminated with `;`, one per line.
    Statements(Vec<Snippet>),
    Indent {
        level: usize,
        part: Box<Snippet>,
    },
    /// Literal segments interleaved with interpolated snippets.
    Template {
        segments: Vec<String>,
        holes: Vec<Snippet>,
    },
    /// Registers a `using` directive on the scope during attach.
    Using {
        path: String,
        part: Box<Snippet>,
    },
}

impl Snippet {
    /// Registers this snippet's scope requirements, recursively.
    ///
    /// Attaching is idempotent; attaching the same tree twice leaves the
    /// scope unchanged.
    pub fn attach(&self, scope: &mut Scope) {
        match &self.0 {
            Repr::Lit(_) => {}
            Repr::Join { parts, .. } | Repr::Statements(parts) => {
                for part in parts {
                    part.attach(scope);
                }
            }
            Repr::Indent { part, .. } => part.attach(scope),
            Repr::Template { holes, .. } => {
                for hole in holes {
                    hole.attach(scope);
                }
            }
            Repr::Using { path, part } => {
                scope.require_using(path);
                part.attach(scope);
            }
        }
    }

    /// Renders this snippet to text.
    pub fn render(&self, scope: &Scope) -> String {
        match &self.0 {
            Repr::Lit(text) => text.clone(),
            Repr::Join {
                sep,
                skip_empty,
                parts,
            } => parts
                .iter()
                .map(|part| part.render(scope))
                .filter(|text| !*skip_empty || !text.is_empty())
                .join(sep),
            Repr::Statements(parts) => parts
                .iter()
                .map(|part| format!("{};", part.render(scope)))
                .join("\n"),
            Repr::Indent { level, part } => {
                let prefix = "  ".repeat(*level);
                part.render(scope)
                    .split('\n')
                    .map(|line| {
                        if line.is_empty() {
                            line.to_owned()
                        } else {
                            format!("{prefix}{line}")
                        }
                    })
                    .join("\n")
            }
            Repr::Template { segments, holes } => render_template(segments, holes, scope),
            Repr::Using { part, .. } => part.render(scope),
        }
    }
}

impl From<&str> for Snippet {
    fn from(text: &str) -> Self {
        Self(Repr::Lit(text.to_owned()))
    }
}

impl From<String> for Snippet {
    fn from(text: String) -> Self {
        Self(Repr::Lit(text))
    }
}

/// Joins non-empty parts with one blank line between them.
pub fn stanzas(parts: impl IntoIterator<Item = Snippet>) -> Snippet {
    Snippet(Repr::Join {
        sep: "\n\n".to_owned(),
        skip_empty: true,
        parts: parts.into_iter().collect(),
    })
}

/// Joins parts with single newlines.
pub fn lines(parts: impl IntoIterator<Item = Snippet>) -> Snippet {
    joined("\n", parts)
}

/// Terminates each part with `;` and joins them with newlines.
pub fn statements(parts: impl IntoIterator<Item = Snippet>) -> Snippet {
    Snippet(Repr::Statements(parts.into_iter().collect()))
}

/// Joins parts with `,`, without a space.
pub fn commas(parts: impl IntoIterator<Item = Snippet>) -> Snippet {
    joined(",", parts)
}

/// Joins parts with ` | `.
pub fn union(parts: impl IntoIterator<Item = Snippet>) -> Snippet {
    joined(" | ", parts)
}

/// Concatenates parts with no separator.
pub fn concat(parts: impl IntoIterator<Item = Snippet>) -> Snippet {
    joined("", parts)
}

/// Joins parts with an arbitrary separator.
pub fn joined(sep: &str, parts: impl IntoIterator<Item = Snippet>) -> Snippet {
    Snippet(Repr::Join {
        sep: sep.to_owned(),
        skip_empty: false,
        parts: parts.into_iter().collect(),
    })
}

/// Indents every non-empty line of a part by `level` two-space steps.
pub fn indent(part: impl Into<Snippet>, level: usize) -> Snippet {
    Snippet(Repr::Indent {
        level,
        part: Box::new(part.into()),
    })
}

/// Wraps a part so that attaching it requires a `using` directive.
pub fn using(path: &str, part: impl Into<Snippet>) -> Snippet {
    Snippet(Repr::Using {
        path: path.to_owned(),
        part: Box::new(part.into()),
    })
}

/// Builds a template snippet from a source string with `{}` holes.
///
/// `{{` and `}}` are escapes for literal braces, like [`format!`]. The
/// template may be written with natural source indentation: when an
/// interpolated snippet renders to multiple lines, every line after the
/// first is re-indented to the column where the hole sits, and the
/// assembled text is then stripped of its common leading whitespace and
/// of leading and trailing blank lines. Most callers go through the
/// [`snippet!`][crate::snippet] macro.
pub fn template(source: &str, holes: Vec<Snippet>) -> Snippet {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                current.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                current.push('}');
            }
            '{' if chars.peek() == Some(&'}') => {
                chars.next();
                segments.push(mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    segments.push(current);
    Snippet(Repr::Template { segments, holes })
}

/// Builds a [`Snippet`](crate::compose::Snippet) from a template string
/// with `{}` holes, one expression per hole.
///
/// ```
/// use typeslate::compose::Scope;
/// use typeslate::snippet;
///
/// let body = snippet!("
///     {{
///       {}
///     }}", "x: string;");
/// assert_eq!(body.render(&Scope::new()), "{\n  x: string;\n}");
/// ```
#[macro_export]
macro_rules! snippet {
    ($source:literal $(, $hole:expr)* $(,)?) => {
        $crate::compose::template($source, vec![$($crate::compose::Snippet::from($hole)),*])
    };
}

fn render_template(segments: &[String], holes: &[Snippet], scope: &Scope) -> String {
    let mut out = String::new();
    for (index, segment) in segments.iter().enumerate() {
        out.push_str(segment);
        if let Some(hole) = holes.get(index) {
            let text = hole.render(scope);
            let column = hole_column(segment);
            if column > 0 && text.contains('\n') {
                let continuation = format!("\n{}", " ".repeat(column));
                out.push_str(&text.replace('\n', &continuation));
            } else {
                out.push_str(&text);
            }
        }
    }
    dedent(&out).trim().to_owned()
}

/// Returns the column a hole sits at: the length of the whitespace run
/// after the segment's last newline, or zero when the hole is mid-line.
fn hole_column(segment: &str) -> usize {
    match segment.rfind('\n') {
        Some(pos) => {
            let tail = &segment[pos + 1..];
            if tail.chars().all(|c| c == ' ' || c == '\t') {
                tail.len()
            } else {
                0
            }
        }
        None => 0,
    }
}

/// Strips the minimum leading whitespace across all non-blank lines.
fn dedent(text: &str) -> String {
    let min_indent = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    text.split('\n')
        .map(|line| {
            if line.len() > min_indent {
                &line[min_indent..]
            } else {
                line
            }
        })
        .join("\n")
}

/// The shared formatting scope for one output document.
///
/// Carries the namespace nesting and the `using` directives the
/// document needs. Both are headroom for multi-namespace output; the
/// converter currently emits a single flat namespace.
#[derive(Debug, Default)]
pub struct Scope {
    namespaces: Vec<String>,
    usings: BTreeSet<String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters a nested namespace.
    pub fn enter_namespace(&mut self, name: impl Into<String>) {
        self.namespaces.push(name.into());
    }

    /// Leaves the innermost namespace.
    pub fn leave_namespace(&mut self) {
        self.namespaces.pop();
    }

    /// Returns the dotted path of the current namespace nesting.
    pub fn namespace(&self) -> String {
        self.namespaces.iter().join(".")
    }

    /// Records that the document needs a `using` directive.
    pub fn require_using(&mut self, path: &str) {
        self.usings.insert(path.to_owned());
    }

    /// Returns the required `using` directives, sorted.
    pub fn usings(&self) -> impl Iterator<Item = &str> {
        self.usings.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn render(snippet: &Snippet) -> String {
        snippet.render(&Scope::new())
    }

    #[test]
    fn test_stanzas_skip_empty_parts() {
        let snippet = stanzas(["first".into(), "".into(), "second".into()]);
        assert_eq!(render(&snippet), "first\n\nsecond");
    }

    #[test]
    fn test_lines_and_commas() {
        assert_eq!(render(&lines(["a".into(), "b".into()])), "a\nb");
        assert_eq!(render(&commas(["a".into(), "b".into()])), "a,b");
    }

    #[test]
    fn test_statements_terminate_each_part() {
        let snippet = statements(["x: string".into(), "y: boolean".into()]);
        assert_eq!(render(&snippet), "x: string;\ny: boolean;");
    }

    #[test]
    fn test_union_join() {
        let snippet = union(["string".into(), "float64".into()]);
        assert_eq!(render(&snippet), "string | float64");
    }

    #[test]
    fn test_indent_skips_empty_lines() {
        let snippet = indent("a\n\nb", 2);
        assert_eq!(render(&snippet), "    a\n\n    b");
    }

    #[test]
    fn test_template_literal_braces() {
        let snippet = snippet!("{{}}");
        assert_eq!(render(&snippet), "{}");
    }

    #[test]
    fn test_template_mid_line_hole() {
        let snippet = snippet!("alias {} = {};", "Name", "string");
        assert_eq!(render(&snippet), "alias Name = string;");
    }

    #[test]
    fn test_template_reindents_multi_line_holes() {
        let body = snippet!("
            {{
              {}
            }}", statements(["x: float64".into(), "y: float64".into()]));
        assert_eq!(render(&body), "{\n  x: float64;\n  y: float64;\n}");
    }

    #[test]
    fn test_template_nested_three_levels() {
        let inner = snippet!("
            {{
              {}
            }}", statements(["value: string".into()]));
        let field = snippet!("nested: {}", inner);
        let body = snippet!("
            {{
              {}
            }}", statements([field]));
        let outer = snippet!("model Outer {};", body);
        assert_eq!(
            render(&outer),
            indoc::indoc! {"
                model Outer {
                  nested: {
                    value: string;
                  };
                };"}
        );
    }

    #[test]
    fn test_render_is_repeatable() {
        let snippet = snippet!("
            model {} {{
              {}
            }}", "Point", statements(["x: float64".into()]));
        let scope = Scope::new();
        assert_eq!(snippet.render(&scope), snippet.render(&scope));
    }

    #[test]
    fn test_attach_is_idempotent() {
        let snippet = using("TypeSpec.Http", "op read(): void");
        let mut scope = Scope::new();
        snippet.attach(&mut scope);
        snippet.attach(&mut scope);
        assert_eq!(scope.usings().collect::<Vec<_>>(), vec!["TypeSpec.Http"]);
    }

    #[test]
    fn test_scope_namespace_nesting() {
        let mut scope = Scope::new();
        scope.enter_namespace("Api");
        scope.enter_namespace("Models");
        assert_eq!(scope.namespace(), "Api.Models");
        scope.leave_namespace();
        assert_eq!(scope.namespace(), "Api");
    }

    #[test]
    fn test_dedent_ignores_blank_lines() {
        assert_eq!(dedent("  a\n\n    b"), "a\n\n  b");
    }
}
