//! The resolved-type surface this crate consumes.
//!
//! Type resolution happens in an external front-end; it hands this
//! crate a *snapshot*: an interned table of resolved type nodes plus
//! the declarations of each source unit, with every cross-reference
//! expressed as an index into the table. Two handles compare equal only
//! when they point at the same table entry, so identity comparison
//! distinguishes structurally identical types declared in different
//! places.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::SnapshotError;

/// A handle to a resolved type in a [`TypeStore`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(transparent)]
pub struct TypeId(usize);

impl TypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A resolved type node.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeNode {
    String,
    Number,
    Boolean,
    Array {
        element: TypeId,
    },
    Tuple {
        elements: Vec<TypeId>,
    },
    Object {
        #[serde(default)]
        symbol: Option<String>,
        #[serde(default, rename = "typeArguments")]
        type_arguments: Vec<TypeId>,
        #[serde(default)]
        properties: Vec<Property>,
    },
    Union {
        members: Vec<TypeId>,
    },
    Intersection {
        members: Vec<TypeId>,
    },
    TemplateLiteral {
        #[serde(default)]
        head: String,
        #[serde(default)]
        spans: Vec<TemplateSpan>,
    },
    /// The front-end's canonical textual rendering of a type shape the
    /// conversion rules don't cover (mapped, conditional, `keyof`,
    /// indexed access, literals).
    Opaque {
        display: String,
    },
}

impl TypeNode {
    /// Visits every type handle this node holds.
    fn visit_refs(&mut self, f: &mut impl FnMut(&mut TypeId)) {
        match self {
            Self::String | Self::Number | Self::Boolean | Self::Opaque { .. } => {}
            Self::Array { element } => f(element),
            Self::Tuple { elements } => elements.iter_mut().for_each(f),
            Self::Object {
                type_arguments,
                properties,
                ..
            } => {
                type_arguments.iter_mut().for_each(&mut *f);
                for property in properties {
                    f(&mut property.ty);
                }
            }
            Self::Union { members } | Self::Intersection { members } => {
                members.iter_mut().for_each(f);
            }
            Self::TemplateLiteral { spans, .. } => {
                for span in spans {
                    f(&mut span.ty);
                }
            }
        }
    }
}

/// One interpolated slot of a template-literal type: the interpolated
/// type followed by the literal text after it.
#[derive(Clone, Debug, Deserialize)]
pub struct TemplateSpan {
    #[serde(rename = "type")]
    pub ty: TypeId,
    #[serde(default)]
    pub literal: String,
}

/// A named property of an object type.
#[derive(Clone, Debug, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeId,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub docs: Docs,
}

/// Structured documentation attached to a declaration or property.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Docs {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<DocTag>,
}

impl Docs {
    /// Returns the first tag with the given name.
    pub fn tag(&self, name: &str) -> Option<&DocTag> {
        self.tags.iter().find(|tag| tag.name == name)
    }

    /// Returns the free-text description, if it is non-empty.
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// A named documentation tag with an optional text payload.
#[derive(Clone, Debug, Deserialize)]
pub struct DocTag {
    pub name: String,
    #[serde(default)]
    pub text: String,
}

/// A type declaration within a source unit.
#[derive(Clone, Debug, Deserialize)]
pub struct Declaration {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeId,
    /// The number of type parameters on the original declaration.
    #[serde(default, rename = "typeParams")]
    pub type_params: usize,
    #[serde(default)]
    pub docs: Docs,
}

/// The declarations of a single source unit.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Unit {
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

/// One snapshot file produced by the resolver front-end.
#[derive(Debug, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub types: Vec<TypeNode>,
    #[serde(default)]
    pub units: IndexMap<String, Unit>,
}

impl Snapshot {
    /// Parses a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let result = serde_path_to_error::deserialize(&mut deserializer)?;
        Ok(result)
    }

    /// Parses a snapshot from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SnapshotError> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml);
        let result = serde_path_to_error::deserialize(deserializer)?;
        Ok(result)
    }

    /// Shifts every type handle by `base`, for merging snapshots into
    /// one shared table.
    fn rebase(&mut self, base: usize) {
        let mut shift = |id: &mut TypeId| id.0 += base;
        for node in &mut self.types {
            node.visit_refs(&mut shift);
        }
        for unit in self.units.values_mut() {
            for declaration in &mut unit.declarations {
                shift(&mut declaration.ty);
            }
        }
    }
}

/// The interned table of resolved type nodes.
#[derive(Debug, Default)]
pub struct TypeStore {
    nodes: Vec<TypeNode>,
}

impl TypeStore {
    /// Adds a node and returns its handle. Nodes are never deduplicated;
    /// each call mints a distinct identity.
    pub fn push(&mut self, node: TypeNode) -> TypeId {
        let id = TypeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Returns the node behind a handle.
    pub fn node(&self, id: TypeId) -> &TypeNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A resolved project: one type table shared by all source units.
#[derive(Debug, Default)]
pub struct Project {
    store: TypeStore,
    units: IndexMap<String, Unit>,
}

impl Project {
    /// Parses a project from a single JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Self::from_snapshots([Snapshot::from_json(json)?])
    }

    /// Parses a project from a single YAML snapshot.
    pub fn from_yaml(yaml: &str) -> Result<Self, SnapshotError> {
        Self::from_snapshots([Snapshot::from_yaml(yaml)?])
    }

    /// Merges snapshots into one project. Units keep their input order;
    /// each snapshot's type handles are rebased onto the shared table.
    pub fn from_snapshots(
        snapshots: impl IntoIterator<Item = Snapshot>,
    ) -> Result<Self, SnapshotError> {
        let mut store = TypeStore::default();
        let mut units = IndexMap::new();
        for mut snapshot in snapshots {
            snapshot.rebase(store.len());
            store.nodes.extend(snapshot.types);
            units.extend(snapshot.units);
        }
        Self::from_parts(store, units)
    }

    /// Builds a project directly from a type table and units, the entry
    /// point for resolver front-ends linked into the same process.
    pub fn from_parts(
        mut store: TypeStore,
        units: IndexMap<String, Unit>,
    ) -> Result<Self, SnapshotError> {
        let len = store.len();
        let mut bad = None;
        let mut check = |id: TypeId| {
            if id.0 >= len && bad.is_none() {
                bad = Some(id.0);
            }
        };
        for node in &mut store.nodes {
            node.visit_refs(&mut |id| check(*id));
        }
        for unit in units.values() {
            for declaration in &unit.declarations {
                check(declaration.ty);
            }
        }
        match bad {
            Some(index) => Err(SnapshotError::BadTypeRef { index, len }),
            None => Ok(Self { store, units }),
        }
    }

    /// Returns the shared type table.
    pub fn store(&self) -> &TypeStore {
        &self.store
    }

    /// Returns the unit with the given name.
    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.units.get(name)
    }

    /// Returns all units, in input order.
    pub fn units(&self) -> impl Iterator<Item = (&str, &Unit)> {
        self.units.iter().map(|(name, unit)| (name.as_str(), unit))
    }
}
