//! Normalized schema records: the immutable value tree one walk produces for
//! one namespace, consumed once by the renderer.
//!
//! Each record is owned by exactly one parent; callbacks are the one
//! exception, stored once in the module-level flat collection and referenced
//! elsewhere by name only.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Result, StubError};
use crate::meta::Direction;

// ---------------------------------------------------------------------------
// Type references
// ---------------------------------------------------------------------------

/// Normalized type reference. `namespace` is `None` when the type is local to
/// the namespace being rendered; container types carry their fully rendered
/// parameterized name (e.g. `list[str]`) with no namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub nullable: bool,
}

impl TypeRef {
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
            nullable: false,
        }
    }

    pub fn local(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Qualified name without the nullability wrapper.
    pub fn qualified(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Externally visible result shape of a callable: the native return combined
/// with its OUT/INOUT arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "shape", content = "types")]
pub enum ReturnShape {
    None,
    Single(TypeRef),
    Tuple(Vec<TypeRef>),
}

impl ReturnShape {
    pub fn from_parts(mut parts: Vec<TypeRef>) -> Self {
        match parts.len() {
            0 => ReturnShape::None,
            1 => ReturnShape::Single(parts.remove(0)),
            _ => ReturnShape::Tuple(parts),
        }
    }
}

// ---------------------------------------------------------------------------
// Callables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentRecord {
    pub name: String,
    pub direction: Direction,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    pub is_optional: bool,
    pub is_callback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_length_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_repr: Option<String>,
    /// Advisory note (rename record, unresolved type, foreign callback).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ArgumentRecord {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            direction: Direction::In,
            ty,
            is_optional: false,
            is_callback: false,
            array_length_index: None,
            default_repr: None,
            note: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallableKind {
    Function,
    Signal,
    Callback,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DeprecationRecord {
    pub is_deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallableRecord {
    pub name: String,
    pub namespace: String,
    pub kind: CallableKind,
    pub arguments: Vec<ArgumentRecord>,
    #[serde(rename = "return")]
    pub ret: ReturnShape,
    pub may_return_null: bool,
    pub can_throw: bool,
    pub is_constructor: bool,
    pub is_getter: bool,
    pub is_setter: bool,
    pub is_method: bool,
    pub is_async: bool,
    pub deprecated: DeprecationRecord,
    /// Advisory notes surfaced next to the definition in the artifact.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl CallableRecord {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, kind: CallableKind) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            kind,
            arguments: Vec::new(),
            ret: ReturnShape::None,
            may_return_null: false,
            can_throw: false,
            is_constructor: false,
            is_getter: false,
            is_setter: false,
            is_method: false,
            is_async: false,
            deprecated: DeprecationRecord::default(),
            notes: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    pub readable: bool,
    pub writable: bool,
    pub construct: bool,
    pub construct_only: bool,
    pub is_deprecated: bool,
}

/// Signal run/behavior flags, each an independent bit of `GSignalFlags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SignalFlagSet {
    pub run_first: bool,
    pub run_last: bool,
    pub run_cleanup: bool,
    pub no_recurse: bool,
    pub detailed: bool,
    pub action: bool,
    pub no_hooks: bool,
    pub is_deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalRecord {
    /// Raw signal name (never sanitized: signal names are string keys, not
    /// Python identifiers).
    pub name: String,
    pub flags: SignalFlagSet,
    pub handler: CallableRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassRecord {
    pub namespace: String,
    pub name: String,
    pub base: TypeRef,
    pub fields: Vec<FieldRecord>,
    pub properties: Vec<PropertyRecord>,
    pub methods: Vec<CallableRecord>,
    pub signals: Vec<SignalRecord>,
    /// Synthesized property-based constructor; `None` when an explicit
    /// constructor already exists among `methods`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init: Option<CallableRecord>,
    pub deprecated: DeprecationRecord,
}

// ---------------------------------------------------------------------------
// Enums, constants, aliases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumMemberRecord {
    pub name: String,
    pub value: i64,
    pub is_deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumRecord {
    pub namespace: String,
    pub name: String,
    pub kind: crate::meta::EnumKind,
    pub base: TypeRef,
    pub members: Vec<EnumMemberRecord>,
    pub deprecated: DeprecationRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstantRecord {
    pub namespace: String,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    pub literal: String,
    pub is_deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasRecord {
    pub name: String,
    /// `None` marks a "does not exist" placeholder (target lives in an
    /// internal module with no importable counterpart).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<AliasTarget>,
    pub reason: String,
    /// The renderer replaces the literal target with a hand-authored
    /// substitute definition.
    pub substitute: bool,
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallbackRecord {
    pub name: String,
    pub signature: CallableRecord,
    pub origins: BTreeSet<String>,
}

/// Accumulator for callback types discovered while walking arguments, fields
/// and vfuncs. Deduplicates by name; two sites referencing the same name must
/// agree on signature or the whole run is aborted.
#[derive(Debug, Default)]
pub struct CallbackSink {
    callbacks: IndexMap<String, CallbackRecord>,
}

impl CallbackSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, signature: CallableRecord, origin: impl Into<String>) -> Result<()> {
        let origin = origin.into();
        let name = signature.name.clone();
        match self.callbacks.get_mut(&name) {
            Some(existing) => {
                if existing.signature != signature {
                    let first = existing
                        .origins
                        .iter()
                        .next()
                        .cloned()
                        .unwrap_or_else(|| "<unknown>".into());
                    return Err(StubError::CallbackMismatch {
                        name,
                        first_origin: first,
                        second_origin: origin,
                    });
                }
                existing.origins.insert(origin);
            }
            None => {
                let mut origins = BTreeSet::new();
                origins.insert(origin);
                self.callbacks.insert(
                    name.clone(),
                    CallbackRecord {
                        name,
                        signature,
                        origins,
                    },
                );
            }
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    /// Record one more origin site for an already collected callback.
    pub fn add_origin(&mut self, name: &str, origin: impl Into<String>) {
        if let Some(existing) = self.callbacks.get_mut(name) {
            existing.origins.insert(origin.into());
        }
    }

    pub fn into_map(self) -> IndexMap<String, CallbackRecord> {
        self.callbacks
    }
}

// ---------------------------------------------------------------------------
// Module schema
// ---------------------------------------------------------------------------

/// Top-level aggregate for one namespace; built once by the walker, consumed
/// once by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSchema {
    pub namespace: String,
    pub version: String,
    pub aliases: Vec<AliasRecord>,
    pub enums: Vec<EnumRecord>,
    pub constants: Vec<ConstantRecord>,
    pub functions: Vec<CallableRecord>,
    pub classes: Vec<ClassRecord>,
    pub callbacks: IndexMap<String, CallbackRecord>,
}

impl ModuleSchema {
    pub fn new(namespace: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            version: version.into(),
            aliases: Vec::new(),
            enums: Vec::new(),
            constants: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            callbacks: IndexMap::new(),
        }
    }
}
