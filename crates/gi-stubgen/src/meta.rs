//! Metadata node model: the capability-typed view of a GObject-Introspection
//! namespace that a backend adapter must supply.
//!
//! The real girepository FFI is out of scope; adapters translate whatever they
//! read (a typelib, a GIR document, a pre-dumped JSON file) into these nodes.
//! Every node derives `Deserialize` so the shipped JSON adapter is pure data
//! loading, and `Serialize` so schemas can be dumped for diagnostics.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Type references
// ---------------------------------------------------------------------------

/// A `(namespace, name)` pair naming an entity in some namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeTarget {
    pub namespace: String,
    pub name: String,
}

impl TypeTarget {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for TypeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// GI type tags. Mirrors `GITypeTag`, minus tags the stub generator never
/// sees in practice (GValue-internal tags).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    Void,
    Boolean,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    GType,
    Utf8,
    Filename,
    Unichar,
    Array,
    GList,
    GSList,
    GHash,
    Error,
    Interface,
}

impl Tag {
    /// True for tags whose values can never be null at the language level
    /// (used by the property nullability heuristic).
    pub fn is_never_null(self) -> bool {
        matches!(
            self,
            Tag::Boolean
                | Tag::Int8
                | Tag::UInt8
                | Tag::Int16
                | Tag::UInt16
                | Tag::Int32
                | Tag::UInt32
                | Tag::Int64
                | Tag::UInt64
                | Tag::Float
                | Tag::Double
                | Tag::Utf8
                | Tag::Filename
                | Tag::Unichar
        )
    }
}

/// A type-info node: tag plus the capabilities the mapper needs (pointer-ness,
/// interface target, container parameter types, array length designation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeNode {
    pub tag: Tag,
    #[serde(default)]
    pub is_pointer: bool,
    /// Referenced entity for `Tag::Interface`.
    #[serde(default)]
    pub interface: Option<TypeTarget>,
    /// Element type(s) for container tags (one for arrays/lists, two for hashes).
    #[serde(default)]
    pub params: Vec<TypeNode>,
    /// For sized arrays: index of the argument that carries the element count.
    #[serde(default)]
    pub array_length: Option<usize>,
}

impl TypeNode {
    pub fn simple(tag: Tag) -> Self {
        Self {
            tag,
            is_pointer: false,
            interface: None,
            params: Vec::new(),
            array_length: None,
        }
    }

    pub fn void() -> Self {
        Self::simple(Tag::Void)
    }

    pub fn interface(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            interface: Some(TypeTarget::new(namespace, name)),
            ..Self::simple(Tag::Interface)
        }
    }

    pub fn array_of(element: TypeNode, length: Option<usize>) -> Self {
        Self {
            params: vec![element],
            array_length: length,
            ..Self::simple(Tag::Array)
        }
    }
}

// ---------------------------------------------------------------------------
// Callables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    In,
    Out,
    Inout,
}

/// One raw argument of a callable, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgNode {
    pub name: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(rename = "type")]
    pub ty: TypeNode,
    #[serde(default)]
    pub may_be_null: bool,
    #[serde(default)]
    pub is_optional: bool,
}

/// Function flags. Signals and callback signatures never carry these; the
/// normalizer defaults them all to false for those kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FunctionFlags {
    #[serde(default)]
    pub is_method: bool,
    #[serde(default)]
    pub is_constructor: bool,
    #[serde(default)]
    pub is_getter: bool,
    #[serde(default)]
    pub is_setter: bool,
    #[serde(default)]
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Deprecation {
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// A callable metadata node: function, method, constructor, signal handler or
/// callback signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallableNode {
    pub name: String,
    #[serde(default)]
    pub args: Vec<ArgNode>,
    #[serde(default = "TypeNode::void", rename = "return")]
    pub ret: TypeNode,
    #[serde(default)]
    pub may_return_null: bool,
    /// The native return exists only at the C level (e.g. a `gboolean`
    /// success flag already implied by a GError) and is suppressed.
    #[serde(default)]
    pub skip_return: bool,
    #[serde(default)]
    pub can_throw: bool,
    #[serde(default)]
    pub flags: FunctionFlags,
    #[serde(default)]
    pub deprecated: Deprecation,
}

impl CallableNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            ret: TypeNode::void(),
            may_return_null: false,
            skip_return: false,
            can_throw: false,
            flags: FunctionFlags::default(),
            deprecated: Deprecation::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// `GSignalFlags` bits the assembler decodes.
pub mod signal_flags {
    pub const RUN_FIRST: u32 = 1 << 0;
    pub const RUN_LAST: u32 = 1 << 1;
    pub const RUN_CLEANUP: u32 = 1 << 2;
    pub const NO_RECURSE: u32 = 1 << 3;
    pub const DETAILED: u32 = 1 << 4;
    pub const ACTION: u32 = 1 << 5;
    pub const NO_HOOKS: u32 = 1 << 6;
    pub const DEPRECATED: u32 = 1 << 8;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalNode {
    pub name: String,
    /// Raw `GSignalFlags` bitmask.
    #[serde(default)]
    pub flags: u32,
    pub handler: CallableNode,
}

// ---------------------------------------------------------------------------
// Fields and properties
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldNode {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeNode,
}

/// `GParamFlags` bits the assembler decodes.
pub mod property_flags {
    pub const READABLE: u32 = 1 << 0;
    pub const WRITABLE: u32 = 1 << 1;
    pub const CONSTRUCT: u32 = 1 << 2;
    pub const CONSTRUCT_ONLY: u32 = 1 << 3;
    pub const DEPRECATED: u32 = 1 << 31;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyNode {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeNode,
    /// Raw `GParamFlags` bitmask.
    #[serde(default)]
    pub flags: u32,
    /// Declared default value, when the metadata carries one.
    #[serde(default)]
    pub default: Option<LiteralValue>,
}

// ---------------------------------------------------------------------------
// Objects, structs, interfaces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    Object,
    Struct,
    Interface,
    Union,
}

/// One entry of a type's ordered ancestor chain, closest ancestor first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ancestor {
    pub namespace: String,
    pub name: String,
    /// Internal C-struct layer (instance/class struct plumbing), never a
    /// meaningful base at the language level.
    #[serde(default)]
    pub is_internal: bool,
}

/// A member that exists only on the live language-level type, not in the
/// declared metadata walk (overrides, descriptors, injected helpers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RuntimeMember {
    Constant { name: String, value: LiteralValue },
    Descriptor { name: String },
    Callable { name: String, signature: PySignature },
    Unknown { name: String, type_signature: String },
}

impl RuntimeMember {
    pub fn name(&self) -> &str {
        match self {
            RuntimeMember::Constant { name, .. }
            | RuntimeMember::Descriptor { name }
            | RuntimeMember::Callable { name, .. }
            | RuntimeMember::Unknown { name, .. } => name,
        }
    }
}

/// Lightweight signature of a pure-language callable (no metadata backing).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PySignature {
    #[serde(default)]
    pub params: Vec<PyParam>,
    #[serde(default)]
    pub returns: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyParam {
    pub name: String,
    #[serde(default)]
    pub annotation: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectNode {
    pub name: String,
    pub kind: ObjectKind,
    /// Dotted path of the module the live type is defined in
    /// (e.g. `gi.repository.Gtk`, `gi.overrides.GObject`).
    pub defining_module: String,
    #[serde(default)]
    pub ancestry: Vec<Ancestor>,
    #[serde(default)]
    pub fields: Vec<FieldNode>,
    #[serde(default)]
    pub methods: Vec<CallableNode>,
    #[serde(default)]
    pub properties: Vec<PropertyNode>,
    #[serde(default)]
    pub signals: Vec<SignalNode>,
    /// Runtime-discovered members for the local attribute sweep.
    #[serde(default)]
    pub extra: Vec<RuntimeMember>,
    /// Registered GType name (e.g. `GtkWidget`), when known.
    #[serde(default)]
    pub gtype_name: Option<String>,
    #[serde(default)]
    pub deprecated: Deprecation,
}

// ---------------------------------------------------------------------------
// Enums, flags, constants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnumKind {
    Enum,
    Flags,
}

/// One enum/flags member: raw metadata name plus the escaped-safe variant the
/// backend computed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueNode {
    pub name: String,
    /// Collision-escaped form of `name` (raw name plus a trailing underscore
    /// when it collides with a reserved keyword).
    pub escaped: String,
    pub value: i64,
    #[serde(default)]
    pub is_deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumNode {
    pub name: String,
    pub kind: EnumKind,
    #[serde(default)]
    pub members: Vec<ValueNode>,
    /// Language-level ancestry names (e.g. `["GObject.GEnum", "enum.IntEnum"]`),
    /// used for base selection.
    #[serde(default)]
    pub ancestry: Vec<String>,
    #[serde(default)]
    pub deprecated: Deprecation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantNode {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeNode,
    pub value: LiteralValue,
    #[serde(default)]
    pub deprecated: Deprecation,
}

/// A plain-old-data literal. JSON maps onto this directly (untagged), so the
/// JSON backend and the doc side-table stay schema-free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<LiteralValue>),
    Dict(IndexMap<String, LiteralValue>),
}

impl LiteralValue {
    /// Name of the Python type this literal inhabits.
    pub fn python_type(&self) -> &'static str {
        match self {
            LiteralValue::None => "None",
            LiteralValue::Bool(_) => "bool",
            LiteralValue::Int(_) => "int",
            LiteralValue::Float(_) => "float",
            LiteralValue::Str(_) => "str",
            LiteralValue::List(_) => "list",
            LiteralValue::Dict(_) => "dict",
        }
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A named metadata entity, classified into a closed capability kind.
/// Tagged `entity` on the wire; `kind` is taken by the node payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "kebab-case")]
pub enum Entity {
    Function(CallableNode),
    Callback(CallableNode),
    Object(ObjectNode),
    Enum(EnumNode),
    Constant(ConstantNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Function,
    Callback,
    Object,
    Enum,
    Constant,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Function => "function",
            EntityKind::Callback => "callback",
            EntityKind::Object => "object",
            EntityKind::Enum => "enum",
            EntityKind::Constant => "constant",
        }
    }
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Function(_) => EntityKind::Function,
            Entity::Callback(_) => EntityKind::Callback,
            Entity::Object(_) => EntityKind::Object,
            Entity::Enum(_) => EntityKind::Enum,
            Entity::Constant(_) => EntityKind::Constant,
        }
    }
}

// ---------------------------------------------------------------------------
// Live module surface
// ---------------------------------------------------------------------------

/// What the live module binds under one attribute name, classified up front
/// into a closed tag set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AttrValue {
    /// Backed by a metadata entity. `reported_name` is the name the entity
    /// reports for itself, `module` the dotted path it claims to live in;
    /// either differing from the binding site marks a re-export.
    Introspected { reported_name: String, module: String },
    /// A plain literal value.
    Literal { value: LiteralValue },
    /// A module-level instance of an enum/flags type.
    EnumMember { target: TypeTarget, value: i64 },
    /// A pure-language function with no metadata backing.
    PlainFunction { signature: PySignature },
    /// Nothing above matched; `type_signature` names the concrete runtime type.
    Unclassified { type_signature: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeNode {
    pub name: String,
    pub value: AttrValue,
}

/// One loaded namespace: its public attribute surface plus the entity table
/// behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceNode {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub attributes: Vec<AttributeNode>,
    #[serde(default)]
    pub entities: IndexMap<String, Entity>,
}
