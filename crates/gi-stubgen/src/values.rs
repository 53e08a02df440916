//! Enum/flag and constant normalization.
//!
//! Derives canonical uppercase member names (collision-safe, keep-first on
//! duplicates), selects the enum/flags base type from the live ancestry, and
//! renders constant literals with build-machine paths redacted.

use std::path::Path;

use crate::ident;
use crate::mapper::{relative_namespace, to_type_ref};
use crate::meta::{EnumKind, EnumNode, LiteralValue, TypeTarget, ValueNode};
use crate::records::{ConstantRecord, DeprecationRecord, EnumMemberRecord, EnumRecord, TypeRef};
use crate::repo::Repository;

// ---------------------------------------------------------------------------
// Enums / flags
// ---------------------------------------------------------------------------

pub fn enum_record(node: &EnumNode, current_ns: &str) -> EnumRecord {
    EnumRecord {
        namespace: current_ns.to_string(),
        name: node.name.clone(),
        kind: node.kind,
        base: base_for(node, current_ns),
        members: enum_members(node),
        deprecated: DeprecationRecord {
            is_deprecated: node.deprecated.is_deprecated,
            message: node.deprecated.message.clone(),
        },
    }
}

/// Canonical member name for one enum/flags value.
///
/// The backend supplies both the raw name and its keyword-escaped form. In
/// member position a keyword-shaped name is legal, so when the escape exists
/// only because of a keyword collision the raw form wins; call-argument
/// positions never get this leniency. Invalid characters are substituted
/// before uppercasing.
pub fn member_name(value: &ValueNode) -> String {
    let base = if value.escaped == format!("{}_", value.name) && ident::is_keyword(&value.name) {
        value.name.as_str()
    } else {
        value.escaped.as_str()
    };

    let mut out: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out.to_uppercase()
}

/// Members with final names deduplicated: the first occurrence of a colliding
/// name wins, later ones are dropped with a warning.
pub fn enum_members(node: &EnumNode) -> Vec<EnumMemberRecord> {
    let mut seen: Vec<String> = Vec::new();
    let mut members = Vec::new();
    for value in &node.members {
        let name = member_name(value);
        if seen.contains(&name) {
            tracing::warn!(
                enum_name = %node.name,
                member = %name,
                value = value.value,
                "duplicate enum member name after sanitization; dropped"
            );
            continue;
        }
        seen.push(name.clone());
        members.push(EnumMemberRecord {
            name,
            value: value.value,
            is_deprecated: value.is_deprecated,
        });
    }
    members
}

/// The richer GObject base when the live ancestry carries it, the plain
/// integer enum/flag base otherwise.
fn base_for(node: &EnumNode, current_ns: &str) -> TypeRef {
    let (rich, plain) = match node.kind {
        EnumKind::Enum => ("GObject.GEnum", "IntEnum"),
        EnumKind::Flags => ("GObject.GFlags", "IntFlag"),
    };
    if node.ancestry.iter().any(|a| a == rich) {
        let name = rich.rsplit('.').next().unwrap_or(rich);
        TypeRef::new(name, relative_namespace("GObject", current_ns))
    } else {
        TypeRef::local(plain)
    }
}

/// Qualified member reference for a raw value, when one can be derived.
/// Flag combinations and defaults with no matching member yield `None`.
pub fn member_ref(node: &EnumNode, value: i64) -> Option<String> {
    let member = node.members.iter().find(|m| m.value == value)?;
    Some(format!("{}.{}", node.name, member_name(member)))
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// A plain-old-data module constant.
pub fn constant_record(
    bound_name: &str,
    ty: &crate::meta::TypeNode,
    value: &LiteralValue,
    is_deprecated: bool,
    current_ns: &str,
    repo: &Repository,
) -> ConstantRecord {
    ConstantRecord {
        namespace: current_ns.to_string(),
        name: bound_name.to_string(),
        ty: to_type_ref(ty, current_ns, repo).into_type_ref(current_ns),
        literal: redacted_repr(value),
        is_deprecated,
    }
}

/// A module-level literal with no metadata node: the type is inferred from
/// the literal itself.
pub fn literal_constant(bound_name: &str, value: &LiteralValue, current_ns: &str) -> ConstantRecord {
    ConstantRecord {
        namespace: current_ns.to_string(),
        name: bound_name.to_string(),
        ty: TypeRef::local(value.python_type()),
        literal: redacted_repr(value),
        is_deprecated: false,
    }
}

/// A module-level enum/flags *instance*: rendered as a qualified member
/// reference when a member name can be derived, a raw value-construction
/// expression otherwise.
pub fn enum_member_constant(
    bound_name: &str,
    target: &TypeTarget,
    value: i64,
    current_ns: &str,
    repo: &Repository,
) -> ConstantRecord {
    let type_ref = TypeRef::new(
        target.name.clone(),
        relative_namespace(&target.namespace, current_ns),
    );
    let prefix = type_ref.qualified();

    let literal = match repo.find(&target.namespace, &target.name) {
        Some(crate::meta::Entity::Enum(node)) => match member_ref(node, value) {
            Some(member) => {
                // member_ref renders "Type.MEMBER"; qualify with the
                // namespace prefix where needed.
                match &type_ref.namespace {
                    Some(ns) => format!("{ns}.{member}"),
                    None => member,
                }
            }
            None => format!("{prefix}({value})"),
        },
        _ => format!("{prefix}({value})"),
    };

    ConstantRecord {
        namespace: current_ns.to_string(),
        name: bound_name.to_string(),
        ty: type_ref,
        literal,
        is_deprecated: false,
    }
}

/// Python literal representation with sensitive values redacted: absolute
/// filesystem paths that exist on the build machine are elided.
pub fn redacted_repr(value: &LiteralValue) -> String {
    match value {
        LiteralValue::None => "None".to_string(),
        LiteralValue::Bool(true) => "True".to_string(),
        LiteralValue::Bool(false) => "False".to_string(),
        LiteralValue::Int(n) => n.to_string(),
        LiteralValue::Float(f) => {
            if f.fract() == 0.0 && f.is_finite() {
                format!("{f:.1}")
            } else {
                format!("{f}")
            }
        }
        LiteralValue::Str(s) => {
            if s.starts_with('/') && Path::new(s).exists() {
                "'...'".to_string()
            } else {
                format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
            }
        }
        LiteralValue::List(items) => {
            let rendered: Vec<String> = items.iter().map(redacted_repr).collect();
            format!("[{}]", rendered.join(", "))
        }
        LiteralValue::Dict(map) => {
            let rendered: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("'{k}': {}", redacted_repr(v)))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
    }
}
