//! Type/tag mapper: converts a metadata type-info node into the normalized
//! type representation, relative to an explicitly passed current namespace.
//!
//! Primitive tags map via a fixed table; containers recurse into their
//! parameter types; INTERFACE resolves through the repository so callback
//! signatures come back as a structured marker instead of a value type.

use crate::meta::{Entity, Tag, TypeNode, TypeTarget};
use crate::records::TypeRef;
use crate::repo::Repository;

/// Result of mapping one type-info node.
#[derive(Debug, Clone, PartialEq)]
pub enum MappedType {
    /// VOID, non-pointer: no value.
    None,
    /// An ordinary value type.
    Value(TypeRef),
    /// The referenced entity is a callback signature; callbacks cannot be
    /// resolved to ordinary values, callers decide how to materialize them.
    Callback(TypeTarget),
    /// Forward-declared or unloaded reference; best-effort name.
    Unresolved(TypeRef),
}

impl MappedType {
    /// Collapse to a `TypeRef`, degrading `None` to Python's `None` type and
    /// callbacks to their qualified name (no local definition implied).
    pub fn into_type_ref(self, current_ns: &str) -> TypeRef {
        match self {
            MappedType::None => TypeRef::local("None"),
            MappedType::Value(t) | MappedType::Unresolved(t) => t,
            MappedType::Callback(target) => {
                TypeRef::new(target.name, relative_namespace(&target.namespace, current_ns))
            }
        }
    }
}

/// `None` when `namespace` is the namespace being rendered.
pub fn relative_namespace(namespace: &str, current_ns: &str) -> Option<String> {
    if namespace == current_ns {
        None
    } else {
        Some(namespace.to_string())
    }
}

/// Map a type-info node to the normalized representation. Pure in
/// `(node, current_ns)` apart from read-only repository lookups.
pub fn to_type_ref(node: &TypeNode, current_ns: &str, repo: &Repository) -> MappedType {
    match node.tag {
        Tag::Void => {
            if node.is_pointer {
                // gpointer: the universal object type.
                MappedType::Value(TypeRef::local("Any"))
            } else {
                MappedType::None
            }
        }
        Tag::Boolean => MappedType::Value(TypeRef::local("bool")),
        Tag::Int8
        | Tag::UInt8
        | Tag::Int16
        | Tag::UInt16
        | Tag::Int32
        | Tag::UInt32
        | Tag::Int64
        | Tag::UInt64 => MappedType::Value(TypeRef::local("int")),
        Tag::Float | Tag::Double => MappedType::Value(TypeRef::local("float")),
        Tag::Utf8 | Tag::Filename | Tag::Unichar => MappedType::Value(TypeRef::local("str")),
        Tag::GType => MappedType::Value(TypeRef::new(
            "Type",
            relative_namespace("GObject", current_ns),
        )),
        Tag::Error => MappedType::Value(TypeRef::new(
            "Error",
            relative_namespace("GLib", current_ns),
        )),
        Tag::Array | Tag::GList | Tag::GSList => {
            let element = element_name(node.params.first(), current_ns, repo);
            MappedType::Value(TypeRef::local(format!("list[{element}]")))
        }
        Tag::GHash => {
            let key = element_name(node.params.first(), current_ns, repo);
            let value = element_name(node.params.get(1), current_ns, repo);
            MappedType::Value(TypeRef::local(format!("dict[{key}, {value}]")))
        }
        Tag::Interface => map_interface(node, current_ns, repo),
    }
}

fn map_interface(node: &TypeNode, current_ns: &str, repo: &Repository) -> MappedType {
    let Some(target) = &node.interface else {
        // No target recorded at all; nothing better than Any.
        return MappedType::Unresolved(TypeRef::local("Any"));
    };

    match repo.find(&target.namespace, &target.name) {
        Some(Entity::Callback(_)) => MappedType::Callback(target.clone()),
        Some(_) => MappedType::Value(TypeRef::new(
            target.name.clone(),
            relative_namespace(&target.namespace, current_ns),
        )),
        None => MappedType::Unresolved(TypeRef::new(
            target.name.clone(),
            relative_namespace(&target.namespace, current_ns),
        )),
    }
}

fn element_name(param: Option<&TypeNode>, current_ns: &str, repo: &Repository) -> String {
    match param {
        None => "Any".to_string(),
        Some(p) => match to_type_ref(p, current_ns, repo) {
            MappedType::None => "Any".to_string(),
            MappedType::Value(t) | MappedType::Unresolved(t) => t.qualified(),
            MappedType::Callback(target) => {
                TypeRef::new(target.name, relative_namespace(&target.namespace, current_ns))
                    .qualified()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{CallableNode, EnumKind, EnumNode, NamespaceNode, ObjectKind, ObjectNode};
    use crate::repo::testing::context_with;
    use crate::repo::Context;
    use indexmap::IndexMap;

    fn ctx_with_gtk() -> Context {
        let mut entities = IndexMap::new();
        entities.insert(
            "Widget".to_string(),
            Entity::Object(ObjectNode {
                name: "Widget".into(),
                kind: ObjectKind::Object,
                defining_module: "gi.repository.Gtk".into(),
                ancestry: vec![],
                fields: vec![],
                methods: vec![],
                properties: vec![],
                signals: vec![],
                extra: vec![],
                gtype_name: Some("GtkWidget".into()),
                deprecated: Default::default(),
            }),
        );
        entities.insert(
            "TickCallback".to_string(),
            Entity::Callback(CallableNode::new("TickCallback")),
        );
        entities.insert(
            "Align".to_string(),
            Entity::Enum(EnumNode {
                name: "Align".into(),
                kind: EnumKind::Enum,
                members: vec![],
                ancestry: vec![],
                deprecated: Default::default(),
            }),
        );
        let mut ctx = context_with(vec![NamespaceNode {
            name: "Gtk".into(),
            version: "4.0".into(),
            attributes: vec![],
            entities,
        }]);
        ctx.repo.require("Gtk", None).unwrap();
        ctx
    }

    #[test]
    fn primitive_table() {
        let ctx = ctx_with_gtk();
        let repo = &ctx.repo;
        let cases = [
            (Tag::Boolean, "bool"),
            (Tag::Int32, "int"),
            (Tag::UInt64, "int"),
            (Tag::Double, "float"),
            (Tag::Utf8, "str"),
            (Tag::Filename, "str"),
        ];
        for (tag, expected) in cases {
            assert_eq!(
                to_type_ref(&TypeNode::simple(tag), "Gtk", repo),
                MappedType::Value(TypeRef::local(expected))
            );
        }
    }

    #[test]
    fn void_maps_to_none_unless_pointer() {
        let ctx = ctx_with_gtk();
        assert_eq!(
            to_type_ref(&TypeNode::void(), "Gtk", &ctx.repo),
            MappedType::None
        );
        let mut ptr = TypeNode::void();
        ptr.is_pointer = true;
        assert_eq!(
            to_type_ref(&ptr, "Gtk", &ctx.repo),
            MappedType::Value(TypeRef::local("Any"))
        );
    }

    #[test]
    fn gtype_is_relative_to_current_namespace() {
        let ctx = ctx_with_gtk();
        assert_eq!(
            to_type_ref(&TypeNode::simple(Tag::GType), "Gtk", &ctx.repo),
            MappedType::Value(TypeRef::new("Type", Some("GObject".into())))
        );
        assert_eq!(
            to_type_ref(&TypeNode::simple(Tag::GType), "GObject", &ctx.repo),
            MappedType::Value(TypeRef::local("Type"))
        );
    }

    #[test]
    fn interface_resolves_local_and_foreign() {
        let ctx = ctx_with_gtk();
        let local = TypeNode::interface("Gtk", "Widget");
        assert_eq!(
            to_type_ref(&local, "Gtk", &ctx.repo),
            MappedType::Value(TypeRef::local("Widget"))
        );
        assert_eq!(
            to_type_ref(&local, "Gdk", &ctx.repo),
            MappedType::Value(TypeRef::new("Widget", Some("Gtk".into())))
        );
    }

    #[test]
    fn callback_interface_is_a_marker() {
        let ctx = ctx_with_gtk();
        let node = TypeNode::interface("Gtk", "TickCallback");
        assert_eq!(
            to_type_ref(&node, "Gtk", &ctx.repo),
            MappedType::Callback(TypeTarget::new("Gtk", "TickCallback"))
        );
        // Enums and objects are not callbacks.
        let node = TypeNode::interface("Gtk", "Align");
        assert!(matches!(
            to_type_ref(&node, "Gtk", &ctx.repo),
            MappedType::Value(_)
        ));
    }

    #[test]
    fn unresolved_interface_keeps_best_effort_name() {
        let ctx = ctx_with_gtk();
        let node = TypeNode::interface("Gdk", "Surface");
        assert_eq!(
            to_type_ref(&node, "Gtk", &ctx.repo),
            MappedType::Unresolved(TypeRef::new("Surface", Some("Gdk".into())))
        );
    }

    #[test]
    fn containers_recurse() {
        let ctx = ctx_with_gtk();
        let arr = TypeNode::array_of(TypeNode::simple(Tag::Utf8), None);
        assert_eq!(
            to_type_ref(&arr, "Gtk", &ctx.repo),
            MappedType::Value(TypeRef::local("list[str]"))
        );

        let mut hash = TypeNode::simple(Tag::GHash);
        hash.params = vec![
            TypeNode::simple(Tag::Utf8),
            TypeNode::interface("Gtk", "Widget"),
        ];
        assert_eq!(
            to_type_ref(&hash, "Gtk", &ctx.repo),
            MappedType::Value(TypeRef::local("dict[str, Widget]"))
        );
        assert_eq!(
            to_type_ref(&hash, "Gdk", &ctx.repo),
            MappedType::Value(TypeRef::local("dict[str, Gtk.Widget]"))
        );
    }
}
