//! Class/struct assembler.
//!
//! Merges the declared metadata view of a type (fields, properties, methods,
//! signals) with its runtime-only members (overrides, descriptors, injected
//! helpers), synthesizes the property-based constructor, and resolves the
//! single most appropriate base type under namespace-shadowing rules.

use crate::callable::{materialize_callback, normalize_callable, normalize_py_callable};
use crate::error::Result;
use crate::ident;
use crate::mapper::{MappedType, relative_namespace, to_type_ref};
use crate::meta::{
    Entity, LiteralValue, ObjectNode, PropertyNode, RuntimeMember, Tag, property_flags,
    signal_flags,
};
use crate::overrides;
use crate::records::{
    ArgumentRecord, CallableKind, CallableRecord, CallbackSink, ClassRecord, DeprecationRecord,
    FieldRecord, PropertyRecord, ReturnShape, SignalFlagSet, SignalRecord, TypeRef,
};
use crate::repo::Repository;
use crate::values;

/// Struct-linkage field names that exist for C layout, not for users.
const INTERNAL_FIELDS: &[&str] = &[
    "parent",
    "parent_instance",
    "parent_class",
    "priv",
    "g_type_instance",
];

/// Assemble one class/struct/interface. Returns `None` when the type is not
/// local to `current_ns` (foreign re-exports are the alias resolver's job).
pub fn assemble_class(
    obj: &ObjectNode,
    current_ns: &str,
    repo: &Repository,
    sink: &mut CallbackSink,
) -> Result<Option<ClassRecord>> {
    let module_segment = obj
        .defining_module
        .rsplit('.')
        .next()
        .unwrap_or(&obj.defining_module);
    if !module_segment.eq_ignore_ascii_case(current_ns) {
        return Ok(None);
    }

    let mut class = ClassRecord {
        namespace: current_ns.to_string(),
        name: obj.name.clone(),
        base: resolve_base(obj, current_ns),
        fields: Vec::new(),
        properties: Vec::new(),
        methods: Vec::new(),
        signals: Vec::new(),
        init: None,
        deprecated: DeprecationRecord {
            is_deprecated: obj.deprecated.is_deprecated,
            message: obj.deprecated.message.clone(),
        },
    };

    // Methods first: they win name collisions against fields.
    for method in &obj.methods {
        let origin = format!("{current_ns}.{}.{}", obj.name, method.name);
        let mut record =
            normalize_callable(method, CallableKind::Function, current_ns, &origin, repo, sink)?;
        if record.name == "connect" {
            record.notes.push(
                "shadows the generic signal connect; use GObject.Object.connect for signal \
                 subscription"
                    .to_string(),
            );
        }
        class.methods.push(record);
    }

    assemble_fields(obj, &mut class, current_ns, repo, sink)?;
    assemble_properties(obj, &mut class, current_ns, repo);
    assemble_signals(obj, &mut class, current_ns, repo, sink)?;
    runtime_sweep(obj, &mut class, current_ns);

    let has_explicit_ctor = class
        .methods
        .iter()
        .any(|m| m.is_constructor || m.name == "__init__");
    if !has_explicit_ctor {
        class.init = Some(synthesize_init(obj, current_ns, repo));
    }

    overrides::apply(&mut class);
    Ok(Some(class))
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

fn assemble_fields(
    obj: &ObjectNode,
    class: &mut ClassRecord,
    current_ns: &str,
    repo: &Repository,
    sink: &mut CallbackSink,
) -> Result<()> {
    for field in &obj.fields {
        if field.name.starts_with('_') || INTERNAL_FIELDS.contains(&field.name.as_str()) {
            continue;
        }
        if class.methods.iter().any(|m| m.name == field.name) {
            // Methods win the name.
            continue;
        }
        if field.ty.tag == Tag::Void {
            continue;
        }

        match to_type_ref(&field.ty, current_ns, repo) {
            MappedType::Callback(target) => {
                // Callback-typed fields are not exposable as data, but a
                // same-namespace callback still gets its definition emitted.
                if target.namespace == current_ns {
                    let origin = format!("{current_ns}.{}.{}", obj.name, field.name);
                    materialize_callback(&target, current_ns, &origin, repo, sink)?;
                }
                continue;
            }
            MappedType::None => continue,
            MappedType::Value(ty) | MappedType::Unresolved(ty) => {
                let (name, note) = ident::sanitize(&field.name)?;
                class.fields.push(FieldRecord {
                    name,
                    ty,
                    read_only: false,
                    note,
                });
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn assemble_properties(
    obj: &ObjectNode,
    class: &mut ClassRecord,
    current_ns: &str,
    repo: &Repository,
) {
    for prop in &obj.properties {
        let Ok((name, _)) = ident::sanitize(&prop.name) else {
            tracing::warn!(class = %obj.name, "property with empty name skipped");
            continue;
        };
        class.properties.push(PropertyRecord {
            name,
            ty: property_type(prop, current_ns, repo),
            readable: prop.flags & property_flags::READABLE != 0,
            writable: prop.flags & property_flags::WRITABLE != 0,
            construct: prop.flags & property_flags::CONSTRUCT != 0,
            construct_only: prop.flags & property_flags::CONSTRUCT_ONLY != 0,
            is_deprecated: prop.flags & property_flags::DEPRECATED != 0,
        });
    }
}

/// Property type with the nullability heuristic: primitive tags are never
/// null; anything else is nullable absent more precise metadata.
fn property_type(prop: &PropertyNode, current_ns: &str, repo: &Repository) -> TypeRef {
    let nullable = !prop.ty.tag.is_never_null();
    resolve_property_type(prop, current_ns, repo).with_nullable(nullable)
}

/// Resolve a property's concrete type, with the exhaustive fallback for
/// types registered in the metadata system but never loaded until first use:
/// first by GType name, then by a name-guessing heuristic against the owning
/// namespace.
fn resolve_property_type(prop: &PropertyNode, current_ns: &str, repo: &Repository) -> TypeRef {
    let mapped = to_type_ref(&prop.ty, current_ns, repo);
    let MappedType::Unresolved(best_effort) = mapped else {
        return mapped.into_type_ref(current_ns);
    };
    let Some(target) = &prop.ty.interface else {
        return best_effort;
    };

    // GType-name scan across loaded namespaces.
    for ns in repo.loaded() {
        for (name, entity) in &ns.entities {
            if let Entity::Object(node) = entity {
                if node.gtype_name.as_deref() == Some(target.name.as_str()) {
                    return TypeRef::new(name.clone(), relative_namespace(&ns.name, current_ns));
                }
            }
        }
    }

    // Name guess: a GType-style name often carries the namespace as prefix
    // (GtkWidget -> Gtk.Widget).
    let lowered = target.name.to_ascii_lowercase();
    let prefix = current_ns.to_ascii_lowercase();
    if let Some(stripped) = lowered.strip_prefix(&prefix) {
        if !stripped.is_empty() {
            let guessed = &target.name[current_ns.len()..];
            if repo.find(current_ns, guessed).is_some() {
                return TypeRef::local(guessed);
            }
        }
    }

    best_effort
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

fn assemble_signals(
    obj: &ObjectNode,
    class: &mut ClassRecord,
    current_ns: &str,
    repo: &Repository,
    sink: &mut CallbackSink,
) -> Result<()> {
    // A method literally named "connect" shadows signal access at the
    // language level; no signal surface is emitted at all.
    if class.methods.iter().any(|m| m.name == "connect") {
        return Ok(());
    }

    for signal in &obj.signals {
        let origin = format!("{current_ns}.{}::{}", obj.name, signal.name);
        let mut handler = normalize_callable(
            &signal.handler,
            CallableKind::Signal,
            current_ns,
            &origin,
            repo,
            sink,
        )?;
        handler.arguments.insert(
            0,
            ArgumentRecord::new("self", TypeRef::local(obj.name.clone())),
        );
        class.signals.push(SignalRecord {
            name: signal.name.clone(),
            flags: decode_signal_flags(signal.flags),
            handler,
        });
    }

    // One companion property-changed signal per readable/writable property.
    for prop in &obj.properties {
        let readable = prop.flags & property_flags::READABLE != 0;
        let writable = prop.flags & property_flags::WRITABLE != 0;
        if !readable && !writable {
            continue;
        }
        let mut handler = CallableRecord::new(
            format!("notify::{}", prop.name),
            current_ns,
            CallableKind::Signal,
        );
        handler.arguments = vec![
            ArgumentRecord::new("self", TypeRef::local(obj.name.clone())),
            ArgumentRecord::new(
                "pspec",
                TypeRef::new("ParamSpec", relative_namespace("GObject", current_ns)),
            ),
        ];
        class.signals.push(SignalRecord {
            name: format!("notify::{}", prop.name),
            flags: SignalFlagSet {
                run_first: true,
                ..SignalFlagSet::default()
            },
            handler,
        });
    }

    Ok(())
}

fn decode_signal_flags(bits: u32) -> SignalFlagSet {
    SignalFlagSet {
        run_first: bits & signal_flags::RUN_FIRST != 0,
        run_last: bits & signal_flags::RUN_LAST != 0,
        run_cleanup: bits & signal_flags::RUN_CLEANUP != 0,
        no_recurse: bits & signal_flags::NO_RECURSE != 0,
        detailed: bits & signal_flags::DETAILED != 0,
        action: bits & signal_flags::ACTION != 0,
        no_hooks: bits & signal_flags::NO_HOOKS != 0,
        is_deprecated: bits & signal_flags::DEPRECATED != 0,
    }
}

// ---------------------------------------------------------------------------
// Runtime-discovered members
// ---------------------------------------------------------------------------

/// Fold in members that exist only on the live type object. Failures here
/// are logged and skipped, never fatal to the whole class.
fn runtime_sweep(obj: &ObjectNode, class: &mut ClassRecord, current_ns: &str) {
    for member in &obj.extra {
        if let Err(e) = sweep_member(member, class, current_ns) {
            tracing::warn!(
                class = %obj.name,
                member = member.name(),
                error = %e,
                "attribute sweep failed; member skipped"
            );
        }
    }
}

fn sweep_member(member: &RuntimeMember, class: &mut ClassRecord, current_ns: &str) -> Result<()> {
    let already_known = |name: &str| {
        class.methods.iter().any(|m| m.name == name)
            || class.fields.iter().any(|f| f.name == name)
            || class.properties.iter().any(|p| p.name == name)
    };

    match member {
        RuntimeMember::Constant { name, value } => {
            let (name, note) = ident::sanitize(name)?;
            if already_known(&name) {
                return Ok(());
            }
            class.fields.push(FieldRecord {
                name,
                ty: literal_type(value),
                read_only: true,
                note,
            });
        }
        RuntimeMember::Descriptor { name } => {
            let (name, note) = ident::sanitize(name)?;
            if already_known(&name) {
                return Ok(());
            }
            // No further metadata exists for a bare descriptor.
            class.fields.push(FieldRecord {
                name,
                ty: TypeRef::local("Any"),
                read_only: true,
                note,
            });
        }
        RuntimeMember::Callable { name, signature } => {
            let (safe_name, _) = ident::sanitize(name)?;
            if let Some(existing) = class.methods.iter_mut().find(|m| m.name == safe_name) {
                existing
                    .notes
                    .push("overridden by a language-level implementation".to_string());
                return Ok(());
            }
            class
                .methods
                .push(normalize_py_callable(name, signature, current_ns)?);
        }
        RuntimeMember::Unknown {
            name,
            type_signature,
        } => {
            tracing::debug!(
                class = %class.name,
                member = %name,
                runtime_type = %type_signature,
                "unclassified extra attribute"
            );
        }
    }
    Ok(())
}

fn literal_type(value: &LiteralValue) -> TypeRef {
    TypeRef::local(value.python_type())
}

// ---------------------------------------------------------------------------
// Synthesized constructor
// ---------------------------------------------------------------------------

/// Property-based `__init__`: every writable-or-construct-time property
/// becomes an optional keyword parameter, deduplicated by name and sorted.
fn synthesize_init(obj: &ObjectNode, current_ns: &str, repo: &Repository) -> CallableRecord {
    let mut init = CallableRecord::new("__init__", current_ns, CallableKind::Function);
    init.is_method = true;
    init.is_constructor = true;
    init.ret = ReturnShape::None;

    let mut params: Vec<(String, &PropertyNode)> = Vec::new();
    for prop in &obj.properties {
        let settable = prop.flags
            & (property_flags::WRITABLE | property_flags::CONSTRUCT | property_flags::CONSTRUCT_ONLY)
            != 0;
        if !settable {
            continue;
        }
        let Ok((name, _)) = ident::sanitize(&prop.name) else {
            continue;
        };
        if params.iter().any(|(existing, _)| *existing == name) {
            continue;
        }
        params.push((name, prop));
    }
    params.sort_by(|(a, _), (b, _)| a.cmp(b));

    for (name, prop) in params {
        let mut arg = ArgumentRecord::new(name, property_type(prop, current_ns, repo));
        arg.is_optional = true;
        arg.default_repr = Some(init_default(prop, current_ns, repo));
        init.arguments.push(arg);
    }

    init
}

/// Default expression for one constructor parameter. Enum/flag-typed
/// properties render a qualified member reference when one can be derived
/// (falling back to the raw integer), everything else gets an ellipsis or
/// its declared literal.
fn init_default(prop: &PropertyNode, current_ns: &str, repo: &Repository) -> String {
    if let Some(target) = &prop.ty.interface {
        if let Some(Entity::Enum(node)) = repo.find(&target.namespace, &target.name) {
            if let Some(LiteralValue::Int(v)) = &prop.default {
                return match values::member_ref(node, *v) {
                    Some(member) => match relative_namespace(&target.namespace, current_ns) {
                        Some(ns) => format!("{ns}.{member}"),
                        None => member,
                    },
                    None => v.to_string(),
                };
            }
        }
    }
    match &prop.default {
        Some(value) => values::redacted_repr(value),
        None => "...".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Base resolution
// ---------------------------------------------------------------------------

/// Walk the ordered ancestor chain: internal C-struct layers are skipped, a
/// same-name/same-namespace entry is a language-level shadow of this very
/// type and skipped too. The first survivor is the base; without one, the
/// universal root object type.
fn resolve_base(obj: &ObjectNode, current_ns: &str) -> TypeRef {
    for ancestor in &obj.ancestry {
        if ancestor.is_internal {
            continue;
        }
        if ancestor.name == obj.name && ancestor.namespace.eq_ignore_ascii_case(current_ns) {
            // Inheriting from the shadow would be circular.
            continue;
        }
        return TypeRef::new(
            ancestor.name.clone(),
            relative_namespace(&ancestor.namespace, current_ns),
        );
    }

    if current_ns == "GObject" && obj.name == "Object" {
        return TypeRef::local("object");
    }
    TypeRef::new("Object", relative_namespace("GObject", current_ns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{
        Ancestor, ArgNode, CallableNode, Deprecation, Direction, EnumKind, EnumNode, FieldNode,
        NamespaceNode, ObjectKind, PyParam, PySignature, SignalNode, TypeNode, ValueNode,
    };
    use crate::repo::Context;
    use crate::repo::testing::context_with;
    use indexmap::IndexMap;

    fn bare_object(name: &str) -> ObjectNode {
        ObjectNode {
            name: name.into(),
            kind: ObjectKind::Object,
            defining_module: "gi.repository.Gtk".into(),
            ancestry: vec![],
            fields: vec![],
            methods: vec![],
            properties: vec![],
            signals: vec![],
            extra: vec![],
            gtype_name: None,
            deprecated: Deprecation::default(),
        }
    }

    fn gtk_context(extra_entities: Vec<(&str, Entity)>) -> Context {
        let mut entities = IndexMap::new();
        entities.insert(
            "ForeachFunc".to_string(),
            Entity::Callback(CallableNode::new("ForeachFunc")),
        );
        entities.insert(
            "Align".to_string(),
            Entity::Enum(EnumNode {
                name: "Align".into(),
                kind: EnumKind::Enum,
                members: vec![
                    ValueNode {
                        name: "fill".into(),
                        escaped: "fill".into(),
                        value: 0,
                        is_deprecated: false,
                    },
                    ValueNode {
                        name: "start".into(),
                        escaped: "start".into(),
                        value: 1,
                        is_deprecated: false,
                    },
                ],
                ancestry: vec![],
                deprecated: Deprecation::default(),
            }),
        );
        for (name, entity) in extra_entities {
            entities.insert(name.to_string(), entity);
        }
        let mut ctx = context_with(vec![NamespaceNode {
            name: "Gtk".into(),
            version: "4.0".into(),
            attributes: vec![],
            entities,
        }]);
        ctx.repo.require("Gtk", None).unwrap();
        ctx
    }

    fn assemble(obj: &ObjectNode, ctx: &Context) -> (Option<ClassRecord>, CallbackSink) {
        let mut sink = CallbackSink::new();
        let class = assemble_class(obj, "Gtk", &ctx.repo, &mut sink).unwrap();
        (class, sink)
    }

    #[test]
    fn foreign_types_are_not_assembled() {
        let ctx = gtk_context(vec![]);
        let mut obj = bare_object("Pixbuf");
        obj.defining_module = "gi.repository.GdkPixbuf".into();
        let (class, _) = assemble(&obj, &ctx);
        assert!(class.is_none());
    }

    #[test]
    fn methods_win_field_name_collisions() {
        let ctx = gtk_context(vec![]);
        let mut obj = bare_object("Widget");
        obj.methods.push(CallableNode::new("margin"));
        obj.fields.push(FieldNode {
            name: "margin".into(),
            ty: TypeNode::simple(Tag::Int32),
        });
        obj.fields.push(FieldNode {
            name: "parent_instance".into(),
            ty: TypeNode::simple(Tag::Int32),
        });
        obj.fields.push(FieldNode {
            name: "width".into(),
            ty: TypeNode::simple(Tag::Int32),
        });
        let (class, _) = assemble(&obj, &ctx);
        let class = class.unwrap();
        let field_names: Vec<_> = class.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(field_names, vec!["width"]);
    }

    #[test]
    fn callback_field_is_skipped_but_emitted() {
        let ctx = gtk_context(vec![]);
        let mut obj = bare_object("Row");
        obj.fields.push(FieldNode {
            name: "foreach".into(),
            ty: TypeNode::interface("Gtk", "ForeachFunc"),
        });
        let (class, sink) = assemble(&obj, &ctx);
        assert!(class.unwrap().fields.is_empty());
        let map = sink.into_map();
        assert!(map.contains_key("ForeachFunc"));
        assert!(map["ForeachFunc"].origins.contains("Gtk.Row.foreach"));
    }

    #[test]
    fn base_tie_break_skips_shadow_and_internal_layers() {
        let ctx = gtk_context(vec![]);
        let mut obj = bare_object("Widget");
        obj.ancestry = vec![
            Ancestor {
                namespace: "Gtk".into(),
                name: "WidgetClass".into(),
                is_internal: true,
            },
            Ancestor {
                namespace: "gtk".into(),
                name: "Widget".into(),
                is_internal: false,
            },
            Ancestor {
                namespace: "GObject".into(),
                name: "InitiallyUnowned".into(),
                is_internal: false,
            },
        ];
        let (class, _) = assemble(&obj, &ctx);
        assert_eq!(
            class.unwrap().base,
            TypeRef::new("InitiallyUnowned", Some("GObject".into()))
        );
    }

    #[test]
    fn base_falls_back_to_universal_root() {
        let ctx = gtk_context(vec![]);
        let obj = bare_object("Widget");
        let (class, _) = assemble(&obj, &ctx);
        assert_eq!(
            class.unwrap().base,
            TypeRef::new("Object", Some("GObject".into()))
        );
    }

    #[test]
    fn connect_method_suppresses_signals() {
        let ctx = gtk_context(vec![]);
        let mut obj = bare_object("Bus");
        obj.methods.push(CallableNode::new("connect"));
        obj.signals.push(SignalNode {
            name: "message".into(),
            flags: signal_flags::RUN_LAST,
            handler: CallableNode::new("message"),
        });
        obj.properties.push(PropertyNode {
            name: "name".into(),
            ty: TypeNode::simple(Tag::Utf8),
            flags: property_flags::READABLE,
            default: None,
        });
        let (class, _) = assemble(&obj, &ctx);
        let class = class.unwrap();
        assert!(class.signals.is_empty());
        let connect = class.methods.iter().find(|m| m.name == "connect").unwrap();
        assert!(connect.notes.iter().any(|n| n.contains("GObject.Object.connect")));
    }

    #[test]
    fn signals_carry_flags_and_self_parameter() {
        let ctx = gtk_context(vec![]);
        let mut obj = bare_object("Widget");
        let mut handler = CallableNode::new("destroy");
        handler.args = vec![ArgNode {
            name: "data".into(),
            direction: Direction::In,
            ty: TypeNode::simple(Tag::Utf8),
            may_be_null: false,
            is_optional: false,
        }];
        obj.signals.push(SignalNode {
            name: "destroy".into(),
            flags: signal_flags::RUN_CLEANUP | signal_flags::NO_RECURSE | signal_flags::NO_HOOKS,
            handler,
        });
        let (class, _) = assemble(&obj, &ctx);
        let class = class.unwrap();
        let signal = &class.signals[0];
        assert!(signal.flags.run_cleanup && signal.flags.no_recurse && signal.flags.no_hooks);
        assert!(!signal.flags.run_first);
        let names: Vec<_> = signal.handler.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["self", "data"]);
    }

    #[test]
    fn notify_signals_synthesized_per_property() {
        let ctx = gtk_context(vec![]);
        let mut obj = bare_object("Widget");
        obj.properties.push(PropertyNode {
            name: "visible".into(),
            ty: TypeNode::simple(Tag::Boolean),
            flags: property_flags::READABLE | property_flags::WRITABLE,
            default: None,
        });
        obj.properties.push(PropertyNode {
            name: "internal".into(),
            ty: TypeNode::simple(Tag::Boolean),
            flags: 0,
            default: None,
        });
        let (class, _) = assemble(&obj, &ctx);
        let class = class.unwrap();
        let names: Vec<_> = class.signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["notify::visible"]);
        assert!(class.signals[0].flags.run_first);
    }

    #[test]
    fn property_nullability_heuristic() {
        let ctx = gtk_context(vec![]);
        let mut obj = bare_object("Widget");
        obj.properties.push(PropertyNode {
            name: "label".into(),
            ty: TypeNode::simple(Tag::Utf8),
            flags: property_flags::READABLE,
            default: None,
        });
        obj.properties.push(PropertyNode {
            name: "halign".into(),
            ty: TypeNode::interface("Gtk", "Align"),
            flags: property_flags::READABLE,
            default: None,
        });
        let (class, _) = assemble(&obj, &ctx);
        let class = class.unwrap();
        assert!(!class.properties[0].ty.nullable);
        assert!(class.properties[1].ty.nullable);
    }

    #[test]
    fn init_synthesized_from_writable_properties() {
        let ctx = gtk_context(vec![]);
        let mut obj = bare_object("Widget");
        obj.properties.push(PropertyNode {
            name: "visible".into(),
            ty: TypeNode::simple(Tag::Boolean),
            flags: property_flags::READABLE | property_flags::WRITABLE,
            default: Some(LiteralValue::Bool(true)),
        });
        obj.properties.push(PropertyNode {
            name: "halign".into(),
            ty: TypeNode::interface("Gtk", "Align"),
            flags: property_flags::WRITABLE,
            default: Some(LiteralValue::Int(1)),
        });
        obj.properties.push(PropertyNode {
            name: "read-only-prop".into(),
            ty: TypeNode::simple(Tag::Utf8),
            flags: property_flags::READABLE,
            default: None,
        });
        let (class, _) = assemble(&obj, &ctx);
        let init = class.unwrap().init.unwrap();
        assert!(init.is_constructor);
        let names: Vec<_> = init.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["halign", "visible"]);
        assert_eq!(init.arguments[0].default_repr.as_deref(), Some("Align.START"));
        assert_eq!(init.arguments[1].default_repr.as_deref(), Some("True"));
    }

    #[test]
    fn enum_default_with_no_member_falls_back_to_raw_value() {
        let ctx = gtk_context(vec![]);
        let mut obj = bare_object("Widget");
        obj.properties.push(PropertyNode {
            name: "halign".into(),
            ty: TypeNode::interface("Gtk", "Align"),
            flags: property_flags::WRITABLE,
            default: Some(LiteralValue::Int(42)),
        });
        let (class, _) = assemble(&obj, &ctx);
        let init = class.unwrap().init.unwrap();
        assert_eq!(init.arguments[0].default_repr.as_deref(), Some("42"));
    }

    #[test]
    fn explicit_constructor_suppresses_synthesis() {
        let ctx = gtk_context(vec![]);
        let mut obj = bare_object("Widget");
        let mut new = CallableNode::new("new");
        new.flags.is_constructor = true;
        obj.methods.push(new);
        let (class, _) = assemble(&obj, &ctx);
        assert!(class.unwrap().init.is_none());
    }

    #[test]
    fn runtime_override_flags_gi_method() {
        let ctx = gtk_context(vec![]);
        let mut obj = bare_object("Widget");
        obj.methods.push(CallableNode::new("show"));
        obj.extra.push(RuntimeMember::Callable {
            name: "show".into(),
            signature: PySignature::default(),
        });
        obj.extra.push(RuntimeMember::Callable {
            name: "helper".into(),
            signature: PySignature {
                params: vec![PyParam {
                    name: "self".into(),
                    annotation: None,
                    default: None,
                }],
                returns: Some("bool".into()),
            },
        });
        obj.extra.push(RuntimeMember::Descriptor {
            name: "props_proxy".into(),
        });
        obj.extra.push(RuntimeMember::Unknown {
            name: "weird".into(),
            type_signature: "builtins.module".into(),
        });
        let (class, _) = assemble(&obj, &ctx);
        let class = class.unwrap();
        let show = class.methods.iter().find(|m| m.name == "show").unwrap();
        assert!(show.notes.iter().any(|n| n.contains("overridden")));
        assert!(class.methods.iter().any(|m| m.name == "helper"));
        let descriptor = class.fields.iter().find(|f| f.name == "props_proxy").unwrap();
        assert!(descriptor.read_only);
        assert_eq!(descriptor.ty, TypeRef::local("Any"));
    }

    #[test]
    fn gtype_fallback_resolves_lazy_property_types() {
        let mut widget = bare_object("Widget");
        widget.gtype_name = Some("GtkWidget".into());
        let ctx = gtk_context(vec![("Widget", Entity::Object(widget))]);

        let mut obj = bare_object("Window");
        obj.properties.push(PropertyNode {
            name: "child".into(),
            // Registered under its GType name, never loaded as "GtkWidget".
            ty: TypeNode::interface("Gtk", "GtkWidget"),
            flags: property_flags::WRITABLE,
            default: None,
        });
        let (class, _) = assemble(&obj, &ctx);
        let class = class.unwrap();
        assert_eq!(class.properties[0].ty.qualified(), "Widget");
    }
}
