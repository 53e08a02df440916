//! Argument & callable normalizer.
//!
//! Turns a callable metadata node (function, method, constructor, signal
//! handler, callback signature) into a `CallableRecord`: length arguments
//! elided, directions classified, the combined return shape computed from the
//! native return plus OUT/INOUT arguments, and nested callback definitions
//! surfaced through the caller-supplied accumulator.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::ident;
use crate::mapper::{MappedType, to_type_ref};
use crate::meta::{CallableNode, Direction, PySignature, TypeTarget};
use crate::records::{
    ArgumentRecord, CallableKind, CallableRecord, CallbackSink, DeprecationRecord, ReturnShape,
    TypeRef,
};
use crate::repo::Repository;

/// Normalize one callable. `origin` is the qualified name of the call site
/// (`Ns.func` or `Ns.Class.method`), used to tag discovered callbacks.
pub fn normalize_callable(
    node: &CallableNode,
    kind: CallableKind,
    current_ns: &str,
    origin: &str,
    repo: &Repository,
    sink: &mut CallbackSink,
) -> Result<CallableRecord> {
    let mut record = CallableRecord::new("", current_ns, kind);

    // Signal and callback names are string keys, never Python-callable
    // identifiers; they keep their raw form.
    match kind {
        CallableKind::Function => {
            let (name, note) = ident::sanitize(&node.name)?;
            if let Some(note) = note {
                record
                    .notes
                    .push(format!("renamed from '{}' ({note})", node.name));
            }
            record.name = name;
        }
        CallableKind::Signal | CallableKind::Callback => {
            record.name = node.name.clone();
        }
    }

    // Indices consumed as array lengths exist only at the C level.
    let length_indices = length_argument_indices(node);

    for (index, arg) in node.args.iter().enumerate() {
        if length_indices.contains(&index) {
            continue;
        }

        let (arg_name, name_note) = ident::sanitize(&arg.name)?;
        let mut out = ArgumentRecord::new(arg_name, TypeRef::local("Any"));
        out.direction = arg.direction;
        out.is_optional = arg.is_optional;
        out.array_length_index = arg.ty.array_length;
        out.note = name_note;

        match to_type_ref(&arg.ty, current_ns, repo) {
            MappedType::None => {
                out.ty = TypeRef::local("Any");
            }
            MappedType::Value(t) => {
                out.ty = t.with_nullable(arg.may_be_null);
            }
            MappedType::Unresolved(t) => {
                out.ty = t.with_nullable(arg.may_be_null);
                push_note(&mut out.note, "type could not be fully resolved");
            }
            MappedType::Callback(target) => {
                out.is_callback = true;
                out.ty = materialize_callback(&target, current_ns, origin, repo, sink)?
                    .with_nullable(arg.may_be_null);
                if target.namespace != current_ns {
                    push_note(
                        &mut out.note,
                        "cross-namespace callback; signature not statically verified",
                    );
                }
            }
        }

        if matches!(arg.direction, Direction::In | Direction::Inout) {
            if arg.may_be_null {
                out.default_repr = Some("None".into());
            } else if arg.is_optional {
                out.default_repr = Some("...".into());
            }
        }

        record.arguments.push(out);
    }

    record.ret = combined_return(node, &length_indices, current_ns, origin, repo, sink)?;
    record.may_return_null = node.may_return_null;
    record.can_throw = node.can_throw;

    // Function flags are meaningless on signals and callbacks and stay false.
    if kind == CallableKind::Function {
        record.is_constructor = node.flags.is_constructor;
        record.is_getter = node.flags.is_getter;
        record.is_setter = node.flags.is_setter;
        record.is_method = node.flags.is_method;
        record.is_async = node.flags.is_async;
    }

    record.deprecated = DeprecationRecord {
        is_deprecated: node.deprecated.is_deprecated,
        message: node.deprecated.message.clone(),
    };

    Ok(record)
}

/// Arguments referenced as element counts by some sized array (including the
/// return type's array).
fn length_argument_indices(node: &CallableNode) -> BTreeSet<usize> {
    let mut indices = BTreeSet::new();
    if let Some(i) = node.ret.array_length {
        indices.insert(i);
    }
    for arg in &node.args {
        if let Some(i) = arg.ty.array_length {
            indices.insert(i);
        }
    }
    indices
}

/// Native return (unless suppressed or void) followed by every OUT/INOUT
/// argument in declaration order, length arguments excluded.
fn combined_return(
    node: &CallableNode,
    length_indices: &BTreeSet<usize>,
    current_ns: &str,
    origin: &str,
    repo: &Repository,
    sink: &mut CallbackSink,
) -> Result<ReturnShape> {
    let mut parts = Vec::new();

    if !node.skip_return {
        match to_type_ref(&node.ret, current_ns, repo) {
            MappedType::None => {}
            MappedType::Value(t) | MappedType::Unresolved(t) => {
                parts.push(t.with_nullable(node.may_return_null));
            }
            MappedType::Callback(target) => {
                parts.push(
                    materialize_callback(&target, current_ns, origin, repo, sink)?
                        .with_nullable(node.may_return_null),
                );
            }
        }
    }

    for (index, arg) in node.args.iter().enumerate() {
        if length_indices.contains(&index) {
            continue;
        }
        if !matches!(arg.direction, Direction::Out | Direction::Inout) {
            continue;
        }
        let part = match to_type_ref(&arg.ty, current_ns, repo) {
            MappedType::None => TypeRef::local("Any"),
            MappedType::Value(t) | MappedType::Unresolved(t) => t,
            MappedType::Callback(target) => {
                materialize_callback(&target, current_ns, origin, repo, sink)?
            }
        };
        parts.push(part.with_nullable(arg.may_be_null));
    }

    Ok(ReturnShape::from_parts(parts))
}

/// Turn a callback marker into a type reference. Same-namespace callbacks are
/// normalized and emitted alongside the module (once, deduplicated by name);
/// foreign callbacks are referenced by qualified name only.
pub fn materialize_callback(
    target: &TypeTarget,
    current_ns: &str,
    origin: &str,
    repo: &Repository,
    sink: &mut CallbackSink,
) -> Result<TypeRef> {
    if target.namespace != current_ns {
        return Ok(TypeRef::new(
            target.name.clone(),
            Some(target.namespace.clone()),
        ));
    }

    if sink.contains(&target.name) {
        sink.add_origin(&target.name, origin);
    } else if let Some(cb) = repo.find_callable(&target.namespace, &target.name)? {
        let signature = normalize_callable(
            cb,
            CallableKind::Callback,
            current_ns,
            &format!("{current_ns}.{}", target.name),
            repo,
            sink,
        )?;
        sink.add(signature, origin)?;
    } else {
        tracing::debug!(target = %target, "callback entity not found; referenced by name only");
    }

    Ok(TypeRef::local(target.name.clone()))
}

// ---------------------------------------------------------------------------
// Lightweight signature path (pure-language callables, no metadata backing)
// ---------------------------------------------------------------------------

/// Normalize a runtime-introspected signature into a record compatible enough
/// to merge with the metadata-derived method list.
pub fn normalize_py_callable(
    name: &str,
    sig: &PySignature,
    namespace: &str,
) -> Result<CallableRecord> {
    let (safe_name, note) = ident::sanitize(name)?;
    let mut record = CallableRecord::new(safe_name, namespace, CallableKind::Function);
    if let Some(note) = note {
        record.notes.push(format!("renamed from '{name}' ({note})"));
    }

    for (index, param) in sig.params.iter().enumerate() {
        if index == 0 && (param.name == "self" || param.name == "cls") {
            record.is_method = true;
            continue;
        }
        let ty = param
            .annotation
            .clone()
            .map_or_else(|| TypeRef::local("Any"), TypeRef::local);
        let mut arg = ArgumentRecord::new(param.name.clone(), ty);
        if let Some(default) = &param.default {
            arg.is_optional = true;
            arg.default_repr = Some(default.clone());
        }
        record.arguments.push(arg);
    }

    record.ret = match sig.returns.as_deref() {
        None | Some("None") => ReturnShape::None,
        Some(ann) => ReturnShape::Single(TypeRef::local(ann)),
    };

    Ok(record)
}

fn push_note(slot: &mut Option<String>, note: &str) {
    match slot {
        Some(existing) => {
            existing.push_str("; ");
            existing.push_str(note);
        }
        None => *slot = Some(note.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{
        ArgNode, Entity, NamespaceNode, PyParam, Tag, TypeNode,
    };
    use crate::repo::Context;
    use crate::repo::testing::context_with;
    use indexmap::IndexMap;

    fn arg(name: &str, ty: TypeNode) -> ArgNode {
        ArgNode {
            name: name.into(),
            direction: Direction::In,
            ty,
            may_be_null: false,
            is_optional: false,
        }
    }

    fn out_arg(name: &str, ty: TypeNode) -> ArgNode {
        ArgNode {
            direction: Direction::Out,
            ..arg(name, ty)
        }
    }

    fn ctx() -> Context {
        let mut entities = IndexMap::new();
        let mut cb = CallableNode::new("ForeachFunc");
        cb.args = vec![arg("item", TypeNode::simple(Tag::Utf8))];
        cb.ret = TypeNode::simple(Tag::Boolean);
        entities.insert("ForeachFunc".to_string(), Entity::Callback(cb));
        let mut ctx = context_with(vec![NamespaceNode {
            name: "Gtk".into(),
            version: "4.0".into(),
            attributes: vec![],
            entities,
        }]);
        ctx.repo.require("Gtk", None).unwrap();
        ctx
    }

    fn normalize(node: &CallableNode, ctx: &Context) -> (CallableRecord, CallbackSink) {
        let mut sink = CallbackSink::new();
        let rec = normalize_callable(
            node,
            CallableKind::Function,
            "Gtk",
            &format!("Gtk.{}", node.name),
            &ctx.repo,
            &mut sink,
        )
        .unwrap();
        (rec, sink)
    }

    #[test]
    fn single_native_return() {
        let ctx = ctx();
        let mut node = CallableNode::new("get_name");
        node.ret = TypeNode::simple(Tag::Utf8);
        let (rec, _) = normalize(&node, &ctx);
        assert_eq!(rec.ret, ReturnShape::Single(TypeRef::local("str")));
    }

    #[test]
    fn suppressed_return_with_two_out_args_is_a_tuple() {
        let ctx = ctx();
        let mut node = CallableNode::new("get_size");
        node.ret = TypeNode::simple(Tag::Boolean);
        node.skip_return = true;
        node.args = vec![
            out_arg("width", TypeNode::simple(Tag::Int32)),
            out_arg("height", TypeNode::simple(Tag::Int32)),
        ];
        let (rec, _) = normalize(&node, &ctx);
        assert_eq!(
            rec.ret,
            ReturnShape::Tuple(vec![TypeRef::local("int"), TypeRef::local("int")])
        );
    }

    #[test]
    fn void_return_no_out_args_is_no_value() {
        let ctx = ctx();
        let node = CallableNode::new("show");
        let (rec, _) = normalize(&node, &ctx);
        assert_eq!(rec.ret, ReturnShape::None);
    }

    #[test]
    fn array_length_argument_is_elided() {
        let ctx = ctx();
        let mut node = CallableNode::new("set_items");
        node.args = vec![
            arg(
                "items",
                TypeNode::array_of(TypeNode::simple(Tag::Utf8), Some(1)),
            ),
            arg("n_items", TypeNode::simple(Tag::Int32)),
            arg("flag", TypeNode::simple(Tag::Boolean)),
        ];
        let (rec, _) = normalize(&node, &ctx);
        let names: Vec<_> = rec.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["items", "flag"]);
        assert_eq!(rec.arguments[0].array_length_index, Some(1));
    }

    #[test]
    fn return_array_length_out_arg_is_elided() {
        let ctx = ctx();
        let mut node = CallableNode::new("get_items");
        node.ret = TypeNode::array_of(TypeNode::simple(Tag::Utf8), Some(0));
        node.args = vec![out_arg("n_items", TypeNode::simple(Tag::Int32))];
        let (rec, _) = normalize(&node, &ctx);
        assert!(rec.arguments.is_empty());
        assert_eq!(rec.ret, ReturnShape::Single(TypeRef::local("list[str]")));
    }

    #[test]
    fn local_callback_argument_emits_record() {
        let ctx = ctx();
        let mut node = CallableNode::new("foreach");
        node.args = vec![arg("func", TypeNode::interface("Gtk", "ForeachFunc"))];
        let (rec, sink) = normalize(&node, &ctx);
        assert!(rec.arguments[0].is_callback);
        assert_eq!(rec.arguments[0].ty, TypeRef::local("ForeachFunc"));
        let map = sink.into_map();
        assert!(map.contains_key("ForeachFunc"));
        assert!(map["ForeachFunc"].origins.contains("Gtk.foreach"));
    }

    #[test]
    fn foreign_callback_argument_gets_advisory_note() {
        let ctx = ctx();
        let mut node = CallableNode::new("watch");
        node.args = vec![arg("func", {
            let mut t = TypeNode::interface("GLib", "SourceFunc");
            // Unloaded namespace: still detected as interface, but foreign
            // callbacks are only ever referenced by qualified name.
            t.tag = Tag::Interface;
            t
        })];
        // GLib.SourceFunc is unresolved here, so it maps as Unresolved, not
        // Callback; load a GLib namespace to exercise the foreign path.
        let mut glib_entities = IndexMap::new();
        glib_entities.insert(
            "SourceFunc".to_string(),
            Entity::Callback(CallableNode::new("SourceFunc")),
        );
        let mut ctx2 = context_with(vec![
            ctx.repo.namespace("Gtk").unwrap().clone(),
            NamespaceNode {
                name: "GLib".into(),
                version: "2.0".into(),
                attributes: vec![],
                entities: glib_entities,
            },
        ]);
        ctx2.repo.require("Gtk", None).unwrap();
        ctx2.repo.require("GLib", None).unwrap();

        let mut sink = CallbackSink::new();
        let rec = normalize_callable(
            &node,
            CallableKind::Function,
            "Gtk",
            "Gtk.watch",
            &ctx2.repo,
            &mut sink,
        )
        .unwrap();
        assert!(rec.arguments[0].is_callback);
        assert_eq!(
            rec.arguments[0].ty,
            TypeRef::new("SourceFunc", Some("GLib".into()))
        );
        assert!(
            rec.arguments[0]
                .note
                .as_deref()
                .unwrap()
                .contains("cross-namespace callback")
        );
        // No local definition for foreign callbacks.
        assert!(sink.into_map().is_empty());
    }

    #[test]
    fn keyword_function_name_is_renamed_with_note() {
        let ctx = ctx();
        let node = CallableNode::new("import");
        let (rec, _) = normalize(&node, &ctx);
        assert_eq!(rec.name, "import_");
        assert_eq!(
            rec.notes,
            vec!["renamed from 'import' (changed: reserved keyword)".to_string()]
        );
    }

    #[test]
    fn signal_names_are_never_sanitized() {
        let ctx = ctx();
        let node = CallableNode::new("notify::class");
        let mut sink = CallbackSink::new();
        let rec = normalize_callable(
            &node,
            CallableKind::Signal,
            "Gtk",
            "Gtk.Widget",
            &ctx.repo,
            &mut sink,
        )
        .unwrap();
        assert_eq!(rec.name, "notify::class");
        assert!(rec.notes.is_empty());
    }

    #[test]
    fn signals_carry_no_function_flags() {
        let ctx = ctx();
        let mut node = CallableNode::new("activate");
        node.flags.is_method = true;
        node.flags.is_async = true;
        let mut sink = CallbackSink::new();
        let rec = normalize_callable(
            &node,
            CallableKind::Signal,
            "Gtk",
            "Gtk.Widget",
            &ctx.repo,
            &mut sink,
        )
        .unwrap();
        assert!(!rec.is_method);
        assert!(!rec.is_async);
    }

    #[test]
    fn nullable_in_arg_defaults_to_none() {
        let ctx = ctx();
        let mut node = CallableNode::new("set_tooltip");
        node.args = vec![ArgNode {
            may_be_null: true,
            ..arg("text", TypeNode::simple(Tag::Utf8))
        }];
        let (rec, _) = normalize(&node, &ctx);
        assert!(rec.arguments[0].ty.nullable);
        assert_eq!(rec.arguments[0].default_repr.as_deref(), Some("None"));
    }

    #[test]
    fn py_callable_normalization() {
        let sig = PySignature {
            params: vec![
                PyParam {
                    name: "self".into(),
                    annotation: None,
                    default: None,
                },
                PyParam {
                    name: "detail".into(),
                    annotation: Some("str".into()),
                    default: Some("''".into()),
                },
            ],
            returns: Some("bool".into()),
        };
        let rec = normalize_py_callable("do_thing", &sig, "Gtk").unwrap();
        assert!(rec.is_method);
        assert_eq!(rec.arguments.len(), 1);
        assert_eq!(rec.arguments[0].default_repr.as_deref(), Some("''"));
        assert_eq!(rec.ret, ReturnShape::Single(TypeRef::local("bool")));
    }
}
