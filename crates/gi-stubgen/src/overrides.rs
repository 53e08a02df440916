//! Manual patch table for known metadata gaps.
//!
//! Some members exist only at the binding level (never introspected) or only
//! at the native layer (introspected but unusable); a small fixed table
//! corrects these by name, applied after all other assembly passes.

use crate::records::{
    ArgumentRecord, CallableKind, CallableRecord, ClassRecord, ReturnShape, TypeRef,
};

enum Patch {
    Insert(CallableRecord),
    Replace(CallableRecord),
    Remove(&'static str),
}

fn varargs() -> ArgumentRecord {
    ArgumentRecord::new("*args", TypeRef::local("Any"))
}

fn method(name: &str, namespace: &str) -> CallableRecord {
    let mut m = CallableRecord::new(name, namespace, CallableKind::Function);
    m.is_method = true;
    m
}

fn patches(namespace: &str, class_name: &str) -> Vec<Patch> {
    match (namespace, class_name) {
        ("GObject", "Object") => {
            // connect/emit are injected by the binding and never appear in
            // the introspected method list; newv is unusable from Python.
            let mut connect = method("connect", namespace);
            connect.arguments = vec![
                ArgumentRecord::new("detailed_signal", TypeRef::local("str")),
                ArgumentRecord::new("handler", TypeRef::local("Callable")),
                varargs(),
            ];
            connect.ret = ReturnShape::Single(TypeRef::local("int"));

            let mut emit = method("emit", namespace);
            emit.arguments = vec![
                ArgumentRecord::new("signal", TypeRef::local("str")),
                varargs(),
            ];
            emit.ret = ReturnShape::Single(TypeRef::local("Any"));

            // The introspected get_property takes an out-GValue; the binding
            // returns the value directly.
            let mut get_property = method("get_property", namespace);
            get_property.arguments =
                vec![ArgumentRecord::new("property_name", TypeRef::local("str"))];
            get_property.ret = ReturnShape::Single(TypeRef::local("Any"));

            vec![
                Patch::Insert(connect),
                Patch::Insert(emit),
                Patch::Replace(get_property),
                Patch::Remove("newv"),
            ]
        }
        _ => Vec::new(),
    }
}

/// Apply the patch table to an assembled class, keyed by member name.
pub fn apply(class: &mut ClassRecord) {
    for patch in patches(&class.namespace, &class.name) {
        match patch {
            Patch::Insert(record) => {
                if !class.methods.iter().any(|m| m.name == record.name) {
                    class.methods.push(record);
                }
            }
            Patch::Replace(record) => {
                match class.methods.iter_mut().find(|m| m.name == record.name) {
                    Some(slot) => *slot = record,
                    None => class.methods.push(record),
                }
            }
            Patch::Remove(name) => {
                class.methods.retain(|m| m.name != name);
            }
        }
    }
}
