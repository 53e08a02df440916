//! Module walker: iterates a namespace's public attributes, dispatches each
//! to the normalizers in priority order, merges transitively discovered
//! callbacks, and buckets whatever nothing recognized.

use indexmap::IndexMap;

use crate::alias::resolve_alias;
use crate::callable::{normalize_callable, normalize_py_callable};
use crate::class::assemble_class;
use crate::error::Result;
use crate::meta::{AttrValue, Entity};
use crate::records::{CallableKind, CallbackSink, ModuleSchema};
use crate::repo::Context;
use crate::values;

/// Attributes nothing recognized, bucketed by their concrete runtime type.
pub type Unknowns = IndexMap<String, Vec<String>>;

pub struct WalkOutput {
    pub schema: ModuleSchema,
    pub unknown: Unknowns,
}

/// Walk one loaded namespace into a `ModuleSchema`. The namespace must have
/// been required on the context's repository beforehand.
pub fn walk(ctx: &Context, namespace: &str) -> Result<WalkOutput> {
    let ns = ctx.repo.namespace(namespace)?;
    let mut schema = ModuleSchema::new(&ns.name, &ns.version);
    let mut sink = CallbackSink::new();
    let mut unknown: Unknowns = IndexMap::new();

    for attr in &ns.attributes {
        if attr.name.starts_with("__") {
            continue;
        }

        match &attr.value {
            AttrValue::Introspected {
                reported_name,
                module,
            } => {
                if let Some(alias) = resolve_alias(&attr.name, reported_name, module, namespace) {
                    schema.aliases.push(alias);
                    continue;
                }
                match ctx.repo.find(namespace, reported_name) {
                    None => {
                        // Not-found is recovered locally: no schema for this
                        // attribute, the walk continues.
                        tracing::warn!(
                            namespace,
                            attribute = %attr.name,
                            "no metadata entity behind introspected attribute"
                        );
                    }
                    Some(Entity::Function(node)) => {
                        let origin = format!("{namespace}.{}", attr.name);
                        schema.functions.push(normalize_callable(
                            node,
                            CallableKind::Function,
                            namespace,
                            &origin,
                            &ctx.repo,
                            &mut sink,
                        )?);
                    }
                    Some(Entity::Callback(node)) => {
                        let signature = normalize_callable(
                            node,
                            CallableKind::Callback,
                            namespace,
                            &format!("{namespace}.{}", attr.name),
                            &ctx.repo,
                            &mut sink,
                        )?;
                        sink.add(signature, namespace.to_string())?;
                    }
                    Some(Entity::Enum(node)) => {
                        schema.enums.push(values::enum_record(node, namespace));
                    }
                    Some(Entity::Object(node)) => {
                        match assemble_class(node, namespace, &ctx.repo, &mut sink)? {
                            Some(class) => schema.classes.push(class),
                            None => {
                                tracing::debug!(
                                    namespace,
                                    attribute = %attr.name,
                                    module = %node.defining_module,
                                    "object is foreign to this namespace; skipped"
                                );
                            }
                        }
                    }
                    Some(Entity::Constant(node)) => {
                        schema.constants.push(values::constant_record(
                            &attr.name,
                            &node.ty,
                            &node.value,
                            node.deprecated.is_deprecated,
                            namespace,
                            &ctx.repo,
                        ));
                    }
                }
            }
            AttrValue::Literal { value } => {
                schema
                    .constants
                    .push(values::literal_constant(&attr.name, value, namespace));
            }
            AttrValue::EnumMember { target, value } => {
                schema.constants.push(values::enum_member_constant(
                    &attr.name,
                    target,
                    *value,
                    namespace,
                    &ctx.repo,
                ));
            }
            AttrValue::PlainFunction { signature } => {
                schema
                    .functions
                    .push(normalize_py_callable(&attr.name, signature, namespace)?);
            }
            AttrValue::Unclassified { type_signature } => {
                unknown
                    .entry(type_signature.clone())
                    .or_default()
                    .push(attr.name.clone());
            }
        }
    }

    schema.callbacks = sink.into_map();

    for (type_signature, names) in &unknown {
        tracing::warn!(
            namespace,
            runtime_type = %type_signature,
            attributes = ?names,
            "attributes no normalizer recognized"
        );
    }

    Ok(WalkOutput { schema, unknown })
}
