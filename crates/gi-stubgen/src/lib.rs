pub mod alias;
pub mod callable;
pub mod class;
pub mod docs;
pub mod error;
pub mod ident;
pub mod mapper;
pub mod meta;
pub mod overrides;
pub mod records;
pub mod render;
pub mod repo;
pub mod values;
pub mod walker;

use crate::error::Result;
use crate::records::ModuleSchema;
use crate::repo::Context;

/// High-level API: require a namespace through the context's backend, walk it
/// into a normalized schema, and render the `.pyi` artifact text.
///
/// `namespace`: the GI namespace (e.g. "Gtk")
/// `version`: an explicit typelib version (e.g. "4.0"), or `None` for
/// whatever the backend resolves
pub fn generate_stubs(
    ctx: &mut Context,
    namespace: &str,
    version: Option<&str>,
) -> Result<(ModuleSchema, String)> {
    ctx.repo.require(namespace, version)?;
    let out = walker::walk(ctx, namespace)?;
    let text = render::render_module(&out.schema, &ctx.docs);
    Ok((out.schema, text))
}
