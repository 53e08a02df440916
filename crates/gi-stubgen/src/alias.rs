//! Alias resolution: decides whether a module attribute is a re-export of an
//! entity defined elsewhere, and if so, what the alias should point at.

use crate::records::{AliasRecord, AliasTarget};

/// Internal implementation-detail modules with no importable counterpart.
fn is_internal_module(module: &str) -> bool {
    module == "_gi"
        || module.starts_with("gi._")
        || module
            .rsplit('.')
            .next()
            .is_some_and(|seg| seg.starts_with('_'))
}

/// Foreign-namespace aliases redirected to hand-authored substitute
/// definitions: the literal metadata targets lack the members the runtime
/// injects into them.
const SUBSTITUTED: &[&str] = &["GEnum", "GFlags"];

/// Decide whether `bound_name` (as bound in `current_ns`) is a re-export of
/// the entity reporting `reported_name` in `module`. `None` means
/// not-an-alias: the attribute is an original definition.
pub fn resolve_alias(
    bound_name: &str,
    reported_name: &str,
    module: &str,
    current_ns: &str,
) -> Option<AliasRecord> {
    let segment = module.rsplit('.').next().unwrap_or(module);
    let foreign = !segment.eq_ignore_ascii_case(current_ns);

    if foreign && is_internal_module(module) && SUBSTITUTED.contains(&reported_name) {
        return Some(AliasRecord {
            name: bound_name.to_string(),
            target: Some(AliasTarget {
                namespace: None,
                name: reported_name.to_string(),
            }),
            reason: format!("hand-authored substitute for {module}.{reported_name}"),
            substitute: true,
        });
    }

    if foreign {
        if is_internal_module(module) {
            // No importable counterpart exists; emit an explicit placeholder.
            return Some(AliasRecord {
                name: bound_name.to_string(),
                target: None,
                reason: format!("defined in internal module {module}"),
                substitute: false,
            });
        }
        return Some(AliasRecord {
            name: bound_name.to_string(),
            target: Some(AliasTarget {
                namespace: Some(segment.to_string()),
                name: reported_name.to_string(),
            }),
            reason: format!("re-export of {segment}.{reported_name}"),
            substitute: false,
        });
    }

    if reported_name != bound_name {
        // Same module, different name: an alias into this very module.
        return Some(AliasRecord {
            name: bound_name.to_string(),
            target: Some(AliasTarget {
                namespace: None,
                name: reported_name.to_string(),
            }),
            reason: format!("re-export of {reported_name}"),
            substitute: false,
        });
    }

    None
}
