//! Metadata repository facade.
//!
//! Wraps a backend adapter behind one stable interface: namespaces load at
//! most once (idempotent, cached by name), lookups return capability-typed
//! entities, and kind expectations are enforced here so normalizers never
//! probe for capabilities themselves. Backend variants differ only in how
//! they materialize `NamespaceNode` documents.

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::docs::DocTable;
use crate::error::{Result, StubError};
use crate::meta::{CallableNode, Entity, EntityKind, NamespaceNode};

// ---------------------------------------------------------------------------
// Backend adapters
// ---------------------------------------------------------------------------

/// One backend variant. Implementations translate their source (typelib,
/// GIR document, pre-dumped JSON) into a `NamespaceNode`; the facade owns
/// caching and lookup on top.
pub trait Backend {
    fn load(&self, namespace: &str, version: Option<&str>) -> Result<NamespaceNode>;
}

/// Reads namespace documents from `<root>/<Namespace>-<version>.json`,
/// falling back to `<root>/<Namespace>.json` when no version is requested or
/// the versioned file is absent.
pub struct JsonBackend {
    root: PathBuf,
}

impl JsonBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Backend for JsonBackend {
    fn load(&self, namespace: &str, version: Option<&str>) -> Result<NamespaceNode> {
        let mut candidates = Vec::new();
        if let Some(version) = version {
            candidates.push(self.root.join(format!("{namespace}-{version}.json")));
        }
        candidates.push(self.root.join(format!("{namespace}.json")));

        let path = candidates
            .iter()
            .find(|p| p.exists())
            .ok_or_else(|| StubError::NamespaceLoad {
                namespace: namespace.to_string(),
                reason: format!("no metadata document under {}", self.root.display()),
            })?;

        let raw = std::fs::read_to_string(path)?;
        let node: NamespaceNode =
            serde_json::from_str(&raw).map_err(|e| StubError::NamespaceLoad {
                namespace: namespace.to_string(),
                reason: format!("{}: {e}", path.display()),
            })?;
        Ok(node)
    }
}

// ---------------------------------------------------------------------------
// Repository facade
// ---------------------------------------------------------------------------

pub struct Repository {
    backend: Box<dyn Backend>,
    namespaces: IndexMap<String, NamespaceNode>,
}

impl Repository {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            namespaces: IndexMap::new(),
        }
    }

    /// Load a namespace at most once. Re-requiring a loaded namespace is a
    /// no-op; a differing version on a later call is only logged, the first
    /// load wins.
    pub fn require(&mut self, namespace: &str, version: Option<&str>) -> Result<&NamespaceNode> {
        if let Some(loaded) = self.namespaces.get(namespace) {
            if let Some(version) = version {
                if loaded.version != version {
                    tracing::warn!(
                        namespace,
                        loaded = %loaded.version,
                        requested = %version,
                        "namespace already loaded with a different version"
                    );
                }
            }
        } else {
            let node = self.backend.load(namespace, version)?;
            tracing::debug!(namespace, version = %node.version, "namespace loaded");
            self.namespaces.insert(namespace.to_string(), node);
        }
        Ok(&self.namespaces[namespace])
    }

    pub fn is_loaded(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    /// All currently loaded namespaces, in load order.
    pub fn loaded(&self) -> impl Iterator<Item = &NamespaceNode> {
        self.namespaces.values()
    }

    pub fn namespace(&self, namespace: &str) -> Result<&NamespaceNode> {
        self.namespaces
            .get(namespace)
            .ok_or_else(|| StubError::NamespaceNotLoaded(namespace.to_string()))
    }

    /// Look up an entity; `None` covers both an unloaded namespace and a
    /// missing name (not-found is recovered locally by callers).
    pub fn find(&self, namespace: &str, name: &str) -> Option<&Entity> {
        self.namespaces.get(namespace)?.entities.get(name)
    }

    /// Look up an entity constrained to an expected kind. Missing entities
    /// stay `Ok(None)`; an entity of the wrong kind is a hard type error.
    pub fn find_kind(
        &self,
        namespace: &str,
        name: &str,
        expected: EntityKind,
    ) -> Result<Option<&Entity>> {
        match self.find(namespace, name) {
            None => Ok(None),
            Some(entity) if entity.kind() == expected => Ok(Some(entity)),
            Some(entity) => Err(StubError::TypeMismatch {
                namespace: namespace.to_string(),
                name: name.to_string(),
                expected: expected.label(),
                found: entity.kind().label(),
            }),
        }
    }

    /// Look up an entity that must support the callable capability set.
    pub fn find_callable(&self, namespace: &str, name: &str) -> Result<Option<&CallableNode>> {
        match self.find(namespace, name) {
            None => Ok(None),
            Some(Entity::Function(node)) | Some(Entity::Callback(node)) => Ok(Some(node)),
            Some(_) => Err(StubError::NotCallable {
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Generation context
// ---------------------------------------------------------------------------

/// Explicitly constructed per-run context: the namespace cache and the doc
/// table live here and nowhere else. Dropping the context is the reset.
pub struct Context {
    pub repo: Repository,
    pub docs: DocTable,
}

impl Context {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            repo: Repository::new(backend),
            docs: DocTable::new(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// In-memory backend for tests: preloaded namespace documents by name.
    pub struct StaticBackend {
        pub namespaces: Vec<NamespaceNode>,
    }

    impl Backend for StaticBackend {
        fn load(&self, namespace: &str, _version: Option<&str>) -> Result<NamespaceNode> {
            self.namespaces
                .iter()
                .find(|n| n.name == namespace)
                .cloned()
                .ok_or_else(|| StubError::NamespaceLoad {
                    namespace: namespace.to_string(),
                    reason: "not in static backend".into(),
                })
        }
    }

    pub fn context_with(namespaces: Vec<NamespaceNode>) -> Context {
        Context::new(Box::new(StaticBackend { namespaces }))
    }
}
