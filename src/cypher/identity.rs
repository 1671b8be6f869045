//! Native identity to stable id mapping
//!
//! Scoped to one query execution. Native identities are only meaningful
//! within a single result set, so a mapper is created per operation and
//! dropped with it.

use crate::error::{AdapterError, AdapterResult};
use crate::graph::NativeId;
use crate::session::IdGenerator;
use std::collections::HashMap;

/// How [`IdentityMapper::assign`] chooses the external id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityMode {
    /// Use the id the element carries, minting one only when it carries none.
    /// Data graphs.
    ReuseIfPresent,
    /// Always mint, ignoring any carried id. Schema graphs, whose native
    /// identities live in a different space from data ids.
    AlwaysMint,
}

/// One-to-one map from native identity keys to stable external ids
#[derive(Debug, Clone)]
pub struct IdentityMapper {
    mode: IdentityMode,
    bindings: HashMap<String, String>,
}

impl IdentityMapper {
    pub fn new(mode: IdentityMode) -> Self {
        Self {
            mode,
            bindings: HashMap::new(),
        }
    }

    /// External id bound to `internal`, if any
    pub fn resolve(&self, internal: &NativeId) -> Option<&str> {
        self.bindings.get(internal.as_key()).map(String::as_str)
    }

    /// Bind `internal` to `external`.
    ///
    /// Rebinding the same pair is a no-op; binding a different external id
    /// is an [`AdapterError::IdentityConflict`].
    pub fn bind(&mut self, internal: &NativeId, external: &str) -> AdapterResult<()> {
        match self.bindings.get(internal.as_key()) {
            Some(existing) if existing == external => Ok(()),
            Some(existing) => Err(AdapterError::IdentityConflict {
                internal: internal.as_key().to_string(),
                existing: existing.clone(),
                attempted: external.to_string(),
            }),
            None => {
                self.bindings
                    .insert(internal.as_key().to_string(), external.to_string());
                Ok(())
            }
        }
    }

    /// Resolve or create the external id of `internal`.
    ///
    /// An identity seen before keeps its binding. In reuse mode a carried id
    /// that disagrees with that binding is a conflict.
    pub fn assign(
        &mut self,
        internal: &NativeId,
        carried: Option<&str>,
        ids: &dyn IdGenerator,
    ) -> AdapterResult<String> {
        let carried = match self.mode {
            IdentityMode::ReuseIfPresent => carried,
            IdentityMode::AlwaysMint => None,
        };
        if let Some(existing) = self.resolve(internal) {
            let existing = existing.to_string();
            if let Some(carried) = carried {
                self.bind(internal, carried)?;
            }
            return Ok(existing);
        }
        let external = match carried {
            Some(id) => id.to_string(),
            None => ids.new_id(),
        };
        self.bind(internal, &external)?;
        Ok(external)
    }

    /// Like [`resolve`](Self::resolve) but a missing binding is a
    /// [`AdapterError::DanglingEndpoint`] of `relationship`.
    pub fn resolve_endpoint(&self, relationship: &str, endpoint: &NativeId) -> AdapterResult<String> {
        self.resolve(endpoint)
            .map(str::to_string)
            .ok_or_else(|| AdapterError::DanglingEndpoint {
                relationship: relationship.to_string(),
                endpoint: endpoint.as_key().to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl IdGenerator for Counter {
        fn new_id(&self) -> String {
            format!("minted-{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    #[test]
    fn test_bind_is_idempotent() {
        let mut mapper = IdentityMapper::new(IdentityMode::ReuseIfPresent);
        let native = NativeId::from(1);
        mapper.bind(&native, "a").unwrap();
        mapper.bind(&native, "a").unwrap();
        assert_eq!(mapper.resolve(&native), Some("a"));
        assert_eq!(mapper.len(), 1);
    }

    #[test]
    fn test_rebind_conflicts() {
        let mut mapper = IdentityMapper::new(IdentityMode::ReuseIfPresent);
        let native = NativeId::from(1);
        mapper.bind(&native, "a").unwrap();
        let err = mapper.bind(&native, "b").unwrap_err();
        assert_eq!(
            err,
            AdapterError::IdentityConflict {
                internal: "1".to_string(),
                existing: "a".to_string(),
                attempted: "b".to_string(),
            }
        );
        assert_eq!(mapper.resolve(&native), Some("a"));
    }

    #[test]
    fn test_resolve_unbound() {
        let mapper = IdentityMapper::new(IdentityMode::AlwaysMint);
        assert_eq!(mapper.resolve(&NativeId::from(9)), None);
        let err = mapper.resolve_endpoint("r1", &NativeId::from(9)).unwrap_err();
        assert!(matches!(err, AdapterError::DanglingEndpoint { .. }));
    }

    #[test]
    fn test_reuse_mode() {
        let ids = Counter::default();
        let mut mapper = IdentityMapper::new(IdentityMode::ReuseIfPresent);

        assert_eq!(mapper.assign(&NativeId::from(1), Some("n1"), &ids).unwrap(), "n1");
        assert_eq!(mapper.assign(&NativeId::from(2), None, &ids).unwrap(), "minted-0");
        // Seen again without a carried id: keeps the minted binding.
        assert_eq!(mapper.assign(&NativeId::from(2), None, &ids).unwrap(), "minted-0");
        assert_eq!(mapper.assign(&NativeId::from(1), Some("n1"), &ids).unwrap(), "n1");

        let err = mapper.assign(&NativeId::from(1), Some("other"), &ids).unwrap_err();
        assert!(matches!(err, AdapterError::IdentityConflict { .. }));
    }

    #[test]
    fn test_always_mint_mode() {
        let ids = Counter::default();
        let mut mapper = IdentityMapper::new(IdentityMode::AlwaysMint);

        let first = mapper.assign(&NativeId::from(1), Some("n1"), &ids).unwrap();
        assert_eq!(first, "minted-0");
        assert_eq!(mapper.assign(&NativeId::from(1), Some("n1"), &ids).unwrap(), "minted-0");
        assert_eq!(mapper.assign(&NativeId::from(2), None, &ids).unwrap(), "minted-1");
    }
}
