//! The generated agent hierarchy.
//!
//! [`CrowdGenerator`] turns one crowd input and one agent template scene
//! into the hierarchy
//!
//! ```text
//! /<name>/<agentType>/<variation>/<agentId>/...
//! ```
//!
//! Every property of every location is computed on demand from the path
//! alone, and every property has a paired hash over exactly the content its
//! computation reads. The grouping table behind child-name enumeration is
//! built once per distinct crowd points hash and shared.

use std::sync::Arc;

use glam::Mat4;

use crate::cache::{CacheStats, HierarchyCache};
use crate::crowd::classify::{PathKind, classify};
use crate::crowd::grouping::{self, AgentGroupingTable, group_agents};
use crate::crowd::scope::agent_scope;
use crate::crowd::settings::Settings;
use crate::data::{BoundingBox, CompoundData, Object};
use crate::errors::{CrowdError, Result};
use crate::hash::{HashKey, KeyHasher};
use crate::scene::{CrowdSource, SceneSource, ScenePath};
use crate::utils::{Symbol, interner};

pub struct CrowdGenerator {
    crowd: Arc<dyn CrowdSource>,
    agents: Arc<dyn SceneSource>,
    settings: Settings,
    groupings: HierarchyCache<Arc<AgentGroupingTable>>,
}

impl std::fmt::Debug for CrowdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrowdGenerator")
            .field("settings", &self.settings)
            .field("groupings", &self.groupings)
            .finish_non_exhaustive()
    }
}

impl CrowdGenerator {
    pub fn new(
        crowd: Arc<dyn CrowdSource>,
        agents: Arc<dyn SceneSource>,
        settings: Settings,
    ) -> Self {
        Self {
            crowd,
            agents,
            settings,
            groupings: HierarchyCache::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn crowd(&self) -> &dyn CrowdSource {
        self.crowd.as_ref()
    }

    pub(crate) fn agents(&self) -> &dyn SceneSource {
        self.agents.as_ref()
    }

    #[must_use]
    pub fn grouping_stats(&self) -> CacheStats {
        self.groupings.stats()
    }

    // ========================================================================
    // Agent grouping
    // ========================================================================

    #[must_use]
    pub fn grouping_hash(&self) -> HashKey {
        grouping::grouping_hash(self.crowd.object_hash(), self.settings.mode)
    }

    /// The shared grouping table. `path` is the location that needs it and
    /// only appears in errors.
    pub fn grouping(&self, path: &ScenePath) -> Result<Arc<AgentGroupingTable>> {
        self.groupings
            .get_or_try_insert_with(self.grouping_hash(), || {
                let mode = self.settings.grouping_mode()?;
                let object = self.crowd.object();
                let points = object.as_points().ok_or_else(|| {
                    CrowdError::invalid(
                        path,
                        format!(
                            "input crowd must be a points primitive, found {}",
                            object.type_name()
                        ),
                    )
                })?;
                Ok(Arc::new(group_agents(points, mode, path)?))
            })
    }

    // ========================================================================
    // Sets
    // ========================================================================

    /// Generated set names. Set membership is not mapped into the agent
    /// hierarchy, so there are none.
    #[must_use]
    pub fn set_names(&self) -> Arc<[Symbol]> {
        Arc::from([])
    }

    #[must_use]
    pub fn set_names_hash(&self) -> HashKey {
        let mut h = KeyHasher::new();
        h.append("setNames");
        h.finish()
    }

    /// Members of `set_name`. Always empty.
    #[must_use]
    pub fn set(&self, set_name: &str) -> Vec<ScenePath> {
        log::trace!("Set \"{set_name}\" requested; generated sets are always empty");
        Vec::new()
    }

    #[must_use]
    pub fn set_hash(&self, _set_name: &str) -> HashKey {
        let mut h = KeyHasher::new();
        h.append("set");
        h.finish()
    }

    fn property_hasher(property: &str, kind: PathKind) -> KeyHasher {
        let mut h = KeyHasher::new();
        h.append(property).write_tag(kind as u8);
        h
    }
}

impl SceneSource for CrowdGenerator {
    fn bound(&self, path: &ScenePath) -> Result<BoundingBox> {
        self.branch_bound(path)
    }

    fn bound_hash(&self, path: &ScenePath) -> Result<HashKey> {
        self.branch_bound_hash(path)
    }

    fn transform(&self, path: &ScenePath) -> Result<Mat4> {
        self.branch_transform(path)
    }

    fn transform_hash(&self, path: &ScenePath) -> Result<HashKey> {
        self.branch_transform_hash(path)
    }

    fn attributes(&self, path: &ScenePath) -> Result<Arc<CompoundData>> {
        match classify(path).kind {
            PathKind::AgentLeaf | PathKind::NestedInternal => {
                self.agents.attributes(&agent_scope(path))
            }
            _ => Ok(Arc::new(CompoundData::new())),
        }
    }

    fn attributes_hash(&self, path: &ScenePath) -> Result<HashKey> {
        match classify(path).kind {
            kind @ (PathKind::AgentLeaf | PathKind::NestedInternal) => {
                let mut h = Self::property_hasher("attributes", kind);
                h.append(&self.agents.attributes_hash(&agent_scope(path))?);
                Ok(h.finish())
            }
            _ => Ok(Self::property_hasher("attributes", PathKind::Root).finish()),
        }
    }

    fn object(&self, path: &ScenePath) -> Result<Arc<Object>> {
        match classify(path).kind {
            PathKind::AgentLeaf => self.agent_object(path),
            PathKind::NestedInternal => self.agents.object(&agent_scope(path)),
            _ => Ok(Arc::new(Object::Null)),
        }
    }

    fn object_hash(&self, path: &ScenePath) -> Result<HashKey> {
        match classify(path).kind {
            PathKind::AgentLeaf => self.agent_object_hash(path),
            kind @ PathKind::NestedInternal => {
                let mut h = Self::property_hasher("object", kind);
                h.append(&self.agents.object_hash(&agent_scope(path))?);
                Ok(h.finish())
            }
            _ => Ok(Self::property_hasher("object", PathKind::Root).finish()),
        }
    }

    fn child_names(&self, path: &ScenePath) -> Result<Arc<[Symbol]>> {
        let names: Arc<[Symbol]> = match classify(path).kind {
            PathKind::Root => {
                if self.settings.name.is_empty() {
                    Arc::from([])
                } else {
                    Arc::from([interner::intern(&self.settings.name)])
                }
            }
            PathKind::Collection => self.grouping(path)?.type_names(),
            PathKind::AgentType => self
                .grouping(path)?
                .variation_names(path.name(1).unwrap_or_default()),
            PathKind::Variation => self
                .grouping(path)?
                .agent_ids(path.name(1).unwrap_or_default(), path.name(2).unwrap_or_default())
                .cloned()
                .unwrap_or_else(|| Arc::from([])),
            PathKind::AgentLeaf | PathKind::NestedInternal => {
                self.agents.child_names(&agent_scope(path))?
            }
        };
        Ok(names)
    }

    fn child_names_hash(&self, path: &ScenePath) -> Result<HashKey> {
        let kind = classify(path).kind;
        let mut h = Self::property_hasher("childNames", kind);
        match kind {
            PathKind::Root => {
                h.append(&self.settings.name);
            }
            PathKind::Collection | PathKind::AgentType | PathKind::Variation => {
                h.append(&self.grouping_hash());
                for name in path.names().skip(1) {
                    h.append(name);
                }
            }
            PathKind::AgentLeaf | PathKind::NestedInternal => {
                h.append(&self.agents.child_names_hash(&agent_scope(path))?);
            }
        }
        Ok(h.finish())
    }
}
