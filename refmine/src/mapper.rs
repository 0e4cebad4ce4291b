//! Statement mappings between two code bodies.
//!
//! A [`BodyMapper`] pairs a before body with an after body and lists the
//! statements of the first that the node matching sends into the second.
//! Mappers live in a [`MapperSet`] and refer to their enclosing mapper by
//! [`MapperId`]; the set interns them by value, so the same body pair reached
//! through several refactorings is a single mapper.

use core::fmt;
use core::hash::{Hash, Hasher};

use gumnut::DiffTree;
use gumnut::indextree::NodeId;
use rapidhash::RapidHashMap as HashMap;

use crate::container::Container;
use crate::diff::TreeDiff;
use crate::error::MapperError;
use crate::kind::AstKind;
use crate::location::LocationInfo;
use crate::{debug, trace};

/// Joins the before and after location of a statement mapping.
pub const LOCATION_SEPARATOR: &str = "==";

/// A statement on one side of a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fragment {
    /// Node of the statement.
    pub node: NodeId,
    /// Kind of the statement.
    pub kind: AstKind,
    /// Where the statement is.
    pub location: LocationInfo,
}

impl Fragment {
    fn new(tree: &crate::ast::AstTree, node: NodeId) -> Self {
        Self {
            node,
            kind: *tree.kind(node),
            location: tree.location(node),
        }
    }
}

/// A before statement and the after statement it corresponds to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatementMapping {
    /// Statement in the before body.
    pub before: Fragment,
    /// Statement in the after body.
    pub after: Fragment,
}

impl StatementMapping {
    /// Before and after locations, rendered.
    pub fn location_pair(&self) -> (String, String) {
        (
            self.before.location.to_string(),
            self.after.location.to_string(),
        )
    }
}

impl fmt::Display for StatementMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{LOCATION_SEPARATOR}{}",
            self.before.location, self.after.location
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MapperKey {
    container1: Container,
    container2: Container,
    body_before: NodeId,
    body_after: NodeId,
}

/// Statement-level correspondence between two code bodies.
///
/// Equality and hashing only look at the containers and body roots, never at
/// where the mapper is stored.
#[derive(Debug, Clone)]
pub struct BodyMapper {
    key: MapperKey,
    mappings: Vec<StatementMapping>,
    parent: Option<MapperId>,
    nested: bool,
}

impl BodyMapper {
    /// Map the statements below `body_before` (in the before tree of `diff`)
    /// onto those below `body_after` (in the after tree).
    ///
    /// A statement is mapped when the node matching sends it to a statement
    /// strictly inside the after body. The body roots themselves are never
    /// part of the result.
    pub fn new(
        diff: &TreeDiff,
        container1: Container,
        container2: Container,
        body_before: NodeId,
        body_after: NodeId,
    ) -> Result<Self, MapperError> {
        let before = diff.before();
        let after = diff.after();
        if !before.contains(body_before) {
            return Err(MapperError::BeforeBodyMissing {
                index: usize::from(body_before),
            });
        }
        if !after.contains(body_after) {
            return Err(MapperError::AfterBodyMissing {
                index: usize::from(body_after),
            });
        }

        let mut mappings = Vec::new();
        for node in before.descendants(body_before) {
            if !before.kind(node).is_statement() {
                continue;
            }
            let Some(partner) = diff.after_of(node) else {
                continue;
            };
            if partner == body_after
                || !after.kind(partner).is_statement()
                || !after.is_within(partner, body_after)
            {
                continue;
            }
            mappings.push(StatementMapping {
                before: Fragment::new(before, node),
                after: Fragment::new(after, partner),
            });
        }

        trace!(
            container1 = %container1,
            container2 = %container2,
            mappings = mappings.len(),
            "body mapper built"
        );
        Ok(Self {
            key: MapperKey {
                container1,
                container2,
                body_before,
                body_after,
            },
            mappings,
            parent: None,
            nested: false,
        })
    }

    /// The before container.
    pub fn container1(&self) -> &Container {
        &self.key.container1
    }

    /// The after container.
    pub fn container2(&self) -> &Container {
        &self.key.container2
    }

    /// Root of the before body.
    pub fn body_before(&self) -> NodeId {
        self.key.body_before
    }

    /// Root of the after body.
    pub fn body_after(&self) -> NodeId {
        self.key.body_after
    }

    /// Statement mappings, in source order of the before body.
    pub fn mappings(&self) -> &[StatementMapping] {
        &self.mappings
    }

    /// Whether this mapper was created for a fragment of another mapper
    /// (extracted or inlined code) rather than for a whole-body comparison.
    pub fn is_nested(&self) -> bool {
        self.nested
    }

    /// The enclosing mapper, for nested mappers.
    pub fn parent_mapper(&self) -> Option<MapperId> {
        self.parent
    }

    /// Whether the before statement `node` is mapped.
    pub fn maps_before(&self, node: NodeId) -> bool {
        self.mappings.iter().any(|m| m.before.node == node)
    }

    /// Whether the after statement `node` is mapped.
    pub fn maps_after(&self, node: NodeId) -> bool {
        self.mappings.iter().any(|m| m.after.node == node)
    }
}

impl PartialEq for BodyMapper {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for BodyMapper {}

impl Hash for BodyMapper {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for BodyMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.key.container1, self.key.container2)
    }
}

/// Handle to a mapper in a [`MapperSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapperId(u32);

impl MapperId {
    /// Slot index in the set.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MapperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mapper#{}", self.0)
    }
}

/// Arena of body mappers for one commit analysis.
#[derive(Debug, Default)]
pub struct MapperSet {
    mappers: Vec<BodyMapper>,
    by_value: HashMap<MapperKey, MapperId>,
}

impl MapperSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level mapper, or return the handle of an equal one.
    pub fn insert(&mut self, mapper: BodyMapper) -> MapperId {
        if let Some(&id) = self.by_value.get(&mapper.key) {
            trace!(%id, "mapper already known");
            return id;
        }
        let id = MapperId(self.mappers.len() as u32);
        debug!(%id, mapper = %mapper, nested = mapper.nested, "mapper added");
        self.by_value.insert(mapper.key.clone(), id);
        self.mappers.push(mapper);
        id
    }

    /// Add a mapper for a fragment of `parent`, or return the handle of an
    /// equal one nested under the same parent.
    ///
    /// An equal mapper that is top-level or nested elsewhere is a
    /// [`MapperError::NestingConflict`].
    pub fn insert_nested(
        &mut self,
        mut mapper: BodyMapper,
        parent: MapperId,
    ) -> Result<MapperId, MapperError> {
        self.mapper(parent)?;
        if let Some(&id) = self.by_value.get(&mapper.key) {
            let known = self.mapper(id)?;
            if known.parent != Some(parent) {
                debug!(%id, %parent, known_parent = ?known.parent, "nesting conflict");
                return Err(MapperError::NestingConflict { index: id.index() });
            }
            return Ok(id);
        }
        mapper.parent = Some(parent);
        mapper.nested = true;
        Ok(self.insert(mapper))
    }

    /// The mapper behind `id`, if any.
    pub fn get(&self, id: MapperId) -> Option<&BodyMapper> {
        self.mappers.get(id.index())
    }

    /// The mapper behind `id`.
    pub fn mapper(&self, id: MapperId) -> Result<&BodyMapper, MapperError> {
        self.get(id)
            .ok_or(MapperError::UnknownMapper { index: id.index() })
    }

    /// The enclosing mapper of `id`, `None` for top-level mappers.
    pub fn parent_of(&self, id: MapperId) -> Result<Option<&BodyMapper>, MapperError> {
        match self.mapper(id)?.parent {
            Some(parent) => self.mapper(parent).map(Some),
            None => Ok(None),
        }
    }

    /// Handle of a mapper equal to `mapper`, if one was added.
    pub fn find(&self, mapper: &BodyMapper) -> Option<MapperId> {
        self.by_value.get(&mapper.key).copied()
    }

    /// Nested mappers whose parent is `id`, in insertion order.
    pub fn children_of(&self, id: MapperId) -> impl Iterator<Item = MapperId> + '_ {
        self.iter()
            .filter(move |(_, m)| m.parent == Some(id))
            .map(|(child, _)| child)
    }

    /// Every mapper with its handle, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (MapperId, &BodyMapper)> + '_ {
        self.mappers
            .iter()
            .enumerate()
            .map(|(i, m)| (MapperId(i as u32), m))
    }

    /// Number of distinct mappers.
    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}
