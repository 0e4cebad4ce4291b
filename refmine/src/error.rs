use facet::Facet;

/// Errors raised at the edge of the mapping API.
///
/// Matching itself never fails; these only cover handles and descriptions
/// that do not refer to anything.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum MapperError {
    /// body root {index} is not a node of the before tree
    BeforeBodyMissing { index: usize },

    /// body root {index} is not a node of the after tree
    AfterBodyMissing { index: usize },

    /// no mapper with handle {index}
    UnknownMapper { index: usize },

    /// mapper {index} is already known with a different parent
    NestingConflict { index: usize },

    /// unknown node kind {name}
    UnknownKind { name: String },

    /// no node tagged {tag}
    UnknownTag { tag: String },

    /// invalid tree description: {message}
    InvalidDescription { message: String },
}
