//! # Refmine
//!
//! Statement mappings between two versions of a program, the raw material
//! refactoring detection is built on.
//!
//! Two file trees are matched with [`gumnut`]'s identical-subtree matcher
//! under a [`StatementPolicy`]: only statements and a few meaningful
//! expression kinds are committed on their own. Body mappers then restrict
//! the node matching to pairs of code bodies (methods, constructors,
//! lambdas, static initializers) and list which statement went where.
//!
//! ## Usage
//!
//! ```
//! use refmine::{AstBuilder, AstKind, BodyMapper, Container, MapperSet, diff_trees};
//! use refmine::gumnut::MatchingConfig;
//!
//! fn body(calls: &[&str]) -> refmine::AstTree {
//!     let mut b = AstBuilder::new("Foo.java", AstKind::Block, 1, 10);
//!     for (i, call) in calls.iter().enumerate() {
//!         let line = i as u32 + 2;
//!         b.open(AstKind::ExpressionStatement, line, line);
//!         b.leaf(AstKind::MethodInvocation, *call, line);
//!         b.close();
//!     }
//!     b.finish()
//! }
//!
//! let diff = diff_trees(body(&["a", "b"]), body(&["b"]), &MatchingConfig::default());
//! let run = Container::method("Foo", "run");
//! let root_a = diff.before().tree().root;
//! let root_b = diff.after().tree().root;
//! let mapper = BodyMapper::new(&diff, run.clone(), run, root_a, root_b).unwrap();
//!
//! let mut mappers = MapperSet::new();
//! let id = mappers.insert(mapper);
//! let lines: Vec<String> = mappers
//!     .mapper(id)
//!     .unwrap()
//!     .mappings()
//!     .iter()
//!     .map(|m| m.to_string())
//!     .collect();
//! assert_eq!(lines, vec!["line range:3-3==line range:2-2"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]

pub use gumnut;

mod tracing_macros;
pub(crate) use tracing_macros::{debug, trace};

mod error;
pub use error::MapperError;

/// Syntax trees and their builder
pub mod ast;
/// Code body signatures
pub mod container;
/// Serializable tree descriptions
pub mod description;
/// Matching two versions of a file
pub mod diff;
/// Node kinds
pub mod kind;
/// Fragment locations
pub mod location;
/// Body mappers and the mapper arena
pub mod mapper;
/// Acceptance policy for statement matching
pub mod policy;
/// Mapping reports
pub mod report;

pub use ast::{AstBuilder, AstTree, AstTypes};
pub use container::{Container, ContainerKind, Parameter};
pub use description::{AstNode, TreeDescription};
pub use diff::{TreeDiff, diff_many, diff_trees};
pub use kind::AstKind;
pub use location::LocationInfo;
pub use mapper::{
    BodyMapper, Fragment, LOCATION_SEPARATOR, MapperId, MapperSet, StatementMapping,
};
pub use policy::StatementPolicy;
pub use report::{MappingReport, RefactoringCandidate, RefactoringKind};
