//! Rendering the statement mappings behind a list of refactorings.

use core::fmt;

use facet::Facet;
use rapidhash::RapidHashSet as HashSet;

use crate::error::MapperError;
use crate::mapper::{BodyMapper, MapperId, MapperSet};

/// Refactorings whose evidence is a body mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum RefactoringKind {
    /// Code moved out into a new method.
    Extract,
    /// A method's body folded into its caller.
    Inline,
    /// Several methods merged into one.
    Merge,
    /// One method split into several.
    Split,
    /// A method moved to another class.
    Move,
    /// Several tests folded into one parameterized test.
    Parameterize,
}

impl fmt::Display for RefactoringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RefactoringKind::Extract => "Extract Method",
            RefactoringKind::Inline => "Inline Method",
            RefactoringKind::Merge => "Merge Method",
            RefactoringKind::Split => "Split Method",
            RefactoringKind::Move => "Move Method",
            RefactoringKind::Parameterize => "Parameterize Test",
        })
    }
}

/// A detected refactoring and the mapper backing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefactoringCandidate {
    /// What was detected.
    pub kind: RefactoringKind,
    /// Mapper of the refactored body.
    pub mapper: MapperId,
}

impl RefactoringCandidate {
    /// Pair a refactoring kind with its mapper.
    pub fn new(kind: RefactoringKind, mapper: MapperId) -> Self {
        Self { kind, mapper }
    }
}

/// Mapper summaries, one line per mapper followed by one line per mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingReport {
    lines: Vec<String>,
}

impl MappingReport {
    /// Report every distinct mapper behind `candidates`, in order, then the
    /// enclosing mappers of nested ones.
    ///
    /// A mapper reached through several candidates is reported once, and so
    /// is a parent shared by several nested mappers. A parent that was
    /// already reported as a candidate is not repeated.
    pub fn collect(
        set: &MapperSet,
        candidates: &[RefactoringCandidate],
    ) -> Result<Self, MapperError> {
        let mut report = Self::default();
        let mut reported: HashSet<MapperId> = HashSet::default();
        let mut parents: Vec<MapperId> = Vec::new();

        for candidate in candidates {
            let mapper = set.mapper(candidate.mapper)?;
            if !reported.insert(candidate.mapper) {
                continue;
            }
            report.push_mapper(mapper);
            if let Some(parent) = mapper.parent_mapper()
                && mapper.is_nested()
                && !parents.contains(&parent)
            {
                parents.push(parent);
            }
        }

        for parent in parents {
            if reported.insert(parent) {
                report.push_mapper(set.mapper(parent)?);
            }
        }
        Ok(report)
    }

    /// Append a mapper's summary and its mapping lines.
    pub fn push_mapper(&mut self, mapper: &BodyMapper) {
        self.lines.push(mapper.to_string());
        self.lines
            .extend(mapper.mappings().iter().map(ToString::to_string));
    }

    /// All lines, in report order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Take the lines.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl fmt::Display for MappingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
