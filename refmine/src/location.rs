//! Where fragments sit in their source files.

use core::fmt;

use gumnut::Span;

use crate::kind::AstKind;

/// Where a code fragment sits in its file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationInfo {
    /// Path of the file, relative to the repository root.
    pub file_path: String,
    /// Source range of the fragment.
    pub span: Span,
    /// Kind of the fragment's node.
    pub kind: AstKind,
}

impl LocationInfo {
    /// First line of the fragment.
    pub fn start_line(&self) -> u32 {
        self.span.start.line
    }

    /// Last line of the fragment.
    pub fn end_line(&self) -> u32 {
        self.span.end.line
    }

    /// Whether `other` lies within this fragment, in the same file.
    pub fn subsumes(&self, other: &LocationInfo) -> bool {
        self.file_path == other.file_path
            && self.span.start.offset <= other.span.start.offset
            && other.span.end.offset <= self.span.end.offset
    }
}

impl fmt::Display for LocationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line range:{}-{}", self.start_line(), self.end_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gumnut::Position;

    fn location(start: (usize, u32), end: (usize, u32)) -> LocationInfo {
        LocationInfo {
            file_path: "src/Foo.java".to_string(),
            span: Span::new(
                Position {
                    offset: start.0,
                    line: start.1,
                    column: 1,
                },
                Position {
                    offset: end.0,
                    line: end.1,
                    column: 1,
                },
            ),
            kind: AstKind::ExpressionStatement,
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(location((10, 3), (40, 5)).to_string(), "line range:3-5");
    }

    #[test]
    fn test_subsumes() {
        let outer = location((10, 3), (40, 5));
        let inner = location((12, 3), (20, 3));
        assert!(outer.subsumes(&inner));
        assert!(!inner.subsumes(&outer));

        let mut elsewhere = inner.clone();
        elsewhere.file_path = "src/Bar.java".to_string();
        assert!(!outer.subsumes(&elsewhere));
    }
}
