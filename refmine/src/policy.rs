//! Which isomorphic subtrees are trustworthy enough to be matched on their own.

use gumnut::AcceptancePolicy;

use crate::kind::AstKind;

/// Acceptance policy for statement-level matching.
///
/// Small invocation parts and type references match by accident all the
/// time, so they are dropped as tiny trees. A candidate is only committed on
/// its own if it is a statement (blocks and short returns excepted), a doc
/// comment, or one of a few expression kinds that carry enough meaning.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementPolicy;

impl AcceptancePolicy<AstKind> for StatementPolicy {
    fn is_tiny(&self, kind: &AstKind, height: usize, min_priority: usize) -> bool {
        match kind {
            AstKind::MethodInvocationReceiver => true,
            AstKind::MethodInvocationArguments | AstKind::SimpleType => height <= min_priority,
            _ => false,
        }
    }

    fn is_acceptable(&self, kind: &AstKind, height: usize) -> bool {
        match kind {
            AstKind::Block => false,
            AstKind::ReturnStatement => height > 2,
            k if k.is_statement() => true,
            AstKind::Javadoc
            | AstKind::MethodInvocation
            | AstKind::MethodInvocationArguments
            | AstKind::MethodInvocationReceiver
            | AstKind::InfixExpression
            | AstKind::ClassInstanceCreation => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receiver_is_always_tiny() {
        let policy = StatementPolicy;
        assert!(policy.is_tiny(&AstKind::MethodInvocationReceiver, 1, 1));
        assert!(policy.is_tiny(&AstKind::MethodInvocationReceiver, 7, 1));
    }

    #[test]
    fn test_small_wrappers_are_tiny() {
        let policy = StatementPolicy;
        assert!(policy.is_tiny(&AstKind::MethodInvocationArguments, 1, 1));
        assert!(!policy.is_tiny(&AstKind::MethodInvocationArguments, 2, 1));
        assert!(policy.is_tiny(&AstKind::SimpleType, 1, 1));
        assert!(!policy.is_tiny(&AstKind::SimpleName, 1, 1));
    }

    #[test]
    fn test_acceptable_kinds() {
        let policy = StatementPolicy;
        assert!(policy.is_acceptable(&AstKind::ExpressionStatement, 3));
        assert!(policy.is_acceptable(&AstKind::TryStatement, 5));
        assert!(!policy.is_acceptable(&AstKind::Block, 4));
        assert!(!policy.is_acceptable(&AstKind::ReturnStatement, 2));
        assert!(policy.is_acceptable(&AstKind::ReturnStatement, 3));
        assert!(policy.is_acceptable(&AstKind::Javadoc, 2));
        assert!(policy.is_acceptable(&AstKind::InfixExpression, 2));
        assert!(!policy.is_acceptable(&AstKind::SimpleName, 1));
        assert!(!policy.is_acceptable(&AstKind::MethodDeclaration, 6));
    }
}
