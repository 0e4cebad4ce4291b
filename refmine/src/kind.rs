//! Node kinds of a Java-like syntax tree.

use core::fmt;

use crate::error::MapperError;

macro_rules! ast_kinds {
    ($($variant:ident => $name:literal,)*) => {
        /// Closed set of node kinds produced by the front-end.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum AstKind {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl AstKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [AstKind] = &[$(AstKind::$variant,)*];

            /// The front-end's name for this kind.
            pub fn name(self) -> &'static str {
                match self {
                    $(AstKind::$variant => $name,)*
                }
            }

            /// Look a kind up by its front-end name.
            pub fn from_name(name: &str) -> Result<Self, MapperError> {
                match name {
                    $($name => Ok(AstKind::$variant),)*
                    _ => Err(MapperError::UnknownKind {
                        name: name.to_string(),
                    }),
                }
            }
        }
    };
}

ast_kinds! {
    // declarations
    CompilationUnit => "CompilationUnit",
    PackageDeclaration => "PackageDeclaration",
    ImportDeclaration => "ImportDeclaration",
    TypeDeclaration => "TypeDeclaration",
    EnumDeclaration => "EnumDeclaration",
    FieldDeclaration => "FieldDeclaration",
    MethodDeclaration => "MethodDeclaration",
    Initializer => "Initializer",
    SingleVariableDeclaration => "SingleVariableDeclaration",
    VariableDeclarationFragment => "VariableDeclarationFragment",
    Modifier => "Modifier",
    Javadoc => "Javadoc",
    TagElement => "TagElement",
    TextElement => "TextElement",

    // statements
    AssertStatement => "AssertStatement",
    Block => "Block",
    BreakStatement => "BreakStatement",
    CatchClause => "CatchClause",
    ConstructorInvocation => "ConstructorInvocation",
    ContinueStatement => "ContinueStatement",
    DoStatement => "DoStatement",
    EmptyStatement => "EmptyStatement",
    EnhancedForStatement => "EnhancedForStatement",
    ExpressionStatement => "ExpressionStatement",
    ForStatement => "ForStatement",
    IfStatement => "IfStatement",
    LabeledStatement => "LabeledStatement",
    ReturnStatement => "ReturnStatement",
    SuperConstructorInvocation => "SuperConstructorInvocation",
    SwitchCase => "SwitchCase",
    SwitchStatement => "SwitchStatement",
    SynchronizedStatement => "SynchronizedStatement",
    ThrowStatement => "ThrowStatement",
    TryStatement => "TryStatement",
    TypeDeclarationStatement => "TypeDeclarationStatement",
    VariableDeclarationStatement => "VariableDeclarationStatement",
    WhileStatement => "WhileStatement",
    YieldStatement => "YieldStatement",

    // expressions
    ArrayAccess => "ArrayAccess",
    ArrayCreation => "ArrayCreation",
    Assignment => "Assignment",
    AssignmentOperator => "ASSIGNMENT_OPERATOR",
    BooleanLiteral => "BooleanLiteral",
    CastExpression => "CastExpression",
    CharacterLiteral => "CharacterLiteral",
    ClassInstanceCreation => "ClassInstanceCreation",
    ConditionalExpression => "ConditionalExpression",
    FieldAccess => "FieldAccess",
    InfixExpression => "InfixExpression",
    InfixOperator => "INFIX_EXPRESSION_OPERATOR",
    InstanceofExpression => "InstanceofExpression",
    LambdaExpression => "LambdaExpression",
    MethodInvocation => "MethodInvocation",
    MethodInvocationArguments => "METHOD_INVOCATION_ARGUMENTS",
    MethodInvocationReceiver => "METHOD_INVOCATION_RECEIVER",
    NullLiteral => "NullLiteral",
    NumberLiteral => "NumberLiteral",
    ParenthesizedExpression => "ParenthesizedExpression",
    PostfixExpression => "PostfixExpression",
    PrefixExpression => "PrefixExpression",
    QualifiedName => "QualifiedName",
    SimpleName => "SimpleName",
    StringLiteral => "StringLiteral",
    SuperMethodInvocation => "SuperMethodInvocation",
    ThisExpression => "ThisExpression",

    // types
    ArrayType => "ArrayType",
    ParameterizedType => "ParameterizedType",
    PrimitiveType => "PrimitiveType",
    SimpleType => "SimpleType",
}

impl AstKind {
    /// Whether nodes of this kind are statements, i.e. what statement
    /// mappings are made of.
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            AstKind::AssertStatement
                | AstKind::Block
                | AstKind::BreakStatement
                | AstKind::CatchClause
                | AstKind::ConstructorInvocation
                | AstKind::ContinueStatement
                | AstKind::DoStatement
                | AstKind::EmptyStatement
                | AstKind::EnhancedForStatement
                | AstKind::ExpressionStatement
                | AstKind::ForStatement
                | AstKind::IfStatement
                | AstKind::LabeledStatement
                | AstKind::ReturnStatement
                | AstKind::SuperConstructorInvocation
                | AstKind::SwitchCase
                | AstKind::SwitchStatement
                | AstKind::SynchronizedStatement
                | AstKind::ThrowStatement
                | AstKind::TryStatement
                | AstKind::TypeDeclarationStatement
                | AstKind::VariableDeclarationStatement
                | AstKind::WhileStatement
                | AstKind::YieldStatement
        )
    }
}

impl fmt::Display for AstKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
