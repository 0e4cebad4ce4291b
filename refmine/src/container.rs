//! The code body a mapper works on: a method, a constructor, a lambda or a
//! static initializer.

use core::fmt;

use facet::Facet;

/// What kind of code body a container is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum ContainerKind {
    /// A method with a name and a return type.
    Method,
    /// A constructor, named after its class.
    Constructor,
    /// A lambda expression.
    Lambda,
    /// A `static { ... }` block.
    StaticInitializer,
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Facet)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Declared type, as written.
    #[facet(rename = "type")]
    pub ty: String,
}

/// Signature of a code body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Facet)]
pub struct Container {
    /// What the body belongs to.
    pub kind: ContainerKind,
    /// Fully qualified name of the declaring class.
    pub class_name: String,
    /// Method name (the class name for constructors).
    pub name: String,
    /// Parameters, in declaration order.
    #[facet(default)]
    pub parameters: Vec<Parameter>,
    /// Return type; `None` means `void` for methods.
    #[facet(default)]
    pub return_type: Option<String>,
    /// Visibility modifier, if any was written.
    #[facet(default)]
    pub visibility: Option<String>,
}

impl Container {
    fn new(kind: ContainerKind, class_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            class_name: class_name.into(),
            name: name.into(),
            parameters: Vec::new(),
            return_type: None,
            visibility: None,
        }
    }

    /// A method of `class_name`.
    pub fn method(class_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ContainerKind::Method, class_name, name)
    }

    /// A constructor of `class_name`.
    pub fn constructor(class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        let name = simple_name(&class_name).to_string();
        Self::new(ContainerKind::Constructor, class_name, name)
    }

    /// A lambda declared inside `enclosing` of `class_name`.
    pub fn lambda(class_name: impl Into<String>, enclosing: impl Into<String>) -> Self {
        Self::new(ContainerKind::Lambda, class_name, enclosing)
    }

    /// The static initializer of `class_name`.
    pub fn static_initializer(class_name: impl Into<String>) -> Self {
        Self::new(ContainerKind::StaticInitializer, class_name, "static")
    }

    /// Add a parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            ty: ty.into(),
        });
        self
    }

    /// Set the return type.
    pub fn returning(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    /// Set the visibility modifier.
    pub fn with_visibility(mut self, visibility: impl Into<String>) -> Self {
        self.visibility = Some(visibility.into());
        self
    }

    fn write_parameters(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", param.name, param.ty)?;
        }
        f.write_str(")")
    }
}

fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ContainerKind::Method | ContainerKind::Constructor => {
                if let Some(visibility) = &self.visibility {
                    write!(f, "{visibility} ")?;
                }
                f.write_str(&self.name)?;
                self.write_parameters(f)?;
                if self.kind == ContainerKind::Method {
                    write!(f, " : {}", self.return_type.as_deref().unwrap_or("void"))?;
                }
                Ok(())
            }
            ContainerKind::Lambda => {
                self.write_parameters(f)?;
                write!(f, " -> lambda in {}", self.name)
            }
            ContainerKind::StaticInitializer => {
                write!(f, "static initializer of {}", simple_name(&self.class_name))
            }
        }
    }
}
