//! IDL Abstract Syntax Tree
//!
//! This module defines the nodes produced by the parser. Every node is
//! rebuilt from scratch for each source file.

use crate::error::{IdlError, Result};

/// Root of an IDL file
#[derive(Debug, Clone, Default)]
pub struct IdlFile {
    /// `#include` lines forwarded verbatim into the generated header block
    pub extra_headers: Vec<String>,
    pub delegates: Vec<DelegateDecl>,
    pub interfaces: Vec<InterfaceDecl>,
}

impl IdlFile {
    /// A file contributes nothing when it declares neither interfaces nor delegates
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty() && self.delegates.is_empty()
    }
}

/// `interface Qualified::Name { ... }`
#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub qualified_name: String,
    pub members: Vec<Member>,
}

impl InterfaceDecl {
    /// Symbol-naming key shared by every generated function of this interface
    pub fn flattened_name(&self) -> String {
        flatten_qualified_name(&self.qualified_name)
    }

    /// Script-visible class name
    pub fn short_name(&self) -> &str {
        short_name(&self.qualified_name)
    }
}

/// Interface member
#[derive(Debug, Clone)]
pub enum Member {
    Constructor(ConstructorDecl),
    Method(MethodDecl),
    Property(PropertyDecl),
}

#[derive(Debug, Clone, Default)]
pub struct ConstructorDecl {
    pub params: Vec<Param>,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub return_type: TypeRef,
    pub name: String,
    pub params: Vec<Param>,
    /// Call the native method without capitalizing its name
    pub name_as_is: bool,
}

#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub ty: TypeRef,
    pub name: String,
    pub is_readonly: bool,
    pub name_as_is: bool,
}

/// `delegate ReturnType Qualified::Name(args);`
#[derive(Debug, Clone)]
pub struct DelegateDecl {
    pub return_type: TypeRef,
    pub qualified_name: String,
    pub params: Vec<Param>,
}

impl DelegateDecl {
    pub fn flattened_name(&self) -> String {
        flatten_qualified_name(&self.qualified_name)
    }
}

/// A `type name` pair in a parameter list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ty: TypeRef,
    pub name: String,
    /// Zero-based position in the declared list. The script sees it at
    /// `arguments[index + 1]`, argument 0 being the receiver.
    pub index: usize,
}

impl Param {
    /// Position of this parameter in the script callback's argument array
    pub fn script_index(&self) -> usize {
        self.index + 1
    }
}

/// Primitive IDL types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Int,
    Float,
    Double,
    String,
    /// Recognized so it can be rejected; has no marshalling rule
    Long,
}

impl Primitive {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            "string" => Some(Self::String),
            "long" => Some(Self::Long),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Long => "long",
        }
    }
}

/// Type reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Only valid as a return type
    Void,
    Primitive(Primitive),
    /// Native class, passed around as `T*`
    Object(String),
    /// `T&` return, marshalled by address
    ObjectRef(String),
    /// `anyof<TypeSet>`: the prototype is picked at runtime from a type tag
    AnyOf(String),
}

impl TypeRef {
    /// Parse a type token as written in the IDL
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if let Some(set) = token
            .strip_prefix("anyof<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return Self::AnyOf(set.trim().to_string());
        }
        if let Some(name) = token.strip_suffix('&') {
            return Self::ObjectRef(name.trim_end().to_string());
        }
        if token == "void" {
            return Self::Void;
        }
        match Primitive::from_keyword(token) {
            Some(p) => Self::Primitive(p),
            None => Self::Object(token.to_string()),
        }
    }

    /// Check that this type may appear as a parameter.
    ///
    /// `anyof` is accepted in return and property positions only; lifting that
    /// restriction needs an unmarshalling rule that maps a script value back to
    /// a member of the type set.
    pub fn check_param(&self, name: &str) -> Result<()> {
        match self {
            Self::AnyOf(_) | Self::Void | Self::ObjectRef(_) => Err(IdlError::unsupported(
                self.to_string(),
                format!("parameter `{name}`"),
            )),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Primitive(p) => f.write_str(p.as_str()),
            Self::Object(name) => f.write_str(name),
            Self::ObjectRef(name) => write!(f, "{name}&"),
            Self::AnyOf(set) => write!(f, "anyof<{set}>"),
        }
    }
}

/// `Foo::Bar::Baz` -> `FooBarBaz`
pub fn flatten_qualified_name(qualified: &str) -> String {
    qualified.replace("::", "")
}

/// `Foo::Bar::Baz` -> `Baz`
pub fn short_name(qualified: &str) -> &str {
    qualified.rsplit("::").next().unwrap_or(qualified)
}
