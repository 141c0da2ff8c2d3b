//! Chakra IDL Compiler
//!
//! This crate reads a small interface-definition language describing native
//! classes and callback signatures, and generates the native glue that
//! exposes those classes to an embedded ChakraCore script runtime.
//!
//! # Architecture
//!
//! The compiler pipeline consists of:
//! 1. Grammar: anchored statement patterns
//! 2. Parser: builds an [`IdlFile`] from the patterns
//! 3. Code Generation: marshalling rules and glue emission
//! 4. Driver: compiles a directory, one output per file or one aggregate
//!
//! # Example
//!
//! ```ignore
//! use chakra_idl::{compile, CompileOptions};
//!
//! let idl = r#"
//!     #include <Zmey/World.h>
//!     interface Zmey::World {
//!         constructor(int capacity);
//!         readonly attribute int entityCount;
//!         Zmey::Entity& spawn(string name);
//!     }
//! "#;
//!
//! let result = compile(idl, &CompileOptions::default())?;
//! println!("{}", result.code);
//! ```

pub mod ast;
pub mod codegen;
pub mod driver;
pub mod grammar;
pub mod parser;
pub mod registry;
mod error;

pub use ast::*;
pub use driver::{compile_directory, DriverOptions, DriverReport, OutputMode};
pub use error::{IdlError, Result};
pub use registry::{AnyOfRequest, DelegateTypeRegistry, HashedTypeSetRegistry, TypeRegistry};

use std::sync::Arc;

use codegen::CodegenOptions;

/// Hash helper the binding layer keys any-of type sets with
const DEFAULT_HASH_FUNCTION: &str = "Zmey::Hash";

/// Compilation options
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub codegen: CodegenOptions,
    /// Used by the default any-of registry
    pub hash_function: String,
    /// Any-of resolution; the hashed binding lookup when unset
    pub registry: Option<Arc<dyn TypeRegistry>>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            codegen: CodegenOptions::default(),
            hash_function: DEFAULT_HASH_FUNCTION.to_string(),
            registry: None,
        }
    }
}

impl CompileOptions {
    /// Set the namespace of the binding layer helpers
    pub fn with_binding_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.codegen.binding_namespace = namespace.into();
        self
    }

    /// Set the native narrow string type
    pub fn with_string_type(mut self, string_type: impl Into<String>) -> Self {
        self.codegen.string_type = string_type.into();
        self
    }

    /// Replace the includes emitted ahead of every file
    pub fn with_runtime_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.codegen.runtime_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_hash_function(mut self, hash_function: impl Into<String>) -> Self {
        self.hash_function = hash_function.into();
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// The registry any-of values are resolved through
    pub fn registry(&self) -> Arc<dyn TypeRegistry> {
        match &self.registry {
            Some(registry) => Arc::clone(registry),
            None => Arc::new(HashedTypeSetRegistry::new(
                self.codegen.binding_namespace.clone(),
                self.hash_function.clone(),
            )),
        }
    }
}

/// Compilation result
#[derive(Debug, Clone)]
pub struct CompileResult {
    /// Generated native source
    pub code: String,
    /// Qualified interface names found in the IDL
    pub interfaces: Vec<String>,
    /// Flattened symbol keys, parallel to `interfaces`
    pub flattened_names: Vec<String>,
    /// Qualified delegate names found in the IDL
    pub delegates: Vec<String>,
}

impl CompileResult {
    /// True when the source declared neither interfaces nor delegates
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty() && self.delegates.is_empty()
    }
}

/// Compile an IDL string to native glue code
pub fn compile(idl: &str, options: &CompileOptions) -> Result<CompileResult> {
    let file = parser::parse(idl)?;
    let registry = options.registry();
    let generated = codegen::generate(&file, &options.codegen, registry.as_ref())?;

    Ok(CompileResult {
        code: generated.code,
        interfaces: file.interfaces.iter().map(|i| i.qualified_name.clone()).collect(),
        flattened_names: generated.interfaces.into_iter().map(|i| i.flattened_name).collect(),
        delegates: file.delegates.iter().map(|d| d.qualified_name.clone()).collect(),
    })
}

/// Parse an IDL string without generating code (for syntax checking)
pub fn parse(idl: &str) -> Result<IdlFile> {
    parser::parse(idl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_interface() {
        let idl = r#"
            interface Foo::Bar {
                constructor(int x);
                readonly attribute int x;
                int getX();
            }
        "#;

        let result = compile(idl, &CompileOptions::default()).unwrap();
        assert_eq!(result.interfaces, vec!["Foo::Bar"]);
        assert_eq!(result.flattened_names, vec!["FooBar"]);
        assert!(result.code.contains("FooBarProjector"));
    }

    #[test]
    fn test_binding_namespace_flows_into_registry() {
        let idl = "interface E { anyof<Set> get(int t); attribute int a; }";
        let options = CompileOptions::default()
            .with_binding_namespace("Engine::Js")
            .with_hash_function("Engine::Crc32");

        let result = compile(idl, &options).unwrap();
        assert!(result.code.contains("Engine::Js::GetPrototypeOfAnyTypeSet(Engine::Crc32(\"Set\"), _t)"));
        assert!(result.code.contains("Engine::Js::DefineProperty(object, L\"a\""));
        assert!(result.code.contains("Engine::Js::AutoNativeClassProjecter EProjector("));
    }

    #[test]
    fn test_custom_registry_and_headers() {
        let idl = r#"
            delegate Zmey::Prototype Game::Pick(int type);
            interface Game::Bag { anyof<Game::Items> item(int type); }
        "#;
        let registry = DelegateTypeRegistry::new("Zmey::Chakra::Binding").with_resolver("Game::Items", "Game::Pick");
        let options = CompileOptions::default()
            .with_registry(Arc::new(registry))
            .with_runtime_headers(["#include <Glue.h>"])
            .with_string_type("std::string");

        let result = compile(idl, &options).unwrap();
        assert!(result.code.starts_with("#include <Glue.h>\n"));
        assert!(result.code.contains("AsGamePick(Zmey::Chakra::Binding::GetRegisteredCallback(L\"Game::Pick\"))(_type)"));
        assert_eq!(result.delegates, vec!["Game::Pick"]);
    }

    #[test]
    fn test_empty_source() {
        let result = compile("// nothing\n#include <a.h>\n", &CompileOptions::default()).unwrap();
        assert!(result.is_empty());
    }
}
