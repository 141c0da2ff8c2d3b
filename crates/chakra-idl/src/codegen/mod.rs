//! Code Generation
//!
//! Generates native glue code from a parsed IDL file. The output of one file
//! is laid out as:
//!
//! 1. runtime includes, then the file's own `#include` lines
//! 2. delegate aliases and cast helpers
//! 3. an anonymous namespace holding every prototype slot of the file, then
//!    each interface's glue in declaration order
//!
//! Object types returned by the file but declared elsewhere get an `extern`
//! slot declaration, so an aggregate output may reference interfaces that
//! appear later in the unit.

pub mod delegate;
pub mod interface;
pub mod naming;
pub mod types;

use std::collections::HashSet;

use crate::ast::{flatten_qualified_name, IdlFile, Member, TypeRef};
use crate::error::{IdlError, Result};
use crate::registry::TypeRegistry;

use self::interface::{generate_interface, InterfaceGlue};
use self::types::Marshal;

/// Code generation options
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// Namespace of `DefineProperty` and `AutoNativeClassProjecter`
    pub binding_namespace: String,
    /// Native narrow string type
    pub string_type: String,
    /// Includes emitted ahead of each file's own headers
    pub runtime_headers: Vec<String>,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            binding_namespace: "Zmey::Chakra::Binding".to_string(),
            string_type: "stl::string".to_string(),
            runtime_headers: vec![
                "#include <cassert>".to_string(),
                "#include <ChakraCore/ChakraCore.h>".to_string(),
                "#include <Zmey/Scripting/Binding.h>".to_string(),
            ],
        }
    }
}

/// Generated text of one file
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub code: String,
    pub interfaces: Vec<InterfaceGlue>,
}

/// Generate native glue for a parsed file.
///
/// Nothing is returned unless every interface and delegate generated cleanly.
pub fn generate(file: &IdlFile, options: &CodegenOptions, registry: &dyn TypeRegistry) -> Result<GeneratedFile> {
    let marshal = Marshal::new(options, registry, &file.delegates);

    // Flattened names key every symbol, so they must be unique
    let mut seen = HashSet::new();
    for iface in &file.interfaces {
        if !seen.insert(iface.flattened_name()) {
            return Err(IdlError::duplicate(&iface.qualified_name));
        }
    }
    let mut seen_delegates = HashSet::new();
    for delegate in &file.delegates {
        if !seen_delegates.insert(delegate.flattened_name()) {
            return Err(IdlError::duplicate_delegate(&delegate.qualified_name));
        }
    }

    let delegates = file
        .delegates
        .iter()
        .map(|d| delegate::generate_delegate(d, &marshal))
        .collect::<Result<Vec<_>>>()?;

    let interfaces = file
        .interfaces
        .iter()
        .map(|iface| generate_interface(iface, marshal))
        .collect::<Result<Vec<_>>>()?;

    let mut code = String::new();
    for header in options.runtime_headers.iter().chain(&file.extra_headers) {
        code.push_str(header);
        code.push('\n');
    }
    for delegate in &delegates {
        code.push('\n');
        code.push_str(delegate);
    }

    code.push_str("\nnamespace\n{\n");
    for iface in &interfaces {
        code.push_str(&format!("JsValueRef {};\n", naming::prototype(&iface.flattened_name)));
    }
    for flat in external_objects(file, &seen) {
        code.push_str(&format!("extern JsValueRef {};\n", naming::prototype(&flat)));
    }
    for iface in &interfaces {
        code.push_str(&iface.code);
    }
    code.push_str("\n}\n");

    Ok(GeneratedFile { code, interfaces })
}

/// Flattened names of object types returned by `file` but not declared in it,
/// in first-reference order
fn external_objects(file: &IdlFile, local: &HashSet<String>) -> Vec<String> {
    let returned = file
        .interfaces
        .iter()
        .flat_map(|iface| &iface.members)
        .filter_map(|member| match member {
            Member::Method(m) => Some(&m.return_type),
            Member::Property(p) => Some(&p.ty),
            Member::Constructor(_) => None,
        });

    let mut external = Vec::new();
    for ty in returned {
        if let TypeRef::Object(name) | TypeRef::ObjectRef(name) = ty {
            let flat = flatten_qualified_name(name);
            if !local.contains(&flat) && !external.contains(&flat) {
                external.push(flat);
            }
        }
    }
    external
}
