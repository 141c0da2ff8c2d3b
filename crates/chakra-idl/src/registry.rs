//! Any-of prototype resolution
//!
//! An `anyof<TypeSet>` return value is wrapped like any other native object,
//! but the prototype attached to it is only known at runtime. A
//! [`TypeRegistry`] decides which native expression yields that prototype.

use std::collections::BTreeMap;

use crate::ast::DelegateDecl;
use crate::codegen::naming;
use crate::error::{IdlError, Result};

/// Everything a registry may look at to resolve one any-of value
#[derive(Debug, Clone, Copy)]
pub struct AnyOfRequest<'a> {
    /// Name inside `anyof<...>`
    pub type_set: &'a str,
    /// Native expression holding the value that selects the concrete type
    pub resolver: &'a str,
    /// Delegates declared by the file being compiled
    pub delegates: &'a [DelegateDecl],
}

/// Maps a type set and a resolver value to a prototype expression
pub trait TypeRegistry: std::fmt::Debug + Send + Sync {
    fn prototype_for(&self, request: &AnyOfRequest<'_>) -> Result<String>;
}

/// Looks the prototype up in the binding layer's table, keyed by the hash of
/// the type-set name and the resolver value.
#[derive(Debug, Clone)]
pub struct HashedTypeSetRegistry {
    binding_namespace: String,
    hash_function: String,
}

impl HashedTypeSetRegistry {
    pub fn new(binding_namespace: impl Into<String>, hash_function: impl Into<String>) -> Self {
        Self {
            binding_namespace: binding_namespace.into(),
            hash_function: hash_function.into(),
        }
    }
}

impl TypeRegistry for HashedTypeSetRegistry {
    fn prototype_for(&self, request: &AnyOfRequest<'_>) -> Result<String> {
        Ok(format!(
            "{}::GetPrototypeOfAnyTypeSet({}(\"{}\"), {})",
            self.binding_namespace, self.hash_function, request.type_set, request.resolver
        ))
    }
}

/// Resolves each type set through a script-registered callback whose
/// signature is declared as a delegate in the same file.
///
/// Type sets without a resolver, or whose resolver delegate is not declared,
/// are rejected.
#[derive(Debug, Clone)]
pub struct DelegateTypeRegistry {
    binding_namespace: String,
    resolvers: BTreeMap<String, String>,
}

impl DelegateTypeRegistry {
    pub fn new(binding_namespace: impl Into<String>) -> Self {
        Self {
            binding_namespace: binding_namespace.into(),
            resolvers: BTreeMap::new(),
        }
    }

    /// Resolve `anyof<type_set>` by calling the callback registered for `delegate`
    pub fn with_resolver(mut self, type_set: impl Into<String>, delegate: impl Into<String>) -> Self {
        self.resolvers.insert(type_set.into(), delegate.into());
        self
    }
}

impl TypeRegistry for DelegateTypeRegistry {
    fn prototype_for(&self, request: &AnyOfRequest<'_>) -> Result<String> {
        let any = format!("anyof<{}>", request.type_set);
        let delegate_name = self
            .resolvers
            .get(request.type_set)
            .ok_or_else(|| IdlError::unsupported(&any, "type registry (no resolver registered)"))?;

        let delegate = request
            .delegates
            .iter()
            .find(|d| &d.qualified_name == delegate_name)
            .ok_or_else(|| {
                IdlError::unsupported(
                    &any,
                    format!("type registry (resolver delegate `{delegate_name}` is not declared)"),
                )
            })?;

        if delegate.params.len() != 1 {
            return Err(IdlError::unsupported(
                &any,
                format!("type registry (resolver delegate `{delegate_name}` must take one argument)"),
            ));
        }

        Ok(format!(
            "{}({}::GetRegisteredCallback(L\"{}\"))({})",
            naming::delegate_cast(&delegate.flattened_name()),
            self.binding_namespace,
            delegate.qualified_name,
            request.resolver
        ))
    }
}
