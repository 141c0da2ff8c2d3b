//! Marshalling rules
//!
//! Maps each IDL type to the native statements that store it, read it from a
//! script argument, convert it back into a script value, and cast it when it
//! is passed to or returned from a native call.

use crate::ast::{flatten_qualified_name, DelegateDecl, Primitive, TypeRef};
use crate::error::{IdlError, Result};
use crate::registry::{AnyOfRequest, TypeRegistry};

use super::naming;
use super::CodegenOptions;

/// Name of the local holding a call or property result
pub const RESULT_VAR: &str = "_result";

/// Native local for a declared parameter or property
pub fn local_var(name: &str) -> String {
    format!("_{name}")
}

/// Type rules bound to one file's options, registry and delegates
#[derive(Debug, Clone, Copy)]
pub struct Marshal<'a> {
    options: &'a CodegenOptions,
    registry: &'a dyn TypeRegistry,
    delegates: &'a [DelegateDecl],
}

impl<'a> Marshal<'a> {
    pub fn new(
        options: &'a CodegenOptions,
        registry: &'a dyn TypeRegistry,
        delegates: &'a [DelegateDecl],
    ) -> Self {
        Self {
            options,
            registry,
            delegates,
        }
    }

    pub fn options(&self) -> &'a CodegenOptions {
        self.options
    }

    /// Native declaration of the local `var` holding a value of `ty`
    pub fn storage(&self, ty: &TypeRef, var: &str) -> Result<String> {
        let decl = match ty {
            TypeRef::Primitive(Primitive::Int) => format!("int {var};"),
            TypeRef::Primitive(Primitive::Float | Primitive::Double) => format!("double {var};"),
            TypeRef::Primitive(Primitive::String) => format!("{} {var};", self.options.string_type),
            TypeRef::Object(name) | TypeRef::ObjectRef(name) => format!("{name}* {var};"),
            TypeRef::AnyOf(_) => format!("void* {var};"),
            TypeRef::Primitive(Primitive::Long) | TypeRef::Void => {
                return Err(IdlError::unsupported(ty.to_string(), format!("storage for `{var}`")))
            }
        };
        Ok(decl)
    }

    /// Statements reading `arguments[script_index]` into the already declared `var`
    pub fn unmarshal(&self, ty: &TypeRef, var: &str, script_index: usize) -> Result<String> {
        let arg = format!("arguments[{script_index}]");
        let code = match ty {
            TypeRef::Primitive(Primitive::Int) => format!("\tJsNumberToInt({arg}, &{var});\n"),
            TypeRef::Primitive(Primitive::Float | Primitive::Double) => {
                format!("\tJsNumberToDouble({arg}, &{var});\n")
            }
            TypeRef::Primitive(Primitive::String) => {
                let mut code = script_value_to_wide(&arg, var);
                code.push_str(&wide_to_narrow(var));
                code
            }
            TypeRef::Object(_) => {
                format!("\tJsGetExternalData({arg}, reinterpret_cast<void**>(&{var}));\n")
            }
            TypeRef::Primitive(Primitive::Long) | TypeRef::AnyOf(_) | TypeRef::ObjectRef(_) | TypeRef::Void => {
                return Err(IdlError::unsupported(ty.to_string(), format!("argument `{var}`")))
            }
        };
        Ok(code)
    }

    /// Cast applied to a local when it is passed to a native call
    pub fn call_arg(&self, ty: &TypeRef, var: &str) -> Result<String> {
        let arg = match ty {
            TypeRef::Primitive(Primitive::Int) => format!("(int){var}"),
            TypeRef::Primitive(Primitive::Float) => format!("(float){var}"),
            TypeRef::Primitive(Primitive::Double) => format!("(double){var}"),
            TypeRef::Primitive(Primitive::String) => var.to_string(),
            TypeRef::Object(name) => format!("({name}*){var}"),
            TypeRef::Primitive(Primitive::Long) | TypeRef::AnyOf(_) | TypeRef::ObjectRef(_) | TypeRef::Void => {
                return Err(IdlError::unsupported(ty.to_string(), format!("argument `{var}`")))
            }
        };
        Ok(arg)
    }

    /// Right-hand side storing a native expression of type `ty` into its local
    pub fn result_cast(&self, ty: &TypeRef, native: &str) -> Result<String> {
        let rhs = match ty {
            TypeRef::Primitive(Primitive::Int) => format!("(int){native}"),
            TypeRef::Primitive(Primitive::Float | Primitive::Double) => format!("(double){native}"),
            TypeRef::Primitive(Primitive::String) => native.to_string(),
            TypeRef::Object(name) => format!("({name}*){native}"),
            TypeRef::ObjectRef(_) => format!("&{native}"),
            TypeRef::AnyOf(_) => format!("(void*){native}"),
            TypeRef::Primitive(Primitive::Long) | TypeRef::Void => {
                return Err(IdlError::unsupported(ty.to_string(), "result"))
            }
        };
        Ok(rhs)
    }

    /// Statements converting `_result` into the script value `output`.
    ///
    /// `resolver` is the native expression used to pick the prototype of an
    /// any-of value; it is ignored for every other type.
    pub fn marshal_result(&self, ty: &TypeRef, resolver: &str) -> Result<String> {
        let code = match ty {
            TypeRef::Primitive(Primitive::Int) => format!("\tJsIntToNumber({RESULT_VAR}, &output);\n"),
            TypeRef::Primitive(Primitive::Float | Primitive::Double) => {
                format!("\tJsDoubleToNumber((double){RESULT_VAR}, &output);\n")
            }
            TypeRef::Primitive(Primitive::String) => {
                let mut code = narrow_to_wide(RESULT_VAR);
                code.push_str(&wide_to_script_value(RESULT_VAR));
                code
            }
            TypeRef::Object(name) | TypeRef::ObjectRef(name) => {
                external_object(&naming::prototype(&flatten_qualified_name(name)))
            }
            TypeRef::AnyOf(type_set) => {
                let prototype = self.registry.prototype_for(&AnyOfRequest {
                    type_set,
                    resolver,
                    delegates: self.delegates,
                })?;
                external_object(&prototype)
            }
            TypeRef::Primitive(Primitive::Long) | TypeRef::Void => {
                return Err(IdlError::unsupported(ty.to_string(), "result"))
            }
        };
        Ok(code)
    }

    /// Native spelling of `ty` in a function-pointer signature
    pub fn native_type(&self, ty: &TypeRef) -> Result<String> {
        let native = match ty {
            TypeRef::Void => "void".to_string(),
            TypeRef::Primitive(Primitive::Int) => "int".to_string(),
            TypeRef::Primitive(Primitive::Float) => "float".to_string(),
            TypeRef::Primitive(Primitive::Double) => "double".to_string(),
            TypeRef::Primitive(Primitive::String) => format!("const {}&", self.options.string_type),
            TypeRef::Object(name) => format!("{name}*"),
            TypeRef::ObjectRef(name) => format!("{name}&"),
            TypeRef::AnyOf(_) => "void*".to_string(),
            TypeRef::Primitive(Primitive::Long) => {
                return Err(IdlError::unsupported(ty.to_string(), "native signature"))
            }
        };
        Ok(native)
    }
}

/// First string step: script value to a wide character buffer
fn script_value_to_wide(arg: &str, var: &str) -> String {
    format!(
        "\tJsValueRef {var}StringValue;\n\
         \tJsConvertValueToString({arg}, &{var}StringValue);\n\
         \tconst wchar_t* {var}WideString;\n\
         \tsize_t {var}WideLength;\n\
         \tJsStringToPointer({var}StringValue, &{var}WideString, &{var}WideLength);\n"
    )
}

/// Second string step: wide buffer to the narrow native string
fn wide_to_narrow(var: &str) -> String {
    format!("\t{var} = ConvertWideStringToUtf8({var}WideString, {var}WideLength);\n")
}

fn narrow_to_wide(var: &str) -> String {
    format!(
        "\tconst wchar_t* {var}WideString;\n\
         \tsize_t {var}WideLength;\n\
         \tUtf8ToWString({var}, {var}WideString, {var}WideLength);\n"
    )
}

fn wide_to_script_value(var: &str) -> String {
    format!("\tJsPointerToString({var}WideString, {var}WideLength, &output);\n")
}

fn external_object(prototype: &str) -> String {
    format!(
        "\tJsCreateExternalObject({RESULT_VAR}, nullptr, &output);\n\
         \tJsSetPrototype(output, {prototype});\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::HashedTypeSetRegistry;

    fn with_marshal(f: impl FnOnce(Marshal<'_>)) {
        let options = CodegenOptions::default();
        let registry = HashedTypeSetRegistry::new("Zmey::Chakra::Binding", "Zmey::Hash");
        f(Marshal::new(&options, &registry, &[]));
    }

    #[test]
    fn test_primitive_rules() {
        with_marshal(|m| {
            let int = TypeRef::parse("int");
            assert_eq!(m.storage(&int, "_x").unwrap(), "int _x;");
            assert_eq!(m.unmarshal(&int, "_x", 1).unwrap(), "\tJsNumberToInt(arguments[1], &_x);\n");
            assert_eq!(m.call_arg(&int, "_x").unwrap(), "(int)_x");

            let float = TypeRef::parse("float");
            assert_eq!(m.storage(&float, "_speed").unwrap(), "double _speed;");
            assert_eq!(m.call_arg(&float, "_speed").unwrap(), "(float)_speed");
            assert_eq!(
                m.marshal_result(&float, "ptr").unwrap(),
                "\tJsDoubleToNumber((double)_result, &output);\n"
            );
        });
    }

    #[test]
    fn test_string_rules_use_both_steps() {
        with_marshal(|m| {
            let string = TypeRef::parse("string");
            assert_eq!(m.storage(&string, "_name").unwrap(), "stl::string _name;");

            let code = m.unmarshal(&string, "_name", 2).unwrap();
            assert!(code.contains("JsConvertValueToString(arguments[2], &_nameStringValue);"));
            assert!(code.contains("_name = ConvertWideStringToUtf8(_nameWideString, _nameWideLength);"));

            let out = m.marshal_result(&string, "ptr").unwrap();
            assert!(out.contains("Utf8ToWString(_result, _resultWideString, _resultWideLength);"));
            assert!(out.contains("JsPointerToString(_resultWideString, _resultWideLength, &output);"));
        });
    }

    #[test]
    fn test_long_is_rejected_everywhere() {
        with_marshal(|m| {
            let long = TypeRef::parse("long");
            assert!(m.storage(&long, "_x").is_err());
            assert!(m.unmarshal(&long, "_x", 1).is_err());
            assert!(m.call_arg(&long, "_x").is_err());
            assert!(m.marshal_result(&long, "ptr").is_err());
            assert!(m.native_type(&long).is_err());
        });
    }

    #[test]
    fn test_object_rules() {
        with_marshal(|m| {
            let entity = TypeRef::parse("Zmey::Entity");
            assert_eq!(m.storage(&entity, "_e").unwrap(), "Zmey::Entity* _e;");
            assert_eq!(
                m.unmarshal(&entity, "_e", 1).unwrap(),
                "\tJsGetExternalData(arguments[1], reinterpret_cast<void**>(&_e));\n"
            );
            let out = m.marshal_result(&entity, "ptr").unwrap();
            assert!(out.contains("JsSetPrototype(output, JsZmeyEntityPrototype);"));

            let by_ref = TypeRef::parse("Zmey::Entity&");
            assert_eq!(m.result_cast(&by_ref, "ptr->Get()").unwrap(), "&ptr->Get()");
        });
    }

    #[test]
    fn test_anyof_resolves_through_registry() {
        with_marshal(|m| {
            let any = TypeRef::parse("anyof<Zmey::Components>");
            assert_eq!(m.storage(&any, RESULT_VAR).unwrap(), "void* _result;");
            let out = m.marshal_result(&any, "_type").unwrap();
            assert!(out.contains("JsCreateExternalObject(_result, nullptr, &output);"));
            assert!(out.contains("GetPrototypeOfAnyTypeSet(Zmey::Hash(\"Zmey::Components\"), _type)"));
            assert!(m.unmarshal(&any, "_v", 1).is_err());
        });
    }
}
