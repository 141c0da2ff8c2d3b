//! Interface glue generation
//!
//! Emits, for one interface: a glue function per method, a getter (and
//! setter) per property, the property registration function, the constructor
//! and the projection record that registers the class with the runtime.

use tracing::{debug, warn};

use crate::ast::{ConstructorDecl, InterfaceDecl, Member, MethodDecl, Param, PropertyDecl, TypeRef};
use crate::error::Result;

use super::naming;
use super::types::{local_var, Marshal, RESULT_VAR};

/// Name of the receiver pointer inside every member glue function
const RECEIVER: &str = "ptr";

/// A property as it appears in the registration function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEntry {
    pub name: String,
    pub is_readonly: bool,
}

/// Generated code for one interface plus the tables it was built from
#[derive(Debug, Clone)]
pub struct InterfaceGlue {
    pub flattened_name: String,
    pub code: String,
    pub properties: Vec<PropertyEntry>,
    pub methods: Vec<String>,
    pub has_constructor: bool,
}

/// Names and rules shared by every member of one interface
#[derive(Debug, Clone)]
pub struct InterfaceContext<'a> {
    qualified_name: &'a str,
    flat: String,
    short_name: &'a str,
    marshal: Marshal<'a>,
}

impl<'a> InterfaceContext<'a> {
    pub fn new(iface: &'a InterfaceDecl, marshal: Marshal<'a>) -> Self {
        Self {
            qualified_name: &iface.qualified_name,
            flat: iface.flattened_name(),
            short_name: iface.short_name(),
            marshal,
        }
    }
}

#[derive(Debug, Clone)]
struct PendingConstructor {
    code: String,
    param_count: usize,
}

/// Accumulator threaded through the members of a single interface.
///
/// Method and property glue is emitted as soon as the member is seen; the
/// constructor is held back because it references the registration function,
/// which can only be written once every property is known.
#[derive(Debug, Clone, Default)]
pub struct InterfaceBuildState {
    glue: String,
    constructor: Option<PendingConstructor>,
    properties: Vec<PropertyEntry>,
    methods: Vec<String>,
}

impl InterfaceBuildState {
    /// Fold one member into the state
    pub fn accept(mut self, member: &Member, ctx: &InterfaceContext<'_>) -> Result<Self> {
        match member {
            Member::Constructor(decl) => {
                if self.constructor.is_some() {
                    warn!("{} declares more than one constructor; the last one wins", ctx.qualified_name);
                }
                self.constructor = Some(PendingConstructor {
                    code: constructor_glue(decl, ctx)?,
                    param_count: decl.params.len(),
                });
            }
            Member::Method(decl) => {
                self.glue.push_str(&method_glue(decl, ctx)?);
                self.methods.push(decl.name.clone());
            }
            Member::Property(decl) => {
                self.glue.push_str(&property_glue(decl, ctx)?);
                self.properties.push(PropertyEntry {
                    name: decl.name.clone(),
                    is_readonly: decl.is_readonly,
                });
            }
        }
        Ok(self)
    }

    /// Lay out the interface: members, registration, constructor, projection
    pub fn finish(self, ctx: &InterfaceContext<'_>) -> InterfaceGlue {
        let mut code = self.glue;
        code.push_str(&define_properties(&self.properties, ctx));
        if let Some(ctor) = &self.constructor {
            code.push_str(&ctor.code);
        }
        code.push_str(&projection(&self.methods, self.constructor.is_some(), ctx));

        debug!(
            interface = ctx.qualified_name,
            methods = self.methods.len(),
            properties = self.properties.len(),
            constructor_params = ?self.constructor.as_ref().map(|c| c.param_count),
            "generated interface glue"
        );

        InterfaceGlue {
            flattened_name: ctx.flat.clone(),
            code,
            properties: self.properties,
            methods: self.methods,
            has_constructor: self.constructor.is_some(),
        }
    }
}

/// Generate all glue for one interface
pub fn generate_interface(iface: &InterfaceDecl, marshal: Marshal<'_>) -> Result<InterfaceGlue> {
    let ctx = InterfaceContext::new(iface, marshal);
    let state = iface
        .members
        .iter()
        .try_fold(InterfaceBuildState::default(), |state, member| state.accept(member, &ctx))?;
    Ok(state.finish(&ctx))
}

fn signature(name: &str) -> String {
    format!(
        "\nJsValueRef CALLBACK {name}(JsValueRef callee, bool isConstructCall, JsValueRef* arguments, unsigned short argumentCount, void* callbackState)\n"
    )
}

/// Receiver extraction with an early return when argument 0 is not one of ours
fn receiver(qualified_name: &str) -> String {
    format!(
        "\tJsValueRef output = JS_INVALID_REFERENCE;\n\
         \tvoid* object;\n\
         \tif (JsGetExternalData(arguments[0], &object) != JsNoError)\n\
         \t{{\n\
         \t\treturn output;\n\
         \t}}\n\
         \t{qualified_name}* {RECEIVER} = static_cast<{qualified_name}*>(object);\n"
    )
}

fn unmarshal_params(params: &[Param], marshal: &Marshal<'_>) -> Result<String> {
    let mut code = String::new();
    for param in params {
        let var = local_var(&param.name);
        code.push_str(&format!("\t{}\n", marshal.storage(&param.ty, &var)?));
        code.push_str(&marshal.unmarshal(&param.ty, &var, param.script_index())?);
    }
    Ok(code)
}

fn call_args(params: &[Param], marshal: &Marshal<'_>) -> Result<String> {
    let args = params
        .iter()
        .map(|p| marshal.call_arg(&p.ty, &local_var(&p.name)))
        .collect::<Result<Vec<_>>>()?;
    Ok(args.join(", "))
}

/// Store `native` into `_result` and convert it into `output`
fn marshal_call_result(ty: &TypeRef, native: &str, resolver: &str, marshal: &Marshal<'_>) -> Result<String> {
    let mut code = format!("\t{}\n", marshal.storage(ty, RESULT_VAR)?);
    code.push_str(&format!("\t{RESULT_VAR} = {};\n", marshal.result_cast(ty, native)?));
    code.push_str(&marshal.marshal_result(ty, resolver)?);
    Ok(code)
}

fn method_glue(decl: &MethodDecl, ctx: &InterfaceContext<'_>) -> Result<String> {
    let marshal = &ctx.marshal;
    let mut code = signature(&naming::method(&ctx.flat, &decl.name));
    code.push_str("{\n");
    code.push_str(&format!(
        "\tassert(!isConstructCall && argumentCount == {});\n",
        decl.params.len() + 1
    ));
    code.push_str(&receiver(ctx.qualified_name));
    code.push_str(&unmarshal_params(&decl.params, marshal)?);

    let native = format!(
        "{RECEIVER}->{}({})",
        naming::native_member(&decl.name, decl.name_as_is),
        call_args(&decl.params, marshal)?
    );
    if decl.return_type == TypeRef::Void {
        code.push_str(&format!("\t{native};\n"));
    } else {
        // The first declared argument selects the concrete type of an any-of result
        let resolver = decl
            .params
            .first()
            .map(|p| local_var(&p.name))
            .unwrap_or_else(|| RECEIVER.to_string());
        code.push_str(&marshal_call_result(&decl.return_type, &native, &resolver, marshal)?);
    }

    code.push_str("\treturn output;\n}\n");
    Ok(code)
}

fn property_glue(decl: &PropertyDecl, ctx: &InterfaceContext<'_>) -> Result<String> {
    let marshal = &ctx.marshal;
    let member = format!("{RECEIVER}->{}", naming::native_member(&decl.name, decl.name_as_is));

    let mut code = signature(&naming::getter(&ctx.flat, &decl.name));
    code.push_str("{\n\tassert(!isConstructCall && argumentCount == 1);\n");
    code.push_str(&receiver(ctx.qualified_name));
    code.push_str(&marshal_call_result(&decl.ty, &member, RECEIVER, marshal)?);
    code.push_str("\treturn output;\n}\n");

    if decl.is_readonly {
        return Ok(code);
    }

    let var = local_var(&decl.name);
    code.push_str(&signature(&naming::setter(&ctx.flat, &decl.name)));
    code.push_str("{\n\tassert(!isConstructCall && argumentCount == 2);\n");
    code.push_str(&receiver(ctx.qualified_name));
    code.push_str(&format!("\t{}\n", marshal.storage(&decl.ty, &var)?));
    code.push_str(&marshal.unmarshal(&decl.ty, &var, 1)?);
    code.push_str(&format!("\t{member} = {};\n", marshal.call_arg(&decl.ty, &var)?));
    code.push_str("\treturn output;\n}\n");
    Ok(code)
}

fn constructor_glue(decl: &ConstructorDecl, ctx: &InterfaceContext<'_>) -> Result<String> {
    let marshal = &ctx.marshal;
    let qualified = ctx.qualified_name;

    let mut code = signature(&naming::constructor(&ctx.flat));
    code.push_str("{\n");
    code.push_str(&format!(
        "\tassert(isConstructCall && argumentCount == {});\n",
        decl.params.len() + 1
    ));
    code.push_str("\tJsValueRef output = JS_INVALID_REFERENCE;\n");
    code.push_str(&unmarshal_params(&decl.params, marshal)?);
    code.push_str(&format!(
        "\t{qualified}* object = new {qualified}({});\n",
        call_args(&decl.params, marshal)?
    ));
    code.push_str("\tJsCreateExternalObject(object, nullptr, &output);\n");
    code.push_str(&format!("\tJsSetPrototype(output, {});\n", naming::prototype(&ctx.flat)));
    code.push_str(&format!("\t{}(output);\n", naming::define_properties(&ctx.flat)));
    code.push_str("\treturn output;\n}\n");
    Ok(code)
}

fn define_properties(properties: &[PropertyEntry], ctx: &InterfaceContext<'_>) -> String {
    let binding = &ctx.marshal.options().binding_namespace;
    let mut code = format!("\nvoid {}(JsValueRef object)\n{{\n", naming::define_properties(&ctx.flat));
    for prop in properties {
        let getter = naming::getter(&ctx.flat, &prop.name);
        if prop.is_readonly {
            code.push_str(&format!(
                "\t{binding}::DefineProperty(object, L\"{}\", &{getter});\n",
                prop.name
            ));
        } else {
            code.push_str(&format!(
                "\t{binding}::DefineProperty(object, L\"{}\", &{getter}, &{});\n",
                prop.name,
                naming::setter(&ctx.flat, &prop.name)
            ));
        }
    }
    code.push_str("}\n");
    code
}

fn projection(methods: &[String], has_constructor: bool, ctx: &InterfaceContext<'_>) -> String {
    let binding = &ctx.marshal.options().binding_namespace;
    let flat = &ctx.flat;
    let constructor = if has_constructor {
        format!("&{}", naming::constructor(flat))
    } else {
        "nullptr".to_string()
    };

    let mut code = String::from("\n");
    if methods.is_empty() {
        code.push_str(&format!(
            "{binding}::AutoNativeClassProjecter {}(\n\tL\"{}\",\n\t{constructor},\n\t{}\n);\n",
            naming::projector(flat),
            ctx.short_name,
            naming::prototype(flat)
        ));
        return code;
    }

    let names = methods
        .iter()
        .map(|m| format!("L\"{m}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let funcs = methods
        .iter()
        .map(|m| format!("&{}", naming::method(flat, m)))
        .collect::<Vec<_>>()
        .join(", ");

    code.push_str(&format!("const wchar_t* {}[] = {{{names}}};\n", naming::member_names(flat)));
    code.push_str(&format!("const JsNativeFunction {}[] = {{{funcs}}};\n", naming::member_funcs(flat)));
    code.push_str(&format!(
        "{binding}::AutoNativeClassProjecter {}(\n\tL\"{}\",\n\t{constructor},\n\t{},\n\t{},\n\t{},\n\t{}\n);\n",
        naming::projector(flat),
        ctx.short_name,
        naming::prototype(flat),
        methods.len(),
        naming::member_names(flat),
        naming::member_funcs(flat)
    ));
    code
}
