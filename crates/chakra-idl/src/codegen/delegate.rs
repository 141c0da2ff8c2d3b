//! Delegate declarations
//!
//! A delegate becomes a native function-pointer alias plus a helper that
//! casts a callback stored by the binding layer back into that alias.

use tracing::debug;

use crate::ast::DelegateDecl;
use crate::error::Result;

use super::naming;
use super::types::Marshal;

pub fn generate_delegate(decl: &DelegateDecl, marshal: &Marshal<'_>) -> Result<String> {
    let flat = decl.flattened_name();
    let alias = naming::delegate_alias(&flat);
    let return_type = marshal.native_type(&decl.return_type)?;
    let params = decl
        .params
        .iter()
        .map(|p| marshal.native_type(&p.ty))
        .collect::<Result<Vec<_>>>()?
        .join(", ");

    debug!(delegate = %decl.qualified_name, "generated delegate");

    Ok(format!(
        "using {alias} = {return_type}(*)({params});\n\
         inline {alias} {cast}(void* callback)\n\
         {{\n\
         \treturn reinterpret_cast<{alias}>(callback);\n\
         }}\n",
        cast = naming::delegate_cast(&flat),
    ))
}
