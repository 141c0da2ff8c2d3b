//! Generated symbol names
//!
//! Every symbol is `<prefix><flattened interface name><suffix>`; the native
//! binding layer relies on these exact spellings.

pub fn prototype(flat: &str) -> String {
    format!("Js{flat}Prototype")
}

pub fn constructor(flat: &str) -> String {
    format!("Js{flat}Constructor")
}

pub fn method(flat: &str, name: &str) -> String {
    format!("Js{flat}{name}")
}

pub fn getter(flat: &str, name: &str) -> String {
    format!("Js{flat}{name}Getter")
}

pub fn setter(flat: &str, name: &str) -> String {
    format!("Js{flat}{name}Setter")
}

pub fn define_properties(flat: &str) -> String {
    format!("Js{flat}DefineProperties")
}

pub fn projector(flat: &str) -> String {
    format!("{flat}Projector")
}

pub fn member_names(flat: &str) -> String {
    format!("{flat}MemberNames")
}

pub fn member_funcs(flat: &str) -> String {
    format!("{flat}MemberFuncs")
}

pub fn delegate_alias(flat: &str) -> String {
    format!("{flat}Callback")
}

pub fn delegate_cast(flat: &str) -> String {
    format!("As{flat}")
}

/// Native member name: capitalized unless the IDL asked for it as written
pub fn native_member(name: &str, name_as_is: bool) -> String {
    if name_as_is {
        return name.to_string();
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_member() {
        assert_eq!(native_member("getX", false), "GetX");
        assert_eq!(native_member("getX", true), "getX");
        assert_eq!(native_member("", false), "");
    }
}
