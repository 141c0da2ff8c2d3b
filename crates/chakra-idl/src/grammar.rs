//! Statement patterns
//!
//! Every recognizer is anchored at the start of the text it is given and
//! returns the captured fields together with the number of bytes it consumed.
//! Matchers hold no scan position, so the same compiled pattern is shared by
//! every file and every call.

use once_cell::sync::Lazy;
use regex::Regex;

/// `(type name, type name, ...)`, the empty list included
const PARAMS: &str = r"((?:\s*[\w:]+\s+\w+\s*,)*(?:\s*[\w:]+\s+\w+\s*)?)";

/// Object name, object reference, or `anyof<TypeSet>`
const RETURN_TYPE: &str = r"([\w:]+&?|anyof<\s*[\w:]+\s*>)";

static EXTRA_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(#include\s*(?:<[^>\n]+>|"[^"\n]+"))"#).expect("valid include pattern")
});

/// Interface body: anything up to the first `}` outside a comment
const BODY: &str = r"((?:/\*(?s:.*?)\*/|//[^\n]*|[^}])*)";

static INTERFACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^interface\s+([\w:]+)\s*\{{{BODY}\}}\s*;?")).expect("valid interface pattern")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((?:(?:readonly|nameasis)\s+)*)attribute\s+([\w:]+|anyof<\s*[\w:]+\s*>)\s+(\w+)\s*;")
        .expect("valid attribute pattern")
});

static METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(nameasis\s+)?{RETURN_TYPE}\s+(\w+)\s*\({PARAMS}\)\s*;"))
        .expect("valid method pattern")
});

static CONSTRUCTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^constructor\s*\({PARAMS}\)\s*;")).expect("valid constructor pattern")
});

static DELEGATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^delegate\s+([\w:]+&?)\s+([\w:]+)\s*\({PARAMS}\)\s*;"))
        .expect("valid delegate pattern")
});

/// A recognized statement and the length of source text it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched<T> {
    pub value: T,
    pub consumed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceMatch<'a> {
    pub qualified_name: &'a str,
    pub body: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatch<'a> {
    pub is_readonly: bool,
    pub name_as_is: bool,
    pub ty: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMatch<'a> {
    pub name_as_is: bool,
    pub return_type: &'a str,
    pub name: &'a str,
    pub args: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorMatch<'a> {
    pub args: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateMatch<'a> {
    pub return_type: &'a str,
    pub qualified_name: &'a str,
    pub args: &'a str,
}

pub fn extra_header(text: &str) -> Option<Matched<&str>> {
    let caps = EXTRA_HEADER.captures(text)?;
    let line = caps.get(1)?.as_str();
    Some(Matched {
        value: line,
        consumed: caps.get(0)?.end(),
    })
}

pub fn interface(text: &str) -> Option<Matched<InterfaceMatch<'_>>> {
    let caps = INTERFACE.captures(text)?;
    Some(Matched {
        value: InterfaceMatch {
            qualified_name: caps.get(1)?.as_str(),
            body: caps.get(2)?.as_str(),
        },
        consumed: caps.get(0)?.end(),
    })
}

pub fn attribute(text: &str) -> Option<Matched<AttributeMatch<'_>>> {
    let caps = ATTRIBUTE.captures(text)?;
    let modifiers = caps.get(1).map_or("", |m| m.as_str());
    Some(Matched {
        value: AttributeMatch {
            is_readonly: modifiers.split_whitespace().any(|m| m == "readonly"),
            name_as_is: modifiers.split_whitespace().any(|m| m == "nameasis"),
            ty: caps.get(2)?.as_str(),
            name: caps.get(3)?.as_str(),
        },
        consumed: caps.get(0)?.end(),
    })
}

pub fn method(text: &str) -> Option<Matched<MethodMatch<'_>>> {
    let caps = METHOD.captures(text)?;
    Some(Matched {
        value: MethodMatch {
            name_as_is: caps.get(1).is_some(),
            return_type: caps.get(2)?.as_str(),
            name: caps.get(3)?.as_str(),
            args: caps.get(4).map_or("", |m| m.as_str()),
        },
        consumed: caps.get(0)?.end(),
    })
}

pub fn constructor(text: &str) -> Option<Matched<ConstructorMatch<'_>>> {
    let caps = CONSTRUCTOR.captures(text)?;
    Some(Matched {
        value: ConstructorMatch {
            args: caps.get(1).map_or("", |m| m.as_str()),
        },
        consumed: caps.get(0)?.end(),
    })
}

pub fn delegate(text: &str) -> Option<Matched<DelegateMatch<'_>>> {
    let caps = DELEGATE.captures(text)?;
    Some(Matched {
        value: DelegateMatch {
            return_type: caps.get(1)?.as_str(),
            qualified_name: caps.get(2)?.as_str(),
            args: caps.get(3).map_or("", |m| m.as_str()),
        },
        consumed: caps.get(0)?.end(),
    })
}

/// Length of the whitespace and comments at the start of `text`.
///
/// An unterminated block comment is left in place so the caller reports it
/// as unparseable text.
pub fn trivia_len(text: &str) -> usize {
    let mut pos = 0;
    loop {
        let rest = &text[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();

        if trimmed.starts_with("//") {
            pos += trimmed.find('\n').unwrap_or(trimmed.len());
        } else if let Some(comment) = trimmed.strip_prefix("/*") {
            match comment.find("*/") {
                Some(end) => pos += end + 4,
                None => return pos,
            }
        } else {
            return pos;
        }
    }
}
