//! IDL Parser
//!
//! Walks a source file with the statement patterns from [`crate::grammar`],
//! advancing a byte cursor past each recognized statement. A file is read in
//! a fixed order: passthrough headers, then delegates, then interfaces.

use crate::ast::*;
use crate::error::{IdlError, Result};
use crate::grammar;

/// Result of trying to recognize one interface member at the cursor
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Matched { member: Member, consumed: usize },
    NoMatch,
}

/// Top-level section the cursor is in; sections never go backwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Headers,
    Delegates,
    Interfaces,
}

/// Parse an IDL string into an AST
pub fn parse(input: &str) -> Result<IdlFile> {
    let mut file = IdlFile::default();
    let mut section = Section::Headers;
    let mut rest = input;

    loop {
        rest = &rest[grammar::trivia_len(rest)..];
        if rest.is_empty() {
            break;
        }

        if section == Section::Headers {
            if let Some(m) = grammar::extra_header(rest) {
                file.extra_headers.push(m.value.to_string());
                rest = &rest[m.consumed..];
                continue;
            }
        }

        if section <= Section::Delegates {
            if let Some(m) = grammar::delegate(rest) {
                section = Section::Delegates;
                file.delegates.push(DelegateDecl {
                    return_type: TypeRef::parse(m.value.return_type),
                    qualified_name: m.value.qualified_name.to_string(),
                    params: parse_args(m.value.args)?,
                });
                rest = &rest[m.consumed..];
                continue;
            }
        }

        match grammar::interface(rest) {
            Some(m) => {
                section = Section::Interfaces;
                file.interfaces.push(InterfaceDecl {
                    qualified_name: m.value.qualified_name.to_string(),
                    members: parse_interface_body(m.value.body)?,
                });
                rest = &rest[m.consumed..];
            }
            None => return Err(IdlError::unknown_body(rest)),
        }
    }

    Ok(file)
}

/// Parse every member of an interface body, in declaration order
pub fn parse_interface_body(body: &str) -> Result<Vec<Member>> {
    let mut members = Vec::new();
    let mut rest = body;

    loop {
        rest = &rest[grammar::trivia_len(rest)..];
        if rest.is_empty() {
            return Ok(members);
        }
        match parse_next_member(rest)? {
            ParseOutcome::Matched { member, consumed } => {
                members.push(member);
                rest = &rest[consumed..];
            }
            ParseOutcome::NoMatch => return Err(IdlError::grammar(rest)),
        }
    }
}

/// Recognize the member at the start of `body`.
///
/// Constructors are tried first, then methods, then properties.
pub fn parse_next_member(body: &str) -> Result<ParseOutcome> {
    if let Some(m) = grammar::constructor(body) {
        return Ok(ParseOutcome::Matched {
            member: Member::Constructor(ConstructorDecl {
                params: parse_args(m.value.args)?,
            }),
            consumed: m.consumed,
        });
    }

    if let Some(m) = grammar::method(body) {
        return Ok(ParseOutcome::Matched {
            member: Member::Method(MethodDecl {
                return_type: TypeRef::parse(m.value.return_type),
                name: m.value.name.to_string(),
                params: parse_args(m.value.args)?,
                name_as_is: m.value.name_as_is,
            }),
            consumed: m.consumed,
        });
    }

    if let Some(m) = grammar::attribute(body) {
        return Ok(ParseOutcome::Matched {
            member: Member::Property(PropertyDecl {
                ty: TypeRef::parse(m.value.ty),
                name: m.value.name.to_string(),
                is_readonly: m.value.is_readonly,
                name_as_is: m.value.name_as_is,
            }),
            consumed: m.consumed,
        });
    }

    Ok(ParseOutcome::NoMatch)
}

/// Split `type a, type b` into indexed parameters
pub fn parse_args(args: &str) -> Result<Vec<Param>> {
    args.split(',')
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
        .enumerate()
        .map(|(index, arg)| {
            let mut words = arg.split_whitespace();
            let ty = words.next().unwrap_or_default();
            let name = words.next().unwrap_or_default();
            let ty = TypeRef::parse(ty);
            ty.check_param(name)?;
            Ok(Param {
                ty,
                name: name.to_string(),
                index,
            })
        })
        .collect()
}
