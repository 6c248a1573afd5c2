//! Attribute application parsing (`@name(args...)`), grounded on the
//! attribute-clause handling inside `iopc_parse_attrs` in
//! `examples/original_source/iopc/iopc-parser.c`: push attribute lex mode
//! right after `@`, read either a plain name or a `ns:name` generic name,
//! then an optional comma-separated argument list.

use crate::attrs::{ArgTokenKind, ArgValue, AttrInstance};
use crate::error::IopError;
use crate::lexer::LexMode;
use crate::token::{Literal, TokenKind};

use super::json_value::parse_json_value;
use super::Parser;

impl<'r> Parser<'r> {
    /// Parses zero or more consecutive `@attr(...)` clauses.
    pub(super) fn parse_attr_list(&mut self) -> Result<Vec<AttrInstance>, IopError> {
        let mut attrs = Vec::new();
        while self.check(TokenKind::At)? {
            attrs.push(self.parse_one_attr()?);
        }
        Ok(attrs)
    }

    fn parse_one_attr(&mut self) -> Result<AttrInstance, IopError> {
        let at = self.expect(TokenKind::At, "@")?;
        self.buf.lexer_mut().push_mode(LexMode::Attribute);

        let name_tok = self.buf.peek0().map_err(IopError::from)?.clone();
        let (generic_name, plain_name) = match name_tok.kind {
            TokenKind::GenericAttrName => {
                self.buf.drop_front(1);
                (Some(name_tok.text.clone()), None)
            }
            TokenKind::Ident => {
                self.buf.drop_front(1);
                (None, Some(name_tok.text.clone()))
            }
            _ => {
                self.buf.lexer_mut().pop_mode();
                return Err(IopError::UnexpectedToken(
                    name_tok.loc.clone(),
                    "expected an attribute name after `@`".into(),
                ));
            }
        };

        let id = if let Some(name) = &plain_name {
            match self.registry.attrs.lookup(name) {
                Some(desc) => desc.id,
                None => {
                    self.buf.lexer_mut().pop_mode();
                    return Err(IopError::Attribute(at.loc.clone(), format!("unknown attribute `@{name}`")));
                }
            }
        } else {
            crate::attrs::AttrId::Generic
        };

        let mut args = Vec::new();
        if self.check(TokenKind::LParen)? {
            self.buf.drop_front(1);
            if generic_name.is_some() {
                // Generic attributes carry one JSON body rather than a
                // typed argument list.
                if !self.check(TokenKind::RParen)? {
                    let value = parse_json_value(self)?;
                    args.push(ArgValue::Json(serde_json::to_string(&value).unwrap_or_default()));
                }
            } else if let Some(name) = &plain_name {
                let desc = self.registry.attrs.lookup(name).cloned();
                if let Some(desc) = desc {
                    if !self.check(TokenKind::RParen)? {
                        for (i, arg_desc) in desc.args.iter().enumerate() {
                            if i > 0 {
                                self.expect(TokenKind::Comma, ",")?;
                            }
                            args.push(self.parse_attr_arg(arg_desc.kind)?);
                        }
                    }
                }
            }
            self.expect(TokenKind::RParen, ")")?;
        }

        self.buf.lexer_mut().pop_mode();

        Ok(AttrInstance {
            id,
            generic_name,
            args,
            loc: at.loc,
        })
    }

    fn parse_attr_arg(&mut self, kind: ArgTokenKind) -> Result<ArgValue, IopError> {
        match kind {
            ArgTokenKind::Ident => {
                let tok = self.expect(TokenKind::Ident, "identifier")?;
                Ok(ArgValue::Ident(tok.text))
            }
            ArgTokenKind::Integer => {
                let tok = self.expect(TokenKind::IntLiteral, "integer")?;
                match tok.literal {
                    Some(Literal::Int(v, sign)) => Ok(ArgValue::from(Literal::Int(v, sign))),
                    _ => unreachable!("lexer always attaches a literal to IntLiteral"),
                }
            }
            ArgTokenKind::Double => {
                if self.check(TokenKind::DoubleLiteral)? {
                    let tok = self.expect(TokenKind::DoubleLiteral, "double")?;
                    match tok.literal {
                        Some(Literal::Double(d)) => Ok(ArgValue::F64(d)),
                        _ => unreachable!(),
                    }
                } else {
                    let tok = self.expect(TokenKind::IntLiteral, "number")?;
                    match tok.literal {
                        Some(Literal::Int(v, _)) => Ok(ArgValue::F64(v as f64)),
                        _ => unreachable!(),
                    }
                }
            }
            ArgTokenKind::Str => {
                let tok = self.expect(TokenKind::StringLiteral, "string")?;
                match tok.literal {
                    Some(Literal::String(s)) => Ok(ArgValue::Str(s)),
                    _ => Ok(ArgValue::Str(tok.text)),
                }
            }
            ArgTokenKind::Json => {
                let value = parse_json_value(self)?;
                Ok(ArgValue::Json(serde_json::to_string(&value).unwrap_or_default()))
            }
        }
    }
}
