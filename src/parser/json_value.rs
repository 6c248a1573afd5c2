//! Token-driven JSON value parser, reused for `@generic` attribute argument
//! bodies (spec.md §9 "the generic-attribute JSON content is stored as a
//! pre-serialized string"). Unlike [`crate::doxygen::json`], which parses
//! raw `\example` text through its own mini scanner, this one consumes
//! tokens already produced by the main lexer/token buffer, since generic
//! attribute bodies sit inline in the `.iop` token stream.

use serde_json::{Map, Value};

use crate::error::IopError;
use crate::token::{Literal, TokenKind};

use super::Parser;

pub fn parse_json_value(p: &mut Parser) -> Result<Value, IopError> {
    let tok = p.buf.peek0().map_err(IopError::from)?.clone();
    match tok.kind {
        TokenKind::LBrace => parse_object(p),
        TokenKind::LBracket => parse_array(p),
        TokenKind::StringLiteral => {
            p.buf.drop_front(1);
            match tok.literal {
                Some(Literal::String(s)) => Ok(Value::String(s)),
                _ => Ok(Value::String(tok.text)),
            }
        }
        TokenKind::IntLiteral => {
            p.buf.drop_front(1);
            match tok.literal {
                Some(Literal::Int(v, _)) => Ok(Value::from(v)),
                _ => Ok(Value::Null),
            }
        }
        TokenKind::DoubleLiteral => {
            p.buf.drop_front(1);
            match tok.literal {
                Some(Literal::Double(d)) => Ok(serde_json::Number::from_f64(d).map(Value::Number).unwrap_or(Value::Null)),
                _ => Ok(Value::Null),
            }
        }
        TokenKind::BoolLiteral => {
            p.buf.drop_front(1);
            match tok.literal {
                Some(Literal::Bool(b)) => Ok(Value::Bool(b)),
                _ => Ok(Value::Null),
            }
        }
        TokenKind::Ident if tok.text == "null" => {
            p.buf.drop_front(1);
            Ok(Value::Null)
        }
        _ => Err(IopError::UnexpectedToken(
            tok.loc.clone(),
            format!("expected a JSON value, found `{}`", tok.text),
        )),
    }
}

fn parse_object(p: &mut Parser) -> Result<Value, IopError> {
    p.expect(TokenKind::LBrace, "{")?;
    let mut map = Map::new();
    if p.check(TokenKind::RBrace)? {
        p.buf.drop_front(1);
        return Ok(Value::Object(map));
    }
    loop {
        let key_tok = p.expect(TokenKind::StringLiteral, "object key")?;
        let key = match key_tok.literal {
            Some(Literal::String(s)) => s,
            _ => key_tok.text,
        };
        p.expect(TokenKind::Colon, ":")?;
        let value = parse_json_value(p)?;
        map.insert(key, value);
        if p.skip(TokenKind::Comma)? {
            continue;
        }
        p.expect(TokenKind::RBrace, "}")?;
        break;
    }
    Ok(Value::Object(map))
}

fn parse_array(p: &mut Parser) -> Result<Value, IopError> {
    p.expect(TokenKind::LBracket, "[")?;
    let mut items = Vec::new();
    if p.check(TokenKind::RBracket)? {
        p.buf.drop_front(1);
        return Ok(Value::Array(items));
    }
    loop {
        items.push(parse_json_value(p)?);
        if p.skip(TokenKind::Comma)? {
            continue;
        }
        p.expect(TokenKind::RBracket, "]")?;
        break;
    }
    Ok(Value::Array(items))
}
