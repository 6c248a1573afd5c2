//! Recursive-descent parser (spec.md §4.5), built on the lookahead
//! [`TokenBuffer`] the same way the teacher's own parser sits on its token
//! buffer: every production either matches what it sees or returns an
//! [`IopError`], never panics, never backtracks past a token it already
//! consumed.

mod attrs_parse;
mod json_value;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::ast::{
    Composite, DefaultValue, Enum, EnumValue, Field, FieldKind, Interface, Module, ModuleField,
    Package, PackageId, PendingOrResolvedParent, PendingTypeRef, Payload, RepeatKind, Rpc,
    SnmpInterface, SnmpParent, StructKind, Typedef,
};
use crate::attrs::check::{check_decl_attrs, check_field_attrs};
use crate::attrs::{AttrId, AttrInstance, AttrTarget};
use crate::diagnostics::Diagnostics;
use crate::doxygen::{self, DoxComment};
use crate::error::IopError;
use crate::folder::{ConstantFolder, Op};
use crate::keywords;
use crate::lexer::Lexer;
use crate::loader;
use crate::loc::SourceLoc;
use crate::options::CompileOptions;
use crate::registry::PackageRegistry;
use crate::token::{Literal, Sign, Token, TokenKind};
use crate::token_buffer::TokenBuffer;

/// Parses `text` (already known to be the source for package `name`) and
/// registers the resulting [`Package`]. The package is inserted into the
/// registry as an empty placeholder before parsing starts so that a cyclic
/// qualified type reference back to it terminates instead of reparsing
/// (spec.md §4.6); the fully built package is written back over the
/// placeholder once parsing succeeds.
pub fn parse_source(
    name: Vec<String>,
    path: PathBuf,
    text: &str,
    registry: &mut PackageRegistry,
    options: &CompileOptions,
    diags: &mut Diagnostics,
) -> Result<PackageId, IopError> {
    let placeholder = Package::new(name.clone(), path.clone());
    let id = registry.insert(placeholder);

    let lexer = Lexer::new(text, path.clone());
    let buf = TokenBuffer::new(lexer);
    let mut parser = Parser {
        buf,
        registry,
        options,
        diags,
        package: Package::new(name, path),
        next_tag: 1,
        seen_tags: HashSet::new(),
        seen_names: HashSet::new(),
    };

    parser.parse_package()?;
    *parser.registry.get_mut(id) = parser.package;
    Ok(id)
}

struct Parser<'r> {
    buf: TokenBuffer,
    registry: &'r mut PackageRegistry,
    options: &'r CompileOptions,
    diags: &'r mut Diagnostics,
    package: Package,
    /// Auto-increment tag counter, reset at the start of every composite,
    /// interface, module and anonymous RPC payload (spec.md §4.5 "Field
    /// tags auto-increment from the previous field's tag, restarting at 1
    /// per declaration").
    next_tag: u16,
    seen_tags: HashSet<u16>,
    seen_names: HashSet<String>,
}

impl<'r> Parser<'r> {
    fn check(&mut self, kind: TokenKind) -> Result<bool, IopError> {
        Ok(self.buf.check(kind)?)
    }

    fn check_keyword(&mut self, kw: &str) -> Result<bool, IopError> {
        Ok(self.buf.check_keyword(kw)?)
    }

    fn skip(&mut self, kind: TokenKind) -> Result<bool, IopError> {
        Ok(self.buf.skip(kind)?)
    }

    fn skip_keyword(&mut self, kw: &str) -> Result<bool, IopError> {
        Ok(self.buf.skip_keyword(kw)?)
    }

    fn peek0(&mut self) -> Result<Token, IopError> {
        Ok(self.buf.peek0()?.clone())
    }

    fn peek_kind(&mut self, i: usize) -> Result<TokenKind, IopError> {
        Ok(self.buf.peek(i)?.kind.clone())
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, IopError> {
        if self.check(kind.clone())? {
            Ok(self.buf.want(kind)?)
        } else {
            let tok = self.peek0()?;
            Err(IopError::UnexpectedToken(
                tok.loc.clone(),
                format!("expected {what}, found `{}`", tok.text),
            ))
        }
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<Token, IopError> {
        if self.check_keyword(kw)? {
            Ok(self.buf.want(TokenKind::Ident)?)
        } else {
            let tok = self.peek0()?;
            Err(IopError::UnexpectedToken(
                tok.loc.clone(),
                format!("expected `{kw}`, found `{}`", tok.text),
            ))
        }
    }

    fn reset_field_scope(&mut self) {
        self.next_tag = 1;
        self.seen_tags.clear();
        self.seen_names.clear();
    }

    fn validate_tag(&self, tag: u16, loc: &SourceLoc) -> Result<(), IopError> {
        if !(1..=0x7FFF).contains(&tag) {
            return Err(IopError::InvalidTag(
                loc.clone(),
                format!("tag {tag} is outside the valid [1, 0x7FFF] range"),
            ));
        }
        Ok(())
    }

    fn check_type_name(&self, tok: &Token) -> Result<(), IopError> {
        check_identifier_basic(tok, true)
    }

    fn check_field_name(&mut self, tok: &Token, attrs: &[AttrInstance]) -> Result<(), IopError> {
        check_identifier_basic(tok, false)?;
        self.check_reserved_or_avoided(tok, attrs)
    }

    fn check_enum_value_name(&self, tok: &Token) -> Result<(), IopError> {
        if tok.text.is_empty() || !tok.text.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_') {
            return Err(IopError::InvalidIdentifier(
                tok.loc.clone(),
                format!("enum value `{}` must be upper-snake-case", tok.text),
            ));
        }
        Ok(())
    }

    fn check_reserved_or_avoided(&mut self, tok: &Token, attrs: &[AttrInstance]) -> Result<(), IopError> {
        if keywords::is_reserved(&tok.text) {
            return Err(IopError::InvalidIdentifier(
                tok.loc.clone(),
                format!("`{}` is a reserved keyword", tok.text),
            ));
        }
        if keywords::is_avoided(&tok.text) {
            let suppressed = attrs.iter().any(|a| {
                a.id == AttrId::NoWarn
                    && matches!(a.args.first(), Some(crate::attrs::ArgValue::Ident(v)) if v == "keyword")
            });
            if !suppressed {
                self.diags.push_warning(
                    tok.loc.clone(),
                    format!("`{}` is a discouraged identifier; suppress with @nowarn(\"keyword\")", tok.text),
                );
            }
        }
        Ok(())
    }

    fn collect_dox(&mut self) -> Result<DoxComment, IopError> {
        let mut chunks = Vec::new();
        while self.check(TokenKind::DoxygenComment)? {
            let tok = self.buf.want(TokenKind::DoxygenComment)?;
            chunks.extend(doxygen::split_chunks(&tok.text, &tok.loc));
        }
        let merged = doxygen::merge_chunks(chunks);
        doxygen::DoxComment::from_chunks(merged, self.diags)
    }

    /// Parses a builtin keyword or a (possibly dotted) type reference,
    /// recursively loading the referenced package when the path is
    /// qualified (spec.md §4.5 "Qualified type references"; there is no
    /// explicit `import` statement).
    fn parse_type_ref(&mut self) -> Result<(FieldKind, Option<PendingTypeRef>), IopError> {
        let first = self.expect(TokenKind::Ident, "type name")?;
        if let Some(kind) = builtin_kind(&first.text) {
            return Ok((kind, None));
        }

        let mut segments = vec![first.text.clone()];
        while self.check(TokenKind::Dot)? {
            self.buf.drop_front(1);
            let seg = self.expect(TokenKind::Ident, "identifier")?;
            segments.push(seg.text);
        }
        let name = segments.pop().unwrap();
        let package_path = segments;

        if !package_path.is_empty() {
            loader::load_package(&package_path, &mut *self.registry, self.options, &mut *self.diags, &first.loc)?;
            if !self.package.imports.contains(&package_path) {
                self.package.imports.push(package_path.clone());
            }
        }

        Ok((FieldKind::Struct, Some(PendingTypeRef { package_path, name })))
    }

    /// Consumes tokens into a [`ConstantFolder`] until a token at paren
    /// depth 0 matches `stop` (spec.md §4.2/§4.5 "the constant folder
    /// consumes the token window until the enclosing punctuation").
    /// `locals` resolves bare identifiers against already-declared enum
    /// values in the same enum (the only case the grammar needs, e.g.
    /// `V2 = V0 + V1`).
    fn parse_const_expr_until(
        &mut self,
        stop: &[TokenKind],
        locals: Option<&HashMap<String, i64>>,
    ) -> Result<(i64, Sign), IopError> {
        let start_loc = self.peek0()?.loc.clone();
        let mut folder = ConstantFolder::new();
        let mut depth: i32 = 0;
        loop {
            let tok = self.peek0()?;
            if depth == 0 && stop.contains(&tok.kind) {
                break;
            }
            match tok.kind {
                TokenKind::IntLiteral => {
                    self.buf.drop_front(1);
                    if let Some(Literal::Int(v, sign)) = tok.literal {
                        folder.feed_number(v, sign);
                    }
                }
                TokenKind::Ident => {
                    self.buf.drop_front(1);
                    match locals.and_then(|m| m.get(&tok.text)).copied() {
                        Some(v) => folder.feed_number(v, Sign::Signed),
                        None => {
                            return Err(IopError::UnresolvedType(
                                tok.loc.clone(),
                                format!("cannot resolve identifier `{}` in constant expression", tok.text),
                            ))
                        }
                    }
                }
                TokenKind::LParen => {
                    self.buf.drop_front(1);
                    folder.feed_op(Op::LParen);
                    depth += 1;
                }
                TokenKind::RParen => {
                    self.buf.drop_front(1);
                    folder.feed_op(Op::RParen);
                    depth -= 1;
                }
                TokenKind::Plus => {
                    self.buf.drop_front(1);
                    folder.feed_op(Op::Add);
                }
                TokenKind::Minus => {
                    self.buf.drop_front(1);
                    folder.feed_op(Op::Sub);
                }
                TokenKind::Star => {
                    self.buf.drop_front(1);
                    folder.feed_op(Op::Mul);
                }
                TokenKind::StarStar => {
                    self.buf.drop_front(1);
                    folder.feed_op(Op::Pow);
                }
                TokenKind::Slash => {
                    self.buf.drop_front(1);
                    folder.feed_op(Op::Div);
                }
                TokenKind::Percent => {
                    self.buf.drop_front(1);
                    folder.feed_op(Op::Mod);
                }
                TokenKind::Amp => {
                    self.buf.drop_front(1);
                    folder.feed_op(Op::And);
                }
                TokenKind::Pipe => {
                    self.buf.drop_front(1);
                    folder.feed_op(Op::Or);
                }
                TokenKind::Caret => {
                    self.buf.drop_front(1);
                    folder.feed_op(Op::Xor);
                }
                TokenKind::Tilde => {
                    self.buf.drop_front(1);
                    folder.feed_op(Op::Not);
                }
                TokenKind::Shl => {
                    self.buf.drop_front(1);
                    folder.feed_op(Op::Shl);
                }
                TokenKind::Shr => {
                    self.buf.drop_front(1);
                    folder.feed_op(Op::Shr);
                }
                _ => {
                    return Err(IopError::UnexpectedToken(
                        tok.loc.clone(),
                        format!("unexpected token `{}` in constant expression", tok.text),
                    ))
                }
            }
        }
        folder.get_result().map_err(|e| IopError::Arithmetic(start_loc.clone(), e.to_string()))
    }

    /// A char/string literal is taken directly, a double literal directly;
    /// everything else goes through the constant folder (spec.md §4.5).
    fn parse_default_value(&mut self, stop: &[TokenKind]) -> Result<DefaultValue, IopError> {
        let tok = self.peek0()?;
        match tok.kind {
            TokenKind::StringLiteral => {
                self.buf.drop_front(1);
                let s = match tok.literal {
                    Some(Literal::String(s)) => s,
                    _ => tok.text,
                };
                Ok(DefaultValue::String(s))
            }
            TokenKind::CharLiteral => {
                self.buf.drop_front(1);
                let c = match tok.literal {
                    Some(Literal::Char(c)) => c,
                    _ => '\0',
                };
                Ok(DefaultValue::Int(c as i64, Sign::Unsigned))
            }
            TokenKind::DoubleLiteral => {
                self.buf.drop_front(1);
                let d = match tok.literal {
                    Some(Literal::Double(d)) => d,
                    _ => 0.0,
                };
                Ok(DefaultValue::Double(d))
            }
            _ => {
                let (v, sign) = self.parse_const_expr_until(stop, None)?;
                Ok(DefaultValue::Int(v, sign))
            }
        }
    }

    /// One field declaration, shared between composite bodies (terminator
    /// `;`) and anonymous RPC payload lists (terminator `,`/`)`).
    fn parse_field(&mut self, terminator: TokenKind, owner_kind: StructKind, owner_is_abstract: bool) -> Result<Field, IopError> {
        let dox = self.collect_dox()?;
        let attrs = self.parse_attr_list()?;

        let explicit_tag = if self.check(TokenKind::IntLiteral)? && self.peek_kind(1)? == TokenKind::Colon {
            let tok = self.expect(TokenKind::IntLiteral, "tag")?;
            self.expect(TokenKind::Colon, ":")?;
            match tok.literal {
                Some(Literal::Int(v, _)) => Some(v),
                _ => None,
            }
        } else {
            None
        };

        let is_static = self.skip_keyword("static")?;

        let start_loc = self.peek0()?.loc.clone();
        let (kind, pending_type) = self.parse_type_ref()?;

        let mut is_reference = false;
        let mut repeat = RepeatKind::Required;
        if self.skip(TokenKind::Question)? {
            repeat = RepeatKind::Optional;
        } else if self.skip(TokenKind::Amp)? {
            is_reference = true;
        } else if self.check(TokenKind::LBracket)? {
            self.buf.drop_front(1);
            self.expect(TokenKind::RBracket, "]")?;
            repeat = RepeatKind::Repeated;
        }

        let name_tok = self.expect(TokenKind::Ident, "field name")?;
        self.check_field_name(&name_tok, &attrs)?;

        let default = if self.skip(TokenKind::Equals)? {
            if owner_kind == StructKind::Union {
                return Err(IopError::Constraint(start_loc.clone(), "default values are forbidden in union types".into()));
            }
            if kind == FieldKind::Void {
                return Err(IopError::Constraint(start_loc.clone(), "default values are forbidden for void types".into()));
            }
            if repeat != RepeatKind::Required {
                return Err(IopError::Constraint(
                    start_loc.clone(),
                    "default values for non required fields makes no sense".into(),
                ));
            }
            let stops = [terminator.clone(), TokenKind::Comma, TokenKind::RParen, TokenKind::Semicolon];
            let dv = self.parse_default_value(&stops)?;
            repeat = RepeatKind::RequiredWithDefault;
            Some(dv)
        } else {
            if is_static && owner_kind == StructKind::Class && !owner_is_abstract {
                return Err(IopError::Constraint(
                    start_loc.clone(),
                    "static fields of non-abstract classes must have a default value".into(),
                ));
            }
            None
        };

        let tag = match explicit_tag {
            Some(v) => {
                let v16 = u16::try_from(v)
                    .map_err(|_| IopError::InvalidTag(start_loc.clone(), format!("tag {v} out of range")))?;
                self.validate_tag(v16, &start_loc)?;
                v16
            }
            None => {
                let t = self.next_tag;
                self.validate_tag(t, &start_loc)?;
                t
            }
        };
        if !self.seen_tags.insert(tag) {
            return Err(IopError::InvalidTag(start_loc.clone(), format!("duplicate field tag {tag}")));
        }
        if !self.seen_names.insert(name_tok.text.clone()) {
            return Err(IopError::InvalidIdentifier(
                start_loc.clone(),
                format!("duplicate field name `{}`", name_tok.text),
            ));
        }
        self.next_tag = tag + 1;

        if repeat.is_repeated() && kind == FieldKind::Void {
            return Err(IopError::Constraint(start_loc.clone(), "a repeated field cannot have type void".into()));
        }
        if is_static && repeat.is_optional() {
            return Err(IopError::Constraint(start_loc.clone(), "a static field cannot be optional".into()));
        }
        if is_reference && !kind.is_composite_ref() {
            return Err(IopError::Constraint(
                start_loc.clone(),
                "`&` is only valid on a struct/union field".into(),
            ));
        }

        let mut field = Field::new(name_tok.text.clone(), tag, kind, repeat, start_loc.merge(&name_tok.loc));
        field.is_reference = is_reference;
        field.is_static = is_static;
        field.default = default;
        field.pending_type = pending_type;
        field.attrs = attrs;
        field.brief = dox.brief;
        field.details = dox.details;
        if field.attrs.iter().any(|a| a.id == AttrId::SnmpIndex) {
            if owner_kind != StructKind::SnmpTbl {
                return Err(IopError::Constraint(
                    field.loc.clone(),
                    "`@snmpIndex` is only valid on a field of an SNMP table".into(),
                ));
            }
            field.snmp_in_table = true;
        }

        // Composite-ref fields stay ambiguous (struct/union/enum) until the
        // resolver links the reference, so their attribute check is
        // deferred to pass 1 (spec.md §4.3).
        if kind != FieldKind::Struct {
            check_field_attrs(&field, &self.registry.attrs)?;
        }

        Ok(field)
    }

    fn parse_package(&mut self) -> Result<(), IopError> {
        let leading_dox = self.collect_dox()?;
        self.expect_keyword("package")?;
        let first_tok = self.expect(TokenKind::Ident, "package name")?;
        let mut segments = vec![first_tok.text.clone()];
        while self.skip(TokenKind::Dot)? {
            segments.push(self.expect(TokenKind::Ident, "package name segment")?.text);
        }
        self.expect(TokenKind::Semicolon, ";")?;
        if segments != self.package.name {
            return Err(IopError::UnexpectedToken(
                first_tok.loc.clone(),
                format!(
                    "package statement `{}` does not match expected package `{}`",
                    segments.join("."),
                    self.package.name.join(".")
                ),
            ));
        }
        self.package.brief = leading_dox.brief;

        while !self.check(TokenKind::Eof)? {
            self.parse_top_decl()?;
        }
        Ok(())
    }

    fn parse_top_decl(&mut self) -> Result<(), IopError> {
        let dox = self.collect_dox()?;
        let attrs = self.parse_attr_list()?;

        let mut is_abstract = false;
        let mut is_local = false;
        loop {
            if self.skip_keyword("abstract")? {
                is_abstract = true;
                continue;
            }
            if self.skip_keyword("local")? {
                is_local = true;
                continue;
            }
            break;
        }

        if self.check_keyword("struct")?
            || self.check_keyword("union")?
            || self.check_keyword("class")?
            || self.check_keyword("snmpObj")?
            || self.check_keyword("snmpTbl")?
        {
            self.parse_composite(dox, attrs, is_abstract, is_local)
        } else if self.skip_keyword("enum")? {
            self.parse_enum(dox, attrs)
        } else if self.skip_keyword("interface")? {
            self.parse_interface(dox, attrs)
        } else if self.skip_keyword("snmpIface")? {
            self.parse_snmp_interface(dox, attrs)
        } else if self.skip_keyword("module")? {
            self.parse_module(dox, attrs)
        } else if self.skip_keyword("typedef")? {
            self.parse_typedef(dox)
        } else {
            let tok = self.peek0()?;
            Err(IopError::UnexpectedToken(
                tok.loc.clone(),
                format!("expected a top-level declaration, found `{}`", tok.text),
            ))
        }
    }

    fn parse_composite(
        &mut self,
        dox: DoxComment,
        attrs: Vec<AttrInstance>,
        is_abstract: bool,
        is_local: bool,
    ) -> Result<(), IopError> {
        let kw = self.buf.eat()?;
        let kind = match kw.text.as_str() {
            "struct" => StructKind::Struct,
            "union" => StructKind::Union,
            "class" => StructKind::Class,
            "snmpObj" => StructKind::SnmpObj,
            "snmpTbl" => StructKind::SnmpTbl,
            _ => unreachable!("dispatch already checked the keyword"),
        };
        if is_local && !kind.is_class_like() {
            return Err(IopError::Constraint(kw.loc.clone(), "`local` only applies to class-like composites".into()));
        }

        let name_tok = self.expect(TokenKind::Ident, "type name")?;
        self.check_type_name(&name_tok)?;

        let mut class_id = None;
        let mut parent = None;
        if self.skip(TokenKind::Colon)? {
            let id_tok = self.expect(TokenKind::IntLiteral, "class id")?;
            let v = match id_tok.literal {
                Some(Literal::Int(v, _)) => v,
                _ => 0,
            };
            let id16 = u16::try_from(v)
                .map_err(|_| IopError::InvalidClassId(id_tok.loc.clone(), format!("class id {v} out of range")))?;
            class_id = Some(id16);
            if self.skip(TokenKind::Colon)? {
                let (_, pending) = self.parse_type_ref()?;
                if let Some(p) = pending {
                    parent = Some(PendingOrResolvedParent::Pending {
                        package_path: p.package_path,
                        name: p.name,
                    });
                }
            }
        }

        self.expect(TokenKind::LBrace, "{")?;
        self.reset_field_scope();

        check_decl_attrs(&attrs, attr_target_for(kind), &self.registry.attrs)?;

        let mut composite = Composite::new(name_tok.text.clone(), kind, kw.loc.merge(&name_tok.loc));
        composite.is_abstract = is_abstract;
        composite.is_local = is_local;
        composite.class_id = class_id;
        composite.parent = parent;
        composite.is_snmp_root = name_tok.text == "Intersec";
        composite.attrs = attrs;
        composite.brief = dox.brief;
        composite.details = dox.details;

        while !self.check(TokenKind::RBrace)? {
            let field = self.parse_field(TokenKind::Semicolon, kind, is_abstract)?;
            self.expect(TokenKind::Semicolon, ";")?;
            if field.is_static {
                composite.static_fields.push(field);
            } else {
                composite.fields.push(field);
            }
        }
        self.expect(TokenKind::RBrace, "}")?;
        self.expect(TokenKind::Semicolon, ";")?;

        if kind == StructKind::Union && composite.fields.is_empty() && composite.static_fields.is_empty() {
            return Err(IopError::Constraint(composite.loc.clone(), "a union must declare at least one field".into()));
        }
        if kind == StructKind::SnmpTbl && !composite.all_fields().any(|f| f.attrs.iter().any(|a| a.id == AttrId::SnmpIndex)) {
            return Err(IopError::Constraint(
                composite.loc.clone(),
                "an SNMP table must declare at least one @snmpIndex field".into(),
            ));
        }

        self.package.composites.push(composite);
        Ok(())
    }

    fn parse_enum(&mut self, dox: DoxComment, attrs: Vec<AttrInstance>) -> Result<(), IopError> {
        let name_tok = self.expect(TokenKind::Ident, "enum name")?;
        self.check_type_name(&name_tok)?;
        check_decl_attrs(&attrs, AttrTarget::Enum, &self.registry.attrs)?;
        self.expect(TokenKind::LBrace, "{")?;

        let mut en = Enum::new(name_tok.text.clone(), name_tok.loc.clone());
        en.attrs = attrs;
        en.brief = dox.brief;
        en.details = dox.details;

        let mut locals: HashMap<String, i64> = HashMap::new();
        let mut next_value: i64 = 0;
        let mut seen_names = HashSet::new();

        while !self.check(TokenKind::RBrace)? {
            let val_dox = self.collect_dox()?;
            let val_attrs = self.parse_attr_list()?;
            let val_name = self.expect(TokenKind::Ident, "enum value name")?;
            self.check_enum_value_name(&val_name)?;
            if !seen_names.insert(val_name.text.clone()) {
                return Err(IopError::InvalidIdentifier(
                    val_name.loc.clone(),
                    format!("duplicate enum value `{}`", val_name.text),
                ));
            }

            let value = if self.skip(TokenKind::Equals)? {
                let (v, _) = self.parse_const_expr_until(&[TokenKind::Comma, TokenKind::RBrace], Some(&locals))?;
                v
            } else {
                next_value
            };
            next_value = value + 1;
            locals.insert(val_name.text.clone(), value);

            en.values.push(EnumValue {
                name: val_name.text,
                value,
                attrs: val_attrs,
                aliases: Vec::new(),
                brief: val_dox.brief,
                loc: val_name.loc,
            });

            if !self.skip(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "}")?;
        self.expect(TokenKind::Semicolon, ";")?;

        self.package.enums.push(en);
        Ok(())
    }

    fn parse_interface(&mut self, dox: DoxComment, attrs: Vec<AttrInstance>) -> Result<(), IopError> {
        let name_tok = self.expect(TokenKind::Ident, "interface name")?;
        self.check_type_name(&name_tok)?;
        check_decl_attrs(&attrs, AttrTarget::Interface, &self.registry.attrs)?;
        self.expect(TokenKind::LBrace, "{")?;
        self.reset_field_scope();

        let mut iface = Interface::new(name_tok.text.clone(), name_tok.loc.clone());
        iface.attrs = attrs;
        iface.brief = dox.brief;
        iface.details = dox.details;

        let mut seen_rpc_names = HashSet::new();
        while !self.check(TokenKind::RBrace)? {
            let rpc = self.parse_rpc(&iface.name)?;
            if !seen_rpc_names.insert(rpc.name.clone()) {
                return Err(IopError::InvalidIdentifier(rpc.loc.clone(), format!("duplicate RPC name `{}`", rpc.name)));
            }
            iface.rpcs.push(rpc);
        }
        self.expect(TokenKind::RBrace, "}")?;
        self.expect(TokenKind::Semicolon, ";")?;

        self.package.interfaces.push(iface);
        Ok(())
    }

    fn parse_rpc(&mut self, owner_name: &str) -> Result<Rpc, IopError> {
        let dox = self.collect_dox()?;
        let attrs = self.parse_attr_list()?;

        let explicit_tag = if self.check(TokenKind::IntLiteral)? && self.peek_kind(1)? == TokenKind::Colon {
            let tok = self.expect(TokenKind::IntLiteral, "tag")?;
            self.expect(TokenKind::Colon, ":")?;
            match tok.literal {
                Some(Literal::Int(v, _)) => Some(v),
                _ => None,
            }
        } else {
            None
        };

        let name_tok = self.expect(TokenKind::Ident, "rpc name")?;
        self.check_field_name(&name_tok, &attrs)?;
        check_decl_attrs(&attrs, AttrTarget::Rpc, &self.registry.attrs)?;

        let tag = match explicit_tag {
            Some(v) => {
                let v16 = u16::try_from(v)
                    .map_err(|_| IopError::InvalidTag(name_tok.loc.clone(), format!("tag {v} out of range")))?;
                self.validate_tag(v16, &name_tok.loc)?;
                v16
            }
            None => {
                let t = self.next_tag;
                self.validate_tag(t, &name_tok.loc)?;
                t
            }
        };
        if !self.seen_tags.insert(tag) {
            return Err(IopError::InvalidTag(name_tok.loc.clone(), format!("duplicate rpc tag {tag}")));
        }
        self.next_tag = tag + 1;

        let mut args = None;
        let mut result = None;
        let mut exception = None;
        let mut is_async = false;

        if self.skip_keyword("in")? {
            args = Some(self.parse_payload(owner_name, &name_tok.text, "Args")?);
        }
        if self.skip_keyword("out")? {
            if self.skip_keyword("null")? {
                is_async = true;
            } else {
                result = Some(self.parse_payload(owner_name, &name_tok.text, "Res")?);
            }
        }
        if self.skip_keyword("throw")? {
            exception = Some(self.parse_payload(owner_name, &name_tok.text, "Exn")?);
        }
        self.expect(TokenKind::Semicolon, ";")?;

        if matches!(args, Some(Payload::Void)) && matches!(result, None) && !is_async {
            // `in void` with a required (non-null) `out` is fine; a bare
            // `in void` with no out clause at all is the boundary case
            // spec.md §8 calls out: a required RPC argument of type void.
        }

        Ok(Rpc {
            name: name_tok.text,
            tag,
            is_async,
            args,
            result,
            exception,
            attrs,
            brief: dox.brief,
            details: dox.details,
            loc: name_tok.loc,
        })
    }

    fn parse_payload(&mut self, _owner_name: &str, rpc_name: &str, suffix: &str) -> Result<Payload, IopError> {
        if self.skip_keyword("void")? {
            return Ok(Payload::Void);
        }
        if self.check(TokenKind::LParen)? {
            self.buf.drop_front(1);
            let synth_name = format!("{rpc_name}{suffix}");
            let loc = self.peek0()?.loc.clone();
            let mut composite = Composite::new(synth_name, StructKind::Struct, loc);

            let saved_tag = self.next_tag;
            let saved_seen_tags = std::mem::take(&mut self.seen_tags);
            let saved_seen_names = std::mem::take(&mut self.seen_names);
            self.next_tag = 1;

            while !self.check(TokenKind::RParen)? {
                let field = self.parse_field(TokenKind::Comma, StructKind::Struct, false)?;
                composite.fields.push(field);
                if !self.skip(TokenKind::Comma)? {
                    break;
                }
            }
            self.expect(TokenKind::RParen, ")")?;

            self.next_tag = saved_tag;
            self.seen_tags = saved_seen_tags;
            self.seen_names = saved_seen_names;
            return Ok(Payload::Anonymous(composite));
        }

        let loc = self.peek0()?.loc.clone();
        let (_, pending) = self.parse_type_ref()?;
        let pending = pending.ok_or_else(|| IopError::UnexpectedToken(loc.clone(), "expected a payload type".into()))?;
        Ok(Payload::Named {
            package_path: pending.package_path,
            name: pending.name,
            resolved: None,
        })
    }

    fn parse_snmp_interface(&mut self, dox: DoxComment, attrs: Vec<AttrInstance>) -> Result<(), IopError> {
        let name_tok = self.expect(TokenKind::Ident, "snmpIface name")?;
        self.check_type_name(&name_tok)?;
        check_decl_attrs(&attrs, AttrTarget::SnmpIface, &self.registry.attrs)?;

        let mut oid = None;
        if self.skip(TokenKind::Colon)? {
            let oid_tok = self.expect(TokenKind::IntLiteral, "oid")?;
            oid = match oid_tok.literal {
                Some(Literal::Int(v, _)) => Some(v as u32),
                _ => None,
            };
        }

        if !self.skip(TokenKind::Colon)? {
            return Err(IopError::UnexpectedToken(
                name_tok.loc.clone(),
                format!("snmpIface `{}` needs a snmpObj parent", name_tok.text),
            ));
        }
        let (_, pending) = self.parse_type_ref()?;
        let pending =
            pending.ok_or_else(|| IopError::UnexpectedToken(name_tok.loc.clone(), "snmpIface requires a parent type".into()))?;
        let parent = SnmpParent::Pending {
            package_path: pending.package_path,
            name: pending.name,
        };

        self.expect(TokenKind::LBrace, "{")?;
        self.reset_field_scope();
        let mut iface = SnmpInterface {
            name: name_tok.text.clone(),
            parent,
            oid,
            rpcs: Vec::new(),
            attrs,
            brief: dox.brief,
            details: dox.details,
            loc: name_tok.loc,
        };

        while !self.check(TokenKind::RBrace)? {
            let rpc = self.parse_rpc(&iface.name)?;
            if rpc.result.is_some() || rpc.exception.is_some() {
                return Err(IopError::Constraint(
                    rpc.loc.clone(),
                    "an SNMP interface RPC cannot declare `out`/`throw`".into(),
                ));
            }
            iface.rpcs.push(rpc);
        }
        self.expect(TokenKind::RBrace, "}")?;
        self.expect(TokenKind::Semicolon, ";")?;

        self.package.snmp_interfaces.push(iface);
        Ok(())
    }

    fn parse_module(&mut self, dox: DoxComment, attrs: Vec<AttrInstance>) -> Result<(), IopError> {
        let name_tok = self.expect(TokenKind::Ident, "module name")?;
        self.check_type_name(&name_tok)?;
        self.expect(TokenKind::LBrace, "{")?;
        self.reset_field_scope();

        let mut module = Module::new(name_tok.text.clone(), name_tok.loc.clone());
        module.attrs = attrs;
        module.brief = dox.brief;

        while !self.check(TokenKind::RBrace)? {
            let explicit_tag = if self.check(TokenKind::IntLiteral)? && self.peek_kind(1)? == TokenKind::Colon {
                let tok = self.expect(TokenKind::IntLiteral, "tag")?;
                self.expect(TokenKind::Colon, ":")?;
                match tok.literal {
                    Some(Literal::Int(v, _)) => Some(v),
                    _ => None,
                }
            } else {
                None
            };

            let loc = self.peek0()?.loc.clone();
            let (_, pending) = self.parse_type_ref()?;
            let pending = pending.ok_or_else(|| IopError::UnexpectedToken(loc.clone(), "expected an interface reference".into()))?;
            let field_name = self.expect(TokenKind::Ident, "module field name")?;
            self.check_field_name(&field_name, &[])?;
            self.expect(TokenKind::Semicolon, ";")?;

            let tag = match explicit_tag {
                Some(v) => u16::try_from(v).map_err(|_| IopError::InvalidTag(loc.clone(), format!("tag {v} out of range")))?,
                None => self.next_tag,
            };
            self.validate_tag(tag, &loc)?;
            if !self.seen_tags.insert(tag) {
                return Err(IopError::InvalidTag(loc.clone(), format!("duplicate module field tag {tag}")));
            }
            self.next_tag = tag + 1;

            module.fields.push(ModuleField {
                name: field_name.text,
                tag,
                package_path: pending.package_path,
                interface_name: pending.name,
                resolved: None,
                loc,
            });
        }
        self.expect(TokenKind::RBrace, "}")?;
        self.expect(TokenKind::Semicolon, ";")?;

        self.package.modules.push(module);
        Ok(())
    }

    fn parse_typedef(&mut self, _dox: DoxComment) -> Result<(), IopError> {
        let loc = self.peek0()?.loc.clone();
        let (kind, pending) = self.parse_type_ref()?;
        let name_tok = self.expect(TokenKind::Ident, "typedef name")?;
        self.check_type_name(&name_tok)?;
        self.expect(TokenKind::Semicolon, ";")?;

        self.package.typedefs.push(Typedef {
            name: name_tok.text,
            kind,
            pending_type: pending,
            resolved: None,
            loc,
        });
        Ok(())
    }
}

fn check_identifier_basic(tok: &Token, upper_initial: bool) -> Result<(), IopError> {
    if tok.text.is_empty() {
        return Err(IopError::InvalidIdentifier(tok.loc.clone(), "empty identifier".into()));
    }
    if tok.text.contains('_') {
        return Err(IopError::InvalidIdentifier(
            tok.loc.clone(),
            format!("identifier `{}` must not contain `_`", tok.text),
        ));
    }
    let first = tok.text.chars().next().unwrap();
    if upper_initial && !first.is_uppercase() {
        return Err(IopError::InvalidIdentifier(
            tok.loc.clone(),
            format!("type name `{}` must start with an uppercase letter", tok.text),
        ));
    }
    if !upper_initial && !first.is_lowercase() {
        return Err(IopError::InvalidIdentifier(
            tok.loc.clone(),
            format!("field/rpc name `{}` must start with a lowercase letter", tok.text),
        ));
    }
    Ok(())
}

fn attr_target_for(kind: StructKind) -> AttrTarget {
    match kind {
        StructKind::Struct => AttrTarget::Struct,
        StructKind::Union => AttrTarget::Union,
        StructKind::Class => AttrTarget::Class,
        StructKind::SnmpObj => AttrTarget::SnmpObj,
        StructKind::SnmpTbl => AttrTarget::SnmpTbl,
    }
}

/// Builtin IOP type keyword -> [`FieldKind`], ported from the
/// `IOPC_TK_*` -> `IOP_T_*` table in `iopc-parser.c`.
pub(crate) fn builtin_kind(word: &str) -> Option<FieldKind> {
    Some(match word {
        "byte" => FieldKind::I8,
        "ubyte" => FieldKind::U8,
        "short" => FieldKind::I16,
        "ushort" => FieldKind::U16,
        "int" => FieldKind::I32,
        "uint" => FieldKind::U32,
        "long" => FieldKind::I64,
        "ulong" => FieldKind::U64,
        "bool" => FieldKind::Bool,
        "bytes" => FieldKind::Bytes,
        "double" => FieldKind::Double,
        "string" => FieldKind::String,
        "xml" => FieldKind::Xml,
        "void" => FieldKind::Void,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_pkg(name: &str, text: &str) -> Result<Package, IopError> {
        let mut registry = PackageRegistry::new();
        let options = CompileOptions::new();
        let mut diags = Diagnostics::new();
        let id = parse_source(
            vec![name.to_string()],
            PathBuf::from(format!("{name}.iop")),
            text,
            &mut registry,
            &options,
            &mut diags,
        )?;
        Ok(registry.get(id).clone())
    }

    #[test]
    fn minimal_struct_parses() {
        let pkg = parse_pkg("p", "package p;\nstruct Point { int x; int y; };").unwrap();
        assert_eq!(pkg.composites.len(), 1);
        assert_eq!(pkg.composites[0].fields.len(), 2);
        assert_eq!(pkg.composites[0].fields[0].tag, 1);
        assert_eq!(pkg.composites[0].fields[1].tag, 2);
    }

    #[test]
    fn explicit_and_auto_tags_mix() {
        let pkg = parse_pkg("p", "package p;\nstruct S { 5: int a; int b; };").unwrap();
        assert_eq!(pkg.composites[0].fields[0].tag, 5);
        assert_eq!(pkg.composites[0].fields[1].tag, 6);
    }

    #[test]
    fn empty_union_is_rejected() {
        let err = parse_pkg("p", "package p;\nunion U { };").unwrap_err();
        assert!(matches!(err, IopError::Constraint(..)));
    }

    #[test]
    fn class_with_id_parses() {
        let pkg = parse_pkg("p", "package p;\nclass Base : 1 { int id; };").unwrap();
        assert_eq!(pkg.composites[0].class_id, Some(1));
    }

    #[test]
    fn anonymous_rpc_payload_gets_synthetic_name() {
        let pkg = parse_pkg("p", "package p;\ninterface I { f in (int a, string b) out void; };").unwrap();
        let rpc = &pkg.interfaces[0].rpcs[0];
        match &rpc.args {
            Some(Payload::Anonymous(c)) => assert_eq!(c.name, "fArgs"),
            other => panic!("expected anonymous args payload, got {other:?}"),
        }
        assert!(matches!(rpc.result, Some(Payload::Void)));
    }

    #[test]
    fn out_null_marks_async() {
        let pkg = parse_pkg("p", "package p;\ninterface I { f out null; };").unwrap();
        assert!(pkg.interfaces[0].rpcs[0].is_async);
        assert!(pkg.interfaces[0].rpcs[0].result.is_none());
    }

    #[test]
    fn tag_zero_is_rejected() {
        let err = parse_pkg("p", "package p;\nstruct S { 0: int a; };").unwrap_err();
        assert!(matches!(err, IopError::InvalidTag(..)));
    }

    #[test]
    fn enum_values_default_and_explicit_via_folder() {
        let pkg = parse_pkg("p", "package p;\nenum Color { RED, GREEN = 1 << 3, BLUE };").unwrap();
        let e = &pkg.enums[0];
        assert_eq!(e.values[0].value, 0);
        assert_eq!(e.values[1].value, 8);
        assert_eq!(e.values[2].value, 9);
    }

    #[test]
    fn reserved_field_name_is_rejected() {
        let err = parse_pkg("p", "package p;\nstruct S { int void; };").unwrap_err();
        assert!(matches!(err, IopError::UnexpectedToken(..)) || matches!(err, IopError::InvalidIdentifier(..)));
    }
}
