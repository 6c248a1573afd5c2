//! Lookahead token buffer (spec.md §4.1).
//!
//! "The parser never peeks at raw input; it requests token `i` from a
//! buffer. The buffer lazily pulls tokens from the lexer until position `i`
//! exists... Drop operations remove the first N tokens and shift." This is
//! the teacher's token-buffer idiom (`ast/tokens` + the various
//! `pipeline/lexer.rs` wrappers) generalized to IOP tokens: a `VecDeque`
//! fronting the [`Lexer`], with the primitives the parser is built from:
//! *peek*, *check*, *check-keyword*, *want*, *skip*, *eat*, *eat-keyword*.

use std::collections::VecDeque;

use crate::error::LexError;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

pub struct TokenBuffer {
    lexer: Lexer,
    window: VecDeque<Token>,
}

impl TokenBuffer {
    pub fn new(lexer: Lexer) -> Self {
        Self {
            lexer,
            window: VecDeque::new(),
        }
    }

    fn fill_to(&mut self, i: usize) -> Result<(), LexError> {
        while self.window.len() <= i {
            let last_is_eof = self.window.back().map(|t| t.is_eof()).unwrap_or(false);
            if last_is_eof {
                let eof = self.window.back().unwrap().clone();
                self.window.push_back(eof);
            } else {
                let tok = self.lexer.next_token()?;
                self.window.push_back(tok);
            }
        }
        Ok(())
    }

    /// Look at token `i` (0 = next unconsumed token) without consuming it.
    pub fn peek(&mut self, i: usize) -> Result<&Token, LexError> {
        self.fill_to(i)?;
        Ok(&self.window[i])
    }

    pub fn peek0(&mut self) -> Result<&Token, LexError> {
        self.peek(0)
    }

    /// Remove the first `n` tokens from the front of the window. The next
    /// `peek`/`fill_to` call refills from the lexer (or re-synthesizes EOF)
    /// as needed, so it is safe to drop past the end of the window.
    pub fn drop_front(&mut self, n: usize) {
        for _ in 0..n {
            self.window.pop_front();
        }
    }

    pub fn check(&mut self, kind: TokenKind) -> Result<bool, LexError> {
        Ok(self.peek0()?.kind == kind)
    }

    pub fn check_keyword(&mut self, kw: &str) -> Result<bool, LexError> {
        let tok = self.peek0()?;
        Ok(tok.kind == TokenKind::Ident && tok.text == kw)
    }

    /// Consume and return a token of the given kind, or fail.
    pub fn want(&mut self, kind: TokenKind) -> Result<Token, LexError> {
        let tok = self.peek0()?.clone();
        debug_assert_eq!(tok.kind, kind, "want() called without a prior check()");
        self.drop_front(1);
        Ok(tok)
    }

    pub fn skip(&mut self, kind: TokenKind) -> Result<bool, LexError> {
        if self.check(kind)? {
            self.drop_front(1);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn skip_keyword(&mut self, kw: &str) -> Result<bool, LexError> {
        if self.check_keyword(kw)? {
            self.drop_front(1);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn eat(&mut self) -> Result<Token, LexError> {
        let tok = self.peek0()?.clone();
        self.drop_front(1);
        Ok(tok)
    }

    pub fn eat_keyword(&mut self) -> Result<Token, LexError> {
        self.eat()
    }

    pub fn lexer_mut(&mut self) -> &mut Lexer {
        &mut self.lexer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookahead_and_drop() {
        let mut buf = TokenBuffer::new(Lexer::new("a b c", "t.iop"));
        assert_eq!(buf.peek(0).unwrap().text, "a");
        assert_eq!(buf.peek(2).unwrap().text, "c");
        buf.drop_front(1);
        assert_eq!(buf.peek(0).unwrap().text, "b");
    }

    #[test]
    fn eof_repeats_on_overrun() {
        let mut buf = TokenBuffer::new(Lexer::new("a", "t.iop"));
        buf.drop_front(1);
        assert!(buf.peek(0).unwrap().is_eof());
        assert!(buf.peek(5).unwrap().is_eof());
    }
}
