use regex::Regex;

use crate::error::BvhError;

/// A whitespace-delimited token and the 1-based line it starts on.
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    pub text: &'a str,
    pub line: usize,
}

/// Lazy whitespace token scanner over a whole .bvh document held in memory.
///
/// Tokens come out in document order with at most one token of lookahead.
/// The scanner itself does no semantic validation; the typed `expect_*`
/// helpers consume one token each and fail with expected-vs-found context
/// on behalf of the parsers.
pub struct Tokens<'a> {
    src: &'a str,
    word: Regex,
    pos: usize,
    line: usize,
    peeked: Option<Token<'a>>,
}

impl<'a> Tokens<'a> {
    pub fn new(src: &'a str) -> Self {
        Tokens {
            src,
            word: Regex::new(r"\S+").unwrap(),
            pos: 0,
            line: 1,
            peeked: None,
        }
    }

    fn scan(&mut self) -> Option<Token<'a>> {
        let m = self.word.find_at(self.src, self.pos)?;
        // tokens never span lines, so counting up to the match start is enough
        self.line += self.src[self.pos..m.start()].matches('\n').count();
        self.pos = m.end();
        Some(Token {
            text: m.as_str(),
            line: self.line,
        })
    }

    /// Next token, or `None` at end of stream.
    pub fn next(&mut self) -> Option<Token<'a>> {
        self.peeked.take().or_else(|| self.scan())
    }

    /// One token of lookahead, without consuming it.
    pub fn peek(&mut self) -> Option<Token<'a>> {
        if self.peeked.is_none() {
            self.peeked = self.scan();
        }
        self.peeked
    }

    /// Consume the next token, or fail naming what the caller was after.
    pub fn demand(&mut self, expected: &'static str) -> Result<Token<'a>, BvhError> {
        self.next().ok_or(BvhError::UnexpectedEof { expected })
    }

    pub fn expect_literal(&mut self, literal: &'static str) -> Result<(), BvhError> {
        let tok = self.demand(literal)?;
        if tok.text != literal {
            return Err(BvhError::UnexpectedToken {
                expected: literal,
                found: tok.text.to_string(),
                line: tok.line,
            });
        }
        Ok(())
    }

    pub fn expect_f64(&mut self, expected: &'static str) -> Result<f64, BvhError> {
        let tok = self.demand(expected)?;
        tok.text.parse::<f64>().map_err(|_| BvhError::InvalidNumber {
            expected,
            found: tok.text.to_string(),
            line: tok.line,
        })
    }

    pub fn expect_usize(&mut self, expected: &'static str) -> Result<usize, BvhError> {
        let tok = self.demand(expected)?;
        tok.text.parse::<usize>().map_err(|_| BvhError::InvalidNumber {
            expected,
            found: tok.text.to_string(),
            line: tok.line,
        })
    }
}
