use std::str::Chars;

use crate::error::MarkupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokKind {
    /// A character that ends up in the display text.
    Char(char),
    /// Raw contents between `[` and `]`.
    Tag(String),
    OpenParen,
    CloseParen,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tok {
    pub tok: TokKind,
    pub span: Span,
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<Chars<'a>>,
    start: usize,
    current: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer { chars: src.chars().peekable(), start: 0, current: 0 }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.current += 1;
        }
        c
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn make(&self, tok: TokKind) -> Tok {
        Tok { tok, span: Span { start: self.start, end: self.current } }
    }

    fn consume_escape(&mut self) -> Result<char, MarkupError> {
        let position = self.start;
        match self.advance() {
            Some('n') => Ok('\n'),
            Some(c @ ('[' | ']' | '(' | ')' | '\\')) => Ok(c),
            _ => Err(MarkupError::BadEscape { position }),
        }
    }

    fn tag_body(&mut self) -> Result<String, MarkupError> {
        let position = self.start;
        let mut body = String::new();
        loop {
            match self.advance() {
                Some(']') => return Ok(body),
                Some('[') | None => return Err(MarkupError::UnterminatedTag { position }),
                Some(c) => body.push(c),
            }
        }
    }

    pub fn run(&mut self) -> Result<Vec<Tok>, MarkupError> {
        let mut tokens = Vec::new();
        while self.peek().is_some() {
            self.start = self.current;
            let tok = match self.advance() {
                Some('\\') => TokKind::Char(self.consume_escape()?),
                Some('[') => TokKind::Tag(self.tag_body()?),
                Some(']') => return Err(MarkupError::StrayClose { position: self.start }),
                Some('(') => TokKind::OpenParen,
                Some(')') => TokKind::CloseParen,
                Some(c) => TokKind::Char(c),
                None => break,
            };
            tokens.push(self.make(tok));
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_count_chars_not_bytes() {
        let toks = Lexer::new("é[SHAKE]").run().unwrap();
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[1].tok, TokKind::Tag("SHAKE".into()));
        assert_eq!(toks[1].span, Span { start: 1, end: 8 });
    }

    #[test]
    fn escapes() {
        let toks = Lexer::new(r"\[a\]\\").run().unwrap();
        let chars: String = toks.iter().map(|t| match t.tok {
            TokKind::Char(c) => c,
            _ => '?',
        }).collect();
        assert_eq!(chars, r"[a]\");
    }

    #[test]
    fn bad_escape_and_unterminated() {
        assert_eq!(Lexer::new(r"ab\q").run(), Err(MarkupError::BadEscape { position: 2 }));
        assert_eq!(Lexer::new("x[PAUSE=1").run(), Err(MarkupError::UnterminatedTag { position: 1 }));
        assert_eq!(Lexer::new("[A[B]").run(), Err(MarkupError::UnterminatedTag { position: 0 }));
        assert_eq!(Lexer::new("end\\").run(), Err(MarkupError::BadEscape { position: 3 }));
    }
}
