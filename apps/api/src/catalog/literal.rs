//! Restricted list-literal parser for catalog cells such as `['Ability', 'Personality']`.
//!
//! Grammar: `[` (string (`,` string)* `,`?)? `]`, where a string is single- or
//! double-quoted with backslash escapes. Nothing else is accepted, so a cell can
//! never be interpreted as anything but a list of strings.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LiteralError {
    #[error("expected '[' at start of list literal")]
    NotAList,

    #[error("unexpected character '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("unexpected end of input")]
    UnexpectedEnd,
}

/// Parses a bracketed list of quoted strings into its elements, in order.
pub fn parse_string_list(input: &str) -> Result<Vec<String>, LiteralError> {
    let mut parser = Parser {
        chars: input.char_indices().collect(),
        pos: 0,
    };
    parser.skip_ws();
    if !parser.eat('[') {
        return Err(LiteralError::NotAList);
    }

    let mut items = Vec::new();
    loop {
        parser.skip_ws();
        match parser.peek() {
            None => return Err(LiteralError::UnexpectedEnd),
            Some((_, ']')) => {
                parser.pos += 1;
                break;
            }
            Some((offset, quote @ ('\'' | '"'))) => {
                parser.pos += 1;
                items.push(parser.string(quote, offset)?);
                parser.skip_ws();
                match parser.peek() {
                    Some((_, ',')) => parser.pos += 1,
                    Some((_, ']')) => {
                        parser.pos += 1;
                        break;
                    }
                    Some((offset, found)) => return Err(LiteralError::Unexpected { found, offset }),
                    None => return Err(LiteralError::UnexpectedEnd),
                }
            }
            Some((offset, found)) => return Err(LiteralError::Unexpected { found, offset }),
        }
    }

    parser.skip_ws();
    if let Some((offset, found)) = parser.peek() {
        return Err(LiteralError::Unexpected { found, offset });
    }
    Ok(items)
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        match self.peek() {
            Some((_, c)) if c == expected => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some((_, c)) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn string(&mut self, quote: char, start: usize) -> Result<String, LiteralError> {
        let mut out = String::new();
        loop {
            let Some((_, c)) = self.peek() else {
                return Err(LiteralError::UnterminatedString(start));
            };
            self.pos += 1;
            match c {
                '\\' => {
                    let Some((_, escaped)) = self.peek() else {
                        return Err(LiteralError::UnterminatedString(start));
                    };
                    self.pos += 1;
                    out.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                }
                c if c == quote => return Ok(out),
                c => out.push(c),
            }
        }
    }
}
