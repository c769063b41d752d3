use super::{Keyword, Location, Symbol, Token};
use crate::error::{Error, Result};

/// Largest value an integer constant may have.
pub const MAX_INTEGER_CONSTANT: u16 = 32767;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum TokenizerState {
    /// Used when we are traversing through whitespace.
    LookingForToken,
    /// Used when we are inside double quotes.
    StringLiteral,
    IntegerLiteral,
    KeywordOrIdentifier,
    LineComment,
    /// Used for the asterisk that opens a block comment, so it cannot also close it.
    BlockCommentOpen,
    BlockComment,
    /// Used when BlockComment sees a * that might end the block.
    BlockComment2,
}

pub struct Tokenizer<'a> {
    line: usize,
    col: usize,
    input: &'a str,
    state: TokenizerState,
    /// Used when reading literals, keywords and identifiers.
    buffer: String,
    /// Where the token being read began.
    start: Location,
}

fn continues_word(c: Option<char>) -> bool {
    matches!(c, Some('a'..='z' | 'A'..='Z' | '0'..='9' | '_'))
}

impl<'a> Tokenizer<'a> {
    fn error(&self, message: String) -> Error {
        Error::Lex {
            location: Location::new(self.line, self.col),
            message,
        }
    }

    fn finish_integer_literal(&mut self) -> Result<Token> {
        let literal_text = std::mem::take(&mut self.buffer);
        self.state = TokenizerState::LookingForToken;
        match literal_text.parse::<u16>() {
            Ok(value) if value <= MAX_INTEGER_CONSTANT => Ok(Token::IntegerConstant(value)),
            _ => Err(Error::Lex {
                location: self.start,
                message: format!(
                    "Integer literal '{}' is larger than {}.",
                    literal_text, MAX_INTEGER_CONSTANT
                ),
            }),
        }
    }

    fn finish_keyword_or_identifier(&mut self) -> Token {
        let token = if let Some(keyword) = Keyword::from_text(&self.buffer[..]) {
            self.buffer.clear();
            Token::Keyword(keyword)
        } else {
            // Take the identifier out of the buffer, leaving behind an empty string.
            Token::Identifier(std::mem::take(&mut self.buffer))
        };
        self.state = TokenizerState::LookingForToken;
        token
    }

    /// `next` is the character after `c`. Words and numbers end when it cannot continue them,
    /// so the character that ends a token is never consumed along with it.
    fn process_char(&mut self, c: char, next: Option<char>) -> Result<Option<Token>> {
        use TokenizerState::*;
        match self.state {
            LookingForToken => {
                self.start = Location::new(self.line, self.col);
                match c {
                    ' ' | '\t' | '\r' | '\n' => (),
                    '0'..='9' => {
                        self.state = IntegerLiteral;
                        return self.process_char(c, next);
                    }
                    'a'..='z' | 'A'..='Z' | '_' => {
                        self.state = KeywordOrIdentifier;
                        return self.process_char(c, next);
                    }
                    // The quote itself is not part of the literal.
                    '"' => self.state = StringLiteral,
                    '/' => match next {
                        Some('*') => self.state = BlockCommentOpen,
                        Some('/') => self.state = LineComment,
                        _ => return Ok(Some(Token::Symbol(Symbol::ForwardSlash))),
                    },
                    _ => {
                        let mut utf8 = [0; 4];
                        return match Symbol::from_text(c.encode_utf8(&mut utf8)) {
                            Some(symbol) => Ok(Some(Token::Symbol(symbol))),
                            None => Err(self.error(format!("Unexpected character '{}'.", c))),
                        };
                    }
                }
            }
            StringLiteral => match c {
                '\n' => {
                    return Err(self.error("Unexpected newline in string literal.".to_owned()))
                }
                '"' if self.buffer.len() > usize::from(MAX_INTEGER_CONSTANT) => {
                    return Err(Error::Lex {
                        location: self.start,
                        message: format!(
                            "String literal is longer than {} characters.",
                            MAX_INTEGER_CONSTANT
                        ),
                    })
                }
                '"' => {
                    self.state = LookingForToken;
                    return Ok(Some(Token::StringConstant(std::mem::take(&mut self.buffer))));
                }
                c if !c.is_ascii() => {
                    return Err(self.error(format!(
                        "The character '{}' cannot appear in a string literal.",
                        c
                    )))
                }
                _ => self.buffer.push(c),
            },
            IntegerLiteral => {
                self.buffer.push(c);
                match next {
                    Some('0'..='9') => (),
                    n if continues_word(n) => {
                        return Err(Error::Lex {
                            location: Location::new(self.line, self.col + 1),
                            message: format!(
                                "Unexpected character '{}' in integer literal.",
                                n.unwrap_or_default()
                            ),
                        })
                    }
                    _ => return self.finish_integer_literal().map(Some),
                }
            }
            KeywordOrIdentifier => {
                self.buffer.push(c);
                if !continues_word(next) {
                    return Ok(Some(self.finish_keyword_or_identifier()));
                }
            }
            LineComment => {
                if c == '\n' {
                    self.state = LookingForToken;
                }
            }
            BlockCommentOpen => self.state = BlockComment,
            BlockComment => {
                if c == '*' {
                    self.state = BlockComment2;
                }
            }
            BlockComment2 => match c {
                // Another asterisk, which might still be followed by a slash.
                '*' => (),
                '/' => self.state = LookingForToken,
                _ => self.state = BlockComment,
            },
        }
        Ok(None)
    }

    /// Called when the end of the file is reached so that the last token we were parsing can finish
    /// up or be reported as unterminated.
    fn process_eof(&mut self) -> Result<Option<Token>> {
        use TokenizerState::*;
        let res = match self.state {
            LookingForToken | LineComment => Ok(None),
            StringLiteral => Err(Error::Lex {
                location: self.start,
                message: "Unterminated string literal.".to_owned(),
            }),
            IntegerLiteral => self.finish_integer_literal().map(Some),
            KeywordOrIdentifier => Ok(Some(self.finish_keyword_or_identifier())),
            BlockCommentOpen | BlockComment | BlockComment2 => Err(Error::Lex {
                location: self.start,
                message: "Unterminated block comment.".to_owned(),
            }),
        };
        // So that if process_eof gets called multiple times we don't cause any undeserved errors.
        self.state = LookingForToken;
        res
    }

    fn next_token(&mut self) -> Option<Result<(Token, Location)>> {
        loop {
            let mut chars = self.input.chars();
            let Some(c) = chars.next() else { break };
            let next = chars.next();
            if c == '\n' {
                self.line += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
            // Strings in Rust are utf-8 so some characters can be more than 1 byte long.
            self.input = &self.input[c.len_utf8()..];
            match self.process_char(c, next) {
                Ok(Some(token)) => return Some(Ok((token, self.start))),
                Ok(None) => (),
                Err(err) => {
                    // Nothing sensible can follow a lexical error.
                    self.input = "";
                    return Some(Err(err));
                }
            }
        }
        match self.process_eof() {
            Ok(Some(token)) => Some(Ok((token, self.start))),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<(Token, Location)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

pub fn tokenize(program: &str) -> Tokenizer<'_> {
    Tokenizer {
        input: program,
        line: 1,
        col: 0,
        state: TokenizerState::LookingForToken,
        buffer: String::new(),
        start: Location::new(1, 1),
    }
}
