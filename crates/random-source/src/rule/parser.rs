//! Tokenizer and recursive-descent parser for rule expressions.

use super::RuleError;

/// Parsed rule expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Call {
        name: String,
        args: Vec<Expr>,
        /// Byte offset of the function name, for error messages
        offset: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    LParen,
    RParen,
    Comma,
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("'{name}'"),
            Token::Int(v) => format!("'{v}'"),
            Token::Float(v) => format!("'{v}'"),
            Token::Str(s) => format!("string '{s}'"),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, RuleError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push((Token::LParen, offset));
            }
            ')' => {
                chars.next();
                tokens.push((Token::RParen, offset));
            }
            ',' => {
                chars.next();
                tokens.push((Token::Comma, offset));
            }
            '\'' | '"' => {
                chars.next();
                let quote = ch;
                let mut value = String::new();
                let mut terminated = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, 't')) => value.push('\t'),
                            Some((_, escaped)) => value.push(escaped),
                            None => break,
                        },
                        c if c == quote => {
                            terminated = true;
                            break;
                        }
                        c => value.push(c),
                    }
                }
                if !terminated {
                    return Err(RuleError::UnterminatedString { offset });
                }
                tokens.push((Token::Str(value), offset));
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let mut text = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    let sign_after_exponent =
                        (c == '-' || c == '+') && (text.ends_with('e') || text.ends_with('E'));
                    let leading_sign = (c == '-' || c == '+') && text.is_empty();
                    if c.is_ascii_digit()
                        || c == '.'
                        || c == 'e'
                        || c == 'E'
                        || c == '_'
                        || leading_sign
                        || sign_after_exponent
                    {
                        text.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((parse_number(&text, offset)?, offset));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((Token::Ident(name), offset));
            }
            ch => return Err(RuleError::UnexpectedChar { ch, offset }),
        }
    }

    tokens.push((Token::Eof, source.len()));
    Ok(tokens)
}

fn parse_number(text: &str, offset: usize) -> Result<Token, RuleError> {
    let invalid = || RuleError::InvalidNumber {
        text: text.to_string(),
        offset,
    };
    let digits = text.replace('_', "");
    if digits.contains(['.', 'e', 'E']) {
        digits.parse::<f64>().map(Token::Float).map_err(|_| invalid())
    } else {
        digits.parse::<i64>().map(Token::Int).map_err(|_| invalid())
    }
}

/// Deepest call nesting a rule may use.
const MAX_DEPTH: usize = 64;

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &(Token, usize) {
        // tokenize always terminates the list with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> (Token, usize) {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token, what: &'static str) -> Result<(), RuleError> {
        let (token, offset) = self.advance();
        if token == expected {
            Ok(())
        } else {
            Err(RuleError::Expected {
                expected: what,
                found: token.describe(),
                offset,
            })
        }
    }

    fn expr(&mut self, depth: usize) -> Result<Expr, RuleError> {
        let (token, offset) = self.advance();
        match token {
            Token::Int(v) => Ok(Expr::Int(v)),
            Token::Float(v) => Ok(Expr::Float(v)),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::Ident(name) if name == "true" => Ok(Expr::Bool(true)),
            Token::Ident(name) if name == "false" => Ok(Expr::Bool(false)),
            Token::Ident(name) => {
                if depth >= MAX_DEPTH {
                    return Err(RuleError::TooDeep {
                        limit: MAX_DEPTH,
                        offset,
                    });
                }
                self.expect(Token::LParen, "'('")?;
                let mut args = Vec::new();
                if self.peek().0 == Token::RParen {
                    self.advance();
                } else {
                    loop {
                        args.push(self.expr(depth + 1)?);
                        let (token, offset) = self.advance();
                        match token {
                            Token::Comma => continue,
                            Token::RParen => break,
                            other => {
                                return Err(RuleError::Expected {
                                    expected: "',' or ')'",
                                    found: other.describe(),
                                    offset,
                                })
                            }
                        }
                    }
                }
                Ok(Expr::Call { name, args, offset })
            }
            other => Err(RuleError::Expected {
                expected: "a literal or function call",
                found: other.describe(),
                offset,
            }),
        }
    }
}

/// Parse a rule expression.
pub fn parse(source: &str) -> Result<Expr, RuleError> {
    if source.trim().is_empty() {
        return Err(RuleError::Empty);
    }

    let mut parser = Parser {
        tokens: tokenize(source)?,
        pos: 0,
    };
    let expr = parser.expr(0)?;
    match parser.peek() {
        (Token::Eof, _) => Ok(expr),
        (_, offset) => Err(RuleError::TrailingInput { offset: *offset }),
    }
}
