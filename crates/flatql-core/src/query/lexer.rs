/// Lexer for the FlatQL query language
///
/// Turns one line of query text into an ordered list of `keyword <op> value`
/// tokens. The first token names the command and its target table.
use std::fmt;

/// Comparison and assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Equal,
    /// `!=` or `<>`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `<`
    LessThan,
    /// `>=`
    GreaterOrEqual,
    /// `<=`
    LessOrEqual,
    /// `:` or whitespace between two identifiers
    Assign,
    /// No valid operator
    Invalid,
}

impl Operator {
    /// Canonical lexeme, re-tokenizes to the same operator
    pub fn lexeme(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
            Operator::Assign => ":",
            Operator::Invalid => "?",
        }
    }

    /// True for the six relational operators
    pub fn is_comparison(self) -> bool {
        !matches!(self, Operator::Assign | Operator::Invalid)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lexeme())
    }
}

/// One parsed unit of the query language
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Text before the operator: a command or column name
    pub keyword: String,
    /// Operator joining keyword and value
    pub operator: Operator,
    /// Text after the operator, quotes removed
    pub value: String,
}

impl Token {
    /// Create a token from its three parts
    pub fn new(keyword: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            operator,
            value: value.into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.keyword, self.operator)?;
        let needs_quotes = self.value.is_empty()
            || self
                .value
                .chars()
                .any(|c| c.is_whitespace() || is_operator_char(c) || c == '\'' || c == ';');
        if needs_quotes {
            write!(f, "'{}'", self.value)
        } else {
            f.write_str(&self.value)
        }
    }
}

/// Lexer errors. All of them abort the whole statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The query holds no tokens
    Empty,
    /// An operator appeared where a value was expected
    UnexpectedOperator {
        /// Character offset into the query
        position: usize,
    },
    /// An operator with no keyword in front of it
    MissingKeyword {
        /// Character offset into the query
        position: usize,
    },
    /// `!` not followed by `=`
    InvalidOperator {
        /// Character offset into the query
        position: usize,
    },
    /// A quote outside of a value
    UnexpectedQuote {
        /// Character offset into the query
        position: usize,
    },
    /// A quoted span with no closing quote
    UnterminatedString {
        /// Character offset into the query
        position: usize,
    },
    /// A keyword at the end of the input with no value
    DanglingKeyword(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty query"),
            ParseError::UnexpectedOperator { position } => {
                write!(f, "unexpected operator at position {}", position)
            }
            ParseError::MissingKeyword { position } => {
                write!(f, "operator without keyword at position {}", position)
            }
            ParseError::InvalidOperator { position } => {
                write!(f, "invalid operator at position {}", position)
            }
            ParseError::UnexpectedQuote { position } => {
                write!(f, "unexpected quote at position {}", position)
            }
            ParseError::UnterminatedString { position } => {
                write!(f, "unterminated string starting at position {}", position)
            }
            ParseError::DanglingKeyword(keyword) => write!(f, "`{}` has no value", keyword),
        }
    }
}

impl std::error::Error for ParseError {}

fn is_operator_char(ch: char) -> bool {
    matches!(ch, ':' | '<' | '>' | '!' | '=')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Token,
    Value,
}

/// Tokenize a query string.
pub fn tokenize(query: &str) -> Result<Vec<Token>, ParseError> {
    Lexer::new(query).tokenize()
}

/// Lexer state
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    /// Create a new lexer from input string
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input.
    ///
    /// Either the complete token list or an error is returned; partially
    /// built tokens never leave this function.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        let mut state = ScanState::Token;
        let mut buffer = String::new();
        let mut keyword = String::new();
        let mut operator = Operator::Assign;

        while let Some(ch) = self.peek() {
            match ch {
                c if is_operator_char(c) => {
                    if state == ScanState::Value {
                        return Err(ParseError::UnexpectedOperator {
                            position: self.position,
                        });
                    }
                    let trimmed = buffer.trim();
                    if trimmed.is_empty() {
                        return Err(ParseError::MissingKeyword {
                            position: self.position,
                        });
                    }
                    keyword = trimmed.to_string();
                    buffer.clear();
                    operator = self.read_operator()?;
                    state = ScanState::Value;
                    self.skip_whitespace();
                }
                '\'' => {
                    if state != ScanState::Value {
                        return Err(ParseError::UnexpectedQuote {
                            position: self.position,
                        });
                    }
                    self.read_quoted(&mut buffer)?;
                }
                c if c.is_whitespace() => match state {
                    ScanState::Value => {
                        tokens.push(Token::new(
                            std::mem::take(&mut keyword),
                            operator,
                            std::mem::take(&mut buffer),
                        ));
                        state = ScanState::Token;
                        self.advance();
                    }
                    ScanState::Token => {
                        self.skip_whitespace();
                        // identifier followed by identifier: implied assignment
                        let implied = !buffer.trim().is_empty()
                            && self.peek().is_some_and(|c| !is_operator_char(c));
                        if implied {
                            keyword = buffer.trim().to_string();
                            buffer.clear();
                            operator = Operator::Assign;
                            state = ScanState::Value;
                        }
                    }
                },
                _ => {
                    buffer.push(ch);
                    self.advance();
                }
            }
        }

        match state {
            ScanState::Value => tokens.push(Token::new(keyword, operator, buffer)),
            ScanState::Token => {
                let trimmed = buffer.trim();
                if !trimmed.is_empty() {
                    return Err(ParseError::DanglingKeyword(trimmed.to_string()));
                }
            }
        }

        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn read_operator(&mut self) -> Result<Operator, ParseError> {
        let start = self.position;
        let ch = self.peek().unwrap_or_default();
        self.advance();

        let operator = match (ch, self.peek()) {
            ('>', Some('=')) => Operator::GreaterOrEqual,
            ('<', Some('=')) => Operator::LessOrEqual,
            ('<', Some('>')) => Operator::NotEqual,
            ('!', Some('=')) => Operator::NotEqual,
            ('>', _) => return Ok(Operator::GreaterThan),
            ('<', _) => return Ok(Operator::LessThan),
            ('=', _) => return Ok(Operator::Equal),
            (':', _) => return Ok(Operator::Assign),
            _ => return Err(ParseError::InvalidOperator { position: start }),
        };
        // two-character lexeme
        self.advance();
        Ok(operator)
    }

    fn read_quoted(&mut self, buffer: &mut String) -> Result<(), ParseError> {
        let start = self.position;
        self.advance(); // skip opening quote

        while let Some(ch) = self.peek() {
            if ch == '\'' {
                self.advance(); // skip closing quote
                return Ok(());
            }
            buffer.push(ch);
            self.advance();
        }

        Err(ParseError::UnterminatedString { position: start })
    }
}
