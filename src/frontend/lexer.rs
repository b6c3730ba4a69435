use crossbeam_channel::Sender;
use tracing::trace;

use super::token::{Token, TokenType};
use crate::error::ParserError;

pub struct Lexer {
    /// The channel that sends tokens concurrently
    sender: Sender<Token>,
    /// Errors encountered while tokenizing
    errors: Vec<ParserError>,
    /// The source code being tokenized
    source: Vec<char>,
    /// Current line number
    line: usize,
    /// Current column number
    col: usize,
    /// Counter for indexing the source code
    c: usize,
    /// Where the token being scanned started
    start: (usize, usize),
    /// Open brackets; a newline inside them does not end the statement
    depth: usize,
}

impl Lexer {
    pub fn new(source: &str, sender: Sender<Token>) -> Self {
        Lexer {
            sender,
            errors: vec![],
            source: source.chars().collect(),
            line: 1,
            col: 1,
            c: 0,
            start: (1, 1),
            depth: 0,
        }
    }

    /// Tokenizes the source, returning the errors encountered
    pub fn tokenize(mut self) -> Vec<ParserError> {
        while let Some(current) = self.current() {
            self.start = (self.line, self.col);
            match current {
                '\t' | ' ' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    if self.depth == 0 {
                        self.add_no_value_token(TokenType::Newline);
                    }
                    self.advance();
                }
                '\\' if self.next_char() == Some('\n') => {
                    // explicit line joining
                    self.advance();
                    self.advance();
                }
                '#' => {
                    // one-line comment
                    while !matches!(self.current(), None | Some('\n')) {
                        self.advance();
                    }
                }
                '(' | '[' => {
                    self.depth += 1;
                    self.single(if current == '(' {
                        TokenType::LParen
                    } else {
                        TokenType::LBracket
                    });
                }
                ')' | ']' => {
                    self.depth = self.depth.saturating_sub(1);
                    self.single(if current == ')' {
                        TokenType::RParen
                    } else {
                        TokenType::RBracket
                    });
                }
                ';' => self.single(TokenType::SColon),
                ',' => self.single(TokenType::Comma),
                '+' => self.single(TokenType::Plus),
                '-' => self.single(TokenType::Minus),
                '*' => self.single(TokenType::Mul),
                '/' => self.single(TokenType::Div),
                '%' => self.single(TokenType::Mod),
                '=' => self.single(TokenType::Equal),
                '"' | '\'' => self.string(current),
                c if c.is_ascii_digit() => self.number(),
                c if c.is_alphabetic() || c == '_' => self.identifier(),
                _ => {
                    self.add_error("unrecognized character");
                    self.advance();
                }
            }
        }
        self.start = (self.line, self.col);
        self.add_no_value_token(TokenType::Newline);
        self.add_no_value_token(TokenType::EOF);
        self.errors
    }

    /// Consumes a one-character token
    fn single(&mut self, kind: TokenType) {
        self.add_no_value_token(kind);
        self.advance();
    }

    /// An identifier, a keyword, or an underscore
    fn identifier(&mut self) {
        let mut var = String::new();
        while let Some(c) = self.current() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            var.push(c);
            self.advance();
        }

        if var.as_str() == "_" {
            self.add_no_value_token(TokenType::Underscore);
        } else {
            match Lexer::keyword(var.as_str()) {
                Some(kind) => self.add_no_value_token(kind),
                None => self.add_token(TokenType::Id, var),
            }
        }
    }

    /// An integer or a float
    fn number(&mut self) {
        let mut number = String::new();
        let mut had_dot = false;

        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                number.push(c);
            } else if c == '.' && !had_dot && self.next_char().map_or(false, |n| n.is_ascii_digit())
            {
                number.push(c);
                had_dot = true;
            } else {
                break;
            }
            self.advance();
        }

        if had_dot {
            self.add_token(TokenType::Float, number);
        } else {
            self.add_token(TokenType::Int, number);
        }
    }

    /// A string delimited by `quote`
    fn string(&mut self, quote: char) {
        let mut value = String::new();
        self.advance();

        loop {
            match self.current() {
                None | Some('\n') => {
                    self.add_error("unterminated string");
                    return;
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    // escape chars
                    self.advance();
                    match self.current() {
                        Some('n') => value.push('\n'),
                        Some('r') => value.push('\r'),
                        Some('t') => value.push('\t'),
                        Some('0') => value.push('\0'),
                        Some(c) => value.push(c),
                        None => continue,
                    }
                    self.advance();
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        self.add_token(TokenType::Str, value);
    }

    /// Appends the Token created with the given TokenType without any String value
    fn add_no_value_token(&mut self, kind: TokenType) {
        self.add_token(kind, String::new());
    }

    /// Sends the Token created with the given TokenType with a String value
    fn add_token(&mut self, kind: TokenType, value: String) {
        let token = Token::new(kind, value, self.start.0, self.start.1);
        trace!(token = %token, "lexed");
        if self.sender.send(token).is_err() {
            self.add_error("unable to send token");
        }
    }

    /// Returns the TokenType of the keyword if the given &str is a keyword
    fn keyword(value: &str) -> Option<TokenType> {
        match value {
            "print" => Some(TokenType::Print),
            "True" => Some(TokenType::True),
            "False" => Some(TokenType::False),
            "None" => Some(TokenType::None),
            _ => None,
        }
    }

    /// Appends the error created with the given error message and where the token started
    fn add_error(&mut self, msg: &str) {
        let error = ParserError::new(msg, self.start.0, self.start.1);
        self.errors.push(error);
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.c).copied()
    }

    /// Returns the next character without advancing
    fn next_char(&self) -> Option<char> {
        self.source.get(self.c + 1).copied()
    }

    /// Advances one character
    fn advance(&mut self) {
        if let Some(current) = self.current() {
            self.c += 1;
            if current == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }
}
