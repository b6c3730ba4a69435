use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenType {
    Int,        // Integer
    Float,      // Float
    Str,        // String
    Id,         // Identifier
    Underscore, // _
    LParen,     // (
    RParen,     // )
    LBracket,   // [
    RBracket,   // ]
    SColon,     // ;
    Newline,    // end of a logical line
    Plus,       // +
    Minus,      // -
    Mul,        // *
    Div,        // /
    Mod,        // %
    Comma,      // ,
    Equal,      // =

    Print, // print
    True,  // True
    False, // False
    None,  // None

    EOF,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenType,
    pub value: String,
    pub position: (usize, usize), // (line, col)
}

impl Token {
    pub fn new(kind: TokenType, value: String, line: usize, col: usize) -> Self {
        Token {
            kind,
            value,
            position: (line, col),
        }
    }

    pub fn eof(line: usize, col: usize) -> Self {
        Token::new(TokenType::EOF, String::new(), line, col)
    }

    pub fn print(&self) -> String {
        if self.value.is_empty() {
            format!("{:?}", self.kind)
        } else {
            self.value.clone()
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}:{}", self.kind, self.value)
    }
}
