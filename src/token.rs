use core::fmt;

use logos::Logos;


#[derive(Debug, Logos, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    // Never produced by logos itself, the lexer substitutes these
    Illegal,
    Eof,

    #[regex("[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    #[regex("[0-9][0-9_]*")]
    Integer,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("!")]
    Bang,
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,

    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    #[token("fn")]
    Function,
    #[token("let")]
    Let,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("return")]
    Return,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Illegal => "ILLEGAL",
            Self::Eof => "EOF",
            Self::Identifier => "IDENTIFIER",
            Self::Integer => "INTEGER",
            Self::String => "STRING",
            Self::Assign => "=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Bang => "!",
            Self::Asterisk => "*",
            Self::Slash => "/",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Colon => ":",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Function => "FUNCTION",
            Self::Let => "LET",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::If => "IF",
            Self::Else => "ELSE",
            Self::Return => "RETURN",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self { kind, literal: literal.into() }
    }

    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, "")
    }
}

/// Pull-based token stream over a source string.
///
/// The stream never fails: characters that do not start any token come back
/// as [`TokenKind::Illegal`], and once the input is exhausted every further
/// call yields [`TokenKind::Eof`].
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { inner: TokenKind::lexer(source), finished: false }
    }

    pub fn next_token(&mut self) -> Token {
        match self.inner.next() {
            Some(Ok(TokenKind::String)) => Token::new(TokenKind::String, unescape(self.inner.slice())),
            Some(Ok(kind)) => Token::new(kind, self.inner.slice()),
            Some(Err(())) => {
                // An opening quote with no closing partner swallows the rest of the input
                if self.inner.slice().starts_with('"') {
                    let remainder = self.inner.remainder().len();
                    self.inner.bump(remainder);
                }
                Token::new(TokenKind::Illegal, self.inner.slice())
            }
            None => Token::eof(),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    /// Yields every token including a single trailing `Eof`.
    fn next(&mut self) -> Option<Token> {
        if self.finished { return None }

        let token = self.next_token();
        self.finished = token.kind == TokenKind::Eof;
        Some(token)
    }
}

fn unescape(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).map(|token| token.kind).collect_vec()
    }

    #[test]
    fn lexes_statement() {
        use TokenKind::*;

        assert_eq!(
            kinds("let five = 5;\nlet add = fn(x, y) { x + y; };"),
            vec![
                Let, Identifier, Assign, Integer, Semicolon,
                Let, Identifier, Assign, Function, LParen, Identifier, Comma, Identifier, RParen,
                LBrace, Identifier, Plus, Identifier, Semicolon, RBrace, Semicolon,
                Eof,
            ]
        );
    }

    #[test]
    fn lexes_operators_and_keywords() {
        use TokenKind::*;

        assert_eq!(
            kinds("!-/*5 < > == != if else return true false [ ] : iffy"),
            vec![
                Bang, Minus, Slash, Asterisk, Integer, Lt, Gt, Eq, NotEq,
                If, Else, Return, True, False, LBracket, RBracket, Colon, Identifier,
                Eof,
            ]
        );
    }

    #[test]
    fn literals_keep_their_text() {
        let tokens = Lexer::new(r#"foo_bar 100_000 "a \"quoted\" word""#).collect_vec();

        assert_eq!(tokens[0], Token::new(TokenKind::Identifier, "foo_bar"));
        assert_eq!(tokens[1], Token::new(TokenKind::Integer, "100_000"));
        assert_eq!(tokens[2], Token::new(TokenKind::String, r#"a "quoted" word"#));
        assert_eq!(tokens[3], Token::eof());
    }

    #[test]
    fn illegal_characters_do_not_stop_the_stream() {
        let tokens = Lexer::new("1 @ 2").collect_vec();

        assert_eq!(tokens[1], Token::new(TokenKind::Illegal, "@"));
        assert_eq!(tokens[2], Token::new(TokenKind::Integer, "2"));
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn unterminated_string_is_illegal() {
        let tokens = Lexer::new(r#"len("abc"#).collect_vec();

        assert_eq!(tokens[2], Token::new(TokenKind::Illegal, r#""abc"#));
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn eof_repeats() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }
}
