use std::rc::Rc;

use tracing::{debug, instrument};

use crate::{
    ast::{BlockStatement, Expression, FunctionLiteral, InfixOperator, PrefixOperator, Program, Statement},
    error::{ParseError, ParseErrors},
    token::{Lexer, Token, TokenKind},
};


/// Binding power of an operator token, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl Precedence {
    pub fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Eq | TokenKind::NotEq => Self::Equals,
            TokenKind::Lt | TokenKind::Gt => Self::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Self::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Self::Product,
            TokenKind::LParen => Self::Call,
            TokenKind::LBracket => Self::Index,
            _ => Self::Lowest,
        }
    }
}

type ParseResult<O> = Result<O, ParseError>;

type PrefixRule<'a> = fn(&mut Parser<'a>) -> ParseResult<Expression>;
type InfixRule<'a> = fn(&mut Parser<'a>, Expression) -> ParseResult<Expression>;

// Every rule is entered with its own token as `current` and returns with the
// last token of the parsed construct as `current`.

fn prefix_rule<'a>(kind: TokenKind) -> Option<PrefixRule<'a>> {
    use TokenKind::*;

    let rule: PrefixRule<'a> = match kind {
        Identifier => Parser::parse_identifier,
        Integer => Parser::parse_integer,
        String => Parser::parse_string,
        True | False => Parser::parse_boolean,
        Bang | Minus => Parser::parse_prefix_expression,
        LParen => Parser::parse_grouped_expression,
        LBracket => Parser::parse_array,
        LBrace => Parser::parse_hash,
        If => Parser::parse_if_expression,
        Function => Parser::parse_function_literal,
        Illegal | Eof | Assign | Plus | Asterisk | Slash | Lt | Gt | Eq | NotEq
        | Comma | Semicolon | Colon | RParen | RBrace | RBracket | Let | Else | Return => return None,
    };
    Some(rule)
}

fn infix_rule<'a>(kind: TokenKind) -> Option<InfixRule<'a>> {
    use TokenKind::*;

    let rule: InfixRule<'a> = match kind {
        Plus | Minus | Asterisk | Slash | Lt | Gt | Eq | NotEq => Parser::parse_infix_expression,
        LParen => Parser::parse_call_expression,
        LBracket => Parser::parse_index_expression,
        Illegal | Eof | Identifier | Integer | String | Assign | Bang | Comma | Semicolon | Colon
        | RParen | LBrace | RBrace | RBracket | Function | Let | True | False | If | Else | Return => return None,
    };
    Some(rule)
}

fn prefix_operator(kind: TokenKind) -> Option<PrefixOperator> {
    match kind {
        TokenKind::Bang => Some(PrefixOperator::Not),
        TokenKind::Minus => Some(PrefixOperator::Negate),
        _ => None,
    }
}

fn infix_operator(kind: TokenKind) -> Option<InfixOperator> {
    match kind {
        TokenKind::Plus => Some(InfixOperator::Add),
        TokenKind::Minus => Some(InfixOperator::Subtract),
        TokenKind::Asterisk => Some(InfixOperator::Multiply),
        TokenKind::Slash => Some(InfixOperator::Divide),
        TokenKind::Lt => Some(InfixOperator::LessThan),
        TokenKind::Gt => Some(InfixOperator::GreaterThan),
        TokenKind::Eq => Some(InfixOperator::Equal),
        TokenKind::NotEq => Some(InfixOperator::NotEqual),
        _ => None,
    }
}

/// Pratt parser over a [`Lexer`] with one token of lookahead.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
    errors: ParseErrors,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();

        Self { lexer, current, peek, errors: ParseErrors::default() }
    }

    /// Parses until end of input. Always yields a program; it is only safe to
    /// evaluate when the accompanying error list is empty.
    pub fn parse_program(mut self) -> (Program, ParseErrors) {
        let mut program = Program::default();

        while !self.current_is(TokenKind::Eof) {
            match self.parse_statement() {
                Ok(statement) => program.statements.push(statement),
                Err(error) => {
                    debug!(%error, "syntax error");
                    self.errors.push(error);
                    self.synchronize();
                }
            }
            self.advance();
        }

        (program, self.errors)
    }

    fn advance(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek.kind)
    }

    fn expect_peek(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.peek_is(kind) {
            self.advance();
            return Ok(())
        }

        Err(match self.peek.kind {
            TokenKind::Illegal => ParseError::IllegalToken(self.peek.literal.clone()),
            got => ParseError::UnexpectedToken { expected: kind, got },
        })
    }

    fn skip_semicolons(&mut self) {
        while self.peek_is(TokenKind::Semicolon) {
            self.advance();
        }
    }

    // Skip the rest of a broken statement
    fn synchronize(&mut self) {
        while !self.current_is(TokenKind::Semicolon)
            && !self.current_is(TokenKind::Eof)
            && !self.peek_is(TokenKind::Let)
            && !self.peek_is(TokenKind::Return)
        {
            self.advance();
        }
    }

    // Like `synchronize`, but stops at the `}` closing the block being parsed
    fn synchronize_block(&mut self) {
        let mut depth = 0usize;

        loop {
            match self.current.kind {
                TokenKind::Eof => return,
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::Semicolon if depth == 0 => return,
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                _ => {}
            }
            if depth == 0 && (self.peek_is(TokenKind::Let) || self.peek_is(TokenKind::Return)) { return }
            self.advance();
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    #[instrument(level = "trace", skip_all)]
    fn parse_let_statement(&mut self) -> ParseResult<Statement> {
        self.expect_peek(TokenKind::Identifier)?;
        let name = self.current.literal.clone();

        self.expect_peek(TokenKind::Assign)?;
        self.advance();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolons();

        Ok(Statement::Let { name, value })
    }

    #[instrument(level = "trace", skip_all)]
    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        self.advance();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolons();

        Ok(Statement::Return(value))
    }

    #[instrument(level = "trace", skip_all)]
    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;

        // Optional, so that a bare `5 + 5` works on a shell line
        self.skip_semicolons();

        Ok(Statement::Expression(expression))
    }

    #[instrument(level = "trace", skip_all)]
    fn parse_block(&mut self) -> ParseResult<BlockStatement> {
        let mut block = BlockStatement::default();
        self.advance();

        while !self.current_is(TokenKind::RBrace) && !self.current_is(TokenKind::Eof) {
            match self.parse_statement() {
                Ok(statement) => block.statements.push(statement),
                Err(error) => {
                    debug!(%error, "syntax error in block");
                    self.errors.push(error);
                    self.synchronize_block();
                    if self.current_is(TokenKind::RBrace) { break }
                }
            }
            self.advance();
        }

        Ok(block)
    }

    #[instrument(level = "trace", skip(self), fields(token = %self.current.kind))]
    fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expression> {
        let prefix = match prefix_rule(self.current.kind) {
            Some(rule) => rule,
            None if self.current_is(TokenKind::Illegal) => {
                return Err(ParseError::IllegalToken(self.current.literal.clone()))
            }
            None => return Err(ParseError::NoPrefixRule(self.current.kind)),
        };
        let mut left = prefix(self)?;

        while !self.peek_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            let Some(infix) = infix_rule(self.peek.kind) else { return Ok(left) };

            self.advance();
            left = infix(self, left)?;
        }

        Ok(left)
    }

    fn parse_identifier(&mut self) -> ParseResult<Expression> {
        Ok(Expression::Identifier(self.current.literal.clone()))
    }

    fn parse_integer(&mut self) -> ParseResult<Expression> {
        let literal = &self.current.literal;
        literal.replace('_', "")
            .parse()
            .map(Expression::Integer)
            .map_err(|_| ParseError::InvalidInteger(literal.clone()))
    }

    fn parse_string(&mut self) -> ParseResult<Expression> {
        Ok(Expression::String(self.current.literal.clone()))
    }

    fn parse_boolean(&mut self) -> ParseResult<Expression> {
        Ok(Expression::Boolean(self.current_is(TokenKind::True)))
    }

    #[instrument(level = "trace", skip_all)]
    fn parse_prefix_expression(&mut self) -> ParseResult<Expression> {
        let operator = prefix_operator(self.current.kind)
            .ok_or(ParseError::NoPrefixRule(self.current.kind))?;
        self.advance();

        let right = self.parse_expression(Precedence::Prefix)?;
        Ok(Expression::Prefix { operator, right: Box::new(right) })
    }

    #[instrument(level = "trace", skip_all)]
    fn parse_infix_expression(&mut self, left: Expression) -> ParseResult<Expression> {
        let operator = infix_operator(self.current.kind)
            .ok_or(ParseError::NoPrefixRule(self.current.kind))?;
        let precedence = Precedence::of(self.current.kind);
        self.advance();

        let right = self.parse_expression(precedence)?;
        Ok(Expression::Infix { operator, left: Box::new(left), right: Box::new(right) })
    }

    #[instrument(level = "trace", skip_all)]
    fn parse_grouped_expression(&mut self) -> ParseResult<Expression> {
        self.advance();

        let expression = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;

        Ok(expression)
    }

    #[instrument(level = "trace", skip_all)]
    fn parse_array(&mut self) -> ParseResult<Expression> {
        Ok(Expression::Array(self.parse_expression_list(TokenKind::RBracket)?))
    }

    #[instrument(level = "trace", skip_all)]
    fn parse_hash(&mut self) -> ParseResult<Expression> {
        let mut pairs = Vec::new();

        while !self.peek_is(TokenKind::RBrace) {
            self.advance();
            let key = self.parse_expression(Precedence::Lowest)?;

            self.expect_peek(TokenKind::Colon)?;
            self.advance();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.peek_is(TokenKind::RBrace) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }
        self.expect_peek(TokenKind::RBrace)?;

        Ok(Expression::Hash(pairs))
    }

    #[instrument(level = "trace", skip_all)]
    fn parse_if_expression(&mut self) -> ParseResult<Expression> {
        self.expect_peek(TokenKind::LParen)?;
        self.advance();

        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        self.expect_peek(TokenKind::LBrace)?;
        let consequence = self.parse_block()?;

        let alternative = if self.peek_is(TokenKind::Else) {
            self.advance();
            self.expect_peek(TokenKind::LBrace)?;
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Expression::If { condition: Box::new(condition), consequence, alternative })
    }

    #[instrument(level = "trace", skip_all)]
    fn parse_function_literal(&mut self) -> ParseResult<Expression> {
        self.expect_peek(TokenKind::LParen)?;
        let parameters = self.parse_function_parameters()?;

        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block()?;

        Ok(Expression::Function(Rc::new(FunctionLiteral { parameters, body })))
    }

    fn parse_function_parameters(&mut self) -> ParseResult<Vec<String>> {
        let mut parameters = Vec::new();

        if self.peek_is(TokenKind::RParen) {
            self.advance();
            return Ok(parameters)
        }

        self.expect_peek(TokenKind::Identifier)?;
        parameters.push(self.current.literal.clone());

        while self.peek_is(TokenKind::Comma) {
            self.advance();
            self.expect_peek(TokenKind::Identifier)?;
            parameters.push(self.current.literal.clone());
        }
        self.expect_peek(TokenKind::RParen)?;

        Ok(parameters)
    }

    #[instrument(level = "trace", skip_all)]
    fn parse_call_expression(&mut self, callee: Expression) -> ParseResult<Expression> {
        let arguments = self.parse_expression_list(TokenKind::RParen)?;
        Ok(Expression::Call { callee: Box::new(callee), arguments })
    }

    #[instrument(level = "trace", skip_all)]
    fn parse_index_expression(&mut self, collection: Expression) -> ParseResult<Expression> {
        self.advance();

        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RBracket)?;

        Ok(Expression::Index { collection: Box::new(collection), index: Box::new(index) })
    }

    // Comma separated expressions up to and including `end`
    fn parse_expression_list(&mut self, end: TokenKind) -> ParseResult<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_is(end) {
            self.advance();
            return Ok(list)
        }

        self.advance();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_is(TokenKind::Comma) {
            self.advance();
            self.advance();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_peek(end)?;

        Ok(list)
    }
}

/// Lexes and parses a whole source string.
pub fn parse(source: &str) -> Result<Program, ParseErrors> {
    let (program, errors) = Parser::new(Lexer::new(source)).parse_program();
    if !errors.is_empty() { return Err(errors) }
    Ok(program)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse_ok(source: &str) -> anyhow::Result<Program> {
        parse(source).map_err(|errors| anyhow::anyhow!("{:?} failed to parse:\n{}", source, errors))
    }

    #[test]
    fn operator_precedence() -> anyhow::Result<()> {
        let cases = [
            ("-a * b", "((-a) * b)"),
            ("!-a", "(!(-a))"),
            ("a + b + c", "((a + b) + c)"),
            ("a + b - c", "((a + b) - c)"),
            ("a * b * c", "((a * b) * c)"),
            ("a * b / c", "((a * b) / c)"),
            ("a + b * c", "(a + (b * c))"),
            ("a + b / c", "(a + (b / c))"),
            ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
            ("3 + 4; -5 * 5", "(3 + 4) ((-5) * 5)"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
            ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
            ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
            ("3 > 5 == false", "((3 > 5) == false)"),
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
            ("(5 + 5) * 2", "((5 + 5) * 2)"),
            ("2 / (5 + 5)", "(2 / (5 + 5))"),
            ("-(5 + 5)", "(-(5 + 5))"),
            ("!(true == true)", "(!(true == true))"),
        ];

        for (source, expected) in cases {
            assert_eq!(parse_ok(source)?.to_string(), expected, "{}", source);
        }
        Ok(())
    }

    #[test]
    fn call_and_index_chain_as_postfix() -> anyhow::Result<()> {
        let cases = [
            ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
            ("add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))", "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))"),
            ("add(a + b + c * d / f + g)", "add((((a + b) + ((c * d) / f)) + g))"),
            ("a * [1, 2, 3, 4][b * c] * d", "((a * ([1, 2, 3, 4][(b * c)])) * d)"),
            ("add(a * b[2], b[1], 2 * [1, 2][1])", "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))"),
            ("f(x)(y)", "f(x)(y)"),
            ("a[i][j]", "((a[i])[j])"),
            ("fn(x) { x }(1)", "fn(x) { x }(1)"),
            ("f()", "f()"),
        ];

        for (source, expected) in cases {
            assert_eq!(parse_ok(source)?.to_string(), expected, "{}", source);
        }
        Ok(())
    }

    #[test]
    fn statements() -> anyhow::Result<()> {
        let program = parse_ok("let x = 5; let y = x * 2;; return y;")?;

        assert_eq!(program.statements.len(), 3);
        assert_eq!(program.statements[0], Statement::Let { name: "x".to_owned(), value: Expression::Integer(5) });
        assert_eq!(program.to_string(), "let x = 5; let y = (x * 2); return y;");
        Ok(())
    }

    #[test]
    fn trailing_semicolon_is_optional() -> anyhow::Result<()> {
        assert_eq!(parse_ok("let x = 1")?.statements.len(), 1);
        assert_eq!(parse_ok("x + 1")?.statements.len(), 1);
        Ok(())
    }

    #[test]
    fn literals() -> anyhow::Result<()> {
        assert_eq!(parse_ok("100_000")?.statements[0], Statement::Expression(Expression::Integer(100_000)));
        assert_eq!(parse_ok(r#""hello world""#)?.to_string(), r#""hello world""#);
        assert_eq!(parse_ok("[]")?.to_string(), "[]");
        assert_eq!(parse_ok(r#"{"one": 1, "two": 1 + 1}"#)?.to_string(), r#"{"one": 1, "two": (1 + 1)}"#);
        assert_eq!(parse_ok("{}")?.to_string(), "{}");
        Ok(())
    }

    #[test]
    fn if_and_function_literals() -> anyhow::Result<()> {
        assert_eq!(parse_ok("if (x < y) { x }")?.to_string(), "if (x < y) { x }");
        assert_eq!(
            parse_ok("if (x < y) { x } else { let z = y; z }")?.to_string(),
            "if (x < y) { x } else { let z = y; z }"
        );
        assert_eq!(parse_ok("fn(x, y) { x + y; }")?.to_string(), "fn(x, y) { (x + y) }");
        assert_eq!(parse_ok("fn() {}")?.to_string(), "fn() {}");

        let program = parse_ok("fn(a, b, c) {}")?;
        match &program.statements[0] {
            Statement::Expression(Expression::Function(literal)) => assert_eq!(literal.parameters, ["a", "b", "c"]),
            other => panic!("expected a function literal, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn errors_accumulate_in_source_order() {
        let (program, errors) = Parser::new(Lexer::new("let 5;\nlet x 5;")).parse_program();

        assert!(program.statements.is_empty());
        assert_eq!(
            errors.0,
            vec![
                ParseError::UnexpectedToken { expected: TokenKind::Identifier, got: TokenKind::Integer },
                ParseError::UnexpectedToken { expected: TokenKind::Assign, got: TokenKind::Integer },
            ]
        );
    }

    #[test]
    fn recovers_at_next_statement() {
        let (program, errors) = Parser::new(Lexer::new("let = 1; 2 + 3; let y 4 let z = 5")).parse_program();

        assert_eq!(errors.len(), 2);
        assert_eq!(program.to_string(), "(2 + 3) let z = 5;");
    }

    #[test]
    fn recovers_inside_blocks() {
        let (program, errors) = Parser::new(Lexer::new("let f = fn(x) { let y 5; y }; f(1)")).parse_program();

        assert_eq!(errors.0, vec![ParseError::UnexpectedToken { expected: TokenKind::Assign, got: TokenKind::Integer }]);
        assert_eq!(program.to_string(), "let f = fn(x) { y }; f(1)");

        assert_eq!(parse("fn(x) { let y 5; y }").unwrap_err().len(), 1);
        assert_eq!(parse("fn(x) { x + }").unwrap_err().0, vec![ParseError::NoPrefixRule(TokenKind::RBrace)]);
    }

    #[test]
    fn block_recovery_stays_in_nested_block() {
        let (program, errors) = Parser::new(Lexer::new("if (a) { if (b) { let 1; } 2 } 3")).parse_program();

        assert_eq!(errors.len(), 1);
        assert_eq!(program.to_string(), "if a { if b {} 2 } 3");
    }

    #[test]
    fn missing_prefix_rule() {
        let errors = parse("let x = ;").unwrap_err();
        assert_eq!(errors.0, vec![ParseError::NoPrefixRule(TokenKind::Semicolon)]);
    }

    #[test]
    fn illegal_and_oversized_tokens() {
        assert_eq!(parse("1 + @").unwrap_err().0, vec![ParseError::IllegalToken("@".to_owned())]);
        assert_eq!(
            parse("99999999999999999999").unwrap_err().0,
            vec![ParseError::InvalidInteger("99999999999999999999".to_owned())]
        );
    }

    #[test]
    fn unclosed_group_reports_expected_token() {
        assert_eq!(
            parse("(1 + 2").unwrap_err().0,
            vec![ParseError::UnexpectedToken { expected: TokenKind::RParen, got: TokenKind::Eof }]
        );
    }
}
