//! Kuri parser.
//!
//! Statements are `IDENTIFIER '=' expression` or a bare expression. Binary
//! expressions use precedence climbing over [`BinaryOperator::precedence`];
//! all operators are left-associative. Prefix forms are identifiers (a call
//! when followed by `(`), numbers, strings, parenthesized expressions and a
//! unary minus that desugars to `0 - operand`.
//!
//! Every later stage walks the tree recursively, so the parser rejects trees
//! taller than [`MAX_NESTING_DEPTH`]. Height counts parentheses, calls, unary
//! minus and each left-associative fold, which makes `a + a + ... + a` as tall
//! as it is long.

use crate::domain::ast::{BinaryOperator, Literal, Node, Program};
use crate::domain::error::{ParseError, ParseErrorKind};
use crate::domain::token::{Token, TokenKind};

/// Tallest expression tree (and deepest bracket nesting) a script may build.
pub const MAX_NESTING_DEPTH: usize = 128;

/// A parsed expression and the height of its tree.
type Parsed = (Node, usize);

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn enter(&mut self, at: &Token) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(self.too_deep(at));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn bounded(&self, node: Node, height: usize, at: &Token) -> Result<Parsed, ParseError> {
        if height > MAX_NESTING_DEPTH {
            return Err(self.too_deep(at));
        }
        Ok((node, height))
    }

    fn too_deep(&self, at: &Token) -> ParseError {
        ParseError {
            kind: ParseErrorKind::NestingTooDeep,
            message: format!("expression nests deeper than {} levels", MAX_NESTING_DEPTH),
            position: at.position(),
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Result<&'a Token, ParseError> {
        match self.tokens.get(self.pos) {
            Some(token) => {
                if token.kind != TokenKind::Eof {
                    self.pos += 1;
                }
                Ok(token)
            }
            None => Err(self.end_of_input("token")),
        }
    }

    fn end_of_input(&self, expected: &str) -> ParseError {
        let position = self
            .tokens
            .last()
            .map(|t| t.position())
            .unwrap_or_default();
        ParseError {
            kind: ParseErrorKind::MissingExpression,
            message: format!("expected {}, found end of input", expected),
            position,
        }
    }

    fn unexpected(&self, token: &Token, expected: &str) -> ParseError {
        ParseError {
            kind: ParseErrorKind::UnexpectedToken,
            message: format!("unexpected {}, expected {}", token.describe(), expected),
            position: token.position(),
        }
    }

    fn missing_paren(&self, token: &Token, opened: &Token) -> ParseError {
        ParseError {
            kind: ParseErrorKind::MissingClosingParen,
            message: format!(
                "expected ')' to close '(' at {}, found {}",
                opened.position(),
                token.describe()
            ),
            position: token.position(),
        }
    }

    fn is_name(kind: TokenKind) -> bool {
        matches!(kind, TokenKind::Identifier | TokenKind::If | TokenKind::Else)
    }

    fn binary_operator(kind: TokenKind) -> Option<BinaryOperator> {
        match kind {
            TokenKind::Plus => Some(BinaryOperator::Add),
            TokenKind::Minus => Some(BinaryOperator::Sub),
            TokenKind::Star => Some(BinaryOperator::Mul),
            TokenKind::Slash => Some(BinaryOperator::Div),
            TokenKind::EqEq => Some(BinaryOperator::Eq),
            TokenKind::NotEq => Some(BinaryOperator::Ne),
            TokenKind::Gt => Some(BinaryOperator::Gt),
            TokenKind::Lt => Some(BinaryOperator::Lt),
            TokenKind::Ge => Some(BinaryOperator::Ge),
            TokenKind::Le => Some(BinaryOperator::Le),
            TokenKind::And => Some(BinaryOperator::And),
            TokenKind::Or => Some(BinaryOperator::Or),
            _ => None,
        }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut body = Vec::new();
        while self.peek_kind() != TokenKind::Eof {
            body.push(self.parse_statement()?);
        }
        Ok(Program { body })
    }

    fn parse_statement(&mut self) -> Result<Node, ParseError> {
        if Self::is_name(self.peek_kind()) && self.peek_kind_at(1) == TokenKind::Assign {
            let name = self.advance()?;
            self.advance()?;
            let (value, _) = self.parse_expression(1)?;
            let range = name.range().cover(&value.range());
            return Ok(Node::Assignment {
                name: name.literal.clone(),
                value: Box::new(value),
                range,
            });
        }
        Ok(self.parse_expression(1)?.0)
    }

    fn parse_expression(&mut self, min_precedence: u8) -> Result<Parsed, ParseError> {
        let (mut left, mut height) = self.parse_prefix()?;

        while let Some(operator) = Self::binary_operator(self.peek_kind()) {
            let precedence = operator.precedence();
            if precedence < min_precedence {
                break;
            }
            let operator_token = self.advance()?;
            self.enter(operator_token)?;
            let (right, right_height) = self.parse_expression(precedence + 1)?;
            self.leave();
            let range = left.range().cover(&right.range());
            let node = Node::BinaryExpression {
                operator,
                left: Box::new(left),
                right: Box::new(right),
                range,
            };
            (left, height) = self.bounded(node, height.max(right_height) + 1, operator_token)?;
        }

        Ok((left, height))
    }

    fn parse_prefix(&mut self) -> Result<Parsed, ParseError> {
        let token = match self.peek() {
            Some(t) => t,
            None => return Err(self.end_of_input("expression")),
        };

        match token.kind {
            kind if Self::is_name(kind) => {
                self.advance()?;
                if self.peek_kind() == TokenKind::LParen {
                    self.parse_call(token)
                } else {
                    let node = Node::Identifier {
                        name: token.literal.clone(),
                        range: token.range(),
                    };
                    Ok((node, 1))
                }
            }
            TokenKind::Number => {
                self.advance()?;
                let value = token.literal.parse::<f64>().map_err(|_| ParseError {
                    kind: ParseErrorKind::UnexpectedToken,
                    message: format!("invalid number literal '{}'", token.literal),
                    position: token.position(),
                })?;
                let node = Node::Literal {
                    value: Literal::Number(value),
                    range: token.range(),
                };
                Ok((node, 1))
            }
            TokenKind::String => {
                self.advance()?;
                let node = Node::Literal {
                    value: Literal::String(token.literal.clone()),
                    range: token.range(),
                };
                Ok((node, 1))
            }
            TokenKind::LParen => {
                self.advance()?;
                self.enter(token)?;
                let inner = self.parse_expression(1)?;
                self.leave();
                let close = match self.peek() {
                    Some(t) => t,
                    None => return Err(self.end_of_input("')'")),
                };
                if close.kind != TokenKind::RParen {
                    return Err(self.missing_paren(close, token));
                }
                self.advance()?;
                Ok(inner)
            }
            TokenKind::Minus => {
                self.advance()?;
                self.enter(token)?;
                let (operand, operand_height) = self.parse_prefix()?;
                self.leave();
                let range = token.range().cover(&operand.range());
                let node = Node::BinaryExpression {
                    operator: BinaryOperator::Sub,
                    left: Box::new(Node::Literal {
                        value: Literal::Number(0.0),
                        range: token.range(),
                    }),
                    right: Box::new(operand),
                    range,
                };
                self.bounded(node, operand_height + 1, token)
            }
            TokenKind::Eof => Err(self.end_of_input("expression")),
            _ => Err(self.unexpected(token, "expression")),
        }
    }

    fn parse_call(&mut self, callee: &'a Token) -> Result<Parsed, ParseError> {
        let open = self.advance()?;
        let mut args = Vec::new();

        if self.peek_kind() == TokenKind::RParen {
            let close = self.advance()?;
            let node = Node::CallExpression {
                callee: callee.literal.clone(),
                args,
                range: callee.range().cover(&close.range()),
            };
            return Ok((node, 1));
        }

        self.enter(open)?;
        let mut tallest = 0;
        loop {
            let (arg, arg_height) = self.parse_expression(1)?;
            tallest = tallest.max(arg_height);
            args.push(arg);
            let next = match self.peek() {
                Some(t) => t,
                None => return Err(self.end_of_input("')'")),
            };
            match next.kind {
                TokenKind::Comma => {
                    self.advance()?;
                }
                TokenKind::RParen => {
                    self.advance()?;
                    self.leave();
                    let node = Node::CallExpression {
                        callee: callee.literal.clone(),
                        args,
                        range: callee.range().cover(&next.range()),
                    };
                    return self.bounded(node, tallest + 1, callee);
                }
                TokenKind::Eof => return Err(self.missing_paren(next, open)),
                _ => return Err(self.unexpected(next, "',' or ')'")),
            }
        }
    }
}

/// Parse a full token stream (as produced by [`crate::domain::lexer::tokenize`]).
pub fn parse(tokens: &[Token]) -> Result<Program, ParseError> {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program()?;
    tracing::debug!(statements = program.body.len(), "parsed program");
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lexer::tokenize;
    use crate::domain::span::Position;

    fn parse_src(src: &str) -> Result<Program, ParseError> {
        parse(&tokenize(src).unwrap())
    }

    fn single(src: &str) -> Node {
        let mut program = parse_src(src).unwrap();
        assert_eq!(program.body.len(), 1);
        program.body.remove(0)
    }

    #[test]
    fn parse_assignment() {
        match single("x = 1") {
            Node::Assignment { name, value, .. } => {
                assert_eq!(name, "x");
                assert!(matches!(
                    *value,
                    Node::Literal {
                        value: Literal::Number(v),
                        ..
                    } if v == 1.0
                ));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn multiplication_binds_tighter() {
        // 1 + 2 * 3 => 1 + (2 * 3)
        match single("1 + 2 * 3") {
            Node::BinaryExpression {
                operator, right, ..
            } => {
                assert_eq!(operator, BinaryOperator::Add);
                assert!(matches!(
                    *right,
                    Node::BinaryExpression {
                        operator: BinaryOperator::Mul,
                        ..
                    }
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn left_associative_subtraction() {
        // 10 - 4 - 3 => (10 - 4) - 3
        match single("10 - 4 - 3") {
            Node::BinaryExpression { left, right, .. } => {
                assert!(matches!(*left, Node::BinaryExpression { .. }));
                assert!(matches!(
                    *right,
                    Node::Literal {
                        value: Literal::Number(v),
                        ..
                    } if v == 3.0
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn logical_operators_bind_loosest() {
        // a > 1 and b < 2 or c => ((a > 1) and (b < 2)) or c
        match single("a > 1 and b < 2 or c") {
            Node::BinaryExpression { operator, left, .. } => {
                assert_eq!(operator, BinaryOperator::Or);
                match *left {
                    Node::BinaryExpression {
                        operator, left, ..
                    } => {
                        assert_eq!(operator, BinaryOperator::And);
                        assert!(matches!(
                            *left,
                            Node::BinaryExpression {
                                operator: BinaryOperator::Gt,
                                ..
                            }
                        ));
                    }
                    other => panic!("expected and, got {:?}", other),
                }
            }
            other => panic!("expected or, got {:?}", other),
        }
    }

    #[test]
    fn parentheses_override_precedence() {
        match single("(1 + 2) * 3") {
            Node::BinaryExpression { operator, left, .. } => {
                assert_eq!(operator, BinaryOperator::Mul);
                assert!(matches!(
                    *left,
                    Node::BinaryExpression {
                        operator: BinaryOperator::Add,
                        ..
                    }
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn call_arguments() {
        match single("macd(close, 12, 26, 9)") {
            Node::CallExpression { callee, args, .. } => {
                assert_eq!(callee, "macd");
                assert_eq!(args.len(), 4);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn empty_call_and_dotted_callee() {
        match single("strategy.close()") {
            Node::CallExpression { callee, args, .. } => {
                assert_eq!(callee, "strategy.close");
                assert!(args.is_empty());
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn unary_minus_desugars() {
        match single("-5") {
            Node::BinaryExpression {
                operator, left, ..
            } => {
                assert_eq!(operator, BinaryOperator::Sub);
                assert!(matches!(
                    *left,
                    Node::Literal {
                        value: Literal::Number(v),
                        ..
                    } if v == 0.0
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn statements_without_separators() {
        let program = parse_src("a = 1\nb = a + 1\nplot(b)").unwrap();
        assert_eq!(program.body.len(), 3);
        assert!(matches!(program.body[2], Node::CallExpression { .. }));
    }

    #[test]
    fn reserved_conditional_parses_as_identifier() {
        let program = parse_src("if = 1").unwrap();
        assert!(matches!(
            &program.body[0],
            Node::Assignment { name, .. } if name == "if"
        ));
    }

    #[test]
    fn ranges_cover_expression() {
        let node = single("x = sma(close, 5)");
        let range = node.range();
        assert_eq!(range.start, Position::new(1, 1));
        assert_eq!(range.end, Position::new(1, 18));
    }

    #[test]
    fn unexpected_token_error() {
        let err = parse_src("x = * 2").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
        assert_eq!(err.position, Position::new(1, 5));
        assert!(err.message.contains("'*'"));
    }

    #[test]
    fn missing_closing_paren() {
        let err = parse_src("x = sma(close, 5").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingClosingParen);

        let err = parse_src("x = (1 + 2").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingClosingParen);
    }

    #[test]
    fn missing_expression() {
        let err = parse_src("x =").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingExpression);
        let err = parse_src("1 +").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingExpression);
    }

    fn nested_parens(levels: usize) -> String {
        format!("x = {}1{}", "(".repeat(levels), ")".repeat(levels))
    }

    #[test]
    fn nesting_up_to_the_ceiling_parses() {
        assert!(parse_src(&nested_parens(MAX_NESTING_DEPTH)).is_ok());
        let chain = format!("x = close{}", " + close".repeat(MAX_NESTING_DEPTH - 1));
        assert!(parse_src(&chain).is_ok());
    }

    #[test]
    fn deep_parentheses_are_rejected() {
        let err = parse_src(&nested_parens(MAX_NESTING_DEPTH + 1)).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep);
        assert_eq!(err.position, Position::new(1, 5 + MAX_NESTING_DEPTH));

        let err = parse_src(&nested_parens(5_000)).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep);
    }

    #[test]
    fn long_unary_minus_run_is_rejected() {
        let src = format!("x = {}1", "-".repeat(20_000));
        assert_eq!(parse_src(&src).unwrap_err().kind, ParseErrorKind::NestingTooDeep);
    }

    #[test]
    fn flat_chains_count_toward_the_ceiling() {
        let src = format!("x = close{}", " + close".repeat(MAX_NESTING_DEPTH));
        assert_eq!(parse_src(&src).unwrap_err().kind, ParseErrorKind::NestingTooDeep);

        let src = format!("x = close{}", " + close".repeat(50_000));
        assert_eq!(parse_src(&src).unwrap_err().kind, ParseErrorKind::NestingTooDeep);
    }

    #[test]
    fn nested_calls_count_toward_the_ceiling() {
        let src = format!("x = {}close{}", "sma(".repeat(200), ", 2)".repeat(200));
        assert_eq!(parse_src(&src).unwrap_err().kind, ParseErrorKind::NestingTooDeep);
    }

    #[test]
    fn bad_argument_separator() {
        let err = parse_src("sma(close 5)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
        assert!(err.message.contains("',' or ')'"));
    }
}
