use crate::tokenizer::{Associativity, OpKind, Token, TokenKind, Tokenizer, TokenizerError};
use achronyme_common::{EngineError, EngineErrorKind};
use smallvec::SmallVec;
use std::error::Error;
use std::fmt::{self, Display};

/// A custom error type for the parser.
#[derive(Debug)]
pub struct ParserError {
    pub message: String,
    pub position: Option<usize>,
}

impl Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pos) = self.position {
            write!(f, "ParserError at position {}: {}", pos, self.message)
        } else {
            write!(f, "ParserError: {}", self.message)
        }
    }
}

impl Error for ParserError {}

impl From<TokenizerError> for ParserError {
    fn from(err: TokenizerError) -> Self {
        ParserError {
            message: err.message,
            position: Some(err.pos),
        }
    }
}

impl From<ParserError> for EngineError {
    fn from(err: ParserError) -> Self {
        EngineError::new(EngineErrorKind::Parse).with_message(err.message)
    }
}

impl From<TokenizerError> for EngineError {
    fn from(err: TokenizerError) -> Self {
        EngineError::new(EngineErrorKind::Parse).with_message(err.message)
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Infix operators after parsing; assignment and arrow never survive to
/// the tree (they become `Let` and `Lambda` nodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    fn from_op(op: OpKind) -> Option<BinaryOp> {
        Some(match op {
            OpKind::Plus => BinaryOp::Add,
            OpKind::Minus => BinaryOp::Sub,
            OpKind::Star => BinaryOp::Mul,
            OpKind::Slash => BinaryOp::Div,
            OpKind::Percent => BinaryOp::Rem,
            OpKind::Caret => BinaryOp::Pow,
            OpKind::Eq => BinaryOp::Eq,
            OpKind::Ne => BinaryOp::Ne,
            OpKind::Lt => BinaryOp::Lt,
            OpKind::Le => BinaryOp::Le,
            OpKind::Gt => BinaryOp::Gt,
            OpKind::Ge => BinaryOp::Ge,
            OpKind::And => BinaryOp::And,
            OpKind::Or => BinaryOp::Or,
            OpKind::Not | OpKind::Assign | OpKind::Arrow => return None,
        })
    }
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    Number(f64),
    /// Imaginary literal `bi`; combined with reals by ordinary `+`/`-`.
    Imaginary(f64),
    Str(String),
    Identifier(String),
    Unary {
        op: UnaryOp,
        expr: Box<ExprNode>,
    },
    Binary {
        op: BinaryOp,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
    },
    Call {
        callee: Box<ExprNode>,
        args: Vec<ExprNode>,
    },
    Index {
        target: Box<ExprNode>,
        index: Box<ExprNode>,
    },
    Lambda {
        params: Vec<String>,
        body: Box<ExprNode>,
    },
    /// `let name = expr` (and bare `name = expr`): binds in the current
    /// environment and yields the bound value.
    Let {
        name: String,
        value: Box<ExprNode>,
    },
    VectorLit(Vec<ExprNode>),
    /// Bracket literal whose elements are all bracket literals.
    MatrixLit(Vec<Vec<ExprNode>>),
}

/// Binding power of a lambda body: everything except a further
/// assignment belongs to the body.
const ARROW_PRECEDENCE: u8 = 2;

/// A climbing parser from tokens to an expression tree.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl<T> From<T> for Parser
where
    T: AsRef<str>,
{
    fn from(source: T) -> Self {
        let tokens = Tokenizer::new(source.as_ref()).unwrap().items;
        Self::new(tokens)
    }
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            position: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn error_here(&self, message: impl Into<String>) -> ParserError {
        ParserError {
            message: message.into(),
            position: self.peek().map(|t| t.start),
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<(), ParserError> {
        match self.peek_kind() {
            Some(k) if k == kind => {
                self.position += 1;
                Ok(())
            }
            Some(k) => Err(self.error_here(format!("expected {what}, found '{k:?}'"))),
            None => Err(ParserError {
                message: format!("expected {what}, found end of input"),
                position: None,
            }),
        }
    }

    /// Parse a single expression; trailing tokens are an error.
    pub fn parse(&mut self) -> Result<ExprNode, ParserError> {
        if self.tokens.is_empty() {
            return Err(ParserError {
                message: "empty expression".to_string(),
                position: None,
            });
        }
        let ast = self.parse_expression()?;
        if self.position < self.tokens.len() {
            return Err(self.error_here("unexpected token after expression"));
        }
        Ok(ast)
    }

    /// Parse a `;`-separated sequence of expressions. A trailing
    /// semicolon is allowed; an empty source yields an empty sequence.
    pub fn parse_sequence(&mut self) -> Result<Vec<ExprNode>, ParserError> {
        let mut exprs = Vec::new();
        loop {
            while self.peek_kind() == Some(&TokenKind::Semicolon) {
                self.position += 1;
            }
            if self.peek().is_none() {
                break;
            }
            exprs.push(self.parse_expression()?);
            match self.peek_kind() {
                None => break,
                Some(TokenKind::Semicolon) => {}
                Some(_) => return Err(self.error_here("expected ';' between expressions")),
            }
        }
        Ok(exprs)
    }

    fn parse_expression(&mut self) -> Result<ExprNode, ParserError> {
        self.parse_binary_op(0)
    }

    fn parse_binary_op(&mut self, min_precedence: u8) -> Result<ExprNode, ParserError> {
        let mut left = self.parse_unary_op()?;

        while let Some(&TokenKind::Op(op)) = self.peek_kind() {
            let Some((precedence, associativity)) = op.infix_precedence() else {
                break;
            };
            if precedence < min_precedence {
                break;
            }

            let op_start = self.peek().map(|t| t.start);
            self.position += 1;

            let next_min_precedence = if associativity == Associativity::Left {
                precedence + 1
            } else {
                precedence
            };
            let right = self.parse_binary_op(next_min_precedence)?;

            left = match op {
                OpKind::Assign => match left {
                    ExprNode::Identifier(name) => ExprNode::Let {
                        name,
                        value: Box::new(right),
                    },
                    _ => {
                        return Err(ParserError {
                            message: "assignment target must be an identifier".to_string(),
                            position: op_start,
                        });
                    }
                },
                OpKind::Arrow => match left {
                    ExprNode::Identifier(name) => ExprNode::Lambda {
                        params: vec![name],
                        body: Box::new(right),
                    },
                    _ => {
                        return Err(ParserError {
                            message: "lambda parameter must be an identifier or a \
                                      parenthesized identifier list"
                                .to_string(),
                            position: op_start,
                        });
                    }
                },
                _ => {
                    let op = BinaryOp::from_op(op).expect("infix operator");
                    ExprNode::Binary {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    }
                }
            };
        }

        Ok(left)
    }

    fn parse_unary_op(&mut self) -> Result<ExprNode, ParserError> {
        let op = match self.peek_kind() {
            Some(TokenKind::Op(OpKind::Minus)) => Some(UnaryOp::Neg),
            Some(TokenKind::Op(OpKind::Not)) => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.position += 1;
            let expr = self.parse_unary_op()?;
            return Ok(ExprNode::Unary {
                op,
                expr: Box::new(expr),
            });
        }
        self.parse_power()
    }

    /// `^` binds tighter than unary and is right-associative; the
    /// exponent re-enters the unary level so `2^-3` and `2^3^2` parse.
    fn parse_power(&mut self) -> Result<ExprNode, ParserError> {
        let base = self.parse_postfix_op()?;
        if self.peek_kind() == Some(&TokenKind::Op(OpKind::Caret)) {
            self.position += 1;
            let exponent = self.parse_unary_op()?;
            return Ok(ExprNode::Binary {
                op: BinaryOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_postfix_op(&mut self) -> Result<ExprNode, ParserError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek_kind() {
                Some(TokenKind::LParen) => {
                    self.position += 1;
                    let args = self.parse_call_arguments()?;
                    expr = ExprNode::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                Some(TokenKind::LBracket) => {
                    self.position += 1;
                    let index = self.parse_expression()?;
                    self.expect(&TokenKind::RBracket, "']' after index")?;
                    expr = ExprNode::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Arguments of a call; the opening paren is already consumed.
    fn parse_call_arguments(&mut self) -> Result<Vec<ExprNode>, ParserError> {
        let mut args = Vec::new();
        if self.peek_kind() == Some(&TokenKind::RParen) {
            self.position += 1;
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            match self.peek_kind() {
                Some(TokenKind::Comma) => {
                    self.position += 1;
                }
                Some(TokenKind::RParen) => {
                    self.position += 1;
                    break;
                }
                _ => return Err(self.error_here("expected ',' or ')' in argument list")),
            }
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<ExprNode, ParserError> {
        let Some(token) = self.advance() else {
            return Err(ParserError {
                message: "unexpected end of input".to_string(),
                position: None,
            });
        };

        match token.kind {
            TokenKind::Number(n) => Ok(ExprNode::Number(n)),
            TokenKind::Imaginary(n) => Ok(ExprNode::Imaginary(n)),
            TokenKind::Str(s) => Ok(ExprNode::Str(s)),
            TokenKind::Ident(name) => Ok(ExprNode::Identifier(name)),
            TokenKind::Let => self.parse_let(),
            TokenKind::LParen => {
                if let Some(params) = self.try_parse_lambda_params() {
                    let body = self.parse_binary_op(ARROW_PRECEDENCE)?;
                    return Ok(ExprNode::Lambda {
                        params: params.into_vec(),
                        body: Box::new(body),
                    });
                }
                let expr = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "closing parenthesis")?;
                Ok(expr)
            }
            TokenKind::LBracket => self.parse_bracket_literal(),
            other => Err(ParserError {
                message: format!("unexpected token '{other:?}'"),
                position: Some(token.start),
            }),
        }
    }

    /// `let NAME = EXPR`; the `let` token is already consumed.
    fn parse_let(&mut self) -> Result<ExprNode, ParserError> {
        let name = match self.peek_kind() {
            Some(TokenKind::Ident(name)) => {
                let name = name.clone();
                self.position += 1;
                name
            }
            _ => return Err(self.error_here("expected a name after 'let'")),
        };
        self.expect(&TokenKind::Op(OpKind::Assign), "'=' in let binding")?;
        let value = self.parse_binary_op(1)?;
        Ok(ExprNode::Let {
            name,
            value: Box::new(value),
        })
    }

    /// Speculatively match `ident, … )` followed by `=>`, for the
    /// parenthesized lambda form. The opening paren is already consumed.
    /// On a match the tokens through `=>` are consumed; otherwise the
    /// position is restored and `None` returned.
    fn try_parse_lambda_params(&mut self) -> Option<SmallVec<[String; 4]>> {
        let saved = self.position;
        let mut params: SmallVec<[String; 4]> = SmallVec::new();

        if self.peek_kind() != Some(&TokenKind::RParen) {
            loop {
                match self.peek_kind() {
                    Some(TokenKind::Ident(name)) => {
                        params.push(name.clone());
                        self.position += 1;
                    }
                    _ => {
                        self.position = saved;
                        return None;
                    }
                }
                match self.peek_kind() {
                    Some(TokenKind::Comma) => self.position += 1,
                    _ => break,
                }
            }
        }

        if self.peek_kind() == Some(&TokenKind::RParen) {
            self.position += 1;
            if self.peek_kind() == Some(&TokenKind::Op(OpKind::Arrow)) {
                self.position += 1;
                return Some(params);
            }
        }

        self.position = saved;
        None
    }

    /// `[ … ]` — a vector literal, or a matrix literal when every
    /// element is itself a bracket literal. The opening bracket is
    /// already consumed.
    fn parse_bracket_literal(&mut self) -> Result<ExprNode, ParserError> {
        let mut elems = Vec::new();
        if self.peek_kind() == Some(&TokenKind::RBracket) {
            self.position += 1;
            return Ok(ExprNode::VectorLit(elems));
        }
        loop {
            elems.push(self.parse_expression()?);
            match self.peek_kind() {
                Some(TokenKind::Comma) => {
                    self.position += 1;
                }
                Some(TokenKind::RBracket) => {
                    self.position += 1;
                    break;
                }
                _ => return Err(self.error_here("expected ',' or ']' in vector literal")),
            }
        }

        if !elems.is_empty() && elems.iter().all(|e| matches!(e, ExprNode::VectorLit(_))) {
            let rows = elems
                .into_iter()
                .map(|e| match e {
                    ExprNode::VectorLit(row) => row,
                    _ => unreachable!(),
                })
                .collect();
            return Ok(ExprNode::MatrixLit(rows));
        }

        Ok(ExprNode::VectorLit(elems))
    }
}

/// Tokenize and parse a single expression.
pub fn parse<T: AsRef<str>>(source: T) -> Result<ExprNode, ParserError> {
    let tokenizer = Tokenizer::new(source.as_ref())?;
    let mut parser = Parser::new(tokenizer.items);
    parser.parse()
}

/// Tokenize and parse a `;`-separated script.
pub fn parse_script<T: AsRef<str>>(source: T) -> Result<Vec<ExprNode>, ParserError> {
    let tokenizer = Tokenizer::new(source.as_ref())?;
    let mut parser = Parser::new(tokenizer.items);
    parser.parse_sequence()
}
