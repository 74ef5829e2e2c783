pub mod parser;
pub mod pretty;
pub mod tokenizer;

pub use parser::{BinaryOp, ExprNode, Parser, ParserError, UnaryOp, parse, parse_script};
pub use pretty::{canonical_expression, pretty_print};
pub use tokenizer::{Associativity, OpKind, Token, TokenKind, Tokenizer, TokenizerError};
