//! Canonical rendering of expression trees.
//!
//! `pretty_print` emits source that re-parses to the same tree, with
//! parentheses only where precedence demands them; `canonical_expression`
//! is the parse-then-render round trip used to normalise user input.

use crate::parser::{BinaryOp, ExprNode, ParserError, UnaryOp, parse};

/// Binding strength of a rendered node, mirroring the parser's levels.
fn precedence(node: &ExprNode) -> u8 {
    match node {
        ExprNode::Let { .. } => 1,
        ExprNode::Lambda { .. } => 2,
        ExprNode::Binary { op, .. } => match op {
            BinaryOp::Or => 3,
            BinaryOp::And => 4,
            BinaryOp::Eq | BinaryOp::Ne => 5,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 6,
            BinaryOp::Add | BinaryOp::Sub => 7,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 8,
            BinaryOp::Pow => 10,
        },
        ExprNode::Unary { .. } => 9,
        _ => u8::MAX,
    }
}

fn render_child(node: &ExprNode, parent_precedence: u8, out: &mut String) {
    if precedence(node) < parent_precedence {
        out.push('(');
        render(node, out);
        out.push(')');
    } else {
        render(node, out);
    }
}

fn render(node: &ExprNode, out: &mut String) {
    match node {
        ExprNode::Number(n) => out.push_str(&format!("{n}")),
        ExprNode::Imaginary(n) => out.push_str(&format!("{n}i")),
        ExprNode::Str(s) => {
            out.push('"');
            out.push_str(&s.replace('"', "\"\""));
            out.push('"');
        }
        ExprNode::Identifier(name) => out.push_str(name),
        ExprNode::Unary { op, expr } => {
            out.push_str(match op {
                UnaryOp::Neg => "-",
                UnaryOp::Not => "!",
            });
            render_child(expr, precedence(node), out);
        }
        ExprNode::Binary { op, left, right } => {
            let prec = precedence(node);
            // Left-associative operators need parens on an equal-level
            // right child; `^` is the mirror image.
            let (left_min, right_min) = if *op == BinaryOp::Pow {
                (prec + 1, prec)
            } else {
                (prec, prec + 1)
            };
            render_child(left, left_min, out);
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            render_child(right, right_min, out);
        }
        ExprNode::Call { callee, args } => {
            render_child(callee, u8::MAX, out);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render(arg, out);
            }
            out.push(')');
        }
        ExprNode::Index { target, index } => {
            render_child(target, u8::MAX, out);
            out.push('[');
            render(index, out);
            out.push(']');
        }
        ExprNode::Lambda { params, body } => {
            if params.len() == 1 {
                out.push_str(&params[0]);
            } else {
                out.push('(');
                out.push_str(&params.join(", "));
                out.push(')');
            }
            out.push_str(" => ");
            render_child(body, precedence(node), out);
        }
        ExprNode::Let { name, value } => {
            out.push_str("let ");
            out.push_str(name);
            out.push_str(" = ");
            render_child(value, precedence(node), out);
        }
        ExprNode::VectorLit(elems) => {
            out.push('[');
            for (i, elem) in elems.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render(elem, out);
            }
            out.push(']');
        }
        ExprNode::MatrixLit(rows) => {
            out.push('[');
            for (i, row) in rows.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push('[');
                for (j, elem) in row.iter().enumerate() {
                    if j > 0 {
                        out.push_str(", ");
                    }
                    render(elem, out);
                }
                out.push(']');
            }
            out.push(']');
        }
    }
}

/// Render a tree as canonical source.
pub fn pretty_print(node: &ExprNode) -> String {
    let mut out = String::new();
    render(node, &mut out);
    out
}

/// Parse and re-render: normalises spacing and drops redundant parens.
pub fn canonical_expression(source: &str) -> Result<String, ParserError> {
    parse(source).map(|node| pretty_print(&node))
}
