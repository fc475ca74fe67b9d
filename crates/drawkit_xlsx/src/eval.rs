//! Deferred-expression evaluation for `@eval@` values.
//!
//! A small closed evaluator: number/string/bool literals, names resolved
//! against a supplied context mapping, `+ - * /`, unary `-`/`!`, comparisons
//! and parentheses. No other names, calls or side effects are reachable.

use std::collections::BTreeMap;

use crate::conf::EVAL_MARKER_PREFIX;
use crate::error::LayoutError;
use crate::spec::EnumCellValue;
use crate::util::derive_value_text;

/// Pluggable resolver applied to every dictionary value before drawing.
pub type SpecEvalResolver =
    fn(&EnumCellValue, &BTreeMap<String, EnumCellValue>) -> Result<EnumCellValue, LayoutError>;

/// Resolve a cell value: evaluate marked strings, pass everything else through.
pub fn resolve_value(
    value: &EnumCellValue,
    context: &BTreeMap<String, EnumCellValue>,
) -> Result<EnumCellValue, LayoutError> {
    if let EnumCellValue::String(text) = value
        && let Some(c_expr) = text.strip_prefix(EVAL_MARKER_PREFIX)
    {
        return evaluate_expression(c_expr, context);
    }
    Ok(value.clone())
}

/// Evaluate an expression string against the context mapping.
pub fn evaluate_expression(
    expr: &str,
    context: &BTreeMap<String, EnumCellValue>,
) -> Result<EnumCellValue, LayoutError> {
    let l_tokens = tokenize(expr)?;
    let mut parser = ExprParser {
        tokens: l_tokens,
        pos: 0,
    };
    let node = parser.parse_expression(0)?;
    if parser.pos != parser.tokens.len() {
        return Err(LayoutError::Expression(format!(
            "unexpected trailing input in {expr:?}."
        )));
    }
    evaluate_node(&node, context)
}

////////////////////////////////////////////////////////////////////////////////
// #region Tokenizer

#[derive(Debug, Clone, PartialEq)]
enum EnumToken {
    Number(f64),
    Text(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    EqEq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Not,
}

fn tokenize(expr: &str) -> Result<Vec<EnumToken>, LayoutError> {
    let mut l_tokens = Vec::new();
    let mut iter = expr.chars().peekable();

    while let Some(&chr) = iter.peek() {
        match chr {
            ' ' | '\t' | '\n' | '\r' => {
                iter.next();
            }
            '+' => {
                iter.next();
                l_tokens.push(EnumToken::Plus);
            }
            '-' => {
                iter.next();
                l_tokens.push(EnumToken::Minus);
            }
            '*' => {
                iter.next();
                l_tokens.push(EnumToken::Star);
            }
            '/' => {
                iter.next();
                l_tokens.push(EnumToken::Slash);
            }
            '(' => {
                iter.next();
                l_tokens.push(EnumToken::LParen);
            }
            ')' => {
                iter.next();
                l_tokens.push(EnumToken::RParen);
            }
            '=' => {
                iter.next();
                if iter.next_if_eq(&'=').is_none() {
                    return Err(LayoutError::Expression(
                        "single '=' is not an operator; use '=='.".to_string(),
                    ));
                }
                l_tokens.push(EnumToken::EqEq);
            }
            '!' => {
                iter.next();
                if iter.next_if_eq(&'=').is_some() {
                    l_tokens.push(EnumToken::Ne);
                } else {
                    l_tokens.push(EnumToken::Not);
                }
            }
            '<' => {
                iter.next();
                if iter.next_if_eq(&'=').is_some() {
                    l_tokens.push(EnumToken::Le);
                } else {
                    l_tokens.push(EnumToken::Lt);
                }
            }
            '>' => {
                iter.next();
                if iter.next_if_eq(&'=').is_some() {
                    l_tokens.push(EnumToken::Ge);
                } else {
                    l_tokens.push(EnumToken::Gt);
                }
            }
            '\'' | '"' => {
                let chr_quote = chr;
                iter.next();
                let mut c_text = String::new();
                let mut if_closed = false;
                for chr_inner in iter.by_ref() {
                    if chr_inner == chr_quote {
                        if_closed = true;
                        break;
                    }
                    c_text.push(chr_inner);
                }
                if !if_closed {
                    return Err(LayoutError::Expression(format!(
                        "unterminated string literal in {expr:?}."
                    )));
                }
                l_tokens.push(EnumToken::Text(c_text));
            }
            '0'..='9' | '.' => {
                let mut c_number = String::new();
                while let Some(&chr_inner) = iter.peek() {
                    if chr_inner.is_ascii_digit() || chr_inner == '.' {
                        c_number.push(chr_inner);
                        iter.next();
                    } else {
                        break;
                    }
                }
                let n_value: f64 = c_number.parse().map_err(|_| {
                    LayoutError::Expression(format!("invalid number literal {c_number:?}."))
                })?;
                l_tokens.push(EnumToken::Number(n_value));
            }
            _ if chr.is_alphabetic() || chr == '_' => {
                let mut c_ident = String::new();
                while let Some(&chr_inner) = iter.peek() {
                    if chr_inner.is_alphanumeric() || chr_inner == '_' {
                        c_ident.push(chr_inner);
                        iter.next();
                    } else {
                        break;
                    }
                }
                l_tokens.push(EnumToken::Ident(c_ident));
            }
            _ => {
                return Err(LayoutError::Expression(format!(
                    "unexpected character {chr:?} in {expr:?}."
                )));
            }
        }
    }

    Ok(l_tokens)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Parser

#[derive(Debug, Clone, PartialEq)]
enum EnumExprNode {
    Literal(EnumCellValue),
    Var(String),
    Unary(EnumUnaryOp, Box<EnumExprNode>),
    Binary(EnumBinaryOp, Box<EnumExprNode>, Box<EnumExprNode>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumUnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumBinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

struct ExprParser {
    tokens: Vec<EnumToken>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&EnumToken> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<EnumToken> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    // Precedence climbing: comparisons bind loosest, then +/-, then */.
    fn parse_expression(&mut self, n_min_binding: u8) -> Result<EnumExprNode, LayoutError> {
        let mut lhs = self.parse_primary()?;

        while let Some(token) = self.peek() {
            let (op, n_binding) = match token {
                EnumToken::EqEq => (EnumBinaryOp::Eq, 1),
                EnumToken::Ne => (EnumBinaryOp::Ne, 1),
                EnumToken::Lt => (EnumBinaryOp::Lt, 1),
                EnumToken::Le => (EnumBinaryOp::Le, 1),
                EnumToken::Gt => (EnumBinaryOp::Gt, 1),
                EnumToken::Ge => (EnumBinaryOp::Ge, 1),
                EnumToken::Plus => (EnumBinaryOp::Add, 2),
                EnumToken::Minus => (EnumBinaryOp::Sub, 2),
                EnumToken::Star => (EnumBinaryOp::Mul, 3),
                EnumToken::Slash => (EnumBinaryOp::Div, 3),
                _ => break,
            };
            if n_binding < n_min_binding {
                break;
            }
            self.advance();
            let rhs = self.parse_expression(n_binding + 1)?;
            lhs = EnumExprNode::Binary(op, Box::new(lhs), Box::new(rhs));
        }

        Ok(lhs)
    }

    fn parse_primary(&mut self) -> Result<EnumExprNode, LayoutError> {
        match self.advance() {
            Some(EnumToken::Number(val)) => Ok(EnumExprNode::Literal(EnumCellValue::Number(val))),
            Some(EnumToken::Text(val)) => Ok(EnumExprNode::Literal(EnumCellValue::String(val))),
            Some(EnumToken::Ident(name)) => match name.as_str() {
                "true" => Ok(EnumExprNode::Literal(EnumCellValue::Bool(true))),
                "false" => Ok(EnumExprNode::Literal(EnumCellValue::Bool(false))),
                _ => Ok(EnumExprNode::Var(name)),
            },
            Some(EnumToken::Minus) => {
                let inner = self.parse_expression(4)?;
                Ok(EnumExprNode::Unary(EnumUnaryOp::Neg, Box::new(inner)))
            }
            Some(EnumToken::Not) => {
                let inner = self.parse_expression(4)?;
                Ok(EnumExprNode::Unary(EnumUnaryOp::Not, Box::new(inner)))
            }
            Some(EnumToken::LParen) => {
                let inner = self.parse_expression(0)?;
                match self.advance() {
                    Some(EnumToken::RParen) => Ok(inner),
                    _ => Err(LayoutError::Expression(
                        "missing closing parenthesis.".to_string(),
                    )),
                }
            }
            other => Err(LayoutError::Expression(format!(
                "expected a value, found {other:?}."
            ))),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Interpreter

fn evaluate_node(
    node: &EnumExprNode,
    context: &BTreeMap<String, EnumCellValue>,
) -> Result<EnumCellValue, LayoutError> {
    match node {
        EnumExprNode::Literal(value) => Ok(value.clone()),
        EnumExprNode::Var(name) => context
            .get(name)
            .cloned()
            .ok_or_else(|| LayoutError::Expression(format!("undefined name {name:?}."))),
        EnumExprNode::Unary(op, inner) => {
            let value = evaluate_node(inner, context)?;
            match (op, value) {
                (EnumUnaryOp::Neg, EnumCellValue::Number(val)) => Ok(EnumCellValue::Number(-val)),
                (EnumUnaryOp::Not, EnumCellValue::Bool(val)) => Ok(EnumCellValue::Bool(!val)),
                (op, value) => Err(LayoutError::Expression(format!(
                    "unary {op:?} is not defined for {value:?}."
                ))),
            }
        }
        EnumExprNode::Binary(op, lhs, rhs) => {
            let left = evaluate_node(lhs, context)?;
            let right = evaluate_node(rhs, context)?;
            evaluate_binary(*op, left, right)
        }
    }
}

fn evaluate_binary(
    op: EnumBinaryOp,
    left: EnumCellValue,
    right: EnumCellValue,
) -> Result<EnumCellValue, LayoutError> {
    use EnumBinaryOp::*;
    use EnumCellValue::{Bool, Number, String as Text};

    match (op, &left, &right) {
        // String + anything concatenates; mirrors the config files' usage.
        (Add, Text(_), _) | (Add, _, Text(_)) => Ok(Text(format!(
            "{}{}",
            derive_value_text(&left, ""),
            derive_value_text(&right, "")
        ))),
        (Add, Number(a), Number(b)) => Ok(Number(a + b)),
        (Sub, Number(a), Number(b)) => Ok(Number(a - b)),
        (Mul, Number(a), Number(b)) => Ok(Number(a * b)),
        (Div, Number(_), Number(b)) if *b == 0.0 => {
            Err(LayoutError::Expression("division by zero.".to_string()))
        }
        (Div, Number(a), Number(b)) => Ok(Number(a / b)),
        (Eq, _, _) => Ok(Bool(left == right)),
        (Ne, _, _) => Ok(Bool(left != right)),
        (Lt, Number(a), Number(b)) => Ok(Bool(a < b)),
        (Le, Number(a), Number(b)) => Ok(Bool(a <= b)),
        (Gt, Number(a), Number(b)) => Ok(Bool(a > b)),
        (Ge, Number(a), Number(b)) => Ok(Bool(a >= b)),
        (Lt, Text(a), Text(b)) => Ok(Bool(a < b)),
        (Le, Text(a), Text(b)) => Ok(Bool(a <= b)),
        (Gt, Text(a), Text(b)) => Ok(Bool(a > b)),
        (Ge, Text(a), Text(b)) => Ok(Bool(a >= b)),
        _ => Err(LayoutError::Expression(format!(
            "{op:?} is not defined for {left:?} and {right:?}."
        ))),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
