use crate::expression::ast::{Aspect, BinaryOp, Expr, Literal, Reference, Sigil};
use crate::expression::error::ExprError;
use crate::expression::lexer::{Token, tokenize};
use crate::model::object::EnableExpr;

/// Parse an enable expression. `Ok(None)` means the expression is empty (no value).
pub(crate) fn parse_enable(expr: &EnableExpr) -> Result<Option<Expr>, ExprError> {
    match expr {
        EnableExpr::Number(v) => Ok(Some(Expr::number(*v))),
        EnableExpr::Text(s) => parse_expr(s),
    }
}

pub(crate) fn parse_expr(src: &str) -> Result<Option<Expr>, ExprError> {
    let src = src.trim();
    if let Some(v) = parse_number(src) {
        return Ok(Some(Expr::number(v)));
    }
    let tokens = tokenize(src);
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut p = Parser {
        src,
        tokens,
        pos: 0,
    };
    let nodes = p.parse_sequence(false)?;
    if nodes.len() % 2 != 1 {
        return Err(ExprError::new(src, "operands and operators don't add up"));
    }
    reduce(src, &nodes).map(Some)
}

/// Tokens with parenthesised spans and `!` spans folded into nested nodes.
#[derive(Debug)]
enum Node {
    Token(Token),
    Group(Vec<Node>),
    Not(Box<Node>),
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn parse_sequence(&mut self, nested: bool) -> Result<Vec<Node>, ExprError> {
        let mut out = Vec::new();
        while let Some(tok) = self.tokens.get(self.pos).cloned() {
            self.pos += 1;
            match tok {
                Token::RParen if nested => return Ok(out),
                Token::RParen => {
                    return Err(ExprError::new(self.src, "parentheses don't add up"));
                }
                _ => out.push(self.node_from(tok)?),
            }
        }
        if nested {
            return Err(ExprError::new(self.src, "parentheses don't add up"));
        }
        Ok(out)
    }

    fn node_from(&mut self, tok: Token) -> Result<Node, ExprError> {
        match tok {
            Token::LParen => Ok(Node::Group(self.parse_sequence(true)?)),
            Token::Not => {
                let Some(next) = self.tokens.get(self.pos).cloned() else {
                    return Err(ExprError::new(self.src, "'!' without operand"));
                };
                self.pos += 1;
                if matches!(next, Token::RParen | Token::Op(_)) {
                    return Err(ExprError::new(self.src, "'!' without operand"));
                }
                Ok(Node::Not(Box::new(self.node_from(next)?)))
            }
            other => Ok(Node::Token(other)),
        }
    }
}

/// Reduce a flat node list to a tree by splitting on the rightmost occurrence of the
/// lowest-priority operator present.
fn reduce(src: &str, nodes: &[Node]) -> Result<Expr, ExprError> {
    match nodes {
        [] => Err(ExprError::new(src, "unbalanced expression")),
        [single] => reduce_single(src, single),
        _ => {
            let split = BinaryOp::BY_PRIORITY.iter().find_map(|&op| {
                nodes
                    .iter()
                    .rposition(|n| matches!(n, Node::Token(Token::Op(o)) if *o == op))
                    .map(|i| (op, i))
            });
            let Some((op, i)) = split else {
                return Err(ExprError::new(src, "operator not found"));
            };
            Ok(Expr::Binary {
                op,
                left: Box::new(reduce(src, &nodes[..i])?),
                right: Box::new(reduce(src, &nodes[i + 1..])?),
            })
        }
    }
}

fn reduce_single(src: &str, node: &Node) -> Result<Expr, ExprError> {
    match node {
        Node::Group(inner) => reduce(src, inner),
        Node::Not(inner) => Ok(Expr::Not(Box::new(reduce_single(src, inner)?))),
        Node::Token(Token::Operand(word)) => Ok(parse_operand(word)),
        Node::Token(tok) => Err(ExprError::new(
            src,
            format!("operator {tok:?} without operands"),
        )),
    }
}

fn parse_operand(word: &str) -> Expr {
    if let Some(v) = parse_number(word) {
        return Expr::number(v);
    }
    if word.eq_ignore_ascii_case("true") {
        return Expr::Literal(Literal::True);
    }
    if word.eq_ignore_ascii_case("false") {
        return Expr::Literal(Literal::False);
    }
    // Signed non-numeric operand produced by the lexer (`a + -#b`).
    if let Some(rest) = word.strip_prefix('-') {
        return Expr::Binary {
            op: BinaryOp::Sub,
            left: Box::new(Expr::number(0.0)),
            right: Box::new(parse_operand(rest)),
        };
    }
    if let Some(rest) = word.strip_prefix('+') {
        return parse_operand(rest);
    }
    parse_reference(word)
        .map(Expr::Reference)
        .unwrap_or_else(|| Expr::Literal(Literal::Word(word.to_owned())))
}

fn parse_reference(word: &str) -> Option<Reference> {
    let mut chars = word.chars();
    let sigil = match chars.next()? {
        '#' => Sigil::Object,
        '.' => Sigil::Class,
        '$' => Sigil::Layer,
        _ => return None,
    };
    let body = chars.as_str();
    let (name, rest) = body.split_once('.').unwrap_or((body, ""));
    if name.is_empty() {
        return None;
    }
    let aspect = if rest.contains("duration") {
        Some(Aspect::Duration)
    } else if rest.contains("end") {
        Some(Aspect::End)
    } else if rest.contains("start") {
        Some(Aspect::Start)
    } else {
        None
    };
    Some(Reference {
        sigil,
        name: name.to_owned(),
        aspect,
    })
}

fn parse_number(s: &str) -> Option<f64> {
    let first = s.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '.' | '-' | '+')) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
#[path = "../../tests/unit/expression/parser.rs"]
mod tests;
