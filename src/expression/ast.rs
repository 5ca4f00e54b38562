use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Literal(Literal),
    Reference(Reference),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
}

impl Expr {
    pub(crate) fn number(v: f64) -> Self {
        Self::Literal(Literal::Number(v))
    }

    /// An expression is constant when it contains no references; such start/end expressions
    /// are interpreted relative to the parent instance.
    pub(crate) fn is_constant(&self) -> bool {
        match self {
            Self::Literal(_) => true,
            Self::Reference(_) => false,
            Self::Binary { left, right, .. } => left.is_constant() && right.is_constant(),
            Self::Not(inner) => inner.is_constant(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Literal {
    Number(f64),
    True,
    False,
    /// A word that is neither a number, a boolean nor a reference. Resolves to no value.
    Word(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reference {
    pub(crate) sigil: Sigil,
    pub(crate) name: String,
    /// Explicit `.start`/`.end`/`.duration` suffix; `None` uses the requested aspect.
    pub(crate) aspect: Option<Aspect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sigil {
    /// `#id`
    Object,
    /// `.class`
    Class,
    /// `$layer`
    Layer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Aspect {
    Start,
    End,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    /// Lowest binding priority first. The parser splits on the rightmost occurrence of the
    /// first operator of this list that is present.
    pub(crate) const BY_PRIORITY: [BinaryOp; 7] = [
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Mod,
    ];

    pub(crate) fn symbol(self) -> char {
        match self {
            BinaryOp::And => '&',
            BinaryOp::Or => '|',
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
            BinaryOp::Mod => '%',
        }
    }

    pub(crate) fn is_boolean(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Numeric result for arithmetic operators, `None` for `&`/`|`.
    pub(crate) fn arithmetic(self, a: f64, b: f64) -> Option<f64> {
        match self {
            BinaryOp::And | BinaryOp::Or => None,
            BinaryOp::Add => Some(a + b),
            BinaryOp::Sub => Some(a - b),
            BinaryOp::Mul => Some(a * b),
            BinaryOp::Div => Some(a / b),
            BinaryOp::Mod => Some(a % b),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Literal::Number(v)) => write!(f, "{v}"),
            Expr::Literal(Literal::True) => f.write_str("true"),
            Expr::Literal(Literal::False) => f.write_str("false"),
            Expr::Literal(Literal::Word(w)) => f.write_str(w),
            Expr::Reference(r) => {
                let sigil = match r.sigil {
                    Sigil::Object => '#',
                    Sigil::Class => '.',
                    Sigil::Layer => '$',
                };
                write!(f, "{sigil}{}", r.name)?;
                match r.aspect {
                    Some(Aspect::Start) => f.write_str(".start"),
                    Some(Aspect::End) => f.write_str(".end"),
                    Some(Aspect::Duration) => f.write_str(".duration"),
                    None => Ok(()),
                }
            }
            Expr::Binary { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Expr::Not(inner) => write!(f, "!{inner}"),
        }
    }
}
