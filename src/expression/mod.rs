//! Enable-condition expressions: `"#a.end + 5"`, `"(.gfx | $L1) & !#b"`, ...

pub(crate) mod ast;
pub(crate) mod error;
pub(crate) mod lexer;
pub(crate) mod parser;
