use crate::expression::ast::BinaryOp;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Op(BinaryOp),
    Not,
    LParen,
    RParen,
    /// Anything between operators: numbers, references, booleans, signed literals.
    Operand(String),
}

const SEPARATED: [char; 10] = ['&', '|', '+', '-', '*', '/', '%', '!', '(', ')'];

fn is_operator_word(word: &str) -> bool {
    matches!(word, "&" | "|" | "+" | "-" | "*" | "/" | "%" | "!")
}

/// Split an expression into tokens.
///
/// Operator and parenthesis characters are always separated from their neighbours, so
/// `#a.end+5` and `#a.end + 5` tokenize the same. A `+`/`-` directly following another
/// operator is glued to the next word as a sign (`a + -b`).
pub(crate) fn tokenize(src: &str) -> Vec<Token> {
    let mut spaced = String::with_capacity(src.len() * 2);
    for c in src.chars() {
        if SEPARATED.contains(&c) {
            spaced.push(' ');
            spaced.push(c);
            spaced.push(' ');
        } else {
            spaced.push(c);
        }
    }

    let mut words: Vec<String> = spaced.split_whitespace().map(str::to_owned).collect();

    let mut i = words.len().saturating_sub(1);
    while i > 0 {
        i -= 1;
        let signed = (words[i] == "-" || words[i] == "+")
            && i > 0
            && is_operator_word(&words[i - 1])
            && i + 1 < words.len();
        if signed {
            let next = words.remove(i + 1);
            words[i].push_str(&next);
        }
    }

    words
        .into_iter()
        .map(|w| match w.as_str() {
            "&" => Token::Op(BinaryOp::And),
            "|" => Token::Op(BinaryOp::Or),
            "+" => Token::Op(BinaryOp::Add),
            "-" => Token::Op(BinaryOp::Sub),
            "*" => Token::Op(BinaryOp::Mul),
            "/" => Token::Op(BinaryOp::Div),
            "%" => Token::Op(BinaryOp::Mod),
            "!" => Token::Not,
            "(" => Token::LParen,
            ")" => Token::RParen,
            _ => Token::Operand(w),
        })
        .collect()
}
