use super::*;

fn parse(src: &str) -> Expr {
    parse_expr(src).unwrap().unwrap()
}

fn obj(name: &str, aspect: Option<Aspect>) -> Expr {
    Expr::Reference(Reference {
        sigil: Sigil::Object,
        name: name.to_owned(),
        aspect,
    })
}

#[test]
fn numbers_pass_through() {
    assert_eq!(parse("42"), Expr::number(42.0));
    assert_eq!(parse(" -1.5 "), Expr::number(-1.5));
    assert_eq!(
        parse_enable(&EnableExpr::Number(7.0)).unwrap(),
        Some(Expr::number(7.0))
    );
}

#[test]
fn empty_expression_has_no_value() {
    assert_eq!(parse_expr("").unwrap(), None);
    assert_eq!(parse_expr("   ").unwrap(), None);
}

#[test]
fn parses_reference_sigils_and_aspects() {
    assert_eq!(parse("#a"), obj("a", None));
    assert_eq!(parse("#a.end"), obj("a", Some(Aspect::End)));
    assert_eq!(
        parse(".gfx.duration"),
        Expr::Reference(Reference {
            sigil: Sigil::Class,
            name: "gfx".to_owned(),
            aspect: Some(Aspect::Duration),
        })
    );
    assert_eq!(
        parse("$L1.start"),
        Expr::Reference(Reference {
            sigil: Sigil::Layer,
            name: "L1".to_owned(),
            aspect: Some(Aspect::Start),
        })
    );
}

#[test]
fn booleans_and_words() {
    assert_eq!(parse("true"), Expr::Literal(Literal::True));
    assert_eq!(parse("FALSE"), Expr::Literal(Literal::False));
    assert_eq!(parse("abc"), Expr::Literal(Literal::Word("abc".to_owned())));
}

#[test]
fn splits_on_rightmost_lowest_priority_operator() {
    // `&` binds weaker than `+`.
    let e = parse("#a + 1 & #b");
    assert_eq!(e.to_string(), "((#a + 1) & #b)");

    // Same operator twice: rightmost split gives left associativity.
    assert_eq!(parse("10 - 2 - 3").to_string(), "((10 - 2) - 3)");

    // `+` is lower than `-`, so it is split first.
    assert_eq!(parse("1 - 2 + 3").to_string(), "((1 - 2) + 3)");
}

#[test]
fn parentheses_nest() {
    assert_eq!(parse("(#a | #b) & #c").to_string(), "((#a | #b) & #c)");
    assert_eq!(parse("((#a))"), obj("a", None));
}

#[test]
fn signed_operand_after_operator() {
    assert_eq!(parse("#a.end + -5").to_string(), "(#a.end + -5)");
    assert_eq!(parse("5 + -#b").to_string(), "(5 + (0 - #b))");
}

#[test]
fn not_binds_to_next_operand() {
    assert_eq!(parse("!#a & #b").to_string(), "(!#a & #b)");
    assert_eq!(parse("#a & !(#b | #c)").to_string(), "(#a & !(#b | #c))");
    assert_eq!(parse("!!#a").to_string(), "!!#a");
}

#[test]
fn unbalanced_parentheses_are_fatal() {
    assert!(parse_expr("(#a & #b").is_err());
    assert!(parse_expr("#a & #b)").is_err());
}

#[test]
fn operand_operator_mismatch_is_fatal() {
    assert!(parse_expr("#a &").is_err());
    assert!(parse_expr("#a #b").is_err());
    assert!(parse_expr("& #a #b").is_err());
    assert!(parse_expr("!").is_err());
    assert!(parse_expr("(+)").is_err());
}

#[test]
fn errors_carry_the_source() {
    let err = parse_expr("(#a").unwrap_err();
    assert_eq!(err.source, "(#a");
    assert!(err.to_string().contains("parentheses"));
}

#[test]
fn constant_detection() {
    assert!(parse("5 + 3 * 2").is_constant());
    assert!(parse("true").is_constant());
    assert!(!parse("#a + 3").is_constant());
    assert!(!parse("!$L1").is_constant());
}
