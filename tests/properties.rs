//! Property-based tests over random acyclic grammars
//!
//! Every grammar is checked against a brute-force recognizer that tries all
//! ways of splitting the input.

use derp::{Grammar, NodeId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Expr {
    Null,
    Empty,
    Term(char),
    Alt(Box<Expr>, Box<Expr>),
    Cat(Box<Expr>, Box<Expr>),
}

fn expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        Just(Expr::Null),
        Just(Expr::Empty),
        prop_oneof![Just('a'), Just('b')].prop_map(Expr::Term),
    ];
    leaf.prop_recursive(5, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::Alt(Box::new(a), Box::new(b))),
            (inner.clone(), inner).prop_map(|(a, b)| Expr::Cat(Box::new(a), Box::new(b))),
        ]
    })
}

fn input() -> impl Strategy<Value = Vec<char>> {
    prop::collection::vec(prop_oneof![Just('a'), Just('b')], 0..6)
}

fn build(g: &mut Grammar<char>, e: &Expr) -> NodeId {
    match e {
        Expr::Null => g.null(),
        Expr::Empty => g.empty(),
        Expr::Term(c) => g.term(*c),
        Expr::Alt(a, b) => {
            let a = build(g, a);
            let b = build(g, b);
            g.alt(a, b)
        }
        Expr::Cat(a, b) => {
            let a = build(g, a);
            let b = build(g, b);
            g.cat(a, b)
        }
    }
}

fn accepts(e: &Expr, s: &[char]) -> bool {
    match e {
        Expr::Null => false,
        Expr::Empty => s.is_empty(),
        Expr::Term(c) => s == [*c],
        Expr::Alt(a, b) => accepts(a, s) || accepts(b, s),
        Expr::Cat(a, b) => (0..=s.len()).any(|i| accepts(a, &s[..i]) && accepts(b, &s[i..])),
    }
}

proptest! {
    #[test]
    fn nullable_matches_empty_input(e in expr()) {
        let mut g = Grammar::new();
        let root = build(&mut g, &e);
        prop_assert_eq!(g.nullable(root), accepts(&e, &[]));
    }

    #[test]
    fn nullable_laws(a in expr(), b in expr()) {
        let mut g = Grammar::new();
        let ra = build(&mut g, &a);
        let rb = build(&mut g, &b);
        let alt = g.alt(ra, rb);
        let cat = g.cat(ra, rb);

        let (na, nb) = (g.nullable(ra), g.nullable(rb));
        prop_assert_eq!(g.nullable(alt), na || nb);
        prop_assert_eq!(g.nullable(cat), na && nb);
    }

    #[test]
    fn match_agrees_with_brute_force(e in expr(), s in input()) {
        let mut g = Grammar::new();
        let root = build(&mut g, &e);
        prop_assert_eq!(g.match_tokens(root, s.clone()).accepted, accepts(&e, &s));
    }

    #[test]
    fn compaction_is_idempotent(e in expr(), s in input()) {
        let mut g = Grammar::new();
        let root = build(&mut g, &e);
        let once = g.compact(root);
        let twice = g.compact(once);

        prop_assert!(g.size(twice) <= g.size(once));
        prop_assert!(g.size(once) <= g.size(root));

        // derive without compacting so only the two compactions are compared
        let (mut x, mut y) = (once, twice);
        for c in &s {
            x = g.derivative(x, c);
            y = g.derivative(y, c);
        }
        prop_assert_eq!(g.nullable(x), g.nullable(y));
        prop_assert_eq!(g.nullable(x), accepts(&e, &s));
    }

    #[test]
    fn is_null_means_nothing_is_accepted(e in expr(), s in input()) {
        let mut g = Grammar::new();
        let root = build(&mut g, &e);
        if g.is_null(root) {
            prop_assert!(!accepts(&e, &s));
        }
        if g.is_empty(root) {
            prop_assert_eq!(accepts(&e, &s), s.is_empty());
        }
    }
}
