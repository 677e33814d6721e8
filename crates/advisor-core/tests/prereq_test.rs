//! Prerequisite parsing and solving against the sample catalog, plus
//! property tests for satisfiability and minimal unlocking sets.

use std::collections::BTreeSet;

use proptest::prelude::*;

use advisor_core::code::CourseCode;
use advisor_core::prereq::{
    MAX_UNLOCK_LITERALS, PrerequisiteExpr, SearchOverflow, is_satisfied, minimal_unlocking_set,
    parse_prerequisite,
};
use advisor_test_utils::{code, codes, sample_catalog};

fn lit(s: &str) -> PrerequisiteExpr {
    PrerequisiteExpr::Literal(code(s))
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[test]
fn single_code_is_a_literal() {
    let catalog = sample_catalog();
    let parse = parse_prerequisite("MATH 01131", |c| catalog.contains(c));
    assert_eq!(parse.expression(), Some(&lit("MATH 01131")));

    let expr = parse.expression();
    assert!(is_satisfied(expr, &codes(&["MATH 01131"])));
    assert!(!is_satisfied(expr, &codes(&["MATH 01130"])));
}

#[test]
fn grouped_expression_builds_nested_tree() {
    let catalog = sample_catalog();
    let parse = parse_prerequisite("MATH 01131 and (CS 01100 or CS 01101)", |c| catalog.contains(c));
    let expected = PrerequisiteExpr::And(vec![
        lit("MATH 01131"),
        PrerequisiteExpr::Or(vec![lit("CS 01100"), lit("CS 01101")]),
    ]);
    assert_eq!(parse.expression(), Some(&expected));

    let expr = parse.expression();
    assert!(is_satisfied(expr, &codes(&["MATH 01131", "CS 01101"])));
    assert!(!is_satisfied(expr, &codes(&["CS 01101"])));
}

#[test]
fn catalog_prose_is_reduced_to_the_expression() {
    let catalog = sample_catalog();
    let text = "Students must complete CS 01100 with a minimum grade of C- and \
                MATH 01130 or MATH 01131 before enrolling.";
    let parse = parse_prerequisite(text, |c| catalog.contains(c));
    let expected = PrerequisiteExpr::Or(vec![
        PrerequisiteExpr::And(vec![lit("CS 01100"), lit("MATH 01130")]),
        lit("MATH 01131"),
    ]);
    assert_eq!(parse.expression(), Some(&expected));
}

#[test]
fn unresolved_reference_never_satisfies() {
    let catalog = sample_catalog();
    let parse = catalog.prerequisite(&code("PHYS 01200")).unwrap();
    assert!(parse.is_valid());
    assert_eq!(parse.unresolved, vec![code("PHYS 00220")]);

    let unlock = minimal_unlocking_set(parse.expression(), &codes(&["MATH 01130"])).unwrap();
    assert_eq!(unlock, vec![code("PHYS 00220")]);
}

#[test]
fn malformed_text_is_invalid_but_keeps_the_text() {
    let parse = parse_prerequisite("(CS 01100 or MATH 01130", |_| true);
    assert!(!parse.is_valid());
    assert_eq!(parse.display_text().as_deref(), Some("(CS 01100 or MATH 01130"));
    assert_eq!(parse.expression(), None);
}

// ---------------------------------------------------------------------------
// Solving
// ---------------------------------------------------------------------------

#[test]
fn unlocking_set_prefers_smallest_then_lexicographic() {
    let catalog = sample_catalog();
    let expr = catalog.prerequisite(&code("CS 01101")).unwrap().expression();
    let unlock = minimal_unlocking_set(expr, &BTreeSet::<CourseCode>::new()).unwrap();
    assert_eq!(unlock, vec![code("CS 01100"), code("MATH 01130")]);

    let unlock = minimal_unlocking_set(expr, &codes(&["MATH 01131"])).unwrap();
    assert_eq!(unlock, vec![code("CS 01100")]);
}

#[test]
fn oversized_search_is_refused() {
    let children: Vec<PrerequisiteExpr> = (0..=MAX_UNLOCK_LITERALS)
        .map(|i| PrerequisiteExpr::Literal(code(&format!("CS {:05}", 1000 + i))))
        .collect();
    let expr = PrerequisiteExpr::And(children);
    let err = minimal_unlocking_set(Some(&expr), &BTreeSet::<CourseCode>::new()).unwrap_err();
    assert_eq!(
        err,
        SearchOverflow {
            literals: MAX_UNLOCK_LITERALS + 1,
            limit: MAX_UNLOCK_LITERALS,
        }
    );
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

const UNIVERSE: [&str; 6] = [
    "ART 01100",
    "CS 01100",
    "CS 01101",
    "MATH 01130",
    "MATH 01131",
    "PHYS 01200",
];

fn expr_strategy() -> impl Strategy<Value = PrerequisiteExpr> {
    let leaf = (0..UNIVERSE.len()).prop_map(|i| lit(UNIVERSE[i]));
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(PrerequisiteExpr::And),
            prop::collection::vec(inner, 2..4).prop_map(PrerequisiteExpr::Or),
        ]
    })
}

fn set_strategy() -> impl Strategy<Value = BTreeSet<CourseCode>> {
    prop::collection::vec(any::<bool>(), UNIVERSE.len()).prop_map(|mask| {
        mask.iter()
            .zip(UNIVERSE)
            .filter(|(keep, _)| **keep)
            .map(|(_, c)| code(c))
            .collect()
    })
}

proptest! {
    #[test]
    fn satisfaction_is_monotonic(
        expr in expr_strategy(),
        base in set_strategy(),
        extra in set_strategy(),
    ) {
        let larger: BTreeSet<CourseCode> = base.union(&extra).cloned().collect();
        if is_satisfied(Some(&expr), &base) {
            prop_assert!(is_satisfied(Some(&expr), &larger));
        }
    }

    #[test]
    fn unlocking_set_is_sufficient_and_minimal(
        expr in expr_strategy(),
        completed in set_strategy(),
    ) {
        let unlock = minimal_unlocking_set(Some(&expr), &completed).unwrap();
        if is_satisfied(Some(&expr), &completed) {
            prop_assert!(unlock.is_empty());
        } else {
            prop_assert!(!unlock.is_empty());
            prop_assert!(unlock.iter().all(|c| !completed.contains(c)));

            let with_all: BTreeSet<CourseCode> =
                completed.iter().chain(unlock.iter()).cloned().collect();
            prop_assert!(is_satisfied(Some(&expr), &with_all));

            for skip in &unlock {
                let without: BTreeSet<CourseCode> = completed
                    .iter()
                    .chain(unlock.iter().filter(|c| *c != skip))
                    .cloned()
                    .collect();
                prop_assert!(!is_satisfied(Some(&expr), &without));
            }
        }
    }
}
