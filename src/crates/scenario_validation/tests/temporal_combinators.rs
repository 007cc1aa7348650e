#[path = "support.rs"]
mod support;

use scenario_validation::geom::Point;
use scenario_validation::{Polarity, Quantifier, Temporal, Validation, ValidationStatus};

use support::{calls, counter, world_at, Scripted};
use ValidationStatus::{Failing, Passing};

fn statuses<V: Validation>(validation: &mut V, ticks: usize) -> Vec<ValidationStatus> {
    let world = world_at(0.0, Point::new(0.0, 0.0));
    (0..ticks)
        .map(|_| validation.evaluate(&world).expect("scripted checks never error"))
        .collect()
}

#[test]
fn always_latches_the_first_failure() {
    let mut always = Temporal::always(Scripted::new(
        "flaky",
        &[Passing, Passing, Failing, Passing, Passing],
    ));

    assert_eq!(
        statuses(&mut always, 5),
        vec![Passing, Passing, Failing, Failing, Failing]
    );
    assert!(always.is_settled());
}

#[test]
fn always_stays_unsettled_while_holding() {
    let mut always = Temporal::always(Scripted::passing("steady"));

    assert_eq!(statuses(&mut always, 3), vec![Passing; 3]);
    assert!(!always.is_settled());
    assert!(always.is_invariant());
}

#[test]
fn eventually_latches_the_first_pass() {
    let mut eventually = Temporal::eventually(Scripted::new(
        "milestone",
        &[Failing, Failing, Passing, Failing],
    ));

    assert_eq!(
        statuses(&mut eventually, 5),
        vec![Failing, Failing, Passing, Passing, Passing]
    );
    assert!(eventually.is_settled());
    assert!(!eventually.is_invariant());
}

#[test]
fn negated_flavours_invert_before_latching() {
    let mut always_not = Temporal::always_not(Scripted::new(
        "bad thing",
        &[Failing, Failing, Passing, Failing],
    ));
    assert_eq!(
        statuses(&mut always_not, 4),
        vec![Passing, Passing, Failing, Failing]
    );

    let mut eventually_not =
        Temporal::eventually_not(Scripted::new("edge case", &[Passing, Failing, Passing]));
    assert_eq!(
        statuses(&mut eventually_not, 3),
        vec![Failing, Passing, Passing]
    );
}

#[test]
fn latched_wrapper_stops_querying_the_check() {
    let hits = counter();
    let mut eventually = Temporal::eventually(Scripted::passing("once").counting(hits.clone()));

    statuses(&mut eventually, 4);
    assert_eq!(calls(&hits), 1);
}

#[test]
fn constructors_report_their_flavour() {
    let check = || Scripted::passing("x");
    let cases = [
        (
            Temporal::always(check()),
            Quantifier::Always,
            Polarity::Affirmative,
            "always: x",
        ),
        (
            Temporal::always_not(check()),
            Quantifier::Always,
            Polarity::Negated,
            "always not: x",
        ),
        (
            Temporal::eventually(check()),
            Quantifier::Eventually,
            Polarity::Affirmative,
            "eventually: x",
        ),
        (
            Temporal::eventually_not(check()),
            Quantifier::Eventually,
            Polarity::Negated,
            "eventually not: x",
        ),
    ];

    for (wrapper, quantifier, polarity, description) in cases {
        assert_eq!(wrapper.quantifier(), quantifier);
        assert_eq!(wrapper.polarity(), polarity);
        assert_eq!(wrapper.describe(), description);
    }
}
