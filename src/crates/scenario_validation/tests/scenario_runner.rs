#[path = "support.rs"]
mod support;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use scenario_validation::geom::Point;
use scenario_validation::validations::kicker_always_not_double_touch;
use scenario_validation::{
    ChannelSource, DiagnosticEvent, MemorySink, ReplaySource, ScenarioConfig, ScenarioOutcome,
    ScenarioRun, SetKind, Temporal, ValidationError, ValidationFactory, ValidationStatus,
};

use support::{
    calls, counter, robot_behind, robot_far_from, tick_world, world_at, Broken, Scripted,
};
use ValidationStatus::{Failing, Passing};

fn ticks(count: u64) -> Vec<scenario_validation::World> {
    (0..count)
        .map(|tick| world_at(tick as f64 * 0.01, Point::new(0.0, 0.0)))
        .collect()
}

#[test]
fn empty_sets_pass_on_the_first_tick() {
    let config = ScenarioConfig::new(vec![Vec::new()], vec![Vec::new()], Duration::from_secs(1));
    let mut source = ReplaySource::new(ticks(3));

    let report = ScenarioRun::new(&config)
        .run(&mut source)
        .expect("replay stays open");

    assert_eq!(
        report.outcome,
        ScenarioOutcome::Passed {
            tick: 1,
            timestamp: 0.0
        }
    );
    assert_eq!(report.ticks, 1);
    assert_eq!(source.remaining(), 2);
}

#[test]
fn unmet_milestone_times_out_without_reaching_the_next_step() {
    let second_calls = counter();
    let tracked = second_calls.clone();
    let config = ScenarioConfig::default()
        .with_eventually_sequence(vec![
            ValidationFactory::new(|| Temporal::eventually(Scripted::failing("ball kicked"))),
            ValidationFactory::new(move || {
                Temporal::eventually(
                    Scripted::passing("robot received ball").counting(tracked.clone()),
                )
            }),
        ])
        .with_timeout(Duration::from_millis(100));

    let (tx, mut source) = ChannelSource::channel();
    let producer = thread::spawn(move || {
        for world in ticks(5) {
            if tx.send(world).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        // Stay connected but silent until the scenario gives up.
        thread::sleep(Duration::from_millis(300));
    });

    let report = ScenarioRun::new(&config)
        .run(&mut source)
        .expect("source stays open");
    producer.join().expect("producer thread");

    assert_eq!(
        report.outcome,
        ScenarioOutcome::TimedOut {
            ticks: 5,
            pending: vec!["eventually: ball kicked".to_string()],
        }
    );
    assert!(!report.passed());
    assert_eq!(calls(&second_calls), 0);
    assert!(report.elapsed >= Duration::from_millis(100));
}

#[test]
fn timeout_holds_even_when_no_snapshot_ever_arrives() {
    let config = ScenarioConfig::new(vec![Vec::new()], vec![Vec::new()], Duration::from_millis(50));
    let (_tx, mut source) = ChannelSource::channel();

    let report = ScenarioRun::new(&config)
        .run(&mut source)
        .expect("source stays open");

    assert_eq!(
        report.outcome,
        ScenarioOutcome::TimedOut {
            ticks: 0,
            pending: Vec::new(),
        }
    );
    assert_eq!(report.last_timestamp, None);
}

#[test]
fn double_touch_fails_the_run_at_the_offending_tick() {
    let config = ScenarioConfig::default()
        .with_always_sequence(vec![ValidationFactory::new(kicker_always_not_double_touch)])
        .with_eventually_sequence(vec![ValidationFactory::new(|| {
            Temporal::eventually(Scripted::failing("never"))
        })]);

    let start = Point::new(0.0, 0.0);
    let moved = Point::new(0.2, 0.0);
    let snapshots = vec![
        tick_world(0, start, &[robot_behind(1, start)]),
        tick_world(1, Point::new(0.1, 0.0), &[robot_far_from(1, start)]),
        tick_world(2, moved, &[robot_behind(1, moved)]),
        tick_world(3, moved, &[robot_far_from(1, moved)]),
    ];
    let mut source = ReplaySource::new(snapshots);

    let sink = Arc::new(MemorySink::new());
    let report = ScenarioRun::with_diagnostics(&config, sink.clone())
        .run(&mut source)
        .expect("replay stays open");

    let description =
        "always: Checking that the robot kicking the ball is not touching the ball consecutively"
            .to_string();
    assert_eq!(
        report.outcome,
        ScenarioOutcome::Failed {
            sequence: 0,
            position: 0,
            description: description.clone(),
            tick: 3,
            timestamp: 0.02,
        }
    );
    assert!(sink.events().contains(&DiagnosticEvent::InvariantViolated {
        sequence: 0,
        position: 0,
        description,
        tick: 3,
        timestamp: 0.02,
    }));
}

#[test]
fn invariants_are_checked_before_milestones() {
    let config = ScenarioConfig::default()
        .with_always_sequence(vec![ValidationFactory::new(|| {
            Temporal::always(Scripted::failing("robots avoid ball"))
        })])
        .with_eventually_sequence(vec![ValidationFactory::new(|| {
            Temporal::eventually(Scripted::passing("ball kicked"))
        })]);

    let mut run = ScenarioRun::new(&config);
    let outcome = run.process_snapshot(&world_at(0.5, Point::new(0.0, 0.0)));

    assert_eq!(
        outcome,
        Some(ScenarioOutcome::Failed {
            sequence: 0,
            position: 0,
            description: "always: robots avoid ball".to_string(),
            tick: 1,
            timestamp: 0.5,
        })
    );
}

#[test]
fn failure_names_the_sequence_and_position_of_the_broken_unit() {
    let config = ScenarioConfig::default()
        .with_always_sequence(vec![ValidationFactory::new(|| {
            Temporal::always(Scripted::passing("robots avoid ball"))
        })])
        .with_always_sequence(vec![
            ValidationFactory::new(|| Temporal::eventually(Scripted::passing("setup"))),
            ValidationFactory::new(|| Temporal::always(Scripted::failing("robots avoid ball"))),
        ])
        .with_eventually_sequence(vec![ValidationFactory::new(|| {
            Temporal::eventually(Scripted::failing("ball kicked"))
        })]);

    let mut run = ScenarioRun::new(&config);
    let world = world_at(0.0, Point::new(0.0, 0.0));

    assert_eq!(run.process_snapshot(&world), None);
    assert_eq!(
        run.process_snapshot(&world),
        Some(ScenarioOutcome::Failed {
            sequence: 1,
            position: 1,
            description: "always: robots avoid ball".to_string(),
            tick: 2,
            timestamp: 0.0,
        })
    );
}

#[test]
fn any_alternative_milestone_path_passes_the_run() {
    let config = ScenarioConfig::default()
        .with_eventually_sequence(vec![ValidationFactory::new(|| {
            Temporal::eventually(Scripted::failing("score directly"))
        })])
        .with_eventually_sequence(vec![
            ValidationFactory::new(|| Temporal::eventually(Scripted::passing("pass"))),
            ValidationFactory::new(|| {
                Temporal::eventually(Scripted::new("receive", &[Failing, Passing]))
            }),
        ]);

    let mut run = ScenarioRun::new(&config);
    let world = world_at(0.0, Point::new(0.0, 0.0));

    assert_eq!(run.process_snapshot(&world), None);
    assert_eq!(run.process_snapshot(&world), None);
    assert_eq!(
        run.process_snapshot(&world),
        Some(ScenarioOutcome::Passed {
            tick: 3,
            timestamp: 0.0
        })
    );
    assert_eq!(run.eventually_set().sequences()[1].cursor(), 2);
}

#[test]
fn terminal_outcome_is_final() {
    let config = ScenarioConfig::new(vec![Vec::new()], vec![Vec::new()], Duration::from_secs(1));
    let mut run = ScenarioRun::new(&config);

    let first = run.process_snapshot(&world_at(0.0, Point::new(0.0, 0.0)));
    let second = run.process_snapshot(&world_at(1.0, Point::new(0.0, 0.0)));

    assert_eq!(first, second);
    assert_eq!(run.ticks(), 1);
}

#[test]
fn evaluation_errors_are_distinct_from_failures() {
    let config = ScenarioConfig::default()
        .with_eventually_sequence(vec![ValidationFactory::new(|| Temporal::eventually(Broken))]);

    let mut source = ReplaySource::new(ticks(2));
    let sink = Arc::new(MemorySink::new());
    let report = ScenarioRun::with_diagnostics(&config, sink.clone())
        .run(&mut source)
        .expect("replay stays open");

    assert_eq!(
        report.outcome,
        ScenarioOutcome::EvaluationError {
            set: SetKind::Eventually,
            description: "eventually: broken check".to_string(),
            message: "ball state unavailable".to_string(),
            tick: 1,
            timestamp: 0.0,
        }
    );
    assert!(sink
        .events()
        .iter()
        .any(|event| matches!(event, DiagnosticEvent::EvaluationFailed { .. })));
}

#[test]
fn abort_stops_the_run() {
    let config = ScenarioConfig::default()
        .with_eventually_sequence(vec![ValidationFactory::new(|| {
            Temporal::eventually(Scripted::failing("never"))
        })])
        .with_timeout(Duration::from_secs(30));

    let run = ScenarioRun::new(&config);
    let abort = run.abort_handle();
    let (tx, mut source) = ChannelSource::channel();

    let aborter = thread::spawn(move || {
        for world in ticks(3) {
            let _ = tx.send(world);
        }
        thread::sleep(Duration::from_millis(50));
        abort.abort();
        // Keep the channel open so the abort, not a closed source, ends the run.
        thread::sleep(Duration::from_millis(100));
    });

    let report = run.run(&mut source).expect("source stays open");
    aborter.join().expect("aborter thread");

    assert_eq!(report.outcome, ScenarioOutcome::Aborted { ticks: 3 });
    assert!(report.elapsed < Duration::from_secs(30));
}

#[test]
fn closed_source_is_an_error() {
    let config = ScenarioConfig::default().with_eventually_sequence(vec![ValidationFactory::new(
        || Temporal::eventually(Scripted::failing("never")),
    )]);
    let (tx, mut source) = ChannelSource::channel();
    drop(tx);

    let result = ScenarioRun::new(&config).run(&mut source);
    assert!(matches!(result, Err(ValidationError::SourceClosed)));
}

#[test]
fn rerunning_a_config_builds_fresh_checks() {
    let config = ScenarioConfig::default()
        .with_always_sequence(vec![ValidationFactory::new(|| {
            Temporal::always(Scripted::new("first tick only", &[Failing, Passing]))
        })]);
    let world = world_at(0.0, Point::new(0.0, 0.0));

    for _ in 0..2 {
        let mut run = ScenarioRun::new(&config);
        assert!(matches!(
            run.process_snapshot(&world),
            Some(ScenarioOutcome::Failed { tick: 1, .. })
        ));
    }
}

#[test]
fn run_started_is_recorded_with_set_sizes() {
    let config = ScenarioConfig::new(
        vec![Vec::new(), Vec::new()],
        vec![Vec::new()],
        Duration::from_secs(2),
    );
    let sink = Arc::new(MemorySink::new());
    let _run = ScenarioRun::with_diagnostics(&config, sink.clone());

    assert_eq!(
        sink.events(),
        vec![DiagnosticEvent::RunStarted {
            always_sequences: 2,
            eventually_sequences: 1,
            timeout: Duration::from_secs(2),
        }]
    );
}

#[test]
fn milestone_progress_is_reported_per_advance() {
    let config = ScenarioConfig::default().with_eventually_sequence(vec![
        ValidationFactory::new(|| Temporal::eventually(Scripted::passing("kick"))),
        ValidationFactory::new(|| Temporal::eventually(Scripted::passing("receive"))),
    ]);
    let sink = Arc::new(MemorySink::new());
    let mut run = ScenarioRun::with_diagnostics(&config, sink.clone());
    let world = world_at(0.0, Point::new(0.0, 0.0));

    run.process_snapshot(&world);
    run.process_snapshot(&world);

    let advances: Vec<_> = sink
        .events()
        .into_iter()
        .filter_map(|event| match event {
            DiagnosticEvent::SequenceAdvanced {
                set: SetKind::Eventually,
                position,
                tick,
                ..
            } => Some((position, tick)),
            _ => None,
        })
        .collect();
    assert_eq!(advances, vec![(0, 1), (1, 2)]);
}

#[test]
fn unit_verdict_passing_does_not_end_an_invariant_sequence() {
    let config = ScenarioConfig::default()
        .with_always_sequence(vec![ValidationFactory::new(|| {
            Temporal::always(Scripted::new("late failure", &[Passing, Passing, Failing]))
        })])
        .with_eventually_sequence(vec![ValidationFactory::new(|| {
            Temporal::eventually(Scripted::failing("never"))
        })]);

    let mut run = ScenarioRun::new(&config);
    let world = world_at(0.0, Point::new(0.0, 0.0));

    assert_eq!(run.process_snapshot(&world), None);
    assert_eq!(run.process_snapshot(&world), None);
    assert!(matches!(
        run.process_snapshot(&world),
        Some(ScenarioOutcome::Failed { tick: 3, .. })
    ));
}
