//! Handshake, cancellation and argument-forwarding guarantees of bounded
//! runs, exercised through recording predicates and processes.

use anyhow::anyhow;
use bound::test_support::{
    Probe, ScriptedPredicate, bailout, counting, ends_after_args, ends_after_prime, fibonacci,
    forever, scripted,
};
use bound::{
    BoundError, Boundary, CallArgs, Phase, Process, Step, all_of, any_of, from_fn, from_iter,
    times,
};

fn protocol_phase(err: BoundError) -> (String, Phase) {
    match err {
        BoundError::Protocol(violation) => (violation.predicate, violation.phase),
        other => panic!("expected a protocol violation, got {other:?}"),
    }
}

#[test]
fn argless_predicate_ignores_arguments() {
    let probe = Probe::new();
    let argless = scripted(
        "argless",
        &[Step::Continue, Step::Continue, Step::Continue],
        Step::Stop,
        &probe,
    );
    let fib2 = argless.bind(fibonacci());
    assert_eq!(fib2.call(&CallArgs::new()).expect("call"), Some(1));
    assert_eq!(probe.closes(), 1);
}

#[test]
fn close_reaches_predicates_nested_in_aggregates() {
    let probe = Probe::new();
    let fibnone = all_of([any_of([bailout(&probe)])]).bind(fibonacci());
    assert_eq!(fibnone.call(&CallArgs::new()).expect("call"), Some(1));
    assert_eq!(probe.closes(), 1);
}

#[test]
fn predicate_ending_at_argument_delivery_is_a_violation() {
    let process = Probe::new();
    let fibinv = all_of([ends_after_prime(), times(10)]).bind(counting(&process));
    let err = fibinv.call(&CallArgs::new()).expect_err("violation");
    assert!(err.is_protocol());
    assert_eq!(
        protocol_phase(err),
        ("ends_after_prime".to_string(), Phase::ArgsDelivery)
    );
    assert_eq!(process.resumes(), 0);
    assert_eq!(process.closes(), 1);
}

#[test]
fn predicate_ending_at_first_cycle_is_a_violation() {
    let process = Probe::new();
    let fibinv = all_of([ends_after_args(), times(10)]).bind(counting(&process));
    let err = fibinv.call(&CallArgs::new()).expect_err("violation");
    assert_eq!(
        protocol_phase(err),
        ("ends_after_args".to_string(), Phase::Cycle(1))
    );
    assert_eq!(process.resumes(), 1);
    assert_eq!(process.closes(), 1);
}

#[test]
fn unaggregated_violation_closes_the_process() {
    let process = Probe::new();
    let bounded = ends_after_args().bind(counting(&process));
    let mut run = bounded.run(&CallArgs::new()).expect("start");
    let err = run
        .next()
        .expect("one item")
        .expect_err("violation at first cycle");
    assert!(err.is_protocol());
    assert!(run.next().is_none());
    assert_eq!(process.closes(), 1);
}

#[test]
fn violating_child_still_lets_siblings_close() {
    let sibling = Probe::new();
    let bounded = all_of([forever(&sibling), ends_after_args()]).bind(fibonacci());
    let err = bounded.call(&CallArgs::new()).expect_err("violation");
    assert!(err.is_protocol());
    assert_eq!(sibling.closes(), 1);
}

#[test]
fn arguments_reach_the_process_and_every_predicate() {
    let args = CallArgs::new()
        .with_arg(1)
        .with_arg(2)
        .with_named("egg", "ham");

    let factory_probe = Probe::new();
    let instance_probe = Probe::new();
    let process_probe = Probe::new();
    let stop_now = [Step::Continue, Step::Stop];
    let by_factory = scripted("pred", &stop_now, Step::Stop, &factory_probe);
    let by_instance = Boundary::from_instance(
        "pred()",
        ScriptedPredicate::new(stop_now, Step::Stop, &instance_probe),
    );

    let bounded = all_of([by_factory, by_instance]).bind(counting(&process_probe));
    assert_eq!(bounded.call(&args).expect("call"), None);

    assert_eq!(factory_probe.args(), vec![args.clone()]);
    assert_eq!(instance_probe.args(), vec![args.clone()]);
    assert_eq!(process_probe.args(), vec![args]);
}

#[test]
fn any_of_also_broadcasts_arguments() {
    let first = Probe::new();
    let second = Probe::new();
    let args = CallArgs::new().with_arg(1).with_arg(2);
    let bounded = any_of([
        scripted("a", &[Step::Continue, Step::Stop], Step::Stop, &first),
        scripted("b", &[Step::Continue, Step::Continue], Step::Stop, &second),
    ])
    .bind(counting(&Probe::new()));
    assert_eq!(bounded.call(&args).expect("call"), None);
    assert_eq!(first.args(), vec![args.clone()]);
    assert_eq!(second.args(), vec![args]);
    assert_eq!(first.closes() + second.closes(), 2);
}

#[test]
fn unconfigured_reference_predicate_is_a_usage_error() {
    let spec = bound::io::config::BoundarySpec::All {
        children: vec![bound::io::config::BoundarySpec::Times { n: None }],
    };
    let process = Probe::new();
    let bounded = spec.to_boundary().bind(counting(&process));
    let err = bounded.call(&CallArgs::new()).expect_err("usage");
    assert!(matches!(err, BoundError::Usage(_)));
    assert_eq!(process.closes(), 1);
}

#[test]
fn predicate_instances_are_single_use() {
    let probe = Probe::new();
    let once = Boundary::from_instance(
        "once",
        ScriptedPredicate::new([Step::Continue], Step::Stop, &probe),
    );
    let bounded = once.bind(fibonacci());
    assert_eq!(bounded.call(&CallArgs::new()).expect("first"), None);
    assert!(matches!(
        bounded.call(&CallArgs::new()),
        Err(BoundError::Usage(_))
    ));
}

#[test]
fn process_errors_close_the_predicate() {
    let probe = Probe::new();
    let bounded = forever(&probe).bind(Process::factory(|args: &CallArgs| -> anyhow::Result<_> {
        let base = match args.arg(0) {
            Some(value) => value
                .as_u64()
                .ok_or_else(|| anyhow!("expected a number, got {value}"))?,
            None => 0,
        };
        Ok(from_iter([base]))
    }));

    assert_eq!(
        bounded.call(&CallArgs::new().with_arg(3)).expect("valid"),
        Some(3)
    );
    assert_eq!(probe.closes(), 1);

    let err = bounded
        .call(&CallArgs::new().with_arg("invalid"))
        .expect_err("invalid argument");
    assert!(matches!(err, BoundError::Process(_)));
    // The factory failed before any predicate existed for this run.
    assert_eq!(probe.closes(), 1);

    let failing = forever(&probe).bind(Process::factory(|_: &CallArgs| {
        Ok(from_fn(|| Err::<Option<u64>, _>(anyhow!("broken"))))
    }));
    let err = failing.call(&CallArgs::new()).expect_err("process error");
    assert!(matches!(err, BoundError::Process(_)));
    assert_eq!(probe.closes(), 2);
}

fn failing_after_one() -> Process<u64> {
    Process::factory(|_: &CallArgs| {
        let mut produced = false;
        Ok(from_fn(move || {
            if produced {
                return Err(anyhow!("source failed"));
            }
            produced = true;
            Ok(Some(7))
        }))
    })
}

#[test]
fn all_of_absorbs_only_when_every_child_does() {
    let absorbing = bound::until_errors("any_error", |_: &anyhow::Error| true);
    let bounded = all_of([absorbing, times(10)]).bind(failing_after_one());
    let err = bounded.call(&CallArgs::new()).expect_err("not absorbed");
    assert!(matches!(err, BoundError::Process(_)));
    assert_eq!(err.to_string(), "source failed");
}

#[test]
fn any_of_absorbs_when_one_child_does() {
    let absorbing = bound::until_errors("any_error", |_: &anyhow::Error| true);
    let bounded = any_of([absorbing, times(10)]).bind(failing_after_one());
    let outcome = bounded.outcome(&CallArgs::new()).expect("absorbed");
    assert_eq!(outcome.values, vec![7]);
    assert_eq!(outcome.stop, bound::StopReason::ErrorAbsorbed);
}
