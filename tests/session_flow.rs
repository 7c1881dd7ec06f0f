use proptest::prelude::*;
use setwise::{
    ExercisePlan, ExercisePlanItem, Phase, SessionError, SetLedger, Transition, WorkoutSession,
    models::OneRMFormula, types::Muscle,
};

fn plan(items: &[(&str, u32, u32)]) -> ExercisePlan {
    ExercisePlan::new(
        "flow",
        items
            .iter()
            .map(|(id, sets, rest)| ExercisePlanItem::new(*id, *id, Muscle::Back, *sets, 10, *rest))
            .collect(),
    )
    .unwrap()
}

#[test]
fn single_exercise_two_sets_completes_with_volume() {
    let mut s = WorkoutSession::start(plan(&[("row", 2, 90)]));

    s.log_set(10, 20.0).unwrap();
    let st = s.state();
    assert!(st.rest_active);
    assert_eq!(st.current_set_number, 2);

    s.skip_rest().unwrap();
    assert!(!s.state().rest_active);

    s.log_set(8, 20.0).unwrap();
    assert_eq!(s.phase(), Phase::Completed);
    assert_eq!(s.ledger().total_volume(), 10.0 * 20.0 + 8.0 * 20.0);
    assert_eq!(s.summary().unwrap().total_volume, 360.0);
    assert_eq!(s.summary().unwrap().exercise_count, 1);
}

#[test]
fn log_set_while_resting_is_rejected() {
    let mut s = WorkoutSession::start(plan(&[("row", 3, 90)]));
    s.log_set(10, 20.0).unwrap();
    let before = s.state();

    let err = s.log_set(10, 20.0).unwrap_err();
    assert!(matches!(err, SessionError::InvalidOperation { .. }));
    assert_eq!(s.ledger().len(), 1);
    assert_eq!(s.state(), before);
}

#[test]
fn navigation_between_exercises_keeps_ledger() {
    let mut s = WorkoutSession::start(plan(&[("pullup", 1, 60), ("curl", 3, 60)]));
    assert_eq!(s.log_set(6, 0.0), Ok(Transition::ExerciseDone));

    s.next_exercise().unwrap();
    let st = s.state();
    assert_eq!(st.current_exercise_index, 1);
    assert_eq!(st.current_set_number, 1);

    s.previous_exercise().unwrap();
    assert_eq!(s.state().current_exercise_index, 0);
    assert_eq!(s.ledger().sets_logged("pullup"), 1);
    assert!(s.ledger().is_set_complete("pullup", 1));
}

#[test]
fn ledger_rejects_gapped_set_number() {
    let mut ledger = SetLedger::new();
    let err = ledger.record("squat", 3, 5, 100.0).unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidSequence { expected: 1, got: 3, .. }
    ));
    assert!(ledger.is_empty());
}

#[test]
fn exit_while_resting_freezes_everything() {
    let mut s = WorkoutSession::start(plan(&[("row", 3, 90)]));
    s.log_set(10, 20.0).unwrap();
    s.tick();

    assert_eq!(s.exit_session(), Ok(Transition::Exited));
    let frozen = s.state();
    assert_eq!(frozen.phase, Phase::Exited);
    assert!(!frozen.rest_active);

    for _ in 0..10 {
        s.tick();
    }
    assert_eq!(s.state(), frozen);
    assert!(s.summary().is_none());
    assert!(s.finished_session(OneRMFormula::Epley).is_none());
}

#[test]
fn skipping_ahead_then_finishing_last_exercise_completes() {
    let mut s = WorkoutSession::start(plan(&[("a", 2, 0), ("b", 1, 0)]));
    s.next_exercise().unwrap();
    assert!(matches!(s.log_set(5, 10.0), Ok(Transition::Completed(_))));
    assert_eq!(s.summary().unwrap().total_volume, 50.0);
}

#[derive(Debug, Clone)]
enum Cmd {
    Log(u32, u32),
    Next,
    Prev,
    Skip,
    Tick,
    Complete,
    Exit,
}

fn cmd_strategy() -> impl Strategy<Value = Cmd> {
    prop_oneof![
        6 => (1u32..15, 0u32..120).prop_map(|(r, w)| Cmd::Log(r, w)),
        2 => Just(Cmd::Next),
        2 => Just(Cmd::Prev),
        2 => Just(Cmd::Skip),
        4 => Just(Cmd::Tick),
        1 => Just(Cmd::Complete),
        1 => Just(Cmd::Exit),
    ]
}

fn apply(s: &mut WorkoutSession, cmd: &Cmd) -> Option<Result<Transition, SessionError>> {
    match cmd {
        Cmd::Log(r, w) => Some(s.log_set(*r, *w as f32)),
        Cmd::Next => Some(s.next_exercise()),
        Cmd::Prev => Some(s.previous_exercise()),
        Cmd::Skip => Some(s.skip_rest()),
        Cmd::Tick => {
            s.tick();
            None
        }
        Cmd::Complete => Some(s.complete_session()),
        Cmd::Exit => Some(s.exit_session()),
    }
}

proptest! {
    #[test]
    fn ledger_stays_contiguous_and_bounded(cmds in prop::collection::vec(cmd_strategy(), 0..80)) {
        let mut s = WorkoutSession::start(plan(&[("a", 3, 2), ("b", 2, 1), ("c", 1, 0)]));
        for cmd in &cmds {
            let _ = apply(&mut s, cmd);
        }

        for item in s.plan().items() {
            let numbers: Vec<u32> = s.ledger().sets_for(&item.id).map(|c| c.set_number).collect();
            let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
            prop_assert_eq!(&numbers, &expected);
            prop_assert!(numbers.len() as u32 <= item.target_sets);
        }

        let manual: f32 = s.ledger().entries().iter().map(|c| c.reps as f32 * c.weight).sum();
        prop_assert_eq!(s.ledger().total_volume(), manual);
    }

    #[test]
    fn terminal_sessions_reject_all_commands(
        prefix in prop::collection::vec(cmd_strategy(), 0..30),
        suffix in prop::collection::vec(cmd_strategy(), 1..30),
        complete in any::<bool>(),
    ) {
        let mut s = WorkoutSession::start(plan(&[("a", 2, 3), ("b", 2, 3)]));
        for cmd in &prefix {
            let _ = apply(&mut s, cmd);
        }
        if !s.phase().is_terminal() {
            if complete {
                s.complete_session().unwrap();
            } else {
                s.exit_session().unwrap();
            }
        }

        let frozen = s.state();
        let sets = s.ledger().len();
        let summary = s.summary().cloned();
        for cmd in &suffix {
            if let Some(res) = apply(&mut s, cmd) {
                prop_assert!(res.is_err());
            }
        }
        prop_assert_eq!(s.state(), frozen);
        prop_assert_eq!(s.ledger().len(), sets);
        prop_assert_eq!(s.summary().cloned(), summary);
    }

    #[test]
    fn skip_rest_always_clears_rest(rest in 1u32..600, ticks in 0u32..5) {
        let mut s = WorkoutSession::start(plan(&[("a", 2, rest)]));
        s.log_set(5, 50.0).unwrap();
        for _ in 0..ticks {
            s.tick();
        }
        if s.state().rest_active {
            s.skip_rest().unwrap();
        }
        prop_assert!(!s.state().rest_active);
        prop_assert_eq!(s.state().rest_remaining_seconds, 0);
    }
}
