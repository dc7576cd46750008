//! Swarm tests: parallel execution, panic isolation, cancellation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cloudslash_analysis::swarm::{CancelToken, Swarm, TaskSpec};
use cloudslash_core::errors::ScanError;
use cloudslash_core::SweepConfig;
use crossbeam_channel::unbounded;

fn config(workers: usize) -> SweepConfig {
    SweepConfig {
        max_workers: Some(workers),
        ..SweepConfig::default()
    }
}

#[test]
fn every_submitted_task_runs() {
    let swarm = Swarm::start(&config(4), CancelToken::new());
    let counter = Arc::new(AtomicUsize::new(0));
    for i in 0..64 {
        let counter = Arc::clone(&counter);
        swarm
            .submit(TaskSpec::named(&format!("task-{i}")), move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
    }
    swarm.join();
    assert_eq!(counter.load(Ordering::SeqCst), 64);
}

#[test]
fn a_panicking_task_becomes_an_error_and_spares_the_worker() {
    let swarm = Swarm::start(&config(1), CancelToken::new());
    let (tx, rx) = unbounded();

    swarm
        .submit_tracked(
            TaskSpec::named("boom"),
            |_| panic!("scanner exploded"),
            tx.clone(),
        )
        .unwrap();
    // The single worker must survive to run this one.
    swarm
        .submit_tracked(TaskSpec::named("after"), |_| Ok(()), tx.clone())
        .unwrap();
    drop(tx);
    swarm.join();

    let outcomes: Vec<_> = rx.iter().collect();
    assert_eq!(outcomes.len(), 2);
    let boom = outcomes.iter().find(|o| o.name == "boom").unwrap();
    assert!(matches!(
        &boom.result,
        Err(ScanError::Fatal { message }) if message.contains("exploded")
    ));
    let after = outcomes.iter().find(|o| o.name == "after").unwrap();
    assert!(after.result.is_ok());
}

#[test]
fn cancellation_short_circuits_queued_tasks() {
    let cancel = CancelToken::new();
    let swarm = Swarm::start(&config(2), cancel.clone());
    let (tx, rx) = unbounded();

    cancel.cancel();
    for i in 0..8 {
        swarm
            .submit_tracked(TaskSpec::named(&format!("late-{i}")), |_| Ok(()), tx.clone())
            .unwrap();
    }
    drop(tx);
    swarm.join();

    for outcome in rx.iter() {
        assert!(matches!(outcome.result, Err(ScanError::Cancelled)));
    }
}

#[test]
fn tasks_observe_the_token_mid_flight() {
    let cancel = CancelToken::new();
    let swarm = Swarm::start(&config(1), cancel.clone());
    let (tx, rx) = unbounded();

    let inner = cancel.clone();
    swarm
        .submit_tracked(
            TaskSpec::named("self-cancelling"),
            move |token| {
                inner.cancel();
                if token.is_cancelled() {
                    return Err(ScanError::Cancelled);
                }
                Ok(())
            },
            tx,
        )
        .unwrap();
    swarm.join();

    let outcome = rx.recv().unwrap();
    assert!(matches!(outcome.result, Err(ScanError::Cancelled)));
}
