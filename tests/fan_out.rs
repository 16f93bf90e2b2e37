use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use failfast::{
    fan_out, CancelSignal, Config, DeliveryMode, FanOutError, NoDelay, SimulatedWork, TaskFate,
    UnitFailure, WorkFn,
};

fn cfg(tasks: usize, fail_index: i64) -> Config {
    Config {
        tasks,
        fail_index,
        verbose: false,
        max_sleep: Duration::from_millis(2),
        delivery: DeliveryMode::CheckThenSend,
    }
}

fn as_set(values: &[i64]) -> BTreeSet<i64> {
    values.iter().copied().collect()
}

fn assert_no_duplicates(values: &[i64]) {
    assert_eq!(as_set(values).len(), values.len(), "duplicates in {values:?}");
}

fn count(fates: &[TaskFate], fate: TaskFate) -> usize {
    fates.iter().filter(|f| **f == fate).count()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn five_tasks_none_failing() -> anyhow::Result<()> {
    let report = failfast::run(&cfg(5, 10)).await?;

    assert_eq!(report.error, None);
    assert_eq!(report.count(), 5);
    assert_eq!(as_set(&report.values), (0..5).collect::<BTreeSet<_>>());
    assert_eq!(report.launched.join().await?, vec![TaskFate::Delivered; 5]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn five_tasks_third_failing() -> anyhow::Result<()> {
    let report = failfast::run(&cfg(5, 2)).await?;

    assert_eq!(report.error, Some(UnitFailure::at(2)));
    assert!(report.count() <= 4);
    assert!(!report.values.contains(&2));
    assert_no_duplicates(&report.values);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_task_failing() -> anyhow::Result<()> {
    let report = failfast::run(&cfg(1, 0)).await?;

    assert!(report.values.is_empty());
    assert_eq!(report.error, Some(UnitFailure::at(0)));
    assert_eq!(report.error.map(|e| e.to_string()).as_deref(), Some("bang 0!"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_task_succeeding() -> anyhow::Result<()> {
    let report = failfast::run(&cfg(1, 5)).await?;

    assert_eq!(report.values, vec![0]);
    assert_eq!(report.error, None);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn all_success_for_every_size() -> anyhow::Result<()> {
    for n in 1..=12usize {
        for fail_index in [-1, n as i64, n as i64 + 7] {
            let report = failfast::run(&cfg(n, fail_index)).await?;
            assert_eq!(report.error, None);
            assert_eq!(as_set(&report.values), (0..n as i64).collect::<BTreeSet<_>>());
            assert_eq!(report.launched.join().await?.len(), n);
        }
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fail_fast_for_every_index() -> anyhow::Result<()> {
    for delivery in [DeliveryMode::CheckThenSend, DeliveryMode::RaceCancel] {
        for n in 1..=8usize {
            for fail_index in 0..n {
                let config = Config {
                    delivery,
                    ..cfg(n, fail_index as i64)
                };
                let report = failfast::run(&config).await?;

                assert_eq!(report.error, Some(UnitFailure::at(fail_index)));
                assert!(report.count() < n);
                assert!(!report.values.contains(&(fail_index as i64)));
                assert_no_duplicates(&report.values);

                // Every task ends somehow; none is left blocked.
                let collected = report.count();
                let fates = report.launched.join().await?;
                assert_eq!(fates.len(), n);
                assert!(count(&fates, TaskFate::Delivered) > collected);
            }
        }
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn zero_delay_work_is_deterministic_on_success() -> anyhow::Result<()> {
    let report = fan_out(&cfg(6, -1), SimulatedWork::new(-1, NoDelay)).await?;
    assert_eq!(as_set(&report.values), (0..6).collect::<BTreeSet<_>>());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn slow_tasks_are_abandoned_after_an_early_failure() -> anyhow::Result<()> {
    let work = WorkFn::new(|i: usize, _signal: CancelSignal| async move {
        if i == 0 {
            return Err(UnitFailure::at(0));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(i)
    });

    let report = fan_out(&cfg(4, 0), work).await?;

    assert!(report.values.is_empty());
    assert_eq!(report.error, Some(UnitFailure::at(0)));
    assert_eq!(
        report.launched.join().await?,
        vec![
            TaskFate::Delivered,
            TaskFate::Abandoned,
            TaskFate::Abandoned,
            TaskFate::Abandoned
        ]
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn early_failure_returns_without_waiting_for_slow_units() -> anyhow::Result<()> {
    for delivery in [DeliveryMode::CheckThenSend, DeliveryMode::RaceCancel] {
        // Unit 1 ignores the signal and takes a long time.
        let work = WorkFn::new(|i: usize, _signal: CancelSignal| async move {
            if i == 0 {
                return Err(UnitFailure::at(0));
            }
            tokio::time::sleep(Duration::from_secs(3)).await;
            Ok(i)
        });
        let config = Config {
            delivery,
            ..cfg(2, 0)
        };

        let started = Instant::now();
        let report = fan_out(&config, work).await?;
        let elapsed = started.elapsed();

        assert_eq!(report.error, Some(UnitFailure::at(0)));
        assert!(elapsed < Duration::from_millis(500), "took {elapsed:?}");
        assert!(report.launched.pending() >= 1);
        // Dropping the report detaches the slow unit.
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn units_watching_the_signal_stop_early() -> anyhow::Result<()> {
    let work = WorkFn::new(|i: usize, signal: CancelSignal| async move {
        if i == 0 {
            return Err(UnitFailure::at(0));
        }
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(3)) => Ok(i),
            _ = signal.cancelled() => Ok(i),
        }
    });

    let started = Instant::now();
    let report = fan_out(&cfg(3, 0), work).await?;
    let fates = report.launched.join().await?;

    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(
        fates,
        vec![TaskFate::Delivered, TaskFate::Abandoned, TaskFate::Abandoned]
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simulated_units_stop_sleeping_after_a_failure() -> anyhow::Result<()> {
    let slow_except_first = |i: usize| {
        if i == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(3)
        }
    };
    let started = Instant::now();
    let report = fan_out(&cfg(4, 0), SimulatedWork::new(0, slow_except_first)).await?;
    report.launched.join().await?;

    assert_eq!(report.error, Some(UnitFailure::at(0)));
    assert!(started.elapsed() < Duration::from_millis(500));
    Ok(())
}

#[tokio::test]
async fn zero_tasks_is_an_error() {
    let err = failfast::run(&cfg(0, 0)).await.unwrap_err();
    assert!(matches!(err, FanOutError::NoTasks));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_work_surfaces_as_join_error() {
    let work = WorkFn::new(|i: usize, _signal: CancelSignal| async move {
        if i == 1 {
            panic!("unit {i} blew up");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok::<_, UnitFailure>(i)
    });

    // The collector sees the channel close once every sender is gone.
    let report = fan_out(&cfg(3, -1), work).await.unwrap();
    assert_eq!(report.error, None);
    assert_eq!(report.count(), 2);

    let err = report.launched.join().await.unwrap_err();
    assert_eq!(err.as_label(), "fan_out_join");
}
