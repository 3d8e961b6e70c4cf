//! Host task queue integration.
//!
//! The scheduler never drains on its own. When work arrives it asks a
//! [`FlushHost`] to call [`run_scheduled_flush`](crate::tracker::run_scheduled_flush)
//! on a later tick of the embedding event loop.

use std::time::Duration;

use super::scheduler;

/// Something that can run the scheduler's flush on a later tick.
pub trait FlushHost {
    /// Arrange for `run_scheduled_flush()` to be called after `delay`.
    ///
    /// Called at most once per requested flush; duplicate requests are
    /// coalesced by the scheduler.
    fn schedule(&self, delay: Duration);
}

/// Host for event loops that poll.
///
/// Scheduling does nothing; the loop checks
/// [`is_flush_scheduled`](crate::tracker::is_flush_scheduled) and calls
/// [`run_scheduled_flush`](crate::tracker::run_scheduled_flush) itself.
/// This is the default host.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualHost;

impl FlushHost for ManualHost {
    fn schedule(&self, _delay: Duration) {}
}

/// Host backed by the tokio local task set.
///
/// Each request spawns a local task, so the host must only be used from
/// inside a [`tokio::task::LocalSet`]. Errors from the flush are logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioHost;

impl FlushHost for TokioHost {
    fn schedule(&self, delay: Duration) {
        tokio::task::spawn_local(async move {
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }

            if let Err(err) = scheduler::run_scheduled_flush() {
                tracing::error!(error = %err, "scheduled flush failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Dependency;
    use crate::tracker::{after_flush, autorun, is_flush_scheduled, set_flush_host};
    use std::cell::Cell;
    use std::rc::Rc;
    use tokio::task::LocalSet;

    #[tokio::test]
    async fn tokio_host_drains_on_next_tick() {
        LocalSet::new()
            .run_until(async {
                set_flush_host(TokioHost);

                let d = Dependency::new();
                let runs = Rc::new(Cell::new(0));
                let (d_clone, runs_clone) = (d.clone(), runs.clone());
                let c = autorun(move |_| {
                    d_clone.depend();
                    runs_clone.set(runs_clone.get() + 1);
                    Ok(())
                })
                .unwrap();

                d.changed();
                assert_eq!(runs.get(), 1);

                tokio::time::sleep(Duration::from_millis(20)).await;
                assert_eq!(runs.get(), 2);
                assert!(!is_flush_scheduled());
                c.stop();
            })
            .await;
    }

    #[tokio::test]
    async fn self_invalidating_computation_does_not_starve_the_loop() {
        LocalSet::new()
            .run_until(async {
                set_flush_host(TokioHost);

                let reran = Rc::new(Cell::new(false));
                let reran_clone = reran.clone();
                let c = autorun(move |c| {
                    if !c.is_first_run() {
                        reran_clone.set(true);
                    }
                    c.invalidate();
                    Ok(())
                })
                .unwrap();
                assert!(!reran.get());

                // Host passes yield, so this task gets to run again.
                tokio::time::sleep(Duration::from_millis(100)).await;
                c.stop();

                let done = Rc::new(Cell::new(false));
                let (done_clone, reran_check, c_check) = (done.clone(), reran.clone(), c.clone());
                after_flush(move || {
                    assert!(reran_check.get());
                    assert!(c_check.is_stopped());
                    done_clone.set(true);
                    Ok(())
                });

                tokio::time::sleep(Duration::from_millis(50)).await;
                assert!(done.get());
            })
            .await;
    }
}
