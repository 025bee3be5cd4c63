use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::SuiteError;

/// Interval + deadline for one bounded poll.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub deadline: Duration,
}

impl PollConfig {
    pub fn new(interval: Duration, deadline: Duration) -> Self {
        Self { interval, deadline }
    }
}

/// One live observation of the probed state.
#[derive(Debug)]
pub enum PollStep<T> {
    Ready(T),
    /// Not there yet; the snapshot is reported back if the deadline passes.
    Pending(String),
}

/// Terminal outcome of a poll.
#[derive(Debug)]
pub enum PollOutcome<T> {
    Satisfied(T),
    Deadline {
        last_seen: Option<String>,
        elapsed: Duration,
    },
    Cancelled,
}

/// Something that can be checked repeatedly against live external state.
/// Each `check` must re-query that state, never answer from a cache.
#[async_trait]
pub trait PollProbe: Send {
    type Output: Send;

    async fn check(&mut self) -> Result<PollStep<Self::Output>, SuiteError>;
}

/// Re-check `probe` every `interval` until it is satisfied, the deadline
/// passes, or `cancel` fires. Fatal probe errors propagate immediately; the
/// probe itself decides what is fatal and what is a `Pending` retry.
pub async fn poll_until<P: PollProbe>(
    cfg: PollConfig,
    cancel: &CancellationToken,
    probe: &mut P,
) -> Result<PollOutcome<P::Output>, SuiteError> {
    let started = Instant::now();
    let mut last_seen = None;

    loop {
        match probe.check().await? {
            PollStep::Ready(value) => return Ok(PollOutcome::Satisfied(value)),
            PollStep::Pending(snapshot) => last_seen = Some(snapshot),
        }

        if started.elapsed() >= cfg.deadline {
            return Ok(PollOutcome::Deadline {
                last_seen,
                elapsed: started.elapsed(),
            });
        }

        tokio::select! {
            _ = cancel.cancelled() => return Ok(PollOutcome::Cancelled),
            _ = tokio::time::sleep(cfg.interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountdownProbe {
        remaining: u32,
        checks: u32,
    }

    #[async_trait]
    impl PollProbe for CountdownProbe {
        type Output = u32;

        async fn check(&mut self) -> Result<PollStep<u32>, SuiteError> {
            self.checks += 1;
            if self.remaining == 0 {
                Ok(PollStep::Ready(self.checks))
            } else {
                self.remaining -= 1;
                Ok(PollStep::Pending(format!("{} to go", self.remaining)))
            }
        }
    }

    struct NeverProbe;

    #[async_trait]
    impl PollProbe for NeverProbe {
        type Output = ();

        async fn check(&mut self) -> Result<PollStep<()>, SuiteError> {
            Ok(PollStep::Pending("still waiting".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn satisfied_after_a_few_ticks() {
        let cancel = CancellationToken::new();
        let mut probe = CountdownProbe {
            remaining: 3,
            checks: 0,
        };
        let cfg = PollConfig::new(Duration::from_millis(500), Duration::from_secs(10));

        let outcome = poll_until(cfg, &cancel, &mut probe).await.unwrap();
        match outcome {
            PollOutcome::Satisfied(checks) => assert_eq!(checks, 4),
            other => panic!("expected Satisfied, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_carries_last_snapshot_and_elapsed() {
        let cancel = CancellationToken::new();
        let mut probe = NeverProbe;
        let cfg = PollConfig::new(Duration::from_secs(2), Duration::from_secs(10));

        let started = Instant::now();
        let outcome = poll_until(cfg, &cancel, &mut probe).await.unwrap();
        let wall = started.elapsed();

        match outcome {
            PollOutcome::Deadline { last_seen, elapsed } => {
                assert_eq!(last_seen.as_deref(), Some("still waiting"));
                assert!(elapsed >= Duration::from_secs(10));
                assert!(elapsed <= Duration::from_secs(12));
            }
            other => panic!("expected Deadline, got {other:?}"),
        }
        // Within one poll interval of the configured deadline.
        assert!(wall >= Duration::from_secs(10) && wall <= Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_wait() {
        let cancel = CancellationToken::new();
        let mut probe = NeverProbe;
        let cfg = PollConfig::new(Duration::from_secs(5), Duration::from_secs(300));

        let child = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            child.cancel();
        });

        let outcome = poll_until(cfg, &cancel, &mut probe).await.unwrap();
        assert!(matches!(outcome, PollOutcome::Cancelled));
    }
}
