use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crmpilot_core::poll::{poll_until, PollConfig, PollOutcome, PollProbe, PollStep};
use crmpilot_core::SuiteError;

use crate::probe::BrowserProbe;

/// A predicate over live browser state.
#[derive(Debug, Clone)]
pub enum Condition {
    UrlIs(String),
    UrlContains(String),
    /// `document.readyState == "complete"`.
    PageReady,
    Visible(String),
    Clickable(String),
    /// Every branch must hold, each latched once observed true. Branches may
    /// become true at different poll ticks; all supported conditions are
    /// monotonic once satisfied.
    All(Vec<Condition>),
}

impl Condition {
    /// Navigation complete: exact URL reached and the document fully loaded.
    pub fn loaded(url: &str) -> Self {
        Condition::All(vec![
            Condition::UrlIs(url.to_string()),
            Condition::PageReady,
        ])
    }

    pub fn describe(&self) -> String {
        match self {
            Condition::UrlIs(url) => format!("url == '{url}'"),
            Condition::UrlContains(part) => format!("url contains '{part}'"),
            Condition::PageReady => "page ready".to_string(),
            Condition::Visible(sel) => format!("'{sel}' visible"),
            Condition::Clickable(sel) => format!("'{sel}' clickable"),
            Condition::All(parts) => parts
                .iter()
                .map(Condition::describe)
                .collect::<Vec<_>>()
                .join(" AND "),
        }
    }

    fn leaves(&self) -> Vec<Condition> {
        match self {
            Condition::All(parts) => parts.iter().flat_map(Condition::leaves).collect(),
            leaf => vec![leaf.clone()],
        }
    }
}

struct ConditionProbe<'a> {
    browser: &'a dyn BrowserProbe,
    leaves: Vec<Condition>,
    latched: Vec<bool>,
}

#[async_trait]
impl PollProbe for ConditionProbe<'_> {
    type Output = ();

    async fn check(&mut self) -> Result<PollStep<()>, SuiteError> {
        let url = self.browser.current_url().await?;

        for (i, leaf) in self.leaves.iter().enumerate() {
            if self.latched[i] {
                continue;
            }
            let holds = match leaf {
                Condition::UrlIs(target) => url == *target,
                Condition::UrlContains(part) => url.contains(part.as_str()),
                Condition::PageReady => self.browser.ready_state().await? == "complete",
                Condition::Visible(sel) => self.browser.element_visible(sel).await?,
                Condition::Clickable(sel) => self.browser.element_clickable(sel).await?,
                Condition::All(_) => unreachable!("nested All flattened before polling"),
            };
            self.latched[i] = holds;
        }

        if self.latched.iter().all(|&l| l) {
            Ok(PollStep::Ready(()))
        } else {
            Ok(PollStep::Pending(format!("current url: '{url}'")))
        }
    }
}

/// Block until `condition` holds or the deadline passes. On timeout the error
/// names the condition, the last observed state and the elapsed time; driver
/// failures surface as `Transport`, never as a timeout.
pub async fn wait_until(
    browser: &dyn BrowserProbe,
    condition: &Condition,
    cfg: PollConfig,
    cancel: &CancellationToken,
) -> Result<(), SuiteError> {
    let leaves = condition.leaves();
    let latched = vec![false; leaves.len()];
    let mut probe = ConditionProbe {
        browser,
        leaves,
        latched,
    };

    match poll_until(cfg, cancel, &mut probe).await? {
        PollOutcome::Satisfied(()) => Ok(()),
        PollOutcome::Deadline { last_seen, elapsed } => Err(SuiteError::StateTimeout {
            condition: condition.describe(),
            last_state: last_seen.unwrap_or_else(|| "never observed".to_string()),
            elapsed,
        }),
        PollOutcome::Cancelled => Err(SuiteError::Other(anyhow::anyhow!(
            "wait cancelled while waiting for {}",
            condition.describe()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct PageSnapshot {
        url: String,
        ready: String,
        visible: HashSet<String>,
        broken: bool,
    }

    #[derive(Clone, Default)]
    struct FakeBrowser {
        state: Arc<Mutex<PageSnapshot>>,
        queries: Arc<AtomicU32>,
    }

    impl FakeBrowser {
        fn with_url(url: &str, ready: &str) -> Self {
            let fake = Self::default();
            fake.set(url, ready);
            fake
        }

        fn set(&self, url: &str, ready: &str) {
            let mut state = self.state.lock().unwrap();
            state.url = url.to_string();
            state.ready = ready.to_string();
        }

        fn show(&self, selector: &str) {
            self.state.lock().unwrap().visible.insert(selector.to_string());
        }

        fn break_transport(&self) {
            self.state.lock().unwrap().broken = true;
        }
    }

    #[async_trait]
    impl BrowserProbe for FakeBrowser {
        async fn current_url(&self) -> Result<String, SuiteError> {
            self.queries.fetch_add(1, Ordering::Relaxed);
            let state = self.state.lock().unwrap();
            if state.broken {
                return Err(SuiteError::Transport("tab crashed".to_string()));
            }
            Ok(state.url.clone())
        }

        async fn ready_state(&self) -> Result<String, SuiteError> {
            self.queries.fetch_add(1, Ordering::Relaxed);
            Ok(self.state.lock().unwrap().ready.clone())
        }

        async fn element_visible(&self, selector: &str) -> Result<bool, SuiteError> {
            self.queries.fetch_add(1, Ordering::Relaxed);
            Ok(self.state.lock().unwrap().visible.contains(selector))
        }

        async fn element_clickable(&self, selector: &str) -> Result<bool, SuiteError> {
            self.element_visible(selector).await
        }
    }

    fn cfg() -> PollConfig {
        PollConfig::new(Duration::from_millis(500), Duration::from_secs(10))
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_once_condition_observed_live() {
        let browser = FakeBrowser::with_url("https://x.test/loading", "loading");
        let mover = browser.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            mover.set("https://x.test/dashboard", "complete");
        });

        let cancel = CancellationToken::new();
        wait_until(
            &browser,
            &Condition::loaded("https://x.test/dashboard"),
            cfg(),
            &cancel,
        )
        .await
        .unwrap();

        // More than one tick of live queries, nothing answered from a cache.
        assert!(browser.queries.load(Ordering::Relaxed) > 2);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_carries_condition_and_last_state() {
        let browser = FakeBrowser::with_url("https://x.test/login", "complete");
        let cancel = CancellationToken::new();

        let err = wait_until(
            &browser,
            &Condition::UrlIs("https://x.test/dashboard".to_string()),
            cfg(),
            &cancel,
        )
        .await
        .unwrap_err();

        match err {
            SuiteError::StateTimeout {
                condition,
                last_state,
                elapsed,
            } => {
                assert!(condition.contains("https://x.test/dashboard"));
                assert!(last_state.contains("https://x.test/login"));
                assert!(elapsed >= Duration::from_secs(10));
            }
            other => panic!("expected StateTimeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn and_branches_latch_at_different_ticks() {
        // URL matches first, then navigation settles while the URL briefly
        // reports a fragment change; both branches must still count.
        let browser = FakeBrowser::with_url("https://x.test/dashboard", "loading");
        let mover = browser.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            mover.set("https://x.test/dashboard#main", "complete");
        });

        let cancel = CancellationToken::new();
        wait_until(
            &browser,
            &Condition::loaded("https://x.test/dashboard"),
            cfg(),
            &cancel,
        )
        .await
        .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_is_not_a_timeout() {
        let browser = FakeBrowser::with_url("https://x.test/login", "complete");
        browser.break_transport();
        let cancel = CancellationToken::new();

        let err = wait_until(
            &browser,
            &Condition::PageReady,
            cfg(),
            &cancel,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SuiteError::Transport(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn element_visibility_condition() {
        let browser = FakeBrowser::with_url("https://x.test/login", "complete");
        let mover = browser.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            mover.show(".alert");
        });

        let cancel = CancellationToken::new();
        wait_until(
            &browser,
            &Condition::Visible(".alert".to_string()),
            cfg(),
            &cancel,
        )
        .await
        .unwrap();
    }
}
