use std::collections::BTreeSet;

use futures::{stream, StreamExt};
use tracing::{debug, error, info, warn};

use crate::{
    config::PROVIDER_CONCURRENCY,
    modules::SubdomainModule,
    normalize::{normalize, Domain},
    sink::Sink,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    Found(usize),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReport {
    pub provider: String,
    pub outcome: ProviderOutcome,
}

/// Lifecycle of one domain's enumeration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Running,
    Merged,
    Persisted,
}

#[derive(Debug, Clone)]
pub struct Enumeration {
    pub subdomains: BTreeSet<String>,
    pub reports: Vec<ProviderReport>,
}

#[derive(Debug, Clone)]
pub struct DomainSummary {
    pub domain: Domain,
    pub found: usize,
    pub reports: Vec<ProviderReport>,
    pub state: RunState,
}

/// Queries every provider for `domain` and merges what they found.
///
/// All providers run to completion; a failing provider only contributes a
/// `Failed` report. Reports are in completion order.
pub async fn enumerate<P>(domain: &Domain, providers: &[P]) -> Enumeration
where
    P: SubdomainModule,
{
    let outcomes: Vec<(ProviderReport, Option<BTreeSet<String>>)> = stream::iter(providers)
        .map(|provider| async move {
            let name = provider.name();
            match provider.enumerate(domain).await {
                Ok(found) => {
                    debug!("{}: {} subdomains for {}", name, found.len(), domain);
                    let report = ProviderReport {
                        provider: name,
                        outcome: ProviderOutcome::Found(found.len()),
                    };
                    (report, Some(found))
                }
                Err(err) => {
                    warn!("{}: {}", name, err);
                    let report = ProviderReport {
                        provider: name,
                        outcome: ProviderOutcome::Failed(err.to_string()),
                    };
                    (report, None)
                }
            }
        })
        .buffer_unordered(PROVIDER_CONCURRENCY)
        .collect()
        .await;

    let mut subdomains = BTreeSet::new();
    let mut reports = Vec::with_capacity(outcomes.len());
    for (report, found) in outcomes {
        if let Some(found) = found {
            subdomains.extend(found.iter().filter_map(|sub| normalize(sub, domain)));
        }
        reports.push(report);
    }

    Enumeration {
        subdomains,
        reports,
    }
}

fn advance(domain: &Domain, state: &mut RunState, next: RunState) {
    debug!("{}: {:?} -> {:?}", domain, state, next);
    *state = next;
}

/// Enumerates one domain and appends its merged set to `sink` in one write.
pub async fn run_domain<P>(domain: &Domain, providers: &[P], sink: &Sink) -> DomainSummary
where
    P: SubdomainModule,
{
    let mut state = RunState::Pending;

    advance(domain, &mut state, RunState::Running);
    let Enumeration {
        subdomains,
        reports,
    } = enumerate(domain, providers).await;
    advance(domain, &mut state, RunState::Merged);

    if !subdomains.is_empty() {
        match sink.append(&subdomains).await {
            Ok(()) => advance(domain, &mut state, RunState::Persisted),
            Err(err) => error!(
                "{}: could not save results to {}: {}",
                domain,
                sink.path().display(),
                err
            ),
        }
    }

    info!("{}: {} unique subdomains", domain, subdomains.len());

    DomainSummary {
        domain: domain.clone(),
        found: subdomains.len(),
        reports,
        state,
    }
}

/// Runs each domain in turn. Domains share nothing but the sink.
pub async fn run_domains<P, F>(
    domains: &[Domain],
    providers: &[P],
    sink: &Sink,
    mut on_done: F,
) -> Vec<DomainSummary>
where
    P: SubdomainModule,
    F: FnMut(&DomainSummary),
{
    let mut summaries = Vec::with_capacity(domains.len());
    for domain in domains {
        let summary = run_domain(domain, providers, sink).await;
        on_done(&summary);
        summaries.push(summary);
    }
    summaries
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{modules::Module, Error};

    struct Stub {
        name: &'static str,
        found: Option<Vec<&'static str>>,
        calls: AtomicUsize,
    }

    impl Stub {
        fn returning(name: &'static str, found: &[&'static str]) -> Self {
            Stub {
                name,
                found: Some(found.to_vec()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(name: &'static str) -> Self {
            Stub {
                name,
                found: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Module for Stub {
        fn name(&self) -> String {
            self.name.to_string()
        }

        fn description(&self) -> String {
            String::from("stub")
        }
    }

    #[async_trait]
    impl SubdomainModule for Stub {
        async fn enumerate(&self, _domain: &Domain) -> Result<BTreeSet<String>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.found {
                Some(found) => Ok(found.iter().map(|s| s.to_string()).collect()),
                None => Err(Error::InvalidHttpResponse(self.name())),
            }
        }
    }

    fn example() -> Domain {
        Domain::parse("example.com").unwrap()
    }

    #[tokio::test]
    async fn merges_and_normalizes_provider_results() {
        let providers = vec![
            Stub::returning("one", &["a.example.com", "shared.example.com"]),
            Stub::returning("two", &["*.b.example.com", "shared.example.com", "other.org"]),
            Stub::failing("three"),
        ];

        let enumeration = enumerate(&example(), &providers).await;

        assert_eq!(
            enumeration.subdomains.into_iter().collect::<Vec<_>>(),
            vec!["a.example.com", "b.example.com", "shared.example.com"]
        );
        assert_eq!(enumeration.reports.len(), 3);
        let failed = enumeration
            .reports
            .iter()
            .find(|report| report.provider == "three")
            .unwrap();
        assert!(matches!(failed.outcome, ProviderOutcome::Failed(_)));
        assert!(providers.iter().all(|p| p.calls.load(Ordering::SeqCst) == 1));
    }

    #[tokio::test]
    async fn all_providers_failing_yields_empty_set() {
        let providers = vec![Stub::failing("one"), Stub::failing("two"), Stub::failing("three")];

        let enumeration = enumerate(&example(), &providers).await;

        assert!(enumeration.subdomains.is_empty());
        assert_eq!(enumeration.reports.len(), 3);
        assert!(enumeration
            .reports
            .iter()
            .all(|report| matches!(report.outcome, ProviderOutcome::Failed(_))));
    }

    #[tokio::test]
    async fn repeated_runs_union_to_a_single_run() {
        let providers = vec![
            Stub::returning("one", &["a.example.com", "c.example.com"]),
            Stub::returning("two", &["c.example.com", "d.example.com"]),
        ];
        let domain = example();

        let once = enumerate(&domain, &providers).await.subdomains;
        let mut twice = enumerate(&domain, &providers).await.subdomains;
        twice.extend(enumerate(&domain, &providers).await.subdomains);

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn empty_result_is_merged_but_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::new(dir.path().join("subs.txt"));
        let providers = vec![Stub::returning("one", &[]), Stub::failing("two")];

        let summary = run_domain(&example(), &providers, &sink).await;

        assert_eq!(summary.state, RunState::Merged);
        assert_eq!(summary.found, 0);
        assert!(!sink.path().exists());
    }

    #[tokio::test]
    async fn each_domain_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::new(dir.path().join("subs.txt"));
        let providers = vec![
            Stub::returning("one", &["x.example.com", "x.example.org"]),
            Stub::returning("two", &["x.example.com", "y.example.org"]),
        ];
        let domains = vec![
            Domain::parse("example.com").unwrap(),
            Domain::parse("example.org").unwrap(),
        ];

        let mut seen = Vec::new();
        let summaries = run_domains(&domains, &providers, &sink, |summary| {
            seen.push(summary.domain.to_string())
        })
        .await;

        assert_eq!(seen, vec!["example.com", "example.org"]);
        assert!(summaries.iter().all(|s| s.state == RunState::Persisted));
        let content = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(content, "x.example.com\nx.example.org\ny.example.org\n");
    }

    #[tokio::test]
    async fn unwritable_sink_leaves_the_run_merged() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let sink = Sink::new(blocker.join("subs.txt"));
        let providers = vec![Stub::returning("one", &["a.example.com", "b.example.com"])];

        let summary = run_domain(&example(), &providers, &sink).await;

        assert_eq!(summary.state, RunState::Merged);
        assert_eq!(summary.found, 2);
        assert_eq!(summary.reports[0].outcome, ProviderOutcome::Found(2));
        assert!(!sink.path().exists());
    }

    /// Sleeps briefly and records the peak number of concurrent calls.
    struct Gauged {
        current: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl Module for Gauged {
        fn name(&self) -> String {
            String::from("gauged")
        }

        fn description(&self) -> String {
            String::from("stub")
        }
    }

    #[async_trait]
    impl SubdomainModule for Gauged {
        async fn enumerate(&self, _domain: &Domain) -> Result<BTreeSet<String>, Error> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(BTreeSet::new())
        }
    }

    #[tokio::test]
    async fn at_most_five_providers_run_at_once() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let providers: Vec<Gauged> = (0..12)
            .map(|_| Gauged {
                current: Arc::clone(&current),
                peak: Arc::clone(&peak),
            })
            .collect();

        let enumeration = enumerate(&example(), &providers).await;

        assert_eq!(enumeration.reports.len(), 12);
        assert_eq!(peak.load(Ordering::SeqCst), PROVIDER_CONCURRENCY);
    }
}
