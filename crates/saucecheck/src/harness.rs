//! Test harness for running suites of scenarios.
//!
//! A [`TestSuite`] holds [`TestGroup`]s of [`TestCase`]s. Every case of an
//! isolated group gets a fresh context from a [`ContextFactory`] (a new
//! browser session, a new API client); a serial group shares one context
//! and stops at the first step that fails hard. A case fails on a hard error or on
//! any soft failure it recorded; either way the outcome lands in the
//! report as `{title, ok}`.

use crate::driver::PageDriver;
use crate::fixture::Session;
use crate::report::{ReportSpec, ReportSuite};
use crate::result::SauceResult;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::StreamExt;
use std::fmt;
use std::future::Future;
use std::time::Instant;

/// Body of a case or setup hook
pub type CaseFn<C> = Box<dyn for<'a> Fn(&'a C) -> BoxFuture<'a, SauceResult<()>> + Send + Sync>;

/// Per-case state handed to every step
#[async_trait]
pub trait CaseContext: Send + Sync {
    /// Verdict on anything deferred during the case; clears it
    fn finish(&self) -> SauceResult<()> {
        Ok(())
    }

    /// Release resources
    async fn close(&self) -> SauceResult<()> {
        Ok(())
    }
}

#[async_trait]
impl<D: PageDriver> CaseContext for Session<D> {
    fn finish(&self) -> SauceResult<()> {
        Session::finish(self)
    }

    async fn close(&self) -> SauceResult<()> {
        Session::close(self).await
    }
}

impl CaseContext for crate::api::ApiClient {}

/// Source of fresh contexts
#[async_trait]
pub trait ContextFactory<C>: Send + Sync {
    /// Build a context for one case (or one serial group)
    async fn create(&self) -> SauceResult<C>;
}

#[async_trait]
impl<C, F, Fut> ContextFactory<C> for F
where
    C: Send + 'static,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = SauceResult<C>> + Send,
{
    async fn create(&self) -> SauceResult<C> {
        self().await
    }
}

/// A single case
pub struct TestCase<C> {
    /// Case title, e.g. `TC-004: Add and remove every item`
    pub title: String,
    run: CaseFn<C>,
}

impl<C> TestCase<C> {
    /// Create a case
    pub fn new<F>(title: impl Into<String>, run: F) -> Self
    where
        F: for<'a> Fn(&'a C) -> BoxFuture<'a, SauceResult<()>> + Send + Sync + 'static,
    {
        Self {
            title: title.into(),
            run: Box::new(run),
        }
    }
}

impl<C> fmt::Debug for TestCase<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase").field("title", &self.title).finish()
    }
}

/// How cases of a group share contexts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupMode {
    /// Fresh context per case; cases may run concurrently
    #[default]
    Isolated,
    /// One context for all cases, in order; a hard failure skips the rest,
    /// soft failures fail only their own step
    Serial,
}

/// Titled group of cases with an optional setup hook
pub struct TestGroup<C> {
    /// Group title, e.g. `CART`
    pub title: String,
    /// Context sharing
    pub mode: GroupMode,
    before_each: Option<CaseFn<C>>,
    /// Cases in declaration order
    pub cases: Vec<TestCase<C>>,
}

impl<C> TestGroup<C> {
    /// Create an isolated group
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            mode: GroupMode::Isolated,
            before_each: None,
            cases: Vec::new(),
        }
    }

    /// Share one context between all cases
    #[must_use]
    pub fn serial(mut self) -> Self {
        self.mode = GroupMode::Serial;
        self
    }

    /// Run `setup` in each case's context before the case body
    #[must_use]
    pub fn before_each<F>(mut self, setup: F) -> Self
    where
        F: for<'a> Fn(&'a C) -> BoxFuture<'a, SauceResult<()>> + Send + Sync + 'static,
    {
        self.before_each = Some(Box::new(setup));
        self
    }

    /// Add a case
    #[must_use]
    pub fn case<F>(mut self, title: impl Into<String>, run: F) -> Self
    where
        F: for<'a> Fn(&'a C) -> BoxFuture<'a, SauceResult<()>> + Send + Sync + 'static,
    {
        self.cases.push(TestCase::new(title, run));
        self
    }

    /// Number of cases
    #[must_use]
    pub fn test_count(&self) -> usize {
        self.cases.len()
    }
}

impl<C> fmt::Debug for TestGroup<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestGroup")
            .field("title", &self.title)
            .field("mode", &self.mode)
            .field("before_each", &self.before_each.is_some())
            .field("cases", &self.cases)
            .finish()
    }
}

/// A titled list of groups
#[derive(Debug)]
pub struct TestSuite<C> {
    /// Suite title, e.g. `ui.spec`
    pub title: String,
    /// Groups in declaration order
    pub groups: Vec<TestGroup<C>>,
}

impl<C> TestSuite<C> {
    /// Create an empty suite
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            groups: Vec::new(),
        }
    }

    /// Add a group
    #[must_use]
    pub fn group(mut self, group: TestGroup<C>) -> Self {
        self.groups.push(group);
        self
    }

    /// Number of cases across groups
    #[must_use]
    pub fn test_count(&self) -> usize {
        self.groups.iter().map(TestGroup::test_count).sum()
    }
}

/// Runner settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Isolated cases in flight at once
    pub workers: usize,
    /// Keep only cases whose title or group title contains this,
    /// case-insensitively
    pub filter: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            filter: None,
        }
    }
}

impl RunOptions {
    /// Set worker count
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set title filter
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn selects(&self, group: &str, case: &str) -> bool {
        self.filter.as_deref().map_or(true, |needle| {
            let needle = needle.to_lowercase();
            group.to_lowercase().contains(&needle) || case.to_lowercase().contains(&needle)
        })
    }
}

/// Run every selected case and report the outcome per group
pub async fn run_suite<C, F>(suite: &TestSuite<C>, factory: &F, options: &RunOptions) -> ReportSuite
where
    C: CaseContext,
    F: ContextFactory<C> + ?Sized,
{
    let started = Instant::now();
    let mut report = ReportSuite::new(&suite.title);

    for group in &suite.groups {
        let selected: Vec<&TestCase<C>> = group
            .cases
            .iter()
            .filter(|case| options.selects(&group.title, &case.title))
            .collect();
        if selected.is_empty() {
            continue;
        }

        let specs = match group.mode {
            GroupMode::Isolated => {
                futures::stream::iter(selected.into_iter().map(|case| run_isolated(group, case, factory)))
                    .buffered(options.workers.max(1))
                    .collect::<Vec<_>>()
                    .await
            }
            GroupMode::Serial => run_serial(group, &selected, factory).await,
        };

        let mut group_report = ReportSuite::new(&group.title);
        group_report.specs = specs;
        report.suites.push(group_report);
    }

    let total: usize = report.suites.iter().map(|s| s.specs.len()).sum();
    let failed: usize = report
        .suites
        .iter()
        .flat_map(|s| &s.specs)
        .filter(|s| !s.ok)
        .count();
    tracing::info!(
        suite = %suite.title,
        total,
        failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "suite finished"
    );
    report
}

/// Hard outcome and deferred verdict of one case, kept apart so a serial
/// group can tell an aborted step from a merely failed one
struct StepOutcome {
    hard: SauceResult<()>,
    soft: SauceResult<()>,
}

impl StepOutcome {
    fn aborted(&self) -> bool {
        self.hard.is_err()
    }

    fn into_result(self) -> SauceResult<()> {
        self.hard.and(self.soft)
    }
}

async fn run_steps<C: CaseContext>(context: &C, group: &TestGroup<C>, case: &TestCase<C>) -> StepOutcome {
    let hard = async {
        if let Some(setup) = &group.before_each {
            setup(context).await?;
        }
        (case.run)(context).await
    }
    .await;
    StepOutcome {
        hard,
        soft: context.finish(),
    }
}

fn to_spec(title: &str, outcome: SauceResult<()>, started: Instant) -> ReportSpec {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match outcome {
        Ok(()) => {
            tracing::info!(case = title, elapsed_ms, "passed");
            ReportSpec::pass(title)
        }
        Err(err) => {
            tracing::warn!(case = title, elapsed_ms, error = %err, "failed");
            ReportSpec::fail(title, err.to_string())
        }
    }
}

async fn run_isolated<C, F>(group: &TestGroup<C>, case: &TestCase<C>, factory: &F) -> ReportSpec
where
    C: CaseContext,
    F: ContextFactory<C> + ?Sized,
{
    let started = Instant::now();
    let outcome = match factory.create().await {
        Ok(context) => {
            let outcome = run_steps(&context, group, case).await.into_result();
            if let Err(err) = context.close().await {
                tracing::debug!(case = %case.title, %err, "context close failed");
            }
            outcome
        }
        Err(err) => Err(err),
    };
    to_spec(&case.title, outcome, started)
}

async fn run_serial<C, F>(group: &TestGroup<C>, cases: &[&TestCase<C>], factory: &F) -> Vec<ReportSpec>
where
    C: CaseContext,
    F: ContextFactory<C> + ?Sized,
{
    let context = match factory.create().await {
        Ok(context) => context,
        Err(err) => {
            let message = err.to_string();
            return cases
                .iter()
                .map(|case| ReportSpec::fail(&case.title, message.clone()))
                .collect();
        }
    };

    let mut specs = Vec::with_capacity(cases.len());
    let mut broken = false;
    for case in cases {
        if broken {
            specs.push(ReportSpec::fail(&case.title, "skipped: an earlier step failed"));
            continue;
        }
        let started = Instant::now();
        let outcome = run_steps(&context, group, case).await;
        broken = outcome.aborted();
        specs.push(to_spec(&case.title, outcome.into_result(), started));
    }

    if let Err(err) = context.close().await {
        tracing::debug!(group = %group.title, %err, "context close failed");
    }
    specs
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::result::SauceError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts calls; records soft failures when asked
    #[derive(Debug, Default)]
    struct Probe {
        steps: AtomicUsize,
        soft: std::sync::Mutex<Vec<String>>,
    }

    impl CaseContext for Probe {
        fn finish(&self) -> SauceResult<()> {
            let pending = std::mem::take(&mut *self.soft.lock().unwrap());
            if pending.is_empty() {
                Ok(())
            } else {
                Err(SauceError::assertion(pending.join("; ")))
            }
        }
    }

    fn suite() -> TestSuite<Probe> {
        TestSuite::new("probe.spec")
            .group(
                TestGroup::new("ISOLATED")
                    .before_each(|p: &Probe| {
                        Box::pin(async move {
                            p.steps.fetch_add(1, Ordering::SeqCst);
                            Ok(())
                        })
                    })
                    .case("TC-001: passes", |p: &Probe| {
                        Box::pin(async move {
                            assert_eq!(p.steps.load(Ordering::SeqCst), 1);
                            Ok(())
                        })
                    })
                    .case("TC-002: hard failure", |_: &Probe| {
                        Box::pin(async { Err(SauceError::assertion("Found error message")) })
                    })
                    .case("TC-003: soft failure", |p: &Probe| {
                        Box::pin(async move {
                            p.soft.lock().unwrap().push("badge".to_string());
                            Ok(())
                        })
                    }),
            )
            .group(
                TestGroup::new("SERIAL")
                    .serial()
                    .case("step 1", |p: &Probe| {
                        Box::pin(async move {
                            p.steps.fetch_add(1, Ordering::SeqCst);
                            p.soft.lock().unwrap().push("echo".to_string());
                            Ok(())
                        })
                    })
                    .case("step 2", |p: &Probe| {
                        Box::pin(async move {
                            assert_eq!(p.steps.load(Ordering::SeqCst), 1);
                            Err(SauceError::assertion("stop"))
                        })
                    })
                    .case("step 3", |_: &Probe| Box::pin(async { Ok(()) })),
            )
    }

    fn factory(created: Arc<AtomicUsize>) -> impl ContextFactory<Probe> {
        move || {
            let created = Arc::clone(&created);
            async move {
                created.fetch_add(1, Ordering::SeqCst);
                Ok(Probe::default())
            }
        }
    }

    #[tokio::test]
    async fn test_outcomes_per_case() {
        let created = Arc::new(AtomicUsize::new(0));
        let report = run_suite(&suite(), &factory(Arc::clone(&created)), &RunOptions::default()).await;

        assert_eq!(report.title, "probe.spec");
        let isolated = &report.suites[0].specs;
        assert!(isolated[0].ok);
        assert!(!isolated[1].ok);
        assert!(isolated[1].error.as_deref().unwrap().contains("Found error message"));
        assert!(!isolated[2].ok);

        let serial = &report.suites[1].specs;
        // a soft failure fails the step but the next step still runs
        assert!(!serial[0].ok);
        assert!(serial[0].error.as_deref().unwrap().contains("echo"));
        assert!(!serial[1].ok);
        assert!(serial[1].error.as_deref().unwrap().contains("stop"));
        assert_eq!(serial[2].error.as_deref(), Some("skipped: an earlier step failed"));

        // three isolated contexts plus one shared serial context
        assert_eq!(created.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_filter_drops_unselected_groups() {
        let created = Arc::new(AtomicUsize::new(0));
        let options = RunOptions::default().with_filter("tc-002");
        let report = run_suite(&suite(), &factory(created), &options).await;
        assert_eq!(report.suites.len(), 1);
        assert_eq!(report.suites[0].specs.len(), 1);
        assert_eq!(report.suites[0].specs[0].title, "TC-002: hard failure");
    }

    #[tokio::test]
    async fn test_workers_keep_declaration_order() {
        let created = Arc::new(AtomicUsize::new(0));
        let options = RunOptions::default().with_workers(3);
        let report = run_suite(&suite(), &factory(created), &options).await;
        let titles: Vec<&str> = report.suites[0].specs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["TC-001: passes", "TC-002: hard failure", "TC-003: soft failure"]);
    }

    #[tokio::test]
    async fn test_factory_failure_fails_every_serial_step() {
        let failing = || async { Err::<Probe, _>(SauceError::driver("no browser")) };
        let report = run_suite(&suite(), &failing, &RunOptions::default().with_filter("serial")).await;
        assert!(report.suites[0].specs.iter().all(|s| !s.ok));
        assert_eq!(report.suites[0].specs.len(), 3);
    }
}
