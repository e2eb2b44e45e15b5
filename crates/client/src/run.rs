//! End-to-end run orchestration.

use filters::{FilterRule, FilterSet};
use logging::targets::RUN;
use tracing::{debug, info, warn};
use transport::{AwsCli, DryRun, InvokeOptions, ObjectLister, TransferPrimitive};
use walk::WalkBuilder;

use engine::{
    Candidate, ConcurrencyScheduler, PathEnumerator, ResultAggregator, RunContext, RunSummary,
    SchedulerState, TaskBuilder, TransferExecutor,
};

use crate::{ClientError, TransferConfig, TransferRequest, UploadSource};

/// Runs one transfer with the given primitive and lister.
///
/// The lister is only consulted for downloads. Per-file failures are
/// reported in the returned summary; only setup and enumeration problems
/// produce an error.
///
/// # Errors
///
/// Returns [`ClientError`] when filters do not compile, the bucket is
/// invalid, enumeration fails or the worker pool cannot start.
pub fn run_transfer<P, L>(
    config: &TransferConfig,
    primitive: P,
    lister: &L,
    context: &RunContext,
) -> Result<RunSummary, ClientError>
where
    P: TransferPrimitive,
    L: ObjectLister + ?Sized,
{
    let request = config.request();
    let direction = request.direction();
    let filters = compile_filters(config)?;

    let builder = match request {
        TransferRequest::Upload { bucket, prefix, .. } => TaskBuilder::upload(bucket.clone(), prefix.clone())?,
        TransferRequest::Download { destination, .. } => TaskBuilder::download(destination.clone()),
    };

    let candidates = enumerate(config, &filters, lister)?;
    let plan = builder.build(candidates);
    if !plan.duplicates.is_empty() {
        warn!(target: RUN, count = plan.duplicates.len(), "ignoring files with duplicate keys");
    }
    if !plan.rejected.is_empty() {
        warn!(target: RUN, count = plan.rejected.len(), "ignoring files with unsafe keys");
    }

    let total = plan.tasks.len();
    let aggregator = ResultAggregator::new(total, direction);
    aggregator.observe_rejected(plan.rejected.len());
    if total == 0 {
        warn!(target: RUN, "no files matched; nothing to {direction}");
        return Ok(aggregator.finalize(context.is_cancelled()));
    }

    info!(
        target: RUN,
        "starting {direction} of {total} file(s), {} byte(s), {} worker(s){}",
        plan.total_bytes(),
        config.workers(),
        if config.dry_run() { " (dry run)" } else { "" }
    );

    let executor = TransferExecutor::new(primitive)
        .with_classifier(config.classifier().clone())
        .with_retry_policy(config.retry())
        .with_invoke_options(InvokeOptions::new().with_timeout(config.timeout()));
    let mut scheduler = ConcurrencyScheduler::new(config.workers());
    let state = scheduler.run(plan.tasks, context, &executor, &aggregator)?;

    let summary = aggregator.finalize(state == SchedulerState::Cancelled);
    info!(
        target: RUN,
        "{direction} finished: {} succeeded, {} failed, {} skipped in {:.1}s",
        summary.succeeded,
        summary.failed,
        summary.skipped,
        summary.elapsed.as_secs_f64()
    );
    Ok(summary)
}

/// Runs a transfer through the `aws` CLI, or [`DryRun`] when requested.
///
/// The CLI is probed with `aws --version` first whenever it will be invoked.
/// Dry-run uploads never touch it.
///
/// # Errors
///
/// As [`run_transfer`], plus [`ClientError::Probe`] when the CLI is missing.
pub fn run_with_aws(config: &TransferConfig, context: &RunContext) -> Result<RunSummary, ClientError> {
    let aws = AwsCli::new()
        .with_program(config.program())
        .with_profile(config.profile().map(str::to_owned));

    let needs_cli = !config.dry_run() || matches!(config.request(), TransferRequest::Download { .. });
    if needs_cli {
        let version = aws.probe().map_err(|source| ClientError::Probe {
            program: config.program().to_string_lossy().into_owned(),
            source,
        })?;
        debug!(target: RUN, %version, "using aws cli");
    }

    if config.dry_run() {
        run_transfer(config, DryRun, &aws, context)
    } else {
        run_transfer(config, aws.clone(), &aws, context)
    }
}

fn compile_filters(config: &TransferConfig) -> Result<FilterSet, ClientError> {
    let rules = config
        .includes()
        .iter()
        .map(FilterRule::include)
        .chain(config.excludes().iter().map(FilterRule::exclude));
    Ok(FilterSet::from_rules(rules)?)
}

fn enumerate<L>(
    config: &TransferConfig,
    filters: &FilterSet,
    lister: &L,
) -> Result<Vec<Candidate>, ClientError>
where
    L: ObjectLister + ?Sized,
{
    let enumerator = match config.request() {
        TransferRequest::Upload {
            source: UploadSource::Directory(root),
            ..
        } => PathEnumerator::local(
            WalkBuilder::new(root)
                .filters(filters.clone())
                .recursive(config.recursive())
                .follow_symlinks(config.follow_symlinks()),
        )?,
        TransferRequest::Upload {
            source: UploadSource::Files(paths),
            ..
        } => PathEnumerator::files(paths, filters),
        TransferRequest::Download { bucket, prefix, .. } => {
            PathEnumerator::remote(lister, bucket, prefix, filters)?
        }
    };
    let candidates = enumerator.collect::<Result<Vec<_>, _>>()?;
    debug!(target: RUN, count = candidates.len(), "enumeration complete");
    Ok(candidates)
}
