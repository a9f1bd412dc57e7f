//! Sync engine — uploads unarchived skins with bounded concurrency, and
//! reconciles the catalog against the archive's own index so items that
//! are already up get records instead of duplicate uploads.

pub mod corrupt;
pub mod error;
pub mod identifier;
pub mod stage;
pub mod uploader;

use std::collections::HashSet;
use std::io::IsTerminal;
use std::time::{Duration, Instant};

use futures_util::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};

use crate::archive::error::ArchiveError;
use crate::archive::responses::SearchDoc;
use crate::archive::{ArchiveIndex, ArchiveTool, SKIN_TYPE_TAG};
use crate::catalog::{ArchiveRecord, CatalogDb};
use crate::types::SkinType;

use error::{FailureClass, SyncError};
use stage::Stager;

/// Knobs for a sync run.
#[derive(Debug)]
pub struct SyncOptions {
    pub skin_type: SkinType,
    pub concurrency: usize,
    pub dry_run: bool,
    pub no_progress_bar: bool,
}

/// Tallies from a sync run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Unarchived skins left after the known-corrupt filter.
    pub eligible: usize,
    pub uploaded: usize,
    /// Uploads a dry run would have performed.
    pub planned: usize,
    pub skipped_corrupt: usize,
    pub conflicts: usize,
    pub corrupt_archives: usize,
    pub encrypted: usize,
    pub unexpected: usize,
}

impl SyncReport {
    pub fn failed(&self) -> usize {
        self.conflicts + self.corrupt_archives + self.encrypted + self.unexpected
    }
}

/// Result of one skin in the batch.
enum ItemOutcome {
    Uploaded,
    Planned,
    Failed(FailureClass),
}

/// Upload every unarchived skin of the requested type.
///
/// Skins on the known-corrupt list are dropped before the batch starts.
/// Individual failures are classified, logged, and tallied without
/// stopping the batch; the only mid-batch abort is a skin vanishing
/// from the catalog between the eligibility query and its upload.
pub async fn run_sync(
    catalog: &dyn CatalogDb,
    stager: &dyn Stager,
    tool: &dyn ArchiveTool,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let started = Instant::now();
    let mut report = SyncReport::default();

    let pending = catalog.unarchived_md5s(options.skin_type).await?;
    let corrupt = corrupt::corrupt_set();

    let mut batch: Vec<String> = Vec::new();
    for md5 in pending {
        if corrupt.contains(md5.as_str()) {
            tracing::debug!(md5 = %md5, "Skipping known-corrupt skin");
            report.skipped_corrupt += 1;
        } else {
            batch.push(md5);
        }
    }
    report.eligible = batch.len();

    if batch.is_empty() {
        if options.dry_run {
            tracing::info!("── Dry Run Summary ──");
            tracing::info!("  0 uploads planned");
        } else {
            tracing::info!("Nothing to upload");
        }
        return Ok(report);
    }

    let pb = create_progress_bar(options.no_progress_bar, batch.len() as u64);
    let pb_ref = &pb;
    let dry_run = options.dry_run;

    let outcomes = stream::iter(batch)
        .map(|md5| async move { sync_one(catalog, stager, tool, md5, dry_run, pb_ref).await })
        .buffer_unordered(options.concurrency);

    tokio::pin!(outcomes);

    while let Some(outcome) = outcomes.next().await {
        match outcome? {
            ItemOutcome::Uploaded => report.uploaded += 1,
            ItemOutcome::Planned => report.planned += 1,
            ItemOutcome::Failed(FailureClass::IdentifierConflict) => report.conflicts += 1,
            ItemOutcome::Failed(FailureClass::CorruptArchive) => report.corrupt_archives += 1,
            ItemOutcome::Failed(FailureClass::EncryptedContent) => report.encrypted += 1,
            ItemOutcome::Failed(FailureClass::Unexpected) => report.unexpected += 1,
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    if options.dry_run {
        tracing::info!("── Dry Run Summary ──");
        tracing::info!("  {} uploads planned", report.planned);
        if report.skipped_corrupt > 0 {
            tracing::info!("  {} known-corrupt skins skipped", report.skipped_corrupt);
        }
        return Ok(report);
    }

    tracing::info!("── Summary ──");
    tracing::info!(
        "  {} uploaded, {} failed, {} total",
        report.uploaded,
        report.failed(),
        report.eligible
    );
    if report.skipped_corrupt > 0 {
        tracing::info!("  {} known-corrupt skins skipped", report.skipped_corrupt);
    }
    if report.conflicts > 0 {
        tracing::info!("  {} identifier conflicts", report.conflicts);
    }
    if report.corrupt_archives > 0 {
        tracing::info!("  {} corrupt archives", report.corrupt_archives);
    }
    if report.encrypted > 0 {
        tracing::info!("  {} encrypted archives", report.encrypted);
    }
    if report.unexpected > 0 {
        tracing::info!("  {} unexpected failures", report.unexpected);
    }
    tracing::info!("  elapsed: {}", format_duration(started.elapsed()));

    Ok(report)
}

/// Upload one skin, or just log it under dry run.
///
/// Upload failures are classified and logged here; only a vanished
/// skin or a catalog read failure propagates.
async fn sync_one(
    catalog: &dyn CatalogDb,
    stager: &dyn Stager,
    tool: &dyn ArchiveTool,
    md5: String,
    dry_run: bool,
    pb: &ProgressBar,
) -> Result<ItemOutcome, SyncError> {
    let skin = catalog
        .get_skin(&md5)
        .await?
        .ok_or(SyncError::SkinNotFound { md5 })?;

    if dry_run {
        pb.suspend(|| {
            tracing::info!("[DRY RUN] Would upload {} ({})", skin.filename, skin.md5);
        });
        return Ok(ItemOutcome::Planned);
    }

    match uploader::upload_skin(catalog, stager, tool, &skin).await {
        Ok(_) => Ok(ItemOutcome::Uploaded),
        Err(e) => {
            let class = e.classify();
            // indicatif needs `suspend` to coordinate log writes
            // with the progress bar redraw.
            match class {
                FailureClass::IdentifierConflict => pb.suspend(|| {
                    tracing::warn!("Identifier conflict for {}: {}", skin.filename, e);
                }),
                FailureClass::CorruptArchive => pb.suspend(|| {
                    tracing::warn!("Corrupt skin {} ({}): {}", skin.filename, skin.md5, e);
                }),
                FailureClass::EncryptedContent => pb.suspend(|| {
                    tracing::warn!(
                        "Encrypted skin {} ({}): {}",
                        skin.filename,
                        skin.md5,
                        e
                    );
                }),
                FailureClass::Unexpected => pb.suspend(|| {
                    tracing::error!(
                        "Upload failed for {} ({}): {}",
                        skin.filename,
                        skin.md5,
                        e
                    );
                }),
            }
            Ok(ItemOutcome::Failed(class))
        }
    }
}

/// Knobs for a reconcile run.
#[derive(Debug)]
pub struct ReconcileOptions {
    pub concurrency: usize,
    pub no_progress_bar: bool,
}

/// Tallies from a reconcile run.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Items the archive search returned.
    pub remote_items: usize,
    /// Items whose identifier the catalog already records.
    pub already_recorded: usize,
    /// Records inserted this run.
    pub backfilled: usize,
    /// Items that could not be matched to exactly one catalog skin.
    pub skipped: usize,
}

enum BackfillOutcome {
    Backfilled,
    Skipped,
}

/// Backfill archive records for items already on the archive.
///
/// Fetches the full collection listing, drops identifiers the catalog
/// already records (case-insensitively), and matches each remaining
/// item to a skin by the md5 of its single `.wsz` file. Items that
/// cannot be matched are logged and skipped. An item whose `skintype`
/// is not `wsz` aborts the run: the search query only asks for classic
/// skins, so a mismatch means the query and the collection disagree and
/// nothing returned can be trusted.
pub async fn run_reconcile(
    catalog: &dyn CatalogDb,
    archive: &dyn ArchiveIndex,
    options: &ReconcileOptions,
) -> Result<ReconcileReport, SyncError> {
    let started = Instant::now();
    let mut report = ReconcileReport::default();

    let docs = archive.search_skins().await?;
    report.remote_items = docs.len();

    for doc in &docs {
        if doc.skintype.as_deref() != Some(SKIN_TYPE_TAG) {
            return Err(SyncError::Archive(ArchiveError::SkinTypeMismatch {
                identifier: doc.identifier.clone(),
                found: doc.skintype.clone(),
            }));
        }
    }

    let known: HashSet<String> = catalog
        .all_identifiers()
        .await?
        .into_iter()
        .map(|id| id.to_lowercase())
        .collect();

    let candidates: Vec<SearchDoc> = docs
        .into_iter()
        .filter(|doc| {
            if known.contains(&doc.identifier.to_lowercase()) {
                report.already_recorded += 1;
                false
            } else {
                true
            }
        })
        .collect();

    if candidates.is_empty() {
        tracing::info!(
            "Catalog already records all {} archive items",
            report.remote_items
        );
        return Ok(report);
    }

    let pb = create_progress_bar(options.no_progress_bar, candidates.len() as u64);
    let pb_ref = &pb;

    let backfills = stream::iter(candidates)
        .map(|doc| async move { backfill_item(catalog, archive, &doc, pb_ref).await })
        .buffer_unordered(options.concurrency);

    tokio::pin!(backfills);

    while let Some(outcome) = backfills.next().await {
        match outcome? {
            BackfillOutcome::Backfilled => report.backfilled += 1,
            BackfillOutcome::Skipped => report.skipped += 1,
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    tracing::info!("── Summary ──");
    tracing::info!(
        "  {} archive items, {} already recorded, {} backfilled, {} skipped",
        report.remote_items,
        report.already_recorded,
        report.backfilled,
        report.skipped
    );
    tracing::info!("  elapsed: {}", format_duration(started.elapsed()));

    Ok(report)
}

/// Match one archive item to a catalog skin and record it.
///
/// Metadata fetch failures and unmatched items are logged and skipped;
/// only catalog errors propagate.
async fn backfill_item(
    catalog: &dyn CatalogDb,
    archive: &dyn ArchiveIndex,
    doc: &SearchDoc,
    pb: &ProgressBar,
) -> Result<BackfillOutcome, SyncError> {
    let metadata = match archive.fetch_metadata(&doc.identifier).await {
        Ok(m) => m,
        Err(e) => {
            pb.suspend(|| {
                tracing::warn!("Could not fetch metadata for {}: {}", doc.identifier, e);
            });
            return Ok(BackfillOutcome::Skipped);
        }
    };

    let skin_files: Vec<_> = metadata
        .files
        .iter()
        .filter(|f| f.name.to_lowercase().ends_with(".wsz"))
        .collect();

    let file = match skin_files.as_slice() {
        [only] => *only,
        [] => {
            pb.suspend(|| tracing::warn!("{} has no .wsz file, skipping", doc.identifier));
            return Ok(BackfillOutcome::Skipped);
        }
        _ => {
            pb.suspend(|| {
                tracing::warn!(
                    "{} has {} .wsz files, cannot match it to one skin",
                    doc.identifier,
                    skin_files.len()
                );
            });
            return Ok(BackfillOutcome::Skipped);
        }
    };

    let md5 = match &file.md5 {
        Some(md5) => md5.to_lowercase(),
        None => {
            pb.suspend(|| {
                tracing::warn!(
                    "{} lists {} without an md5, skipping",
                    doc.identifier,
                    file.name
                );
            });
            return Ok(BackfillOutcome::Skipped);
        }
    };

    if catalog.get_skin(&md5).await?.is_none() {
        pb.suspend(|| {
            tracing::warn!(
                "{} holds {} ({}) which is not in the catalog",
                doc.identifier,
                file.name,
                md5
            );
        });
        return Ok(BackfillOutcome::Skipped);
    }

    // A different identifier may already archive this skin; one record
    // per skin is enough.
    if catalog.has_archive_record(&md5).await? {
        pb.suspend(|| tracing::debug!("{} is already archived elsewhere, skipping", md5));
        return Ok(BackfillOutcome::Skipped);
    }

    catalog
        .insert_archive_record(&ArchiveRecord::new(md5.clone(), doc.identifier.clone()))
        .await?;
    pb.suspend(|| tracing::info!("Backfilled {} from {}", md5, doc.identifier));

    Ok(BackfillOutcome::Backfilled)
}

/// Create a progress bar with a consistent template.
///
/// Returns `ProgressBar::hidden()` when the user passed
/// `--no-progress-bar` or stdout is not a TTY, so piped output and cron
/// logs stay clean.
fn create_progress_bar(no_progress_bar: bool, total: u64) -> ProgressBar {
    if no_progress_bar || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .expect("valid template")
        .progress_chars("=> "),
    );
    pb
}

fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {:02}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}
