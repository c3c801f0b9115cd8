use std::fmt;

use crate::remote::PageId;
use crate::state::RunCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    Create,
    Replace,
}

/// Terminal state of one file's pass through the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Created { page_id: PageId },
    Replaced { page_id: PageId, previous: PageId },
    Skipped,
    /// Dry run: what would have happened.
    Planned(PlannedAction),
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub file: String,
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub reports: Vec<FileReport>,
    /// Records dropped (or, in a dry run, that would be dropped) because
    /// their file no longer exists.
    pub pruned: Vec<String>,
}

impl SyncSummary {
    pub fn counts(&self) -> RunCounts {
        let mut counts = RunCounts {
            pruned: self.pruned.len(),
            ..RunCounts::default()
        };
        for report in &self.reports {
            match report.outcome {
                FileOutcome::Created { .. } => counts.created += 1,
                FileOutcome::Replaced { .. } => counts.replaced += 1,
                FileOutcome::Skipped => counts.skipped += 1,
                FileOutcome::Failed { .. } => counts.failed += 1,
                FileOutcome::Planned(_) => {}
            }
        }
        counts
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.reports.iter().filter_map(|r| match &r.outcome {
            FileOutcome::Failed { reason } => Some((r.file.as_str(), reason.as_str())),
            _ => None,
        })
    }

    pub fn planned(&self) -> impl Iterator<Item = (&str, PlannedAction)> {
        self.reports.iter().filter_map(|r| match r.outcome {
            FileOutcome::Planned(action) => Some((r.file.as_str(), action)),
            _ => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// One-line tally of the run.
    pub fn counts_line(&self) -> String {
        let c = self.counts();
        format!(
            "created {}, replaced {}, skipped {}, failed {}, pruned {}",
            c.created, c.replaced, c.skipped, c.failed, c.pruned
        )
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.counts_line())?;
        for (file, action) in self.planned() {
            let verb = match action {
                PlannedAction::Create => "would create",
                PlannedAction::Replace => "would replace",
            };
            write!(f, "\n  {verb}: {file}")?;
        }
        for (file, reason) in self.failures() {
            write!(f, "\n  failed: {file}: {reason}")?;
        }
        Ok(())
    }
}
