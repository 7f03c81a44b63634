//! Aggregation report - what succeeded, what was skipped, what failed

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::FamilyAggregate;

/// An independently aggregated experiment family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// PageRank and PPR convergence sweeps
    Convergence,
    /// Community size per threshold and score distribution per seed
    Communities,
    /// PUSH against PPR, per epsilon
    PushVsPpr,
    /// PageRank iterations per damping factor
    Damping,
    /// Everything above, per graph size
    Scalability,
}

impl Unit {
    /// All units in execution order.
    pub const ALL: [Self; 5] = [
        Self::Convergence,
        Self::Communities,
        Self::PushVsPpr,
        Self::Damping,
        Self::Scalability,
    ];

    /// Stable name used in logs and in the report.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Convergence => "convergence",
            Self::Communities => "communities",
            Self::PushVsPpr => "push_vs_ppr",
            Self::Damping => "damping",
            Self::Scalability => "scalability",
        }
    }
}

/// Final state of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    /// An aggregate was produced.
    Succeeded,
    /// No data was found; nothing to report.
    Skipped,
    /// The data exists but could not be aggregated.
    Failed,
}

/// Outcome of one unit.
#[derive(Debug, Clone, Serialize)]
pub struct UnitOutcome {
    unit: Unit,
    status: UnitStatus,
    aggregate: Option<FamilyAggregate>,
    reason: Option<String>,
}

impl UnitOutcome {
    pub(crate) const fn succeeded(unit: Unit, aggregate: FamilyAggregate) -> Self {
        Self {
            unit,
            status: UnitStatus::Succeeded,
            aggregate: Some(aggregate),
            reason: None,
        }
    }

    pub(crate) const fn skipped(unit: Unit, reason: String) -> Self {
        Self {
            unit,
            status: UnitStatus::Skipped,
            aggregate: None,
            reason: Some(reason),
        }
    }

    pub(crate) const fn failed(unit: Unit, reason: String) -> Self {
        Self {
            unit,
            status: UnitStatus::Failed,
            aggregate: None,
            reason: Some(reason),
        }
    }

    /// Get the unit.
    #[must_use]
    pub const fn unit(&self) -> Unit {
        self.unit
    }

    /// Get the final status.
    #[must_use]
    pub const fn status(&self) -> UnitStatus {
        self.status
    }

    /// Get the aggregate of a successful unit.
    #[must_use]
    pub const fn aggregate(&self) -> Option<&FamilyAggregate> {
        self.aggregate.as_ref()
    }

    /// Get why the unit was skipped or failed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

/// Result of one full aggregation pass over a results directory.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationReport {
    results_root: PathBuf,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    outcomes: Vec<UnitOutcome>,
}

impl AggregationReport {
    pub(crate) const fn new(
        results_root: PathBuf,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        outcomes: Vec<UnitOutcome>,
    ) -> Self {
        Self {
            results_root,
            started_at,
            finished_at,
            outcomes,
        }
    }

    /// Get the aggregated results directory.
    #[must_use]
    pub fn results_root(&self) -> &Path {
        &self.results_root
    }

    /// Get when the pass started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Get when the pass finished.
    #[must_use]
    pub const fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Get every outcome in execution order.
    #[must_use]
    pub fn outcomes(&self) -> &[UnitOutcome] {
        &self.outcomes
    }

    /// Get the outcome of one unit.
    #[must_use]
    pub fn outcome(&self, unit: Unit) -> Option<&UnitOutcome> {
        self.outcomes.iter().find(|o| o.unit == unit)
    }

    /// Get the aggregate of one unit, if it succeeded.
    #[must_use]
    pub fn aggregate(&self, unit: Unit) -> Option<&FamilyAggregate> {
        self.outcome(unit).and_then(UnitOutcome::aggregate)
    }

    /// Number of units with a given status.
    #[must_use]
    pub fn count(&self, status: UnitStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Number of units that produced an aggregate.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.count(UnitStatus::Succeeded)
    }

    /// Number of units without data.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(UnitStatus::Skipped)
    }

    /// Number of units that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(UnitStatus::Failed)
    }
}

impl fmt::Display for AggregationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} aggregate(s) succeeded, {} skipped, {} failed ({})",
            self.succeeded(),
            self.skipped(),
            self.failed(),
            self.results_root.display()
        )?;
        for outcome in &self.outcomes {
            match (outcome.status, &outcome.reason) {
                (UnitStatus::Succeeded, _) | (_, None) => {
                    writeln!(f, "  {}: {:?}", outcome.unit.name(), outcome.status)?;
                }
                (status, Some(reason)) => {
                    writeln!(f, "  {}: {status:?} ({reason})", outcome.unit.name())?;
                }
            }
        }
        Ok(())
    }
}
