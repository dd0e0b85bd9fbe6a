//! First-class invariants for the cube game.
//!
//! Invariants are logical properties that must hold for every legitimate
//! state (or, for [`transition`], every legitimate pair of consecutive
//! states). Each is a type implementing [`Invariant`]; related invariants
//! are grouped into tuples implementing [`InvariantSet`]. Audits never
//! panic: they collect findings into a [`ValidationReport`].

pub mod heuristics;
pub mod lattice;
pub mod ownership;
pub mod players;
pub mod transition;

pub use heuristics::{PlausibleWinner, TurnParity};
pub use lattice::{
    CellCountExact, FacesUnique, FacesWellFormed, GridSizeInRange, LineCountBounded, LinesUnique,
    LinesWellFormed,
};
pub use ownership::{CellOwnersHoldMajority, ScoreSumBounded, ScoresMatchCells, SquareCountsMatchFaces};
pub use players::{CurrentPlayerKnown, PlayerCount, UniquePlayerIds, WinnerKnown};
pub use transition::{StatePair, TransitionInvariants, validate_transition};

use super::types::GameState;
use serde::Serialize;
use std::fmt;
use tracing::{instrument, warn};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// The state is unacceptable.
    Error,
    /// Suspicious but tolerated.
    Warning,
}

/// A logical property that must hold for a given state.
pub trait Invariant<S: ?Sized> {
    /// Describes every violation found; empty when the invariant holds.
    fn audit(state: &S) -> Vec<String>;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;

    /// Whether a violation rejects the state or only warns.
    fn severity() -> Severity {
        Severity::Error
    }

    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool {
        Self::audit(state).is_empty()
    }
}

/// One violated invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Description of the violated invariant.
    pub invariant: &'static str,
    /// What exactly is wrong.
    pub detail: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.invariant, self.detail)
    }
}

/// Structured result of an audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// No errors were found.
    pub valid: bool,
    /// Violations that make the state unacceptable.
    pub errors: Vec<Finding>,
    /// Suspicious findings.
    pub warnings: Vec<Finding>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl ValidationReport {
    /// Runs one invariant and files its findings.
    pub fn check<S: ?Sized, I: Invariant<S>>(&mut self, state: &S) {
        for detail in I::audit(state) {
            self.push(I::severity(), I::description(), detail);
        }
    }

    /// Files a finding directly.
    pub fn push(&mut self, severity: Severity, invariant: &'static str, detail: impl Into<String>) {
        let finding = Finding {
            invariant,
            detail: detail.into(),
        };
        match severity {
            Severity::Error => {
                self.valid = false;
                self.errors.push(finding);
            }
            Severity::Warning => self.warnings.push(finding),
        }
    }

    /// Errors joined into one line, for error messages.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(Finding::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "valid: {}", self.valid)?;
        for e in &self.errors {
            writeln!(f, "  error   {e}")?;
        }
        for w in &self.warnings {
            writeln!(f, "  warning {w}")?;
        }
        Ok(())
    }
}

/// A set of invariants that can be checked together.
///
/// Implemented for tuples of [`Invariant`]s.
pub trait InvariantSet<S: ?Sized> {
    /// Runs every invariant in the set, filing findings into `report`.
    fn check_all(state: &S, report: &mut ValidationReport);
}

macro_rules! impl_invariant_set {
    ($($name:ident),+) => {
        impl<S: ?Sized, $($name: Invariant<S>),+> InvariantSet<S> for ($($name,)+) {
            fn check_all(state: &S, report: &mut ValidationReport) {
                $(report.check::<S, $name>(state);)+
            }
        }
    };
}

impl_invariant_set!(A);
impl_invariant_set!(A, B);
impl_invariant_set!(A, B, C);
impl_invariant_set!(A, B, C, D);
impl_invariant_set!(A, B, C, D, E);
impl_invariant_set!(A, B, C, D, E, F);

/// Seating invariants.
pub type SeatInvariants = (PlayerCount, UniquePlayerIds, CurrentPlayerKnown, WinnerKnown);

/// Geometric invariants.
pub type LatticeInvariants = (
    GridSizeInRange,
    LinesWellFormed,
    LinesUnique,
    LineCountBounded,
    CellCountExact,
);

/// Face invariants.
pub type FaceInvariants = (FacesWellFormed, FacesUnique);

/// Ownership and scoring invariants.
pub type ScoringInvariants = (
    CellOwnersHoldMajority,
    ScoresMatchCells,
    SquareCountsMatchFaces,
    ScoreSumBounded,
);

/// Warning-level heuristics.
pub type StateHeuristics = (TurnParity, PlausibleWinner);

/// Audits a candidate state against every invariant.
///
/// `None` models an absent state (for example a null network payload) and is
/// itself an error.
#[instrument(skip(state), fields(present = state.is_some()))]
pub fn validate_state(state: Option<&GameState>) -> ValidationReport {
    let mut report = ValidationReport::default();
    let Some(state) = state else {
        report.push(Severity::Error, "State is present", "state is null");
        warn!("Audited a null state");
        return report;
    };

    SeatInvariants::check_all(state, &mut report);
    LatticeInvariants::check_all(state, &mut report);
    FaceInvariants::check_all(state, &mut report);
    ScoringInvariants::check_all(state, &mut report);
    StateHeuristics::check_all(state, &mut report);

    if !report.valid {
        warn!(errors = report.errors.len(), summary = %report.error_summary(), "State failed audit");
    }
    report
}
