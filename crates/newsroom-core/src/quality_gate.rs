//! Deterministic critique classification.
//!
//! The critic is asked to answer with `CODE01` (problems found) or `CODE02`
//! (approved), but models rarely comply exactly. [`classify`] turns whatever
//! text came back into a [`CritiqueVerdict`] by looking for explicit markers
//! first and falling back to keyword scoring.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Markers that settle the verdict as rejected. Checked before approvals.
const REJECT_MARKERS: &[&str] = &["code01", "problemas detectados", "errores"];
/// Markers that settle the verdict as approved.
const APPROVE_MARKERS: &[&str] = &["code02", "aprobado", "no detecta"];

const PROBLEM_INDICATORS: &[&str] = &[
    "sesgo",
    "falacia",
    "dato falso",
    "error",
    "problema",
    "corrección",
];
const APPROVAL_INDICATORS: &[&str] = &["aprobado", "válido", "correcto", "sin problemas", "cumple"];

/// The two critique outcomes, carried with their wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CritiqueCode {
    #[serde(rename = "CODE02")]
    Approved,
    #[serde(rename = "CODE01")]
    Rejected,
}

impl CritiqueCode {
    pub fn as_code(self) -> &'static str {
        match self {
            CritiqueCode::Approved => "CODE02",
            CritiqueCode::Rejected => "CODE01",
        }
    }

    pub fn is_approved(self) -> bool {
        self == CritiqueCode::Approved
    }
}

impl fmt::Display for CritiqueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// What decided a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictBasis {
    ExplicitMarker,
    Keywords,
    /// Neither or both indicator sets matched.
    Ambiguous,
    /// The gate approves everything.
    Unconditional,
}

/// Classified critique: the code plus the raw critique text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritiqueVerdict {
    pub code: CritiqueCode,
    pub text: String,
    pub basis: VerdictBasis,
}

impl CritiqueVerdict {
    pub fn is_approved(&self) -> bool {
        self.code.is_approved()
    }
}

/// Classification policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStrategy {
    /// Markers, then keyword scoring; ambiguity approves.
    #[default]
    Keyword,
    /// Every critique approves. Disables backtracking.
    AlwaysApprove,
    /// Like `Keyword`, but ambiguity rejects.
    Strict,
}

impl GateStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            GateStrategy::Keyword => "keyword",
            GateStrategy::AlwaysApprove => "always_approve",
            GateStrategy::Strict => "strict",
        }
    }
}

impl fmt::Display for GateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GateStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "keyword" => Ok(GateStrategy::Keyword),
            "always_approve" => Ok(GateStrategy::AlwaysApprove),
            "strict" => Ok(GateStrategy::Strict),
            other => Err(format!(
                "unknown gate strategy '{other}' (expected keyword, always_approve or strict)"
            )),
        }
    }
}

/// Stateless classifier parameterised by strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualityGate {
    strategy: GateStrategy,
}

impl QualityGate {
    pub fn new(strategy: GateStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> GateStrategy {
        self.strategy
    }

    /// Classify `critique`. Total and deterministic.
    pub fn classify(&self, critique: &str) -> CritiqueVerdict {
        let (code, basis) = match self.strategy {
            GateStrategy::AlwaysApprove => (CritiqueCode::Approved, VerdictBasis::Unconditional),
            GateStrategy::Keyword => decide(critique, CritiqueCode::Approved),
            GateStrategy::Strict => decide(critique, CritiqueCode::Rejected),
        };
        CritiqueVerdict {
            code,
            text: critique.to_string(),
            basis,
        }
    }
}

/// Classify with the default keyword strategy.
pub fn classify(critique: &str) -> CritiqueVerdict {
    QualityGate::default().classify(critique)
}

fn decide(critique: &str, on_ambiguity: CritiqueCode) -> (CritiqueCode, VerdictBasis) {
    let lowered = critique.to_lowercase();

    if contains_any(&lowered, REJECT_MARKERS) {
        return (CritiqueCode::Rejected, VerdictBasis::ExplicitMarker);
    }
    if contains_any(&lowered, APPROVE_MARKERS) {
        return (CritiqueCode::Approved, VerdictBasis::ExplicitMarker);
    }

    let problems = contains_any(&lowered, PROBLEM_INDICATORS);
    let approvals = contains_any(&lowered, APPROVAL_INDICATORS);
    match (problems, approvals) {
        (true, false) => (CritiqueCode::Rejected, VerdictBasis::Keywords),
        (false, true) => (CritiqueCode::Approved, VerdictBasis::Keywords),
        _ => (on_ambiguity, VerdictBasis::Ambiguous),
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}
