use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::video::VideoId;

/// Outcome of the backend's confidentiality scan.
///
/// Independent of [`super::VideoStatus`]: a `ready` video may be `fail` here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidentialityStatus {
    Pending,
    Pass,
    Warn,
    Fail,
    #[serde(other)]
    Unknown,
}

impl ConfidentialityStatus {
    /// `warn` and `fail` call for a human look before publishing.
    pub fn needs_review(&self) -> bool {
        matches!(
            self,
            ConfidentialityStatus::Warn | ConfidentialityStatus::Fail
        )
    }
}

impl Display for ConfidentialityStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ConfidentialityStatus::Pending => write!(f, "pending"),
            ConfidentialityStatus::Pass => write!(f, "pass"),
            ConfidentialityStatus::Warn => write!(f, "warn"),
            ConfidentialityStatus::Fail => write!(f, "fail"),
            ConfidentialityStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Display for RiskLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Unknown => write!(f, "unknown"),
        }
    }
}

/// A flagged transcript segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfidentialityFinding {
    #[serde(default)]
    pub risk: RiskLevel,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskCounts {
    #[serde(default)]
    pub high: u32,
    #[serde(default)]
    pub medium: u32,
    #[serde(default)]
    pub low: u32,
}

impl RiskCounts {
    pub fn total(&self) -> u32 {
        self.high + self.medium + self.low
    }

    /// Tally findings by risk. Unknown risks are not counted.
    pub fn from_findings(findings: &[ConfidentialityFinding]) -> Self {
        findings.iter().fold(RiskCounts::default(), |mut acc, f| {
            match f.risk {
                RiskLevel::High => acc.high += 1,
                RiskLevel::Medium => acc.medium += 1,
                RiskLevel::Low => acc.low += 1,
                RiskLevel::Unknown => {}
            }
            acc
        })
    }
}

/// Body for `POST /video/confidentiality/check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidentialityCheckRequest {
    pub video_id: VideoId,
}

/// Response of `POST /video/confidentiality/check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidentialityResult {
    pub overall_status: ConfidentialityStatus,
    pub summary: Option<String>,
    pub counts: Option<RiskCounts>,
    #[serde(default)]
    pub segments: Vec<ConfidentialityFinding>,
    pub model_used: Option<String>,
    #[serde(default, deserialize_with = "id_as_string")]
    pub check_id: Option<String>,
}

/// Check ids arrive as integers from the backend and as strings from older builds.
fn id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl ConfidentialityResult {
    /// Counts reported by the backend, or tallied from the segments when absent.
    pub fn risk_counts(&self) -> RiskCounts {
        self.counts
            .unwrap_or_else(|| RiskCounts::from_findings(&self.segments))
    }

    pub fn summary_or_default(&self) -> String {
        match &self.summary {
            Some(s) if !s.trim().is_empty() => s.clone(),
            _ => format!(
                "Confidentiality check: {} ({} findings)",
                self.overall_status,
                self.segments.len()
            ),
        }
    }
}
