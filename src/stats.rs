// 📊 Dashboard Aggregator
// Pure functions from a control set to chart-ready summaries. Given the
// same records, every function here returns the same output; ordering of
// the input only matters where a function explicitly sorts.

use crate::control::{AssessmentPriority, Control, RemediationStatus, ALL_FUNCTIONS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Assumed fraction of the current gap closed per month in the projected
/// burn-down. A modeling constant, not a measured rate.
pub const GAP_CLOSURE_RATE: f64 = 0.12;

/// Number of future months in the projected burn-down series.
pub const PROJECTION_HORIZON_MONTHS: u32 = 9;

/// Domain ranking returns at most this many entries.
pub const DOMAIN_RANKING_LIMIT: usize = 5;

// ============================================================================
// SUMMARY SHAPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub total: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    /// Percentage in [0, 100]; 0 when there are no controls.
    pub compliance_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

impl PriorityBreakdown {
    pub fn total(&self) -> u64 {
        self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationBreakdown {
    pub not_started: u64,
    pub in_progress: u64,
    pub completed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCount {
    /// Short framework code (GV, ID, PR, DE, RS, RC) used as the chart axis key.
    pub code: String,
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRisk {
    pub domain: String,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    /// High×3 + Medium×2 + Low×1 over non-compliant controls.
    pub weighted_score: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Months from now; 0 is the current state.
    pub month: u32,
    pub projected_open: u64,
}

/// Everything the dashboard needs in one fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub summary: ComplianceSummary,
    pub priority_breakdown: PriorityBreakdown,
    pub remediation_breakdown: RemediationBreakdown,
    pub function_distribution: Vec<FunctionCount>,
    pub domain_ranking: Vec<DomainRisk>,
    pub gap_projection: Vec<TrendPoint>,
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Totals and compliance rate. Rate is 0 for an empty set.
pub fn compliance_summary(controls: &[Control]) -> ComplianceSummary {
    let total = controls.len();
    let compliant = controls.iter().filter(|c| c.is_compliant()).count();
    let non_compliant = total - compliant;

    let compliance_rate = if total == 0 {
        0.0
    } else {
        compliant as f64 / total as f64 * 100.0
    };

    ComplianceSummary {
        total,
        compliant,
        non_compliant,
        compliance_rate,
    }
}

pub fn compliance_rate(controls: &[Control]) -> f64 {
    compliance_summary(controls).compliance_rate
}

/// Non-compliant controls by assessment priority. Compliant controls are
/// excluded entirely, so the buckets sum to the non-compliant count.
pub fn priority_breakdown(controls: &[Control]) -> PriorityBreakdown {
    let mut breakdown = PriorityBreakdown::default();

    for control in controls.iter().filter(|c| !c.is_compliant()) {
        match control.assessment_priority {
            AssessmentPriority::High => breakdown.high += 1,
            AssessmentPriority::Medium => breakdown.medium += 1,
            AssessmentPriority::Low => breakdown.low += 1,
        }
    }

    breakdown
}

/// All controls by remediation status.
pub fn remediation_breakdown(controls: &[Control]) -> RemediationBreakdown {
    let mut breakdown = RemediationBreakdown::default();

    for control in controls {
        match control.remediation_status {
            RemediationStatus::NotStarted => breakdown.not_started += 1,
            RemediationStatus::InProgress => breakdown.in_progress += 1,
            RemediationStatus::Completed => breakdown.completed += 1,
        }
    }

    breakdown
}

/// Control counts per NIST function, keyed by short code.
///
/// Every function appears in fixed framework order, zero-filled, so chart
/// axes stay stable as data comes and goes.
pub fn function_distribution(controls: &[Control]) -> Vec<FunctionCount> {
    ALL_FUNCTIONS
        .iter()
        .map(|func| FunctionCount {
            code: func.code().to_string(),
            label: func.label().to_string(),
            count: controls
                .iter()
                .filter(|c| c.nist_function == *func)
                .count() as u64,
        })
        .collect()
}

/// Domains ranked by weighted open risk: per domain, non-compliant controls
/// counted by priority and scored High×3 + Medium×2 + Low×1. Sorted
/// descending; ties keep first-appearance order; at most
/// [`DOMAIN_RANKING_LIMIT`] entries.
pub fn domain_risk_ranking(controls: &[Control]) -> Vec<DomainRisk> {
    let mut ranking: Vec<DomainRisk> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for control in controls.iter().filter(|c| !c.is_compliant()) {
        let position = match index.get(control.cybersecurity_domain.as_str()) {
            Some(&position) => position,
            None => {
                ranking.push(DomainRisk {
                    domain: control.cybersecurity_domain.clone(),
                    high: 0,
                    medium: 0,
                    low: 0,
                    weighted_score: 0,
                });
                index.insert(control.cybersecurity_domain.as_str(), ranking.len() - 1);
                ranking.len() - 1
            }
        };

        let entry = &mut ranking[position];
        match control.assessment_priority {
            AssessmentPriority::High => entry.high += 1,
            AssessmentPriority::Medium => entry.medium += 1,
            AssessmentPriority::Low => entry.low += 1,
        }
        entry.weighted_score += control.assessment_priority.risk_weight();
    }

    // Stable sort keeps first-appearance order among equal scores
    ranking.sort_by(|a, b| b.weighted_score.cmp(&a.weighted_score));
    ranking.truncate(DOMAIN_RANKING_LIMIT);
    ranking
}

/// Synthetic gap-closure burn-down.
///
/// This is NOT recovered from history: it is a deterministic projection of
/// the current non-compliant count under two constants,
/// [`GAP_CLOSURE_RATE`] and [`PROJECTION_HORIZON_MONTHS`]. For month m the
/// projected open count is `total - round(total * m * rate)`, clamped at
/// zero. Month 0 is the current state, so the series has horizon + 1 points.
pub fn gap_closure_projection(controls: &[Control]) -> Vec<TrendPoint> {
    let total = controls.iter().filter(|c| !c.is_compliant()).count() as u64;

    (0..=PROJECTION_HORIZON_MONTHS)
        .map(|month| {
            let closed = (total as f64 * month as f64 * GAP_CLOSURE_RATE).round() as u64;
            TrendPoint {
                month,
                projected_open: total.saturating_sub(closed),
            }
        })
        .collect()
}

/// One-call aggregation for the dashboard fetch.
pub fn dashboard_stats(controls: &[Control]) -> DashboardStats {
    DashboardStats {
        summary: compliance_summary(controls),
        priority_breakdown: priority_breakdown(controls),
        remediation_breakdown: remediation_breakdown(controls),
        function_distribution: function_distribution(controls),
        domain_ranking: domain_risk_ranking(controls),
        gap_projection: gap_closure_projection(controls),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{MeetsCriteria, NistFunction};
    use chrono::Utc;

    fn control(
        function: NistFunction,
        priority: AssessmentPriority,
        domain: &str,
        criteria: MeetsCriteria,
        status: RemediationStatus,
    ) -> Control {
        Control {
            id: uuid::Uuid::new_v4().to_string(),
            owner: "Acme Corp".to_string(),
            nist_function: function,
            nist_category_id: format!("{}.XX", function.code()),
            nist_sub_category_id: format!("{}.XX-01", function.code()),
            assessment_priority: priority,
            control_description: "Test control".to_string(),
            identified_risks: "Test risk".to_string(),
            risk_details: String::new(),
            cybersecurity_domain: domain.to_string(),
            meets_criteria: criteria,
            remediation_status: status,
            last_updated: Utc::now(),
            created_at: None,
            updated_at: None,
        }
    }

    fn compliant(function: NistFunction) -> Control {
        control(
            function,
            AssessmentPriority::Low,
            "Governance",
            MeetsCriteria::Yes,
            RemediationStatus::Completed,
        )
    }

    fn open(priority: AssessmentPriority, domain: &str) -> Control {
        control(
            NistFunction::Protect,
            priority,
            domain,
            MeetsCriteria::No,
            RemediationStatus::InProgress,
        )
    }

    #[test]
    fn test_compliance_rate_six_of_ten() {
        let mut controls: Vec<Control> =
            (0..6).map(|_| compliant(NistFunction::Govern)).collect();
        controls.extend((0..4).map(|_| open(AssessmentPriority::High, "Access Control")));

        let summary = compliance_summary(&controls);
        assert_eq!(summary.total, 10);
        assert_eq!(summary.compliant, 6);
        assert_eq!(summary.non_compliant, 4);
        assert_eq!(summary.compliance_rate, 60.0);
    }

    #[test]
    fn test_empty_input_returns_zeroes_everywhere() {
        let controls: Vec<Control> = Vec::new();

        let summary = compliance_summary(&controls);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.compliance_rate, 0.0);

        assert_eq!(priority_breakdown(&controls), PriorityBreakdown::default());
        assert_eq!(
            remediation_breakdown(&controls),
            RemediationBreakdown::default()
        );
        assert!(domain_risk_ranking(&controls).is_empty());

        let distribution = function_distribution(&controls);
        assert_eq!(distribution.len(), 6);
        assert!(distribution.iter().all(|f| f.count == 0));

        let projection = gap_closure_projection(&controls);
        assert!(projection.iter().all(|p| p.projected_open == 0));
    }

    #[test]
    fn test_compliance_rate_stays_in_range() {
        let all_compliant: Vec<Control> =
            (0..7).map(|_| compliant(NistFunction::Detect)).collect();
        assert_eq!(compliance_rate(&all_compliant), 100.0);

        let none_compliant: Vec<Control> = (0..3)
            .map(|_| open(AssessmentPriority::Medium, "Network Security"))
            .collect();
        assert_eq!(compliance_rate(&none_compliant), 0.0);
    }

    #[test]
    fn test_priority_buckets_sum_to_non_compliant_count() {
        let controls = vec![
            compliant(NistFunction::Govern),
            open(AssessmentPriority::High, "Access Control"),
            open(AssessmentPriority::High, "Access Control"),
            open(AssessmentPriority::Medium, "Data Protection"),
            open(AssessmentPriority::Low, "Network Security"),
            compliant(NistFunction::Respond),
        ];

        let breakdown = priority_breakdown(&controls);
        assert_eq!(breakdown.high, 2);
        assert_eq!(breakdown.medium, 1);
        assert_eq!(breakdown.low, 1);

        let summary = compliance_summary(&controls);
        assert_eq!(breakdown.total(), summary.non_compliant as u64);
    }

    #[test]
    fn test_remediation_breakdown_counts_all_controls() {
        let controls = vec![
            control(
                NistFunction::Identify,
                AssessmentPriority::Low,
                "Asset Management",
                MeetsCriteria::No,
                RemediationStatus::NotStarted,
            ),
            control(
                NistFunction::Identify,
                AssessmentPriority::Low,
                "Asset Management",
                MeetsCriteria::No,
                RemediationStatus::InProgress,
            ),
            compliant(NistFunction::Identify),
        ];

        let breakdown = remediation_breakdown(&controls);
        assert_eq!(breakdown.not_started, 1);
        assert_eq!(breakdown.in_progress, 1);
        assert_eq!(breakdown.completed, 1);
    }

    #[test]
    fn test_function_distribution_is_zero_filled_and_ordered() {
        let controls = vec![
            compliant(NistFunction::Protect),
            compliant(NistFunction::Protect),
            compliant(NistFunction::Recover),
        ];

        let distribution = function_distribution(&controls);
        let codes: Vec<&str> = distribution.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, ["GV", "ID", "PR", "DE", "RS", "RC"]);

        assert_eq!(distribution[2].count, 2); // PR
        assert_eq!(distribution[5].count, 1); // RC
        assert_eq!(distribution[0].count, 0); // GV
    }

    #[test]
    fn test_domain_ranking_weights_and_order() {
        let controls = vec![
            open(AssessmentPriority::Low, "Asset Management"), // score 1
            open(AssessmentPriority::High, "Access Control"),  // 3
            open(AssessmentPriority::High, "Access Control"),  // 6
            open(AssessmentPriority::Medium, "Data Protection"), // 2
            compliant(NistFunction::Govern),                   // ignored
        ];

        let ranking = domain_risk_ranking(&controls);
        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking[0].domain, "Access Control");
        assert_eq!(ranking[0].weighted_score, 6);
        assert_eq!(ranking[0].high, 2);
        assert_eq!(ranking[1].domain, "Data Protection");
        assert_eq!(ranking[2].domain, "Asset Management");
    }

    #[test]
    fn test_domain_ranking_caps_at_five_with_stable_ties() {
        let domains = [
            "Access Control",
            "Network Security",
            "Data Protection",
            "Asset Management",
            "Incident Response",
            "Third-Party Risk",
            "Vulnerability Management",
        ];
        // One Low-priority open control each: all scores tie at 1
        let controls: Vec<Control> = domains
            .iter()
            .map(|d| open(AssessmentPriority::Low, d))
            .collect();

        let ranking = domain_risk_ranking(&controls);
        assert_eq!(ranking.len(), DOMAIN_RANKING_LIMIT);

        // Ties resolve to input order
        let ranked: Vec<&str> = ranking.iter().map(|r| r.domain.as_str()).collect();
        assert_eq!(ranked, &domains[..5]);
    }

    #[test]
    fn test_projection_starts_at_gap_and_burns_down() {
        let controls: Vec<Control> = (0..50)
            .map(|_| open(AssessmentPriority::Medium, "Access Control"))
            .collect();

        let projection = gap_closure_projection(&controls);
        assert_eq!(projection.len(), (PROJECTION_HORIZON_MONTHS + 1) as usize);
        assert_eq!(projection[0].month, 0);
        assert_eq!(projection[0].projected_open, 50);

        // Monotonically non-increasing, never negative
        for pair in projection.windows(2) {
            assert!(pair[1].projected_open <= pair[0].projected_open);
        }

        // 50 - round(50 * 1 * 0.12) = 44
        assert_eq!(projection[1].projected_open, 44);
        // month 9: 50 * 9 * 0.12 = 54 closed, clamps to 0
        assert_eq!(projection.last().unwrap().projected_open, 0);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let mut controls = vec![
            open(AssessmentPriority::High, "Access Control"),
            compliant(NistFunction::Govern),
            open(AssessmentPriority::Low, "Network Security"),
            compliant(NistFunction::Detect),
        ];

        let before = (
            compliance_summary(&controls),
            priority_breakdown(&controls),
            remediation_breakdown(&controls),
            function_distribution(&controls),
        );

        controls.reverse();

        assert_eq!(before.0, compliance_summary(&controls));
        assert_eq!(before.1, priority_breakdown(&controls));
        assert_eq!(before.2, remediation_breakdown(&controls));
        assert_eq!(before.3, function_distribution(&controls));
    }
}
