// 🔍 Filter Engine
// Compound predicate filtering over the in-memory control set. Every
// criterion is optional; supplied criteria combine with AND. Filtering is
// stable: output preserves input order and never reorders or sorts.

use crate::control::{
    AssessmentPriority, Control, MeetsCriteria, NistFunction, RemediationStatus,
};
use serde::{Deserialize, Serialize};

/// Filter criteria for the control list. `None` (or an empty search
/// string) means "no constraint" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlFilter {
    /// Case-insensitive substring matched against description,
    /// sub-category id, and identified risks (OR among the three).
    #[serde(default)]
    pub search: Option<String>,

    #[serde(default)]
    pub function: Option<NistFunction>,

    #[serde(default)]
    pub priority: Option<AssessmentPriority>,

    #[serde(default, alias = "status")]
    pub remediation_status: Option<RemediationStatus>,

    #[serde(default)]
    pub meets_criteria: Option<MeetsCriteria>,

    #[serde(default)]
    pub owner: Option<String>,
}

impl ControlFilter {
    /// True when no criterion is set, i.e. the filter is the identity.
    pub fn is_unconstrained(&self) -> bool {
        self.effective_search().is_none()
            && self.function.is_none()
            && self.priority.is_none()
            && self.remediation_status.is_none()
            && self.meets_criteria.is_none()
            && self.owner.is_none()
    }

    fn effective_search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Does a single control satisfy every supplied criterion?
    pub fn matches(&self, control: &Control) -> bool {
        if let Some(needle) = self.effective_search() {
            let needle = needle.to_lowercase();
            let hit = control
                .control_description
                .to_lowercase()
                .contains(&needle)
                || control
                    .nist_sub_category_id
                    .to_lowercase()
                    .contains(&needle)
                || control.identified_risks.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        if let Some(function) = self.function {
            if control.nist_function != function {
                return false;
            }
        }

        if let Some(priority) = self.priority {
            if control.assessment_priority != priority {
                return false;
            }
        }

        if let Some(status) = self.remediation_status {
            if control.remediation_status != status {
                return false;
            }
        }

        if let Some(criteria) = self.meets_criteria {
            if control.meets_criteria != criteria {
                return false;
            }
        }

        if let Some(owner) = &self.owner {
            if control.owner != *owner {
                return false;
            }
        }

        true
    }

    /// Filtered copy of the input, in input order.
    pub fn apply(&self, controls: &[Control]) -> Vec<Control> {
        controls
            .iter()
            .filter(|c| self.matches(c))
            .cloned()
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn control(
        owner: &str,
        function: NistFunction,
        sub_category: &str,
        description: &str,
        risks: &str,
        priority: AssessmentPriority,
        criteria: MeetsCriteria,
        status: RemediationStatus,
    ) -> Control {
        Control {
            id: uuid::Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            nist_function: function,
            nist_category_id: sub_category
                .split('-')
                .next()
                .unwrap_or_default()
                .to_string(),
            nist_sub_category_id: sub_category.to_string(),
            assessment_priority: priority,
            control_description: description.to_string(),
            identified_risks: risks.to_string(),
            risk_details: String::new(),
            cybersecurity_domain: "Access Control".to_string(),
            meets_criteria: criteria,
            remediation_status: status,
            last_updated: Utc::now(),
            created_at: None,
            updated_at: None,
        }
    }

    fn fixture() -> Vec<Control> {
        vec![
            control(
                "Finance",
                NistFunction::Protect,
                "PR.AA-01",
                "Identities and credentials are managed",
                "Orphaned accounts",
                AssessmentPriority::High,
                MeetsCriteria::No,
                RemediationStatus::InProgress,
            ),
            control(
                "IT Operations",
                NistFunction::Detect,
                "DE.CM-01",
                "Networks are monitored",
                "Blind spots in segment monitoring",
                AssessmentPriority::Medium,
                MeetsCriteria::No,
                RemediationStatus::NotStarted,
            ),
            control(
                "Finance",
                NistFunction::Govern,
                "GV.OC-01",
                "Organizational mission is understood",
                "Policy drift",
                AssessmentPriority::Low,
                MeetsCriteria::Yes,
                RemediationStatus::Completed,
            ),
        ]
    }

    #[test]
    fn test_unconstrained_filter_is_identity() {
        let controls = fixture();
        let filter = ControlFilter::default();

        assert!(filter.is_unconstrained());
        assert_eq!(filter.apply(&controls), controls);
    }

    #[test]
    fn test_empty_search_string_means_no_constraint() {
        let controls = fixture();
        let filter = ControlFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        };

        assert!(filter.is_unconstrained());
        assert_eq!(filter.apply(&controls).len(), 3);
    }

    #[test]
    fn test_search_is_case_insensitive_across_three_fields() {
        let controls = fixture();

        // Hits control_description
        let by_description = ControlFilter {
            search: Some("CREDENTIALS".to_string()),
            ..Default::default()
        };
        assert_eq!(by_description.apply(&controls).len(), 1);

        // Hits nist_sub_category_id
        let by_sub_category = ControlFilter {
            search: Some("de.cm".to_string()),
            ..Default::default()
        };
        assert_eq!(by_sub_category.apply(&controls).len(), 1);

        // Hits identified_risks
        let by_risks = ControlFilter {
            search: Some("policy drift".to_string()),
            ..Default::default()
        };
        assert_eq!(by_risks.apply(&controls).len(), 1);

        // No field matches
        let miss = ControlFilter {
            search: Some("quantum".to_string()),
            ..Default::default()
        };
        assert!(miss.apply(&controls).is_empty());
    }

    #[test]
    fn test_criteria_combine_with_and() {
        let controls = fixture();

        let filter = ControlFilter {
            owner: Some("Finance".to_string()),
            meets_criteria: Some(MeetsCriteria::No),
            ..Default::default()
        };

        let matched = filter.apply(&controls);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].nist_sub_category_id, "PR.AA-01");
    }

    #[test]
    fn test_each_exact_match_dimension() {
        let controls = fixture();

        let by_function = ControlFilter {
            function: Some(NistFunction::Detect),
            ..Default::default()
        };
        assert_eq!(by_function.apply(&controls).len(), 1);

        let by_priority = ControlFilter {
            priority: Some(AssessmentPriority::High),
            ..Default::default()
        };
        assert_eq!(by_priority.apply(&controls).len(), 1);

        let by_status = ControlFilter {
            remediation_status: Some(RemediationStatus::Completed),
            ..Default::default()
        };
        assert_eq!(by_status.apply(&controls).len(), 1);

        let by_owner = ControlFilter {
            owner: Some("Finance".to_string()),
            ..Default::default()
        };
        assert_eq!(by_owner.apply(&controls).len(), 2);

        // Owner comparison is verbatim, not case-folded
        let wrong_case_owner = ControlFilter {
            owner: Some("finance".to_string()),
            ..Default::default()
        };
        assert!(wrong_case_owner.apply(&controls).is_empty());
    }

    #[test]
    fn test_filter_preserves_input_order() {
        let controls = fixture();
        let filter = ControlFilter {
            owner: Some("Finance".to_string()),
            ..Default::default()
        };

        let matched = filter.apply(&controls);
        assert_eq!(matched[0].nist_sub_category_id, "PR.AA-01");
        assert_eq!(matched[1].nist_sub_category_id, "GV.OC-01");
    }

    #[test]
    fn test_filter_is_idempotent() {
        let controls = fixture();
        let filter = ControlFilter {
            meets_criteria: Some(MeetsCriteria::No),
            priority: Some(AssessmentPriority::Medium),
            ..Default::default()
        };

        let once = filter.apply(&controls);
        let twice = filter.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_deserializes_from_query_labels() {
        let filter: ControlFilter = serde_json::from_str(
            r#"{"function":"GV","status":"In Progress","meets_criteria":"No"}"#,
        )
        .unwrap();

        assert_eq!(filter.function, Some(NistFunction::Govern));
        assert_eq!(
            filter.remediation_status,
            Some(RemediationStatus::InProgress)
        );
        assert_eq!(filter.meets_criteria, Some(MeetsCriteria::No));
    }
}
