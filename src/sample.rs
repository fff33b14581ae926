// 🎲 Sample Data Generator
// Seedable generator of plausible control records for demos and tests.
// Field combinations are drawn from a built-in catalog of real CSF 2.0
// category/subcategory codes so charts look sensible out of the box.

use crate::control::{
    AssessmentPriority, Control, MeetsCriteria, NistFunction, RemediationStatus,
};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct CatalogEntry {
    function: NistFunction,
    category_id: &'static str,
    sub_category_id: &'static str,
    description: &'static str,
    domain: &'static str,
    risk: &'static str,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        function: NistFunction::Govern,
        category_id: "GV.OC",
        sub_category_id: "GV.OC-01",
        description: "The organizational mission is understood and informs cybersecurity risk management",
        domain: "Governance",
        risk: "Security program misaligned with business objectives",
    },
    CatalogEntry {
        function: NistFunction::Govern,
        category_id: "GV.RM",
        sub_category_id: "GV.RM-01",
        description: "Risk management objectives are established and agreed to by organizational stakeholders",
        domain: "Governance",
        risk: "Unowned risk acceptance decisions",
    },
    CatalogEntry {
        function: NistFunction::Govern,
        category_id: "GV.PO",
        sub_category_id: "GV.PO-01",
        description: "Policy for managing cybersecurity risks is established and communicated",
        domain: "Governance",
        risk: "Policy drift across business units",
    },
    CatalogEntry {
        function: NistFunction::Identify,
        category_id: "ID.AM",
        sub_category_id: "ID.AM-01",
        description: "Inventories of hardware managed by the organization are maintained",
        domain: "Asset Management",
        risk: "Unknown devices on the network",
    },
    CatalogEntry {
        function: NistFunction::Identify,
        category_id: "ID.AM",
        sub_category_id: "ID.AM-02",
        description: "Inventories of software, services, and systems are maintained",
        domain: "Asset Management",
        risk: "Unpatched shadow IT applications",
    },
    CatalogEntry {
        function: NistFunction::Identify,
        category_id: "ID.RA",
        sub_category_id: "ID.RA-01",
        description: "Vulnerabilities in assets are identified, validated, and recorded",
        domain: "Vulnerability Management",
        risk: "Exploitable vulnerabilities outside scan coverage",
    },
    CatalogEntry {
        function: NistFunction::Identify,
        category_id: "ID.RA",
        sub_category_id: "ID.RA-05",
        description: "Threats, vulnerabilities, likelihoods, and impacts are used to understand inherent risk",
        domain: "Vulnerability Management",
        risk: "Risk register out of date",
    },
    CatalogEntry {
        function: NistFunction::Protect,
        category_id: "PR.AA",
        sub_category_id: "PR.AA-01",
        description: "Identities and credentials for authorized users, services, and hardware are managed",
        domain: "Access Control",
        risk: "Orphaned accounts retaining access",
    },
    CatalogEntry {
        function: NistFunction::Protect,
        category_id: "PR.AA",
        sub_category_id: "PR.AA-05",
        description: "Access permissions incorporate the principles of least privilege and separation of duties",
        domain: "Access Control",
        risk: "Privilege creep in long-tenured accounts",
    },
    CatalogEntry {
        function: NistFunction::Protect,
        category_id: "PR.DS",
        sub_category_id: "PR.DS-01",
        description: "The confidentiality, integrity, and availability of data-at-rest are protected",
        domain: "Data Protection",
        risk: "Unencrypted backups of sensitive data",
    },
    CatalogEntry {
        function: NistFunction::Protect,
        category_id: "PR.PS",
        sub_category_id: "PR.PS-02",
        description: "Software is maintained, replaced, and removed commensurate with risk",
        domain: "Vulnerability Management",
        risk: "End-of-life software in production",
    },
    CatalogEntry {
        function: NistFunction::Detect,
        category_id: "DE.CM",
        sub_category_id: "DE.CM-01",
        description: "Networks and network services are monitored to find potentially adverse events",
        domain: "Network Security",
        risk: "Blind spots in east-west traffic monitoring",
    },
    CatalogEntry {
        function: NistFunction::Detect,
        category_id: "DE.CM",
        sub_category_id: "DE.CM-09",
        description: "Computing hardware and software, runtime environments, and their data are monitored",
        domain: "Network Security",
        risk: "Endpoint telemetry gaps on legacy servers",
    },
    CatalogEntry {
        function: NistFunction::Detect,
        category_id: "DE.AE",
        sub_category_id: "DE.AE-02",
        description: "Potentially adverse events are analyzed to better understand associated activities",
        domain: "Incident Response",
        risk: "Alert fatigue masking true positives",
    },
    CatalogEntry {
        function: NistFunction::Respond,
        category_id: "RS.MA",
        sub_category_id: "RS.MA-01",
        description: "The incident response plan is executed in coordination with relevant third parties",
        domain: "Incident Response",
        risk: "Untested incident response playbooks",
    },
    CatalogEntry {
        function: NistFunction::Respond,
        category_id: "RS.AN",
        sub_category_id: "RS.AN-03",
        description: "Analysis is performed to establish what has taken place during an incident",
        domain: "Incident Response",
        risk: "Insufficient log retention for forensics",
    },
    CatalogEntry {
        function: NistFunction::Respond,
        category_id: "RS.CO",
        sub_category_id: "RS.CO-02",
        description: "Internal and external stakeholders are notified of incidents",
        domain: "Incident Response",
        risk: "Regulatory notification deadlines missed",
    },
    CatalogEntry {
        function: NistFunction::Recover,
        category_id: "RC.RP",
        sub_category_id: "RC.RP-01",
        description: "The recovery portion of the incident response plan is executed once initiated",
        domain: "Business Continuity",
        risk: "Recovery time objectives never validated",
    },
    CatalogEntry {
        function: NistFunction::Recover,
        category_id: "RC.RP",
        sub_category_id: "RC.RP-03",
        description: "The integrity of backups and other restoration assets is verified before use",
        domain: "Business Continuity",
        risk: "Backup restores failing silently",
    },
    CatalogEntry {
        function: NistFunction::Recover,
        category_id: "RC.CO",
        sub_category_id: "RC.CO-04",
        description: "Public updates on incident recovery are shared using approved methods and messaging",
        domain: "Business Continuity",
        risk: "Inconsistent external communications during recovery",
    },
];

const OWNERS: &[&str] = &[
    "Finance",
    "IT Operations",
    "Human Resources",
    "Engineering",
    "Legal & Compliance",
    "Customer Support",
];

const RISK_DETAILS: &[&str] = &[
    "Identified during the most recent internal audit cycle.",
    "Raised by the external assessor; compensating controls partially in place.",
    "Known gap; remediation budget requested for next quarter.",
    "Recurring finding across the last two assessment rounds.",
    "Mitigation depends on a vendor deliverable that has slipped.",
    "",
];

/// Generate `count` plausible controls with a fixed base time, fully
/// deterministic per seed. Ids are left empty; the store assigns them.
///
/// Generated data upholds the sample-data convention that a control
/// meeting its criteria has Completed remediation; the store itself never
/// enforces this.
pub fn generate_sample_controls_at(
    count: usize,
    seed: u64,
    base_time: DateTime<Utc>,
) -> Vec<Control> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut controls = Vec::with_capacity(count);

    for _ in 0..count {
        let entry = &CATALOG[rng.gen_range(0..CATALOG.len())];
        let owner = OWNERS[rng.gen_range(0..OWNERS.len())];

        let assessment_priority = match rng.gen_range(0..100) {
            0..=29 => AssessmentPriority::High,
            30..=74 => AssessmentPriority::Medium,
            _ => AssessmentPriority::Low,
        };

        let meets_criteria = if rng.gen_bool(0.55) {
            MeetsCriteria::Yes
        } else {
            MeetsCriteria::No
        };

        let remediation_status = match meets_criteria {
            MeetsCriteria::Yes => RemediationStatus::Completed,
            MeetsCriteria::No => {
                if rng.gen_bool(0.5) {
                    RemediationStatus::NotStarted
                } else {
                    RemediationStatus::InProgress
                }
            }
        };

        let risk_details = RISK_DETAILS[rng.gen_range(0..RISK_DETAILS.len())];

        let last_updated = base_time - Duration::days(rng.gen_range(0..180));

        controls.push(Control {
            id: String::new(),
            owner: owner.to_string(),
            nist_function: entry.function,
            nist_category_id: entry.category_id.to_string(),
            nist_sub_category_id: entry.sub_category_id.to_string(),
            assessment_priority,
            control_description: entry.description.to_string(),
            identified_risks: entry.risk.to_string(),
            risk_details: risk_details.to_string(),
            cybersecurity_domain: entry.domain.to_string(),
            meets_criteria,
            remediation_status,
            last_updated,
            created_at: None,
            updated_at: None,
        });
    }

    controls
}

/// Convenience wrapper anchored at the current time.
pub fn generate_sample_controls(count: usize, seed: u64) -> Vec<Control> {
    generate_sample_controls_at(count, seed, Utc::now())
}

// ============================================================================
// TESTS
// ============================================================================
