// CSF Tracker - Core Library
// NIST Cybersecurity Framework compliance control tracking:
// SQLite-backed record store, dashboard aggregation, compound filtering,
// CSV import/export, and a seedable sample-data generator.
// Exposes all modules for use in the CLI, API server, and tests.

pub mod control;
pub mod csv_io;
pub mod db;
pub mod filter;
pub mod sample;
pub mod stats;

// Re-export commonly used types
pub use control::{
    AssessmentPriority, Control, MeetsCriteria, NistFunction, RemediationStatus,
    ALL_FUNCTIONS, ALL_PRIORITIES, ALL_STATUSES,
};
pub use csv_io::{load_controls_csv, write_controls_csv};
pub use db::{
    count_controls, delete_all_controls, get_all_controls, get_controls_by_owner,
    insert_controls, setup_database, update_control,
};
pub use filter::ControlFilter;
pub use sample::{generate_sample_controls, generate_sample_controls_at};
pub use stats::{
    compliance_rate, compliance_summary, dashboard_stats, domain_risk_ranking,
    function_distribution, gap_closure_projection, priority_breakdown,
    remediation_breakdown, ComplianceSummary, DashboardStats, DomainRisk,
    FunctionCount, PriorityBreakdown, RemediationBreakdown, TrendPoint,
    DOMAIN_RANKING_LIMIT, GAP_CLOSURE_RATE, PROJECTION_HORIZON_MONTHS,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
