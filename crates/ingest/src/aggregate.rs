//! Job status aggregator. Rolls a day's executions up per partner.

use chrono::NaiveDate;
use indexmap::IndexMap;

use tms_core::{ExecutionStatus, JobExecution, JobStatusResponse, OverallStatus, PartnerJobStatus};

/// Classify a partner from its success/failure counts.
pub fn overall_status(successful: u32, failed: u32) -> OverallStatus {
    if failed == 0 {
        OverallStatus::Success
    } else if successful == 0 {
        OverallStatus::Failed
    } else {
        OverallStatus::Partial
    }
}

/// Build the status report for `job_date` from its execution rows.
///
/// Partners appear in first-seen order; PARTIAL partners count toward
/// neither the successful nor the failed total.
pub fn aggregate(job_date: NaiveDate, executions: &[JobExecution]) -> JobStatusResponse {
    let mut by_partner: IndexMap<&str, Vec<&JobExecution>> = IndexMap::new();
    for execution in executions {
        by_partner
            .entry(execution.partner_id.as_str())
            .or_default()
            .push(execution);
    }

    let partner_statuses: Vec<PartnerJobStatus> = by_partner
        .into_iter()
        .map(|(partner_id, rows)| partner_status(partner_id, &rows))
        .collect();

    let successful_partners = partner_statuses
        .iter()
        .filter(|s| s.overall_status == OverallStatus::Success)
        .count() as u32;
    let failed_partners = partner_statuses
        .iter()
        .filter(|s| s.overall_status == OverallStatus::Failed)
        .count() as u32;

    JobStatusResponse {
        job_date,
        total_partners: partner_statuses.len() as u32,
        successful_partners,
        failed_partners,
        partner_statuses,
    }
}

fn partner_status(partner_id: &str, rows: &[&JobExecution]) -> PartnerJobStatus {
    let successful = rows.iter().filter(|e| e.status == ExecutionStatus::Success).count() as u32;
    let failed_entity_types: Vec<_> = rows
        .iter()
        .filter(|e| e.status == ExecutionStatus::Failed)
        .map(|e| e.entity_type)
        .collect();
    let failed = failed_entity_types.len() as u32;

    PartnerJobStatus {
        partner_id: partner_id.to_string(),
        successful_entities: successful,
        failed_entities: failed,
        failed_entity_types,
        overall_status: overall_status(successful, failed),
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tms_core::EntityType;

    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn row(id: i64, partner: &str, entity: EntityType, status: ExecutionStatus) -> JobExecution {
        JobExecution {
            id,
            job_date: date(),
            partner_id: partner.to_string(),
            entity_type: entity,
            status,
            records_processed: if status == ExecutionStatus::Success { 1 } else { 0 },
            error_message: None,
            execution_time: Utc::now(),
            duration_ms: 3,
        }
    }

    #[test]
    fn test_overall_status_rules() {
        assert_eq!(overall_status(3, 0), OverallStatus::Success);
        assert_eq!(overall_status(0, 0), OverallStatus::Success);
        assert_eq!(overall_status(0, 2), OverallStatus::Failed);
        assert_eq!(overall_status(1, 1), OverallStatus::Partial);
    }

    #[test]
    fn test_empty_input() {
        let resp = aggregate(date(), &[]);
        assert_eq!(resp.total_partners, 0);
        assert_eq!(resp.successful_partners, 0);
        assert_eq!(resp.failed_partners, 0);
        assert!(resp.partner_statuses.is_empty());
        assert_eq!(resp.job_date, date());
    }

    #[test]
    fn test_partial_partner() {
        let rows = vec![
            row(1, "P2", EntityType::Theatre, ExecutionStatus::Success),
            row(2, "P2", EntityType::Hall, ExecutionStatus::Failed),
        ];
        let resp = aggregate(date(), &rows);
        assert_eq!(resp.total_partners, 1);
        assert_eq!(resp.successful_partners, 0);
        assert_eq!(resp.failed_partners, 0);
        let p2 = &resp.partner_statuses[0];
        assert_eq!(p2.overall_status, OverallStatus::Partial);
        assert_eq!(p2.failed_entity_types, vec![EntityType::Hall]);
    }

    #[test]
    fn test_counts_per_bucket() {
        let rows = vec![
            row(1, "OK", EntityType::Theatre, ExecutionStatus::Success),
            row(2, "OK", EntityType::Hall, ExecutionStatus::Success),
            row(3, "DOWN", EntityType::Theatre, ExecutionStatus::Failed),
            row(4, "DOWN", EntityType::Show, ExecutionStatus::Failed),
            row(5, "MIXED", EntityType::Show, ExecutionStatus::Failed),
            row(6, "MIXED", EntityType::Hall, ExecutionStatus::Success),
        ];
        let resp = aggregate(date(), &rows);
        assert_eq!(resp.total_partners, 3);
        assert_eq!(resp.successful_partners, 1);
        assert_eq!(resp.failed_partners, 1);

        let down = resp.partner_statuses.iter().find(|s| s.partner_id == "DOWN").unwrap();
        assert_eq!(down.failed_entities, 2);
        assert_eq!(down.failed_entity_types, vec![EntityType::Theatre, EntityType::Show]);
    }

    #[test]
    fn test_counts_independent_of_input_order() {
        let mut rows = vec![
            row(1, "A", EntityType::Theatre, ExecutionStatus::Success),
            row(2, "B", EntityType::Theatre, ExecutionStatus::Failed),
            row(3, "A", EntityType::Hall, ExecutionStatus::Failed),
            row(4, "C", EntityType::Show, ExecutionStatus::Success),
        ];
        let forward = aggregate(date(), &rows);
        rows.reverse();
        let backward = aggregate(date(), &rows);

        assert_eq!(forward.total_partners, backward.total_partners);
        assert_eq!(forward.successful_partners, backward.successful_partners);
        assert_eq!(forward.failed_partners, backward.failed_partners);
        for status in &forward.partner_statuses {
            let other = backward
                .partner_statuses
                .iter()
                .find(|s| s.partner_id == status.partner_id)
                .unwrap();
            assert_eq!(status.successful_entities, other.successful_entities);
            assert_eq!(status.failed_entities, other.failed_entities);
            assert_eq!(status.overall_status, other.overall_status);
        }
    }

    #[test]
    fn test_failed_entity_types_follow_input_order() {
        let rows = vec![
            row(1, "P", EntityType::Show, ExecutionStatus::Failed),
            row(2, "P", EntityType::Theatre, ExecutionStatus::Failed),
        ];
        let resp = aggregate(date(), &rows);
        assert_eq!(
            resp.partner_statuses[0].failed_entity_types,
            vec![EntityType::Show, EntityType::Theatre]
        );
    }
}
