//! Language-validation diagnostic report (§11.2), a standalone read-only
//! query independent of the per-item worker pipeline: scans persisted
//! Results against their expected language so an operator can spot
//! systemic translation/detection drift.

use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use serde::{Deserialize, Serialize};

use research_core::language;

use crate::entities::result::Entity as ResultEntity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblematicExample {
    pub result_id: i64,
    pub expected_language: String,
    pub detected_language: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageReport {
    pub total: usize,
    pub valid_count: usize,
    pub problematic_count: usize,
    pub problematic_percent: f64,
    pub example_problems: Vec<ProblematicExample>,
    pub problematic_ids: Vec<i64>,
}

pub struct ReportQueries;

impl ReportQueries {
    /// Scan every persisted Result and flag rows whose scoring text
    /// (PT translation when available, else original) doesn't read as the
    /// row's own `language` (§11.2).
    pub async fn language_diagnostic(db: &DatabaseConnection) -> Result<LanguageReport, DbErr> {
        let rows = ResultEntity::find().all(db).await?;
        let total = rows.len();

        let mut valid_count = 0usize;
        let mut example_problems = Vec::new();
        let mut problematic_ids = Vec::new();

        for row in &rows {
            let (valid, detected, confidence) =
                language::is_valid_language(&row.title, &row.description, &row.language);
            if valid {
                valid_count += 1;
            } else {
                problematic_ids.push(row.id);
                if example_problems.len() < 10 {
                    example_problems.push(ProblematicExample {
                        result_id: row.id,
                        expected_language: row.language.clone(),
                        detected_language: detected,
                        confidence,
                    });
                }
            }
        }

        let problematic_count = total - valid_count;
        let problematic_percent =
            if total == 0 { 0.0 } else { (problematic_count as f64 / total as f64) * 100.0 };

        Ok(LanguageReport {
            total,
            valid_count,
            problematic_count,
            problematic_percent,
            example_problems,
            problematic_ids,
        })
    }
}
