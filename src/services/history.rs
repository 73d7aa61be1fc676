use std::collections::HashSet;

use chrono::{Local, TimeZone};

use crate::error::DomainError;
use crate::models::{model_display_name, Category, HistoryRow, PredictionRecord};

const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Formats records for the history table in the viewer's local timezone.
pub fn present(records: &[PredictionRecord]) -> Vec<HistoryRow> {
    present_in(records, &Local)
}

pub fn present_in<Tz>(records: &[PredictionRecord], tz: &Tz) -> Vec<HistoryRow>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    records
        .iter()
        .map(|record| {
            let category = Category::try_from(record.prediction_result).ok();
            HistoryRow {
                id: record.id,
                timestamp: record
                    .timestamp
                    .with_timezone(tz)
                    .format(TIMESTAMP_FORMAT)
                    .to_string(),
                model: model_display_name(&record.model_used).to_string(),
                price: format!("${:.2}", record.features.price),
                size: record.features.size,
                rooms: record.features.rooms,
                category,
                category_label: category.map(|c| c.label()).unwrap_or("Unknown").to_string(),
            }
        })
        .collect()
}

/// Record ids must be unique across a fetched page.
pub fn check_unique_ids(records: &[PredictionRecord]) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    match records.iter().find(|r| !seen.insert(r.id)) {
        Some(duplicate) => Err(DomainError::DuplicateRecord(duplicate.id)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApartmentFeatures;
    use chrono::Utc;

    fn record(id: i64, model: &str, prediction: i64) -> PredictionRecord {
        PredictionRecord {
            id,
            features: ApartmentFeatures::default(),
            prediction_result: prediction,
            model_used: model.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 9, 15, 4, 5).unwrap(),
        }
    }

    #[test]
    fn formats_rows() {
        let rows = present_in(
            &[record(2, "random_forest", 2), record(1, "gradient_boost", 0)],
            &Utc,
        );
        assert_eq!(rows[0].id, 2);
        assert_eq!(rows[0].timestamp, "3/9/2024, 3:04:05 PM");
        assert_eq!(rows[0].model, "Random Forest");
        assert_eq!(rows[0].price, "$1000.00");
        assert_eq!(rows[0].category_label, "Premium");
        assert_eq!(rows[1].model, "gradient_boost");
        assert_eq!(rows[1].category, Some(Category::Budget));
    }

    #[test]
    fn unknown_category_is_labelled_not_dropped() {
        let rows = present_in(&[record(1, "knn", 7)], &Utc);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, None);
        assert_eq!(rows[0].category_label, "Unknown");
    }

    #[test]
    fn duplicate_ids_are_reported() {
        assert!(check_unique_ids(&[record(1, "knn", 0), record(2, "knn", 0)]).is_ok());
        assert_eq!(
            check_unique_ids(&[record(1, "knn", 0), record(1, "knn", 1)]),
            Err(DomainError::DuplicateRecord(1))
        );
    }
}
