//! Domain models for Pitstop
//!
//! Raw records arrive loosely typed from the data service (`Raw*` structs).
//! They are validated into tagged records at the boundary: unknown
//! categories, event types and recurrence types are rejected, never passed
//! through.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dates::parse_date;
use crate::error::{Error, Result};

pub type CarId = i64;
pub type ExpenseId = i64;
pub type SeriesId = i64;

// ========== Expense Models ==========

/// Expense category.
///
/// The declaration order is a compatibility contract: it drives legend
/// order and color assignment for every consumer of the aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    #[serde(rename = "Gas")]
    Gas,
    #[serde(rename = "Car Wash")]
    CarWash,
    #[serde(rename = "Repairs")]
    Repairs,
    #[serde(rename = "Accessories")]
    Accessories,
    #[serde(rename = "Insurance")]
    Insurance,
    #[serde(rename = "Road Tax")]
    RoadTax,
    #[serde(rename = "JAF")]
    Jaf,
    #[serde(rename = "Other")]
    Other,
}

impl ExpenseCategory {
    /// The full category universe in legend order
    pub const ALL: [ExpenseCategory; 8] = [
        Self::Gas,
        Self::CarWash,
        Self::Repairs,
        Self::Accessories,
        Self::Insurance,
        Self::RoadTax,
        Self::Jaf,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gas => "Gas",
            Self::CarWash => "Car Wash",
            Self::Repairs => "Repairs",
            Self::Accessories => "Accessories",
            Self::Insurance => "Insurance",
            Self::RoadTax => "Road Tax",
            Self::Jaf => "JAF",
            Self::Other => "Other",
        }
    }

    /// Position in the category universe
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Legend color for charts
    pub fn color(&self) -> &'static str {
        match self {
            Self::Gas => "rgba(255, 99, 132, 0.5)",
            Self::CarWash => "rgba(54, 162, 235, 0.5)",
            Self::Repairs => "rgba(255, 206, 86, 0.5)",
            Self::Accessories => "rgba(75, 192, 192, 0.5)",
            Self::Insurance => "rgba(153, 102, 255, 0.5)",
            Self::RoadTax => "rgba(255, 159, 64, 0.5)",
            Self::Jaf => "rgba(199, 199, 199, 0.5)",
            Self::Other => "rgba(83, 102, 255, 0.5)",
        }
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = String;

    /// Case-insensitive. Also accepts the singular spellings older expense
    /// forms stored ("Repair", "Accessory", "Others").
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gas" => Ok(Self::Gas),
            "car wash" | "car_wash" | "carwash" => Ok(Self::CarWash),
            "repairs" | "repair" => Ok(Self::Repairs),
            "accessories" | "accessory" => Ok(Self::Accessories),
            "insurance" => Ok(Self::Insurance),
            "road tax" | "road_tax" | "roadtax" => Ok(Self::RoadTax),
            "jaf" => Ok(Self::Jaf),
            "other" | "others" => Ok(Self::Other),
            _ => Err(format!("Unknown expense category: {}", s)),
        }
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expense row as delivered by the data service
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExpense {
    pub id: ExpenseId,
    #[serde(alias = "car_id")]
    pub car_id: CarId,
    pub category: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A validated expense
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub car_id: CarId,
    pub category: ExpenseCategory,
    /// Never negative; a missing amount is stored as zero
    pub amount: Decimal,
    /// `None` when the raw date was missing or unparsable; such records are
    /// skipped by every time-based aggregation
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl TryFrom<RawExpense> for ExpenseRecord {
    type Error = Error;

    fn try_from(raw: RawExpense) -> Result<Self> {
        let category: ExpenseCategory = raw
            .category
            .parse()
            .map_err(|e| Error::InvalidData(format!("expense {}: {}", raw.id, e)))?;

        let amount = raw.amount.unwrap_or(Decimal::ZERO);
        if amount < Decimal::ZERO {
            return Err(Error::InvalidData(format!(
                "expense {}: negative amount {}",
                raw.id, amount
            )));
        }

        let date = raw.date.as_deref().and_then(parse_date);
        if date.is_none() {
            debug!(
                expense_id = raw.id,
                raw_date = ?raw.date,
                "Expense has no usable date"
            );
        }

        Ok(Self {
            id: raw.id,
            car_id: raw.car_id,
            category,
            amount,
            date,
            description: raw.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

// ========== Maintenance Event Models ==========

/// Kind of maintenance event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Maintenance,
    Inspection,
    Insurance,
    Tax,
    Other,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::Inspection => "inspection",
            Self::Insurance => "insurance",
            Self::Tax => "tax",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Maintenance => "Maintenance",
            Self::Inspection => "Inspection",
            Self::Insurance => "Insurance",
            Self::Tax => "Tax",
            Self::Other => "Other",
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "maintenance" => Ok(Self::Maintenance),
            "inspection" => Ok(Self::Inspection),
            "insurance" => Ok(Self::Insurance),
            "tax" => Ok(Self::Tax),
            "other" => Ok(Self::Other),
            _ => Err(format!(
                "Unknown event type: {} (valid: maintenance, inspection, insurance, tax, other)",
                s
            )),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recurrence period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "No Recurrence",
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
        }
    }
}

impl std::str::FromStr for RecurrenceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!(
                "Unknown recurrence type: {} (valid: none, daily, weekly, monthly, yearly)",
                s
            )),
        }
    }
}

impl std::fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recurrence block of a raw event
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecurrence {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub interval: Option<i64>,
    #[serde(default, alias = "end_date")]
    pub end_date: Option<String>,
}

/// Maintenance event row as delivered by the data service.
///
/// Accepts the nested `recurrence` object or the flat `recurrence_type`,
/// `recurrence_interval`, `recurrence_end_date` columns of the events table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventSeries {
    pub id: SeriesId,
    #[serde(alias = "car_id")]
    pub car_id: CarId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "event_type")]
    pub event_type: String,
    #[serde(alias = "start_date")]
    pub start_date: String,
    #[serde(default, alias = "end_date")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub recurrence: Option<RawRecurrence>,
    #[serde(default, alias = "recurrence_type")]
    pub recurrence_type: Option<String>,
    #[serde(default, alias = "recurrence_interval")]
    pub recurrence_interval: Option<i64>,
    #[serde(default, alias = "recurrence_end_date")]
    pub recurrence_end_date: Option<String>,
    #[serde(default, alias = "notification_days_before")]
    pub notification_days_before: Option<Vec<i64>>,
    #[serde(default)]
    pub completed: bool,
}

/// How a maintenance event repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecurrenceRule {
    pub kind: RecurrenceType,
    /// Number of periods between occurrences, at least 1
    pub interval: u32,
    pub end_date: Option<NaiveDate>,
}

impl RecurrenceRule {
    /// A rule that produces only the start date
    pub fn once() -> Self {
        Self {
            kind: RecurrenceType::None,
            interval: 1,
            end_date: None,
        }
    }

    pub fn every(kind: RecurrenceType, interval: u32) -> Self {
        Self {
            kind,
            interval,
            end_date: None,
        }
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Check the rule against the series start date.
    ///
    /// Runs before any expansion so a bad rule never fails mid-sequence.
    pub fn validate(&self, start_date: NaiveDate) -> Result<()> {
        if self.interval < 1 {
            return Err(Error::Recurrence(format!(
                "interval must be at least 1, got {}",
                self.interval
            )));
        }
        if let Some(end) = self.end_date {
            if end < start_date {
                return Err(Error::Recurrence(format!(
                    "end date {} is before start date {}",
                    end, start_date
                )));
            }
        }
        Ok(())
    }

    pub fn is_recurring(&self) -> bool {
        self.kind != RecurrenceType::None
    }
}

/// A validated maintenance event series.
///
/// Only one occurrence is tracked at a time: `completed` refers to the
/// currently tracked occurrence, future occurrences are derived on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceEventSeries {
    pub id: SeriesId,
    pub car_id: CarId,
    pub title: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub recurrence: RecurrenceRule,
    /// Days before each occurrence on which to notify, all non-negative
    pub notification_days_before: Vec<i64>,
    pub completed: bool,
}

fn required_date(series_id: SeriesId, field: &str, value: &str) -> Result<NaiveDate> {
    parse_date(value).ok_or_else(|| {
        Error::InvalidData(format!(
            "event {}: invalid {} '{}'",
            series_id, field, value
        ))
    })
}

fn optional_date(
    series_id: SeriesId,
    field: &str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => required_date(series_id, field, v).map(Some),
        None => Ok(None),
    }
}

impl TryFrom<RawEventSeries> for MaintenanceEventSeries {
    type Error = Error;

    fn try_from(raw: RawEventSeries) -> Result<Self> {
        let id = raw.id;
        let event_type: EventType = raw
            .event_type
            .parse()
            .map_err(|e| Error::InvalidData(format!("event {}: {}", id, e)))?;
        let start_date = required_date(id, "start date", &raw.start_date)?;
        let end_date = optional_date(id, "end date", raw.end_date.as_deref())?;

        let nested = raw.recurrence.unwrap_or_default();
        let kind: RecurrenceType = nested
            .kind
            .or(raw.recurrence_type)
            .as_deref()
            .unwrap_or("none")
            .parse()
            .map_err(|e| Error::InvalidData(format!("event {}: {}", id, e)))?;
        let interval = nested.interval.or(raw.recurrence_interval).unwrap_or(1);
        if interval < 1 || interval > u32::MAX as i64 {
            return Err(Error::Recurrence(format!(
                "event {}: interval must be at least 1, got {}",
                id, interval
            )));
        }
        let recurrence_end = optional_date(
            id,
            "recurrence end date",
            nested.end_date.or(raw.recurrence_end_date).as_deref(),
        )?;

        let recurrence = RecurrenceRule {
            kind,
            interval: interval as u32,
            end_date: recurrence_end,
        };
        recurrence.validate(start_date)?;

        let offsets = raw.notification_days_before.unwrap_or_default();
        crate::schedule::notify::validate_offsets(&offsets)?;

        Ok(Self {
            id,
            car_id: raw.car_id,
            title: raw.title,
            description: raw.description.filter(|d| !d.trim().is_empty()),
            event_type,
            start_date,
            end_date,
            recurrence,
            notification_days_before: offsets,
            completed: raw.completed,
        })
    }
}

// ========== Query Models ==========

/// Lifecycle status of an occurrence, always computed, never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Overdue,
    Upcoming,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Upcoming => "upcoming",
            Self::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Overdue => "Overdue",
            Self::Upcoming => "Upcoming",
            Self::Completed => "Completed",
        }
    }
}

impl std::str::FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overdue" => Ok(Self::Overdue),
            "upcoming" => Ok(Self::Upcoming),
            "completed" => Ok(Self::Completed),
            _ => Err(format!(
                "Unknown status: {} (valid: overdue, upcoming, completed)",
                s
            )),
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Analytics time range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    Month,
    Year,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(format!("Unknown time range: {} (valid: month, year)", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn raw_expense(category: &str, amount: Option<&str>, date: Option<&str>) -> RawExpense {
        RawExpense {
            id: 1,
            car_id: 7,
            category: category.to_string(),
            amount: amount.map(|a| Decimal::from_str(a).unwrap()),
            date: date.map(String::from),
            description: None,
        }
    }

    #[test]
    fn test_category_universe_order() {
        let names: Vec<&str> = ExpenseCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Gas",
                "Car Wash",
                "Repairs",
                "Accessories",
                "Insurance",
                "Road Tax",
                "JAF",
                "Other"
            ]
        );
        for (i, cat) in ExpenseCategory::ALL.iter().enumerate() {
            assert_eq!(cat.index(), i);
        }
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Car Wash".parse(), Ok(ExpenseCategory::CarWash));
        assert_eq!("road tax".parse(), Ok(ExpenseCategory::RoadTax));
        assert_eq!("Repair".parse(), Ok(ExpenseCategory::Repairs));
        assert_eq!("Accessory".parse(), Ok(ExpenseCategory::Accessories));
        assert_eq!("Others".parse(), Ok(ExpenseCategory::Other));
        assert!("Groceries".parse::<ExpenseCategory>().is_err());
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&ExpenseCategory::RoadTax).unwrap();
        assert_eq!(json, "\"Road Tax\"");
    }

    #[test]
    fn test_expense_missing_amount_is_zero() {
        let record = ExpenseRecord::try_from(raw_expense("Gas", None, Some("2024-05-01"))).unwrap();
        assert_eq!(record.amount, Decimal::ZERO);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn test_expense_bad_date_kept_without_date() {
        let record =
            ExpenseRecord::try_from(raw_expense("Gas", Some("10"), Some("yesterday"))).unwrap();
        assert_eq!(record.date, None);
        let record = ExpenseRecord::try_from(raw_expense("Gas", Some("10"), None)).unwrap();
        assert_eq!(record.date, None);
    }

    #[test]
    fn test_expense_rejects_unknown_category() {
        let err = ExpenseRecord::try_from(raw_expense("Snacks", Some("3"), None)).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_expense_rejects_negative_amount() {
        let err = ExpenseRecord::try_from(raw_expense("Gas", Some("-3.50"), None)).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_raw_expense_json_shapes() {
        let camel: RawExpense = serde_json::from_str(
            r#"{"id": 1, "carId": 2, "category": "Gas", "amount": 45.10, "date": "2024-05-01"}"#,
        )
        .unwrap();
        assert_eq!(camel.amount, Some(Decimal::from_str("45.10").unwrap()));
        let snake: RawExpense = serde_json::from_str(
            r#"{"id": 1, "car_id": 2, "category": "Gas", "amount": null}"#,
        )
        .unwrap();
        assert_eq!(snake.car_id, 2);
        assert_eq!(snake.amount, None);
    }

    fn raw_event(json: &str) -> RawEventSeries {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_event_nested_recurrence() {
        let series = MaintenanceEventSeries::try_from(raw_event(
            r#"{"id": 3, "carId": 1, "title": "Oil change", "eventType": "maintenance",
                "startDate": "2024-01-31",
                "recurrence": {"type": "monthly", "interval": 3, "endDate": "2024-12-31"},
                "notificationDaysBefore": [1, 7], "completed": false}"#,
        ))
        .unwrap();
        assert_eq!(series.recurrence.kind, RecurrenceType::Monthly);
        assert_eq!(series.recurrence.interval, 3);
        assert_eq!(series.recurrence.end_date, NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(series.notification_days_before, vec![1, 7]);
    }

    #[test]
    fn test_event_flat_recurrence_columns() {
        let series = MaintenanceEventSeries::try_from(raw_event(
            r#"{"id": 4, "car_id": 1, "title": "Road tax", "event_type": "tax",
                "start_date": "2024-04-01T00:00:00+00:00", "end_date": null,
                "recurrence_type": "yearly", "recurrence_interval": null,
                "recurrence_end_date": null, "notification_days_before": null}"#,
        ))
        .unwrap();
        assert_eq!(series.event_type, EventType::Tax);
        assert_eq!(series.recurrence, RecurrenceRule::every(RecurrenceType::Yearly, 1));
        assert!(series.notification_days_before.is_empty());
        assert!(!series.completed);
    }

    #[test]
    fn test_event_rejects_bad_rules() {
        let zero_interval = raw_event(
            r#"{"id": 5, "carId": 1, "title": "x", "eventType": "other", "startDate": "2024-01-01",
                "recurrence": {"type": "weekly", "interval": 0}}"#,
        );
        assert!(matches!(
            MaintenanceEventSeries::try_from(zero_interval),
            Err(Error::Recurrence(_))
        ));

        let end_before_start = raw_event(
            r#"{"id": 6, "carId": 1, "title": "x", "eventType": "other", "startDate": "2024-01-01",
                "recurrence": {"type": "weekly", "endDate": "2023-12-01"}}"#,
        );
        assert!(matches!(
            MaintenanceEventSeries::try_from(end_before_start),
            Err(Error::Recurrence(_))
        ));

        let unknown_type = raw_event(
            r#"{"id": 7, "carId": 1, "title": "x", "eventType": "party",
                "startDate": "2024-01-01"}"#,
        );
        assert!(matches!(
            MaintenanceEventSeries::try_from(unknown_type),
            Err(Error::InvalidData(_))
        ));

        let negative_offset = raw_event(
            r#"{"id": 8, "carId": 1, "title": "x", "eventType": "other", "startDate": "2024-01-01",
                "notificationDaysBefore": [3, -1]}"#,
        );
        assert!(matches!(
            MaintenanceEventSeries::try_from(negative_offset),
            Err(Error::Notification(_))
        ));
    }

    #[test]
    fn test_status_and_range_from_str() {
        assert_eq!("Overdue".parse(), Ok(EventStatus::Overdue));
        assert!("late".parse::<EventStatus>().is_err());
        assert_eq!("YEAR".parse(), Ok(TimeRange::Year));
        assert!("week".parse::<TimeRange>().is_err());
    }
}
