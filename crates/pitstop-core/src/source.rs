//! Data access for the engine
//!
//! The engine never reaches for a global client. Every entry point takes an
//! [`ExpenseSource`] / [`EventSource`] explicitly; [`MemoryStore`] is the
//! implementation used by the CLI and tests, loaded from JSON or CSV exports
//! of the data service.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use crate::dates::DateWindow;
use crate::error::{Error, Result};
use crate::models::{
    CarId, EventType, ExpenseRecord, MaintenanceEventSeries, RawEventSeries, RawExpense, SeriesId,
};

/// Filter for expense queries
///
/// Records with no date only match when `window` is unset; dated
/// aggregations count them as skipped themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpenseFilter {
    pub car_id: Option<CarId>,
    pub window: Option<DateWindow>,
}

impl ExpenseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn car_id(mut self, id: Option<CarId>) -> Self {
        self.car_id = id;
        self
    }

    pub fn window(mut self, window: Option<DateWindow>) -> Self {
        self.window = window;
        self
    }

    pub fn matches(&self, expense: &ExpenseRecord) -> bool {
        if self.car_id.is_some_and(|car| car != expense.car_id) {
            return false;
        }
        match (self.window, expense.date) {
            (Some(window), Some(date)) => window.contains(date),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

/// Filter for maintenance event queries
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFilter {
    pub car_id: Option<CarId>,
    pub event_type: Option<EventType>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn car_id(mut self, id: Option<CarId>) -> Self {
        self.car_id = id;
        self
    }

    pub fn event_type(mut self, event_type: Option<EventType>) -> Self {
        self.event_type = event_type;
        self
    }

    pub fn matches(&self, series: &MaintenanceEventSeries) -> bool {
        self.car_id.map_or(true, |car| car == series.car_id)
            && self.event_type.map_or(true, |t| t == series.event_type)
    }
}

/// Read access to expense records
pub trait ExpenseSource {
    fn expenses(&self, filter: &ExpenseFilter) -> Result<Vec<ExpenseRecord>>;
}

/// Read access to maintenance event series
pub trait EventSource {
    fn event_series(&self, filter: &EventFilter) -> Result<Vec<MaintenanceEventSeries>>;

    fn series_by_id(&self, id: SeriesId) -> Result<MaintenanceEventSeries> {
        self.event_series(&EventFilter::new())?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::NotFound(format!("event {}", id)))
    }
}

/// Document layout of a JSON export
#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    expenses: Vec<RawExpense>,
    #[serde(default, alias = "maintenance_events")]
    events: Vec<RawEventSeries>,
}

/// CSV row: `id,car_id,category,amount,date,description`
#[derive(Debug, Deserialize)]
struct CsvExpense {
    id: i64,
    car_id: CarId,
    category: String,
    amount: Option<String>,
    date: Option<String>,
    description: Option<String>,
}

/// Validated records held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    expenses: Vec<ExpenseRecord>,
    events: Vec<MaintenanceEventSeries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(expenses: Vec<ExpenseRecord>, events: Vec<MaintenanceEventSeries>) -> Self {
        Self { expenses, events }
    }

    /// Load a JSON document `{ "expenses": [...], "events": [...] }`.
    ///
    /// Any record with an unknown category, event type or an invalid
    /// recurrence rule fails the whole load.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: RawDocument = serde_json::from_reader(reader)?;
        let mut store = Self::new();
        store.add_raw_expenses(raw.expenses)?;
        store.add_raw_events(raw.events)?;
        info!(
            expenses = store.expenses.len(),
            events = store.events.len(),
            "Loaded records"
        );
        Ok(store)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Append expenses from a CSV export with a header row
    pub fn load_expense_csv<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut raws = Vec::new();
        for row in csv_reader.deserialize::<CsvExpense>() {
            let row = row?;
            let amount = match row.amount.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
                Some(a) => Some(a.parse::<Decimal>().map_err(|_| {
                    Error::InvalidData(format!("expense {}: invalid amount '{}'", row.id, a))
                })?),
                None => None,
            };
            raws.push(RawExpense {
                id: row.id,
                car_id: row.car_id,
                category: row.category,
                amount,
                date: row.date,
                description: row.description,
            });
        }
        let count = raws.len();
        self.add_raw_expenses(raws)?;
        debug!(count, "Loaded expenses from CSV");
        Ok(count)
    }

    pub fn load_expense_csv_file(&mut self, path: &Path) -> Result<usize> {
        let file = File::open(path)?;
        self.load_expense_csv(BufReader::new(file))
    }

    /// Validate every record before adding any; a rejected batch leaves the
    /// store unchanged
    pub fn add_raw_expenses(&mut self, raws: Vec<RawExpense>) -> Result<()> {
        let records = raws
            .into_iter()
            .map(ExpenseRecord::try_from)
            .collect::<Result<Vec<_>>>()?;
        self.expenses.extend(records);
        Ok(())
    }

    /// Same all-or-nothing rule as [`MemoryStore::add_raw_expenses`]
    pub fn add_raw_events(&mut self, raws: Vec<RawEventSeries>) -> Result<()> {
        let series = raws
            .into_iter()
            .map(MaintenanceEventSeries::try_from)
            .collect::<Result<Vec<_>>>()?;
        self.events.extend(series);
        Ok(())
    }

    pub fn expense_count(&self) -> usize {
        self.expenses.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

impl ExpenseSource for MemoryStore {
    fn expenses(&self, filter: &ExpenseFilter) -> Result<Vec<ExpenseRecord>> {
        Ok(self
            .expenses
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }
}

impl EventSource for MemoryStore {
    fn event_series(&self, filter: &EventFilter) -> Result<Vec<MaintenanceEventSeries>> {
        Ok(self
            .events
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExpenseCategory;
    use chrono::NaiveDate;
    use std::io::Write;
    use std::str::FromStr;

    const DOC: &str = r#"{
        "expenses": [
            {"id": 1, "carId": 1, "category": "Gas", "amount": 40.5, "date": "2024-05-01"},
            {"id": 2, "carId": 2, "category": "Road Tax", "amount": "120.00", "date": "2024-05-02"},
            {"id": 3, "carId": 1, "category": "JAF", "amount": null, "date": "not a date"}
        ],
        "events": [
            {"id": 10, "carId": 1, "title": "Oil change", "eventType": "maintenance",
             "startDate": "2024-01-15", "recurrence": {"type": "monthly", "interval": 3},
             "notificationDaysBefore": [7], "completed": false},
            {"id": 11, "carId": 2, "title": "Shaken", "eventType": "inspection",
             "startDate": "2025-03-01", "completed": false}
        ]
    }"#;

    #[test]
    fn test_load_json_document() {
        let store = MemoryStore::from_json_reader(DOC.as_bytes()).unwrap();
        assert_eq!(store.expense_count(), 3);
        assert_eq!(store.event_count(), 2);

        let all = store.expenses(&ExpenseFilter::new()).unwrap();
        assert_eq!(all[1].category, ExpenseCategory::RoadTax);
        assert_eq!(all[1].amount, Decimal::from_str("120").unwrap());
        assert_eq!(all[2].amount, Decimal::ZERO);
        assert_eq!(all[2].date, None);
    }

    #[test]
    fn test_expense_filter() {
        let store = MemoryStore::from_json_reader(DOC.as_bytes()).unwrap();
        let car1 = store.expenses(&ExpenseFilter::new().car_id(Some(1))).unwrap();
        assert_eq!(car1.len(), 2);

        let may1 = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let windowed = store
            .expenses(&ExpenseFilter::new().window(Some(DateWindow::new(may1, may1).unwrap())))
            .unwrap();
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].id, 1);
    }

    #[test]
    fn test_event_filter_and_lookup() {
        let store = MemoryStore::from_json_reader(DOC.as_bytes()).unwrap();
        let inspections = store
            .event_series(&EventFilter::new().event_type(Some(EventType::Inspection)))
            .unwrap();
        assert_eq!(inspections.len(), 1);
        assert_eq!(inspections[0].id, 11);

        assert_eq!(store.series_by_id(10).unwrap().title, "Oil change");
        assert!(matches!(store.series_by_id(99), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_unknown_category_fails_load() {
        let doc = r#"{"expenses": [{"id": 1, "carId": 1, "category": "Snacks", "amount": 1}]}"#;
        assert!(matches!(
            MemoryStore::from_json_reader(doc.as_bytes()),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_load_csv_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,car_id,category,amount,date,description").unwrap();
        writeln!(file, "1,1,Gas,45.20,2024-05-01,Full tank").unwrap();
        writeln!(file, "2,1,Car Wash,,2024-05-03,").unwrap();
        writeln!(file, "3,2,Repair,300,,Brake pads").unwrap();

        let mut store = MemoryStore::new();
        let count = store.load_expense_csv_file(file.path()).unwrap();
        assert_eq!(count, 3);

        let all = store.expenses(&ExpenseFilter::new()).unwrap();
        assert_eq!(all[0].amount, Decimal::from_str("45.20").unwrap());
        assert_eq!(all[0].description.as_deref(), Some("Full tank"));
        assert_eq!(all[1].amount, Decimal::ZERO);
        assert_eq!(all[1].description, None);
        assert_eq!(all[2].category, ExpenseCategory::Repairs);
        assert_eq!(all[2].date, None);
    }

    #[test]
    fn test_rejected_csv_leaves_store_unchanged() {
        let mut store = MemoryStore::from_json_reader(DOC.as_bytes()).unwrap();
        let csv = "id,car_id,category,amount,date,description\n\
                   20,1,Gas,10,2024-05-01,\n\
                   21,1,Gas,20,2024-05-02,\n\
                   22,1,Snacks,5,2024-05-03,\n";
        assert!(matches!(
            store.load_expense_csv(csv.as_bytes()),
            Err(Error::InvalidData(_))
        ));
        assert_eq!(store.expense_count(), 3);
    }

    #[test]
    fn test_rejected_events_leave_store_unchanged() {
        let mut store = MemoryStore::new();
        let raws: Vec<RawEventSeries> = serde_json::from_str(
            r#"[
                {"id": 1, "carId": 1, "title": "Oil change", "eventType": "maintenance",
                 "startDate": "2024-01-15", "completed": false},
                {"id": 2, "carId": 1, "title": "Wax", "eventType": "maintenance",
                 "startDate": "2024-01-15", "notificationDaysBefore": [-3], "completed": false}
            ]"#,
        )
        .unwrap();
        assert!(matches!(
            store.add_raw_events(raws),
            Err(Error::Notification(_))
        ));
        assert_eq!(store.event_count(), 0);
    }

    #[test]
    fn test_csv_bad_amount_fails() {
        let csv = "id,car_id,category,amount,date,description\n1,1,Gas,abc,2024-05-01,\n";
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.load_expense_csv(csv.as_bytes()),
            Err(Error::InvalidData(_))
        ));
    }
}
