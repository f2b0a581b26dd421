use chrono::NaiveTime;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    core::record::{HeaderSet, Record},
    error::{CoercionError, StateError},
    item::mapping::{Fields, FromRecord, ToRecord},
};

use super::next_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableStatus {
    Free,
    Occupied,
    Waiting,
    Service,
}

impl TableStatus {
    pub const ALL: [TableStatus; 4] = [
        TableStatus::Free,
        TableStatus::Occupied,
        TableStatus::Waiting,
        TableStatus::Service,
    ];

    pub fn code(self) -> &'static str {
        match self {
            TableStatus::Free => "livre",
            TableStatus::Occupied => "ocupada",
            TableStatus::Waiting => "aguardando",
            TableStatus::Service => "atendimento",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TableStatus::Free => "Livre",
            TableStatus::Occupied => "Ocupada",
            TableStatus::Waiting => "Aguardando",
            TableStatus::Service => "Atendimento",
        }
    }

    /// Style class of the table card.
    pub fn css_class(self) -> &'static str {
        match self {
            TableStatus::Free => "mesa-status-livre",
            TableStatus::Occupied => "mesa-status-ocupada",
            TableStatus::Waiting => "mesa-status-aguardando",
            TableStatus::Service => "mesa-status-atendimento",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_lowercase();
        Self::ALL.into_iter().find(|status| status.code() == code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: u32,
    pub number: u32,
    pub status: TableStatus,
    pub capacity: u32,
    pub waiter: Option<String>,
    pub opened_at: Option<NaiveTime>,
    pub bill: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTable {
    pub number: u32,
    pub capacity: u32,
}

const NUMBER: &str = "numero";
const STATUS: &str = "status";
const CAPACITY: &str = "capacidade";
const WAITER: &str = "garcom";
const OPENED_AT: &str = "horaAbertura";
const BILL: &str = "totalConta";

impl ToRecord for DiningTable {
    fn headers() -> HeaderSet {
        HeaderSet::new([NUMBER, STATUS, CAPACITY, WAITER, OPENED_AT, BILL])
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with(NUMBER, self.number)
            .with(STATUS, self.status.code())
            .with(CAPACITY, self.capacity)
            .with(WAITER, self.waiter.clone())
            .with(
                OPENED_AT,
                self.opened_at.map(|time| time.format("%H:%M").to_string()),
            )
            .with(BILL, self.bill.map(|bill| format!("{:.2}", bill)))
    }
}

impl FromRecord for NewTable {
    fn required_headers() -> HeaderSet {
        HeaderSet::new([NUMBER, CAPACITY])
    }

    fn from_record(record: &Record) -> Result<Self, Vec<CoercionError>> {
        let mut fields = Fields::new(record);

        let table = NewTable {
            number: fields.integer(NUMBER),
            capacity: fields.integer(CAPACITY),
        };

        fields.finish(table)
    }
}

/// Registers a free table. Table numbers are unique.
pub fn add_table(
    mut tables: Vec<DiningTable>,
    new: NewTable,
) -> Result<Vec<DiningTable>, StateError> {
    if tables.iter().any(|table| table.number == new.number) {
        return Err(StateError::DuplicateTable(new.number));
    }

    let id = next_id(tables.iter().map(|table| table.id));
    tables.push(DiningTable {
        id,
        number: new.number,
        status: TableStatus::Free,
        capacity: new.capacity,
        waiter: None,
        opened_at: None,
        bill: None,
    });
    Ok(tables)
}

/// Moves table `id` to `status`.
///
/// Occupying a free table opens it at `now` for `waiter`. Freeing a table
/// clears its waiter, opening time and bill. Other transitions only change
/// the status.
pub fn change_status(
    mut tables: Vec<DiningTable>,
    id: u32,
    status: TableStatus,
    waiter: &str,
    now: NaiveTime,
) -> Result<Vec<DiningTable>, StateError> {
    let table = tables
        .iter_mut()
        .find(|table| table.id == id)
        .ok_or(StateError::UnknownTable(id))?;

    debug!(
        "Table {} goes from {} to {}",
        table.number,
        table.status.code(),
        status.code()
    );

    match (table.status, status) {
        (TableStatus::Free, TableStatus::Occupied) => {
            table.opened_at = Some(now);
            table.waiter = Some(waiter.to_owned());
        }
        (_, TableStatus::Free) => {
            table.opened_at = None;
            table.waiter = None;
            table.bill = None;
        }
        _ => {}
    }
    table.status = status;

    Ok(tables)
}

pub fn count_by_status(tables: &[DiningTable], status: TableStatus) -> usize {
    tables.iter().filter(|table| table.status == status).count()
}

/// Tables not free, in display order.
pub fn in_use(tables: &[DiningTable]) -> impl Iterator<Item = &DiningTable> {
    tables
        .iter()
        .filter(|table| table.status != TableStatus::Free)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn floor() -> Vec<DiningTable> {
        let tables = add_table(Vec::new(), NewTable { number: 1, capacity: 2 }).unwrap();
        add_table(tables, NewTable { number: 2, capacity: 4 }).unwrap()
    }

    #[test]
    fn occupying_free_table_stamps_time_and_waiter() {
        let tables =
            change_status(floor(), 2, TableStatus::Occupied, "João Silva", time(18, 30)).unwrap();

        let table = &tables[1];
        assert_eq!(table.status, TableStatus::Occupied);
        assert_eq!(table.opened_at, Some(time(18, 30)));
        assert_eq!(table.waiter.as_deref(), Some("João Silva"));
    }

    #[test]
    fn freeing_clears_waiter_time_and_bill() {
        let mut tables =
            change_status(floor(), 1, TableStatus::Occupied, "Ana", time(19, 0)).unwrap();
        tables[0].bill = Some(85.5);

        let tables = change_status(tables, 1, TableStatus::Free, "", time(21, 0)).unwrap();

        assert_eq!(tables[0].status, TableStatus::Free);
        assert_eq!(tables[0].waiter, None);
        assert_eq!(tables[0].opened_at, None);
        assert_eq!(tables[0].bill, None);
    }

    #[test]
    fn other_transitions_keep_opening_data() {
        let tables = change_status(floor(), 1, TableStatus::Occupied, "Ana", time(19, 0)).unwrap();
        let tables = change_status(tables, 1, TableStatus::Waiting, "Bia", time(20, 0)).unwrap();

        assert_eq!(tables[0].status, TableStatus::Waiting);
        assert_eq!(tables[0].waiter.as_deref(), Some("Ana"));
        assert_eq!(tables[0].opened_at, Some(time(19, 0)));
    }

    #[test]
    fn duplicate_numbers_and_unknown_ids_are_rejected() {
        assert_eq!(
            add_table(floor(), NewTable { number: 2, capacity: 6 }),
            Err(StateError::DuplicateTable(2))
        );
        assert_eq!(
            change_status(floor(), 9, TableStatus::Free, "", time(12, 0)),
            Err(StateError::UnknownTable(9))
        );
    }

    #[test]
    fn counts_and_in_use_follow_status() {
        let tables = change_status(floor(), 2, TableStatus::Service, "Ana", time(19, 0)).unwrap();

        assert_eq!(count_by_status(&tables, TableStatus::Free), 1);
        assert_eq!(count_by_status(&tables, TableStatus::Service), 1);
        assert_eq!(in_use(&tables).map(|table| table.number).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn export_formats_time_and_bill() {
        let mut tables =
            change_status(floor(), 1, TableStatus::Occupied, "Ana", time(18, 5)).unwrap();
        tables[0].bill = Some(85.5);

        let record = tables[0].to_record();
        assert_eq!(record.text("status"), "ocupada");
        assert_eq!(record.text("horaAbertura"), "18:05");
        assert_eq!(record.text("totalConta"), "85.50");
        assert_eq!(tables[1].to_record().text("garcom"), "");
    }

    #[test]
    fn status_codes_round_trip() {
        for status in TableStatus::ALL {
            assert_eq!(TableStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(TableStatus::Waiting.css_class(), "mesa-status-aguardando");
    }
}
