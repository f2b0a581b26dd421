use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    core::record::{HeaderSet, Record},
    error::{CoercionError, StateError},
    item::mapping::{Fields, FromRecord, ToRecord},
};

use super::next_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Waiter,
    Cook,
    Manager,
    Cashier,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Waiter, Role::Cook, Role::Manager, Role::Cashier];

    /// Value stored in CSV files.
    pub fn code(self) -> &'static str {
        match self {
            Role::Waiter => "garcom",
            Role::Cook => "cozinheiro",
            Role::Manager => "gerente",
            Role::Cashier => "caixa",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Waiter => "Garçom",
            Role::Cook => "Cozinheiro",
            Role::Manager => "Gerente",
            Role::Cashier => "Caixa",
        }
    }

    pub fn badge_color(self) -> &'static str {
        match self {
            Role::Waiter => "bg-blue-100 text-blue-800",
            Role::Cook => "bg-green-100 text-green-800",
            Role::Manager => "bg-purple-100 text-purple-800",
            Role::Cashier => "bg-orange-100 text-orange-800",
        }
    }

    /// Matches the code or the label, ignoring case.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.code() == text || role.label().to_lowercase() == text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: u32,
    pub name: String,
    pub role: Role,
    pub phone: String,
    pub email: String,
    pub active: bool,
    pub hired_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStaffMember {
    pub name: String,
    pub role: Role,
    pub phone: String,
    pub email: String,
    pub active: bool,
    /// `None` when the import left the admission date blank.
    pub hired_on: Option<NaiveDate>,
}

const NAME: &str = "nome";
const ROLE: &str = "cargo";
const PHONE: &str = "telefone";
const EMAIL: &str = "email";
const ACTIVE: &str = "ativo";
const HIRED_ON: &str = "dataAdmissao";

impl ToRecord for StaffMember {
    fn headers() -> HeaderSet {
        HeaderSet::new([NAME, ROLE, PHONE, EMAIL, ACTIVE, HIRED_ON])
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with(NAME, self.name.as_str())
            .with(ROLE, self.role.code())
            .with(PHONE, self.phone.as_str())
            .with(EMAIL, self.email.as_str())
            .with(ACTIVE, self.active)
            .with(HIRED_ON, self.hired_on.format("%Y-%m-%d").to_string())
    }
}

/// A blank role reads as waiter. A blank admission date stays unset until
/// [`add_members`] resolves it.
impl FromRecord for NewStaffMember {
    fn required_headers() -> HeaderSet {
        HeaderSet::new([NAME, ROLE])
    }

    fn from_record(record: &Record) -> Result<Self, Vec<CoercionError>> {
        let mut fields = Fields::new(record);

        let member = NewStaffMember {
            name: fields.text(NAME),
            role: fields
                .choice(ROLE, "role", Role::parse)
                .unwrap_or(Role::Waiter),
            phone: fields.text(PHONE),
            email: fields.text(EMAIL),
            active: fields.boolean(ACTIVE, true),
            hired_on: fields.date(HIRED_ON),
        };

        fields.finish(member)
    }
}

/// Appends `new_members` after the highest existing id. Members without an
/// admission date are recorded as hired on `today`.
pub fn add_members(
    mut staff: Vec<StaffMember>,
    new_members: impl IntoIterator<Item = NewStaffMember>,
    today: NaiveDate,
) -> Vec<StaffMember> {
    for new in new_members {
        let id = next_id(staff.iter().map(|member| member.id));
        staff.push(StaffMember {
            id,
            name: new.name,
            role: new.role,
            phone: new.phone,
            email: new.email,
            active: new.active,
            hired_on: new.hired_on.unwrap_or(today),
        });
    }
    staff
}

pub fn count_by_role(staff: &[StaffMember], role: Role) -> usize {
    staff.iter().filter(|member| member.role == role).count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftStatus {
    Active,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: u32,
    pub staff_id: u32,
    pub started_at: NaiveDateTime,
    pub ended_at: Option<NaiveDateTime>,
    pub status: ShiftStatus,
}

pub fn active_shift(shifts: &[Shift], staff_id: u32) -> Option<&Shift> {
    shifts
        .iter()
        .find(|shift| shift.staff_id == staff_id && shift.status == ShiftStatus::Active)
}

pub fn active_shift_count(shifts: &[Shift]) -> usize {
    shifts
        .iter()
        .filter(|shift| shift.status == ShiftStatus::Active)
        .count()
}

/// Opens a shift for `staff_id` at `now`. A member already on shift keeps
/// the open one and nothing changes.
pub fn start_shift(
    mut shifts: Vec<Shift>,
    staff: &[StaffMember],
    staff_id: u32,
    now: NaiveDateTime,
) -> Result<Vec<Shift>, StateError> {
    if !staff.iter().any(|member| member.id == staff_id) {
        return Err(StateError::UnknownStaff(staff_id));
    }

    if active_shift(&shifts, staff_id).is_some() {
        debug!("Staff member {} is already on shift", staff_id);
        return Ok(shifts);
    }

    let id = next_id(shifts.iter().map(|shift| shift.id));
    shifts.push(Shift {
        id,
        staff_id,
        started_at: now,
        ended_at: None,
        status: ShiftStatus::Active,
    });
    Ok(shifts)
}

/// Closes shift `shift_id` at `now`. Closing a finished shift changes nothing.
pub fn end_shift(
    mut shifts: Vec<Shift>,
    shift_id: u32,
    now: NaiveDateTime,
) -> Result<Vec<Shift>, StateError> {
    let shift = shifts
        .iter_mut()
        .find(|shift| shift.id == shift_id)
        .ok_or(StateError::UnknownShift(shift_id))?;

    if shift.status == ShiftStatus::Active {
        shift.status = ShiftStatus::Finished;
        shift.ended_at = Some(now);
    }
    Ok(shifts)
}
