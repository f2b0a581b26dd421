use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::{
    core::record::{HeaderSet, Record},
    error::StateError,
    item::mapping::ToRecord,
};

use super::{contains_ignore_case, tables::DiningTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
    ];

    pub fn code(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pendente",
            OrderStatus::Preparing => "preparando",
            OrderStatus::Ready => "pronto",
            OrderStatus::Delivered => "entregue",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendente",
            OrderStatus::Preparing => "Preparando",
            OrderStatus::Ready => "Pronto",
            OrderStatus::Delivered => "Entregue",
        }
    }

    pub fn badge_color(self) -> &'static str {
        match self {
            OrderStatus::Pending => "bg-yellow-500",
            OrderStatus::Preparing => "bg-blue-500",
            OrderStatus::Ready => "bg-green-500",
            OrderStatus::Delivered => "bg-gray-500",
        }
    }

    /// The status the kitchen moves an order to next; `None` once delivered.
    pub fn next(self) -> Option<Self> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub menu_item_id: u32,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub notes: Option<String>,
}

impl OrderLine {
    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u32,
    pub table_id: u32,
    pub lines: Vec<OrderLine>,
    pub status: OrderStatus,
    pub placed_at: NaiveTime,
    pub waiter: String,
    pub total: f64,
}

const ID: &str = "id";
const TABLE: &str = "mesa";
const STATUS: &str = "status";
const PLACED_AT: &str = "horario";
const WAITER: &str = "garcom";
const LINES: &str = "itens";
const TOTAL: &str = "total";

impl ToRecord for Order {
    fn headers() -> HeaderSet {
        HeaderSet::new([ID, TABLE, STATUS, PLACED_AT, WAITER, LINES, TOTAL])
    }

    fn to_record(&self) -> Record {
        let lines = self
            .lines
            .iter()
            .map(|line| format!("{}x {}", line.quantity, line.name))
            .collect::<Vec<_>>()
            .join("; ");

        Record::new()
            .with(ID, self.id)
            .with(TABLE, self.table_id)
            .with(STATUS, self.status.code())
            .with(PLACED_AT, self.placed_at.format("%H:%M").to_string())
            .with(WAITER, self.waiter.as_str())
            .with(LINES, lines)
            .with(TOTAL, format!("{:.2}", self.total))
    }
}

/// Orders shown on the order board.
///
/// `status` of `None` keeps every status. A non-empty `search` keeps orders
/// whose table number contains it or whose waiter contains it, ignoring case.
pub fn filter_orders<'a>(
    orders: &'a [Order],
    tables: &[DiningTable],
    status: Option<OrderStatus>,
    search: &str,
) -> Vec<&'a Order> {
    orders
        .iter()
        .filter(|order| status.is_none_or(|status| order.status == status))
        .filter(|order| {
            let table_matches = tables
                .iter()
                .find(|table| table.id == order.table_id)
                .is_some_and(|table| table.number.to_string().contains(search));

            table_matches || contains_ignore_case(&order.waiter, search)
        })
        .collect()
}

/// Order count per status, in [`OrderStatus::ALL`] order.
pub fn status_counts(orders: &[Order]) -> [(OrderStatus, usize); 4] {
    OrderStatus::ALL.map(|status| {
        let count = orders.iter().filter(|order| order.status == status).count();
        (status, count)
    })
}

pub fn update_status(
    mut orders: Vec<Order>,
    id: u32,
    status: OrderStatus,
) -> Result<Vec<Order>, StateError> {
    let order = orders
        .iter_mut()
        .find(|order| order.id == id)
        .ok_or(StateError::UnknownOrder(id))?;
    order.status = status;
    Ok(orders)
}

/// Moves order `id` one step along the kitchen flow. Delivered orders stay put.
pub fn advance(orders: Vec<Order>, id: u32) -> Result<Vec<Order>, StateError> {
    let current = orders
        .iter()
        .find(|order| order.id == id)
        .map(|order| order.status)
        .ok_or(StateError::UnknownOrder(id))?;

    match current.next() {
        Some(next) => update_status(orders, id, next),
        None => Ok(orders),
    }
}
