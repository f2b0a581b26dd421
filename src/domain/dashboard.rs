use serde::Serialize;

use super::{
    orders::{Order, OrderStatus},
    tables::{DiningTable, TableStatus, count_by_status},
};

/// Counters shown on the dashboard home page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardStats {
    pub free_tables: usize,
    pub occupied_tables: usize,
    pub total_tables: usize,
    pub pending_orders: usize,
    /// Sum of every order total.
    pub sales: f64,
}

impl DashboardStats {
    pub fn compute(tables: &[DiningTable], orders: &[Order]) -> Self {
        DashboardStats {
            free_tables: count_by_status(tables, TableStatus::Free),
            occupied_tables: count_by_status(tables, TableStatus::Occupied),
            total_tables: tables.len(),
            pending_orders: orders
                .iter()
                .filter(|order| order.status == OrderStatus::Pending)
                .count(),
            sales: orders.iter().map(|order| order.total).sum(),
        }
    }

    /// Occupied tables as a rounded percentage, `None` without tables.
    pub fn occupancy_rate(&self) -> Option<u32> {
        if self.total_tables == 0 {
            return None;
        }
        let rate = self.occupied_tables as f64 / self.total_tables as f64 * 100.0;
        Some(rate.round() as u32)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::domain::tables::{NewTable, add_table, change_status};

    #[test]
    fn stats_count_tables_orders_and_sales() {
        let mut tables = Vec::new();
        for number in 1..=3 {
            tables = add_table(tables, NewTable { number, capacity: 4 }).unwrap();
        }
        let now = NaiveTime::from_hms_opt(20, 0, 0).unwrap();
        let tables = change_status(tables, 1, TableStatus::Occupied, "Ana", now).unwrap();

        let order = |id, status, total| Order {
            id,
            table_id: 1,
            lines: Vec::new(),
            status,
            placed_at: now,
            waiter: "Ana".into(),
            total,
        };
        let orders = vec![
            order(1, OrderStatus::Pending, 85.5),
            order(2, OrderStatus::Delivered, 14.5),
        ];

        let stats = DashboardStats::compute(&tables, &orders);

        assert_eq!(stats.free_tables, 2);
        assert_eq!(stats.occupied_tables, 1);
        assert_eq!(stats.total_tables, 3);
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.sales, 100.0);
        assert_eq!(stats.occupancy_rate(), Some(33));
    }

    #[test]
    fn empty_floor_has_no_occupancy_rate() {
        let stats = DashboardStats::compute(&[], &[]);
        assert_eq!(stats.occupancy_rate(), None);
        assert_eq!(stats.sales, 0.0);
    }
}
