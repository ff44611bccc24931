use crate::core::domain::Identifiable;
use crate::core::library::StockStatus;

pub mod model;

pub trait Book: Identifiable {
    fn stock_status(&self, low_stock_threshold: i64) -> StockStatus;
    fn is_available(&self) -> bool;
    // percentage of copies currently lent out
    fn borrow_rate(&self) -> f64;
}
