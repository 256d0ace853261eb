pub mod ledger;
pub mod models;
pub mod number;
pub mod repository;

pub use ledger::{OrderError, OrderLedger, OrderLine};
pub use models::{CustomerInfo, Order, OrderItem, OrderStatus, PaymentStatus};
pub use repository::OrderRepository;
