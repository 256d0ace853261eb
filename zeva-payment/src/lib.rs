pub mod config;
pub mod easypaisa;
pub mod jazzcash;
pub mod reconciler;
pub mod sign;
pub mod validate;

pub use config::{EasyPaisaConfig, JazzCashConfig};
pub use easypaisa::EasyPaisaGateway;
pub use jazzcash::JazzCashGateway;
pub use reconciler::{InitiateRequest, PaymentError, PaymentReconciler};
