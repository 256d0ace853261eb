pub mod gateway;
pub mod money;
pub mod notify;

pub use gateway::{CallbackKey, CallbackOutcome, GatewayError, GatewaySubmission, WalletCharge, WalletGateway};
pub use notify::{Notifier, NoopNotifier};
