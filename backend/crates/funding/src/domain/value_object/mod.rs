pub mod order_ref;

pub use order_ref::{OrderPurpose, OrderRef};
