pub mod error;
pub mod money;
pub mod types;
pub mod value;

pub use error::RatingError;
pub use money::{round_money, MONEY_SCALE};
pub use types::*;
pub use value::*;
