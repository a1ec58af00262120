pub mod amount;
pub mod price;
pub mod price_range;

pub use amount::{Amount, TOKEN_DECIMALS};
pub use price::Price;
pub use price_range::PriceRange;
