use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One leg of a pool, as described by the model.
///
/// `initial_price` is the price of this token in units of the other leg.
/// The second token of a pair is the quote and always starts at 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub initial_price: Decimal,
}

impl Token {
    pub fn new(symbol: impl Into<String>, initial_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            initial_price,
        }
    }

    /// True when this token can be used as the quote leg of a pair.
    #[must_use]
    pub fn is_quote(&self) -> bool {
        self.initial_price == Decimal::ONE
    }
}
