//! Symbol and currency tables with fixed-point conversions.

use crate::scaling::{to_float, to_int};
use crate::types::{CurrencyInfo, LookupKey, SymbolInfo};

/// In-memory copy of the server's symbol and currency lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataTables {
    pub symbols: Vec<SymbolInfo>,
    pub currencies: Vec<CurrencyInfo>,
}

impl MetadataTables {
    pub fn new(symbols: Vec<SymbolInfo>, currencies: Vec<CurrencyInfo>) -> Self {
        Self {
            symbols,
            currencies,
        }
    }

    pub fn symbol(&self, key: &LookupKey) -> Option<&SymbolInfo> {
        self.symbols.iter().find(|s| match key {
            LookupKey::ById(id) => s.id == *id,
            LookupKey::ByName(name) => s.name == *name,
        })
    }

    pub fn currency(&self, key: &LookupKey) -> Option<&CurrencyInfo> {
        self.currencies.iter().find(|c| match key {
            LookupKey::ById(id) => c.id == *id,
            LookupKey::ByName(name) => c.name == *name,
        })
    }

    /// Margin currency of a symbol.
    pub fn margin_currency(&self, symbol: &LookupKey) -> Option<&CurrencyInfo> {
        let info = self.symbol(symbol)?;
        self.currency(&LookupKey::ById(info.margin_currency_id))
    }

    pub fn price_from_int(&self, symbol: &LookupKey, price: i64) -> Option<f64> {
        self.symbol(symbol)
            .map(|s| to_float(price, s.fractional_digits))
    }

    pub fn price_to_int(&self, symbol: &LookupKey, price: f64) -> Option<i64> {
        self.symbol(symbol).map(|s| to_int(price, s.fractional_digits))
    }

    pub fn volume_from_int(&self, symbol: &LookupKey, volume: i64) -> Option<f64> {
        self.margin_currency(symbol)
            .map(|c| to_float(volume, c.volume_fractional_digits))
    }

    pub fn volume_to_int(&self, symbol: &LookupKey, volume: f64) -> Option<i64> {
        self.margin_currency(symbol)
            .map(|c| to_int(volume, c.volume_fractional_digits))
    }

    pub fn deposit_from_int(&self, currency: &LookupKey, amount: i64) -> Option<f64> {
        self.currency(currency)
            .map(|c| to_float(amount, c.deposit_fractional_digits))
    }

    pub fn deposit_to_int(&self, currency: &LookupKey, amount: f64) -> Option<i64> {
        self.currency(currency)
            .map(|c| to_int(amount, c.deposit_fractional_digits))
    }
}
