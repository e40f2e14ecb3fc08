//! Fixed merchandise price list.

use std::collections::HashMap;
use std::sync::LazyLock;

use coinshop_core::Coins;

const STANDARD_PRICES: [(&str, u32); 10] = [
    ("t-shirt", 80),
    ("cup", 20),
    ("book", 50),
    ("pen", 10),
    ("powerbank", 200),
    ("hoody", 300),
    ("umbrella", 200),
    ("socks", 10),
    ("wallet", 50),
    ("pink-hoody", 500),
];

static STANDARD: LazyLock<PriceCatalog> = LazyLock::new(|| PriceCatalog {
    prices: STANDARD_PRICES
        .iter()
        .map(|&(name, price)| (name, Coins::from_const(price)))
        .collect(),
});

/// Immutable item-name → price mapping, built once per process.
#[derive(Debug)]
pub struct PriceCatalog {
    prices: HashMap<&'static str, Coins>,
}

impl PriceCatalog {
    /// The shop's price list.
    pub fn standard() -> &'static PriceCatalog {
        &STANDARD
    }

    /// Exact, case-sensitive lookup.
    pub fn price_of(&self, item_name: &str) -> Option<Coins> {
        self.prices.get(item_name).copied()
    }

}
