//! Dealer Catalog
//!
//! Price list, stock levels and dealer addresses the tools answer from.
//! The data is fixed and in-process; `Inventory` is the seam a live
//! backend would plug into.

/// Read-only view over prices, stock and dealers
pub trait Inventory: Send + Sync {
    /// Price in whole rupiah, keyed by lower-case model name
    fn price(&self, model: &str) -> Option<u64>;

    /// Units in stock, keyed by lower-case model name
    fn stock(&self, model: &str) -> Option<u32>;

    /// Dealer address, keyed by title-case city name
    fn dealer(&self, city: &str) -> Option<&str>;

    /// Catalog name (for logs)
    fn name(&self) -> &str;
}

/// Built-in showroom data
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticInventory;

impl StaticInventory {
    pub const fn new() -> Self {
        Self
    }
}

impl Inventory for StaticInventory {
    fn price(&self, model: &str) -> Option<u64> {
        match model {
            "avanza" => Some(250_000_000),
            "agya" => Some(180_000_000),
            "fortuner" => Some(575_000_000),
            "pajero" => Some(600_000_000),
            "civic" => Some(520_000_000),
            _ => None,
        }
    }

    fn stock(&self, model: &str) -> Option<u32> {
        match model {
            "avanza" => Some(5),
            "agya" => Some(12),
            "fortuner" => Some(3),
            "pajero" => Some(2),
            "civic" => Some(4),
            _ => None,
        }
    }

    fn dealer(&self, city: &str) -> Option<&str> {
        match city {
            "Jakarta" => Some("Toyota Astrido Sunter, Jakarta Utara"),
            "Bandung" => Some("Toyota Auto2000 Soekarno-Hatta"),
            "Surabaya" => Some("Auto2000 Kenjeran"),
            "Medan" => Some("Agung Toyota Medan Krakatau"),
            _ => None,
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_model_has_price_and_stock() {
        let inventory = StaticInventory::new();
        for model in ["avanza", "agya", "fortuner", "pajero", "civic"] {
            assert!(inventory.price(model).is_some(), "{model} has no price");
            assert!(inventory.stock(model).is_some(), "{model} has no stock");
        }
    }

    #[test]
    fn test_keys_are_exact() {
        let inventory = StaticInventory::new();
        assert_eq!(inventory.price("fortuner"), Some(575_000_000));
        assert_eq!(inventory.price("Fortuner"), None);
        assert_eq!(inventory.stock("agya"), Some(12));
        assert_eq!(inventory.dealer("Medan"), Some("Agung Toyota Medan Krakatau"));
        assert_eq!(inventory.dealer("medan"), None);
    }

    #[test]
    fn test_every_city_has_dealer() {
        let inventory = StaticInventory::new();
        for city in ["Jakarta", "Bandung", "Surabaya", "Medan"] {
            assert!(inventory.dealer(city).is_some());
        }
        assert_eq!(inventory.dealer("Yogyakarta"), None);
    }
}
