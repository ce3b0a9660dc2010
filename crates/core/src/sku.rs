//! SKU identity: the {model, variant, colour} key every aggregate partitions on.

use serde::{Deserialize, Serialize};

/// Stock-keeping unit identity.
///
/// Two records with the same model/variant/colour refer to the same SKU,
/// regardless of the dealer part number printed on the invoice. The part
/// number (`sku_code` on records) is carried alongside for display and export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sku {
    pub model: String,
    pub variant: String,
    pub colour: String,
}

impl Sku {
    pub fn new(
        model: impl Into<String>,
        variant: impl Into<String>,
        colour: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            variant: variant.into(),
            colour: colour.into(),
        }
    }
}

impl core::fmt::Display for Sku {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {} {}", self.model, self.variant, self.colour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skus_compare_by_value() {
        let a = Sku::new("Splendor Plus", "Standard", "Black");
        let b = Sku::new("Splendor Plus", "Standard", "Black");
        let c = Sku::new("Splendor Plus", "Standard", "Sports Red");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn display_joins_the_three_parts() {
        let sku = Sku::new("Destini 125", "Standard", "Pearl White");
        assert_eq!(sku.to_string(), "Destini 125 Standard Pearl White");
    }
}
