use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of clothing categories assigned by the catalog service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Top,
    Bottom,
    Outerwear,
    Shoes,
    Accessory,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Top,
        Category::Bottom,
        Category::Outerwear,
        Category::Shoes,
        Category::Accessory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Top => "top",
            Category::Bottom => "bottom",
            Category::Outerwear => "outerwear",
            Category::Shoes => "shoes",
            Category::Accessory => "accessory",
        }
    }

    /// Whether items of this category can be worn in a try-on render.
    ///
    /// Outerwear is catalog-only.
    pub fn is_composable(&self) -> bool {
        !matches!(self, Category::Outerwear)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "top" => Ok(Category::Top),
            "bottom" => Ok(Category::Bottom),
            "outerwear" => Ok(Category::Outerwear),
            "shoes" => Ok(Category::Shoes),
            "accessory" => Ok(Category::Accessory),
            _ => Err(format!(
                "Invalid category '{}'. Valid options: top, bottom, outerwear, shoes, accessory",
                s
            )),
        }
    }
}
