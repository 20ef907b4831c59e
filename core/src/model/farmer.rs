use crate::types::FarmerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Districts covered by the audit. Statistics always report every one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum District {
    Pune,
    Satara,
    Sangli,
    Nashik,
    Kolhapur,
}

impl District {
    /// Fixed enumeration order; farmers are assigned districts cyclically.
    pub const ALL: [District; 5] = [
        Self::Pune,
        Self::Satara,
        Self::Sangli,
        Self::Nashik,
        Self::Kolhapur,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pune => "Pune",
            Self::Satara => "Satara",
            Self::Sangli => "Sangli",
            Self::Nashik => "Nashik",
            Self::Kolhapur => "Kolhapur",
        }
    }
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Crop {
    Wheat,
    Rice,
    Sugarcane,
    Cotton,
    Tomato,
    Onion,
}

impl Crop {
    pub const ALL: [Crop; 6] = [
        Self::Wheat,
        Self::Rice,
        Self::Sugarcane,
        Self::Cotton,
        Self::Tomato,
        Self::Onion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wheat => "Wheat",
            Self::Rice => "Rice",
            Self::Sugarcane => "Sugarcane",
            Self::Cotton => "Cotton",
            Self::Tomato => "Tomato",
            Self::Onion => "Onion",
        }
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandOwnership {
    Owned,
    Leased,
}

/// Seasonal fertilizer baseline, in bags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FertilizerUsage {
    pub urea_bags: u32,
    pub dap_bags: u32,
    pub potash_bags: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farmer {
    pub farmer_id: FarmerId,
    pub name: String,
    pub district: District,
    /// Hectares.
    pub farm_size: f64,
    pub land_ownership: LandOwnership,
    pub primary_crop: Crop,
    /// Whole rupees, clamped to [50_000, 800_000] at generation time.
    pub annual_income: u64,
    pub is_taxpayer: bool,
    #[serde(default)]
    pub fertilizer_usage: FertilizerUsage,
}

impl Farmer {
    /// Income at or above this makes a farmer an income-tax payer.
    pub const TAXPAYER_INCOME: u64 = 300_000;

    pub fn derive_is_taxpayer(annual_income: u64) -> bool {
        annual_income >= Self::TAXPAYER_INCOME
    }
}
