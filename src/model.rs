use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub position: usize,
    pub title: String,
    pub subtitle: String,
    pub link: String,
    pub descriptions: Vec<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedItem {
    pub name: String,
    pub english_name: String,
    pub edition: String,
    pub language: Language,
    pub condition: Condition,
    pub extras: BTreeSet<Extra>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub link: String,
}

impl NormalizedItem {
    /// `None` when the product leaves the representable decimal range.
    pub fn total(&self) -> Option<Decimal> {
        line_total(self.quantity, self.unit_price)
    }

    pub fn extras_label(&self) -> String {
        self.extras
            .iter()
            .map(|extra| extra.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn line_total(quantity: u32, unit_price: Decimal) -> Option<Decimal> {
    Decimal::from(quantity).checked_mul(unit_price)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Portuguese,
    English,
    Japanese,
    Phyrexian,
    German,
    Chinese,
    Spanish,
    French,
    Italian,
    Korean,
    Russian,
    Unknown,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Portuguese => "Portuguese",
            Language::English => "English",
            Language::Japanese => "Japanese",
            Language::Phyrexian => "Phyrexian",
            Language::German => "German",
            Language::Chinese => "Chinese",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::Italian => "Italian",
            Language::Korean => "Korean",
            Language::Russian => "Russian",
            Language::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Mint,
    NearMint,
    SlightlyPlayed,
    ModeratelyPlayed,
    HeavilyPlayed,
    Damaged,
    Used,
    Sealed,
    Opened,
    Unknown,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Mint => "Mint",
            Condition::NearMint => "Near Mint",
            Condition::SlightlyPlayed => "Slightly Played",
            Condition::ModeratelyPlayed => "Moderately Played",
            Condition::HeavilyPlayed => "Heavily Played",
            Condition::Damaged => "Damaged",
            Condition::Used => "Used",
            Condition::Sealed => "Sealed",
            Condition::Opened => "Opened",
            Condition::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Extra {
    Foil,
    Promo,
    PreRelease,
}

impl Extra {
    pub fn as_str(self) -> &'static str {
        match self {
            Extra::Foil => "Foil",
            Extra::Promo => "Promo",
            Extra::PreRelease => "Pre-release",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedRowEntry {
    pub position: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportCounts {
    pub containers_found: usize,
    pub items_exported: usize,
    pub rows_skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportRunManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub status: String,
    pub input_path: String,
    pub input_sha256: String,
    pub output_path: String,
    pub counts: ExportCounts,
    pub grand_total: Option<Decimal>,
    pub skipped_rows: Vec<SkippedRowEntry>,
    pub warnings: Vec<String>,
}
