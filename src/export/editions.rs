use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::info;

const BUILTIN_EDITIONS: &[(&str, &str)] = &[
    ("LEA", "Limited Edition Alpha"),
    ("M10", "Magic 2010"),
    ("M21", "Core Set 2021"),
    ("2XM", "Double Masters"),
    ("MH2", "Modern Horizons 2"),
    ("NEO", "Kamigawa: Neon Dynasty"),
    ("DMU", "Dominaria United"),
    ("BRO", "The Brothers' War"),
    ("ONE", "Phyrexia: All Will Be One"),
    ("MOM", "March of the Machine"),
    ("WOE", "Wilds of Eldraine"),
    ("LCI", "The Lost Caverns of Ixalan"),
    ("MKM", "Murders at Karlov Manor"),
    ("OTJ", "Outlaws of Thunder Junction"),
    ("MH3", "Modern Horizons 3"),
    ("BLB", "Bloomburrow"),
    ("DSK", "Duskmourn: House of Horror"),
];

/// Maps edition codes or raw labels to canonical edition names.
#[derive(Debug, Clone)]
pub struct EditionTable {
    by_key: BTreeMap<String, String>,
    trailing_code: Regex,
}

impl EditionTable {
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            by_key: BUILTIN_EDITIONS
                .iter()
                .map(|(code, name)| (code.to_uppercase(), (*name).to_string()))
                .collect(),
            trailing_code: Regex::new(r"[\(\[]\s*([A-Za-z0-9]{2,5})\s*[\)\]]\s*$")
                .context("failed to compile edition code regex")?,
        })
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut table = Self::builtin()?;
        let Some(path) = path else {
            return Ok(table);
        };

        let raw = fs::read(path)
            .with_context(|| format!("failed to read editions file {}", path.display()))?;
        let aliases: BTreeMap<String, String> = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse editions file {}", path.display()))?;

        info!(path = %path.display(), aliases = aliases.len(), "loaded edition aliases");
        table.extend(aliases);
        Ok(table)
    }

    pub fn extend<I>(&mut self, aliases: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, name) in aliases {
            self.by_key.insert(key.trim().to_uppercase(), name.trim().to_string());
        }
    }

    /// Whole-label lookup first, then a trailing `(CODE)`; unmapped labels pass through.
    pub fn normalize(&self, label: &str) -> String {
        let label = label.trim();

        if let Some(name) = self.by_key.get(&label.to_uppercase()) {
            return name.clone();
        }

        self.trailing_code
            .captures(label)
            .and_then(|captures| captures.get(1))
            .and_then(|code| self.by_key.get(&code.as_str().to_uppercase()))
            .cloned()
            .unwrap_or_else(|| label.to_string())
    }
}
