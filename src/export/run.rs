use std::fs;
use std::io;
use std::path::Path;

use anyhow::Result;
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::classify::Classifier;
use super::editions::EditionTable;
use super::extract::{CartDocument, Extraction, MalformedRow};
use super::sheet::write_sheet;
use crate::cli::ExportArgs;
use crate::error::ExportError;
use crate::model::{ExportCounts, ExportRunManifest, NormalizedItem, SkippedRowEntry};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

#[derive(Debug, Default)]
pub struct ExportOutcome {
    pub containers_found: usize,
    pub cart_empty: bool,
    pub items: Vec<NormalizedItem>,
    pub skipped: Vec<MalformedRow>,
}

impl ExportOutcome {
    /// `None` when a line total or the running sum leaves the decimal range.
    pub fn grand_total(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total()?))
    }

    pub fn status(&self) -> &'static str {
        if self.cart_empty {
            "empty_cart"
        } else if self.items.is_empty() {
            "no_items_extracted"
        } else {
            "completed"
        }
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.cart_empty {
            warnings.push("cart was empty; wrote a header-only spreadsheet".to_string());
        } else if self.items.is_empty() {
            warnings.push(format!(
                "extraction failed for every row: all {} cart rows were malformed; wrote a header-only spreadsheet",
                self.skipped.len()
            ));
        } else if !self.skipped.is_empty() {
            warnings.push(format!(
                "skipped {} of {} cart rows as malformed",
                self.skipped.len(),
                self.containers_found
            ));
        }

        if self.grand_total().is_none() {
            warnings.push("grand total exceeds the decimal range; report leaves it empty".to_string());
        }

        warnings
    }
}

pub fn run(args: ExportArgs) -> Result<()> {
    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        "starting export"
    );

    let markup = read_input(&args.input)?;
    let editions = EditionTable::load(args.editions.as_deref())?;
    let classifier = Classifier::new(editions)?;

    let outcome = extract_and_classify(&markup, &classifier)?;

    write_sheet(&args.output, &outcome.items)?;
    info!(path = %args.output.display(), rows = outcome.items.len(), "wrote spreadsheet");

    let warnings = outcome.warnings();
    for warning in &warnings {
        warn!("{warning}");
    }
    log_summary(&outcome);

    if let Some(report_path) = &args.report_path {
        let manifest = build_manifest(&args, &outcome, warnings)?;
        write_json_pretty(report_path, &manifest)?;
        info!(path = %report_path.display(), "wrote run report");
    }

    if outcome.items.is_empty() && !outcome.skipped.is_empty() {
        return Err(ExportError::NoItemsExtracted {
            skipped: outcome.skipped.len(),
        }
        .into());
    }

    Ok(())
}

pub fn read_input(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(markup) => Ok(markup),
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            Err(ExportError::InputNotFound {
                path: path.to_path_buf(),
            }
            .into())
        }
        Err(source) => Err(ExportError::InputUnreadable {
            path: path.to_path_buf(),
            source,
        }
        .into()),
    }
}

pub fn extract_and_classify(markup: &str, classifier: &Classifier) -> Result<ExportOutcome> {
    let document = CartDocument::parse(markup)?;
    let mut outcome = ExportOutcome {
        containers_found: document.container_count(),
        ..ExportOutcome::default()
    };

    match document.rows()? {
        Extraction::EmptyCart => outcome.cart_empty = true,
        Extraction::Rows(rows) => {
            for row in rows {
                match row {
                    Ok(raw) => outcome.items.push(classifier.classify(&raw)),
                    Err(malformed) => {
                        warn!(
                            position = malformed.position,
                            reason = %malformed.defect,
                            "skipping malformed cart row"
                        );
                        outcome.skipped.push(malformed);
                    }
                }
            }
        }
    }

    Ok(outcome)
}

fn log_summary(outcome: &ExportOutcome) {
    info!(
        exported = outcome.items.len(),
        skipped = outcome.skipped.len(),
        grand_total = %outcome
            .grand_total()
            .map_or_else(|| "out of range".to_string(), |total| total.to_string()),
        status = outcome.status(),
        "export summary"
    );

    for malformed in &outcome.skipped {
        info!(
            position = malformed.position,
            reason = %malformed.defect,
            "skipped row"
        );
    }
}

fn build_manifest(
    args: &ExportArgs,
    outcome: &ExportOutcome,
    warnings: Vec<String>,
) -> Result<ExportRunManifest> {
    Ok(ExportRunManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        status: outcome.status().to_string(),
        input_path: args.input.display().to_string(),
        input_sha256: sha256_file(&args.input)?,
        output_path: args.output.display().to_string(),
        counts: ExportCounts {
            containers_found: outcome.containers_found,
            items_exported: outcome.items.len(),
            rows_skipped: outcome.skipped.len(),
        },
        grand_total: outcome.grand_total(),
        skipped_rows: outcome
            .skipped
            .iter()
            .map(|malformed| SkippedRowEntry {
                position: malformed.position,
                reason: malformed.defect.to_string(),
            })
            .collect(),
        warnings,
    })
}
