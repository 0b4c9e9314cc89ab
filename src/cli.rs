use std::path::PathBuf;

use clap::{Args, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "cartsheet",
    version,
    about = "Convert a saved card-marketplace cart page into an XLSX spreadsheet"
)]
pub struct Cli {
    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Saved HTML snapshot of the cart page.
    #[arg(long, default_value = "carrinho_in.html")]
    pub input: PathBuf,

    /// Spreadsheet to write; replaced if it already exists.
    #[arg(long, default_value = "carrinho_out.xlsx")]
    pub output: PathBuf,

    /// JSON object mapping edition codes or labels to canonical names.
    #[arg(long)]
    pub editions: Option<PathBuf>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}
