mod classify;
mod editions;
mod extract;
mod run;
mod sheet;

pub use run::run;
