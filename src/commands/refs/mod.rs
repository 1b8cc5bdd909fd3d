mod dedup;
mod resolve;
mod run;
mod similarity;

pub use run::run;
