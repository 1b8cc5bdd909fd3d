mod chapter;
mod chunks;
mod corpus;
mod error;
mod family;
mod linker;
mod normalize;
mod paragraphs;
mod references;
mod run;
mod survey;
#[cfg(test)]
mod tests;
mod vocabulary;

pub use run::run;
