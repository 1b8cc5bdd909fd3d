use thiserror::Error;

/// Structural problems that make a single document unprocessable until the
/// source is corrected by hand.
#[derive(Debug, Error)]
pub enum RefactorError {
    #[error("front matter does not match the survey template: expected [{expected}], found [{found}]; leading elements: {context}")]
    FrontMatterMismatch {
        expected: String,
        found: String,
        context: String,
    },

    #[error("ambiguous line in references section (fewer than 3 words): {text:?}")]
    AmbiguousReferenceLine { text: String },

    #[error("document has no <{0}> element")]
    MissingContainer(&'static str),

    #[error("file name does not match the survey naming pattern: {0}")]
    UnrecognizedFileName(String),

    #[error("numbered survey {0} does not name a known language")]
    UnknownLanguage(String),
}
