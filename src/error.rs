use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    /// A required settings field is missing, mistyped, or out of range.
    /// The message lists every offending field, not just the first one.
    #[error("invalid tracker settings:\n{0}")]
    InvalidSettings(String),

    #[error("there are no track segments")]
    NoSegments,

    #[error("not enough memory for a {rows} x {cols} cost matrix")]
    NotEnoughMemory { rows: usize, cols: usize },

    /// An elementary cost function failed for one candidate pair.
    ///
    /// The field is `source_name` rather than `source` because thiserror
    /// treats a field named `source` as the error's `source()`, which a
    /// plain `String` cannot be.
    #[error("cost evaluation failed for {source_name} -> {target}: {message}")]
    CostEvaluation {
        source_name: String,
        target: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, TrackerError>;
