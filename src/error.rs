use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("The file is missing required columns: {} (required: {})", .missing.join(", "), .required.join(", "))]
    MissingColumns {
        missing: Vec<String>,
        required: Vec<String>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("{0}")]
    Input(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
