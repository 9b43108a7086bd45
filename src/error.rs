use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// `table()` was called before any row was collected.
    #[error("table has no rows to render")]
    EmptyTable,
    /// The event stream closed a node that was never opened.
    #[error("unbalanced markdown events: end of {0} without a start")]
    UnbalancedEvent(&'static str),
}

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("no syntax definition for language {0:?}")]
    UnknownLanguage(String),
    #[error("no highlighting theme named {0:?}")]
    UnknownTheme(String),
    #[error("highlighting failed: {0}")]
    Highlight(String),
}
