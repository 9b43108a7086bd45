//! Renders markdown to styled text for ANSI terminals.
//!
//! The layout engine (width measurement, reflow, list and table layout)
//! only ever sees strings with embedded escape sequences. Colours come from a
//! [`Stylist`](style::Stylist), code highlighting from a
//! [`Highlighter`](highlight::Highlighter).

pub mod config;
pub mod error;
pub mod highlight;
pub mod layout;
pub mod link;
pub mod list;
pub mod reflow;
pub mod renderer;
pub mod style;
pub mod table;
pub mod text;
pub mod walk;
pub mod width;

pub use config::Options;
pub use error::{HighlightError, RenderError};
pub use renderer::NodeRenderer;
pub use walk::render_markdown;
