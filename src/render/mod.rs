//! Invoice document rendering: deterministic HTML, the PDF content
//! model, and (behind the `pdf` feature) PDF serialization.

mod format;
mod html;
mod layout;

#[cfg(feature = "pdf")]
mod pdf;

pub use format::*;
pub use html::*;
pub use layout::*;

#[cfg(feature = "pdf")]
pub use pdf::*;
