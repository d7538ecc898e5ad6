pub mod gemini;
pub mod image;
pub mod prompt;
pub mod style;

pub use gemini::*;
pub use image::*;
pub use prompt::*;
pub use style::*;
