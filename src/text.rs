/// Measurement results and the measuring capability.
pub mod measure;
/// Style options and their resolved snapshot.
pub mod style;
/// Greedy word wrapping and bounds accumulation.
pub mod wrap;

pub use measure::{BoundingExtents, LineMetrics, TextMeasurer, TextMetrics};
pub use style::{
    BaseAlign, Color, FontSpec, FontStyle, Offset, TextAlign, TextOptions, TextStyle,
};
pub use wrap::{TextBounds, WrappedText, wrap};
