pub mod traits;

pub use traits::{DrawItem, NullSurface, Surface};
