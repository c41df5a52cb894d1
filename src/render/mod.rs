pub mod renderer;

pub use renderer::{Renderer, StatusLine};
