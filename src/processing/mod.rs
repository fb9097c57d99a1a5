pub mod blur;
pub mod color;
pub mod pipeline;
pub mod scale;
