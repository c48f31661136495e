pub mod common;
pub mod image;
pub mod request;
pub mod result;
pub mod theme;
pub mod video;

pub use common::*;
pub use image::*;
pub use request::*;
pub use result::*;
pub use theme::*;
pub use video::*;
