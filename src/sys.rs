pub mod geometry;
pub mod headless;
pub mod screen;
pub mod window;
