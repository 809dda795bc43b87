use serde::{Deserialize, Serialize};

/// Integer pixel rectangle in host coordinates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> i32 { self.x }

    pub fn right(&self) -> i32 { self.x + self.width }

    pub fn top(&self) -> i32 { self.y }

    pub fn bottom(&self) -> i32 { self.y + self.height }

    pub fn size(&self) -> Size { Size::new(self.width, self.height) }

    pub fn with_size(self, size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            ..self
        }
    }
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self { Self { width, height } }
}
