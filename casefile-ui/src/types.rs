use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self { r: 255, g: 255, b: 255, a: 255 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.w &&
            y >= self.y && y < self.y + self.h
    }

    /// Cuts `height` off the top, returning `(top, rest)`.
    pub fn split_top(&self, height: f32) -> (Rect, Rect) {
        let h = height.min(self.h);
        let top = Rect::new(self.x, self.y, self.w, h);
        let rest = Rect::new(self.x, self.y + h, self.w, self.h - h);
        (top, rest)
    }

    pub fn shrink(&self, amount: f32) -> Rect {
        // collapse to an empty rect rather than go negative
        if self.w <= amount * 2.0 || self.h <= amount * 2.0 {
            return Rect::new(self.x, self.y, 0.0, 0.0);
        }
        Rect::new(
            self.x + amount,
            self.y + amount,
            self.w - amount * 2.0,
            self.h - amount * 2.0,
        )
    }

    pub fn center(&self, target_w: f32, target_h: f32) -> Rect {
        let new_x = self.x + (self.w - target_w) / 2.0;
        let new_y = self.y + (self.h - target_h) / 2.0;
        Rect::new(new_x, new_y, target_w, target_h)
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    pub fn anchor_point(&self, anchor: Vec2) -> Vec2 {
        Vec2::new(self.x + self.w * anchor.x, self.y + self.h * anchor.y)
    }
}
