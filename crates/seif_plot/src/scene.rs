use crate::geometry::Ellipse;
use nalgebra as na;
use palette::Srgb;

pub type Color = Srgb<u8>;

/// A drawing command in map canvas coordinates (+y up before the
/// optional flip).
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line {
        from: na::Point2<i32>,
        to: na::Point2<i32>,
        color: Color,
    },
    FilledTriangle {
        vertices: [na::Point2<i32>; 3],
        color: Color,
    },
    Dot {
        center: na::Point2<i32>,
        color: Color,
    },
    Ellipse {
        ellipse: Ellipse,
        color: Color,
    },
}

/// Everything needed to rasterize one frame of the map canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Map canvas size in [height, width] order.
    pub image_hw: [usize; 2],
    /// Primitives in paint order on a black canvas.
    pub primitives: Vec<Primitive>,
    pub flip_vertical: bool,
    /// Text drawn in display coordinates after the flip.
    pub overlay: Option<String>,
}

impl Scene {
    pub fn lines(&self) -> impl Iterator<Item = (na::Point2<i32>, na::Point2<i32>)> + '_ {
        self.primitives.iter().filter_map(|prim| match *prim {
            Primitive::Line { from, to, .. } => Some((from, to)),
            _ => None,
        })
    }

    pub fn triangles(&self) -> impl Iterator<Item = ([na::Point2<i32>; 3], Color)> + '_ {
        self.primitives.iter().filter_map(|prim| match *prim {
            Primitive::FilledTriangle { vertices, color } => Some((vertices, color)),
            _ => None,
        })
    }

    pub fn ellipses(&self) -> impl Iterator<Item = &Ellipse> + '_ {
        self.primitives.iter().filter_map(|prim| match prim {
            Primitive::Ellipse { ellipse, .. } => Some(ellipse),
            _ => None,
        })
    }

    pub fn dots(&self) -> impl Iterator<Item = na::Point2<i32>> + '_ {
        self.primitives.iter().filter_map(|prim| match *prim {
            Primitive::Dot { center, .. } => Some(center),
            _ => None,
        })
    }
}

pub mod colors {
    use super::Color;

    pub fn odometry() -> Color {
        Color::new(255, 128, 128)
    }

    pub fn estimate() -> Color {
        Color::new(0, 255, 0)
    }

    pub fn ground_truth() -> Color {
        Color::new(255, 255, 255)
    }

    pub fn landmark() -> Color {
        Color::new(255, 0, 0)
    }

    pub fn sight_line() -> Color {
        Color::new(96, 96, 96)
    }

    pub fn uncertainty() -> Color {
        Color::new(255, 255, 0)
    }

    pub fn overlay_text() -> Color {
        Color::new(255, 255, 255)
    }
}
