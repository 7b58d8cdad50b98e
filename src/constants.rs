use std::time::Duration;

use enum_map::{enum_map, Enum, EnumMap};
use image::Rgba;
use lazy_static::lazy_static;
use nanorand::{RandomGen, Rng};
use ndarray::{Array2, ArrayView2};

pub const COLS: usize = 10;
pub const ROWS: usize = 20;
pub const DEFAULT_BLOCK_SIZE: u32 = 30;
/// Width and height of the next-piece preview, in blocks.
pub const PREVIEW_SIZE: usize = 4;
pub const BASE_TICK_INTERVAL: Duration = Duration::from_millis(1000);
pub const LINE_SCORE: u32 = 100;
pub const LEVEL_SCORE_STEP: u32 = 1000;

pub const BOARD_BG_COLOR: Rgba<u8> = Rgba([17, 17, 17, 255]);
pub const UI_BACKGROUND_COLOR: [f32; 4] = [89.0 / 255.0, 92.0 / 255.0, 102.0 / 255.0, 1.0];
pub const PREVIEW_BG_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

pub const TITLE: &str = "blockfall";

#[rustfmt::skip]
lazy_static! {
    static ref SHAPES: EnumMap<Shape, Array2<bool>> = enum_map! {
        Shape::I => Array2::from_shape_vec([1, 4], vec![
            true , true , true , true ,
        ]).unwrap(),
        Shape::J => Array2::from_shape_vec([2, 3], vec![
            true , false, false,
            true , true , true ,
        ]).unwrap(),
        Shape::L => Array2::from_shape_vec([2, 3], vec![
            false, false, true ,
            true , true , true ,
        ]).unwrap(),
        Shape::O => Array2::from_shape_vec([2, 2], vec![
            true , true ,
            true , true ,
        ]).unwrap(),
        Shape::S => Array2::from_shape_vec([2, 3], vec![
            false, true , true ,
            true , true , false,
        ]).unwrap(),
        Shape::T => Array2::from_shape_vec([2, 3], vec![
            false, true , false,
            true , true , true ,
        ]).unwrap(),
        Shape::Z => Array2::from_shape_vec([2, 3], vec![
            true , true , false,
            false, true , true ,
        ]).unwrap(),
    };
}

/// The seven piece kinds. Matrices are indexed `[row, col]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum Shape {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl Shape {
    pub fn shape(&self) -> ArrayView2<'static, bool> {
        SHAPES[*self].view()
    }

    #[cfg(test)]
    pub fn all() -> impl Iterator<Item = Shape> {
        (0..Shape::LENGTH).map(Shape::from_usize)
    }
}

impl<Generator: Rng<OUTPUT>, const OUTPUT: usize> RandomGen<Generator, OUTPUT> for Shape {
    fn random(rng: &mut Generator) -> Self {
        Shape::from_usize(rng.generate_range(0..Shape::LENGTH))
    }
}

/// Display colors. Any color may be paired with any shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum Color {
    Rose,
    Cyan,
    Green,
    Violet,
    Orange,
    Yellow,
    Blue,
}

impl Color {
    const COLORS: EnumMap<Color, [u8; 4]> = EnumMap::from_array([
        [0xFF, 0x0D, 0x72, 255],
        [0x0D, 0xC2, 0xFF, 255],
        [0x0D, 0xFF, 0x72, 255],
        [0xF5, 0x38, 0xFF, 255],
        [0xFF, 0x8E, 0x0D, 255],
        [0xFF, 0xE1, 0x38, 255],
        [0x38, 0x77, 0xFF, 255],
    ]);

    pub fn pixel_color(&self) -> Rgba<u8> {
        Rgba(Self::COLORS[*self])
    }

    pub fn float_color(&self) -> [f32; 4] {
        Self::COLORS[*self].map(|x| x as f32 / 255.0)
    }
}

impl<Generator: Rng<OUTPUT>, const OUTPUT: usize> RandomGen<Generator, OUTPUT> for Color {
    fn random(rng: &mut Generator) -> Self {
        Color::from_usize(rng.generate_range(0..Color::LENGTH))
    }
}
