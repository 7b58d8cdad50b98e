use anyhow::{anyhow, Result};
use derivative::Derivative;
use image::RgbaImage;
use imageproc::drawing;
use imageproc::rect::Rect;
use piston_window::graphics;
use piston_window::{G2d, G2dTexture, G2dTextureContext, PistonWindow, Texture, TextureSettings};

use crate::board::Board;
use crate::constants::*;
use crate::game::Game;
use crate::piece::Piece;

/// Window size in pixels: the board plus a preview column on the right.
pub fn window_size(block_size: u32) -> (u32, u32) {
    (
        (COLS + PREVIEW_SIZE + 2) as u32 * block_size,
        ROWS as u32 * block_size,
    )
}

/// Draws the settled board into `buffer`, one square per cell with a
/// one-pixel gap.
pub fn paint_board(buffer: &mut RgbaImage, board: &Board, block_size: u32) {
    for pixel in buffer.pixels_mut() {
        *pixel = BOARD_BG_COLOR;
    }
    let side = block_size.saturating_sub(1).max(1);
    for ((col, row), color) in board.occupied_cells() {
        drawing::draw_filled_rect_mut(
            buffer,
            Rect::at((col as u32 * block_size) as i32, (row as u32 * block_size) as i32)
                .of_size(side, side),
            color.pixel_color(),
        );
    }
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct Canvas {
    #[derivative(Debug = "ignore")]
    texture_context: G2dTextureContext,
    #[derivative(Debug = "ignore")]
    texture: Option<G2dTexture>,
    block_size: u32,
    buffer: RgbaImage,
}

impl Canvas {
    pub fn new(window: &mut PistonWindow, block_size: u32) -> Self {
        Self {
            texture_context: window.create_texture_context(),
            texture: None,
            block_size,
            buffer: RgbaImage::new(COLS as u32 * block_size, ROWS as u32 * block_size),
        }
    }

    /// Marks the board texture as outdated; it is rebuilt on the next frame.
    pub fn invalidate(&mut self) {
        self.texture = None;
    }

    fn board_texture(&mut self, board: &Board) -> Result<&G2dTexture> {
        if self.texture.is_none() {
            paint_board(&mut self.buffer, board, self.block_size);
            let texture = Texture::from_image(
                &mut self.texture_context,
                &self.buffer,
                &TextureSettings::new(),
            )
            .map_err(|e| anyhow!("failed to upload board texture: {e:?}"))?;
            self.texture = Some(texture);
        }
        self.texture
            .as_ref()
            .ok_or_else(|| anyhow!("board texture missing"))
    }

    fn draw_block(&self, x: f64, y: f64, color: [f32; 4], context: graphics::Context, g: &mut G2d) {
        let side = self.block_size as f64 - 1.0;
        graphics::rectangle_from_to(color, [x, y], [x + side, y + side], context.transform, g);
    }

    fn draw_piece(&self, piece: &Piece, context: graphics::Context, g: &mut G2d) {
        let size = self.block_size as f64;
        for (col, row) in piece.coords(0, 0).filter(|&(_, row)| row >= 0) {
            self.draw_block(
                col as f64 * size,
                row as f64 * size,
                piece.color.float_color(),
                context,
                g,
            );
        }
    }

    fn draw_preview(&self, next: Option<&Piece>, context: graphics::Context, g: &mut G2d) {
        let size = self.block_size as f64;
        let origin = [(COLS + 1) as f64 * size, size];
        let extent = PREVIEW_SIZE as f64 * size;
        graphics::rectangle_from_to(
            PREVIEW_BG_COLOR,
            origin,
            [origin[0] + extent, origin[1] + extent],
            context.transform,
            g,
        );
        let Some(next) = next else {
            return;
        };
        for ((row, col), _) in next.shape.indexed_iter().filter(|(_, v)| **v) {
            self.draw_block(
                origin[0] + (col + 1) as f64 * size,
                origin[1] + (row + 1) as f64 * size,
                next.color.float_color(),
                context,
                g,
            );
        }
    }

    pub fn render(&mut self, game: &Game, context: graphics::Context, g: &mut G2d) -> Result<()> {
        graphics::clear(UI_BACKGROUND_COLOR, g);
        let texture = self.board_texture(game.board())?;
        graphics::image(texture, context.transform, g);

        if let Some(piece) = game.current() {
            self.draw_piece(piece, context, g);
        }
        self.draw_preview(game.next(), context, g);
        Ok(())
    }
}
