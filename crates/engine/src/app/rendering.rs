/// One background tile, already resolved to screen space by the simulation's
/// camera. `tile_id` indexes the tileset owned by the asset provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileInstance {
    pub screen_x: i16,
    pub screen_y: i16,
    pub tile_id: u8,
}

/// One sprite to draw, in level pixel coordinates. The renderer subtracts
/// the camera origin itself so flash/flip handling stays in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteInstance {
    pub x: i16,
    pub y: i16,
    pub number: i16,
    pub flipped: bool,
    pub flash: bool,
}

/// Drawing contract. The backend (framebuffer, terminal, test recorder) is
/// not part of this workspace; the simulation only produces draw lists.
pub trait Renderer {
    fn draw_tiles(&mut self, tiles: &[TileInstance]);
    fn draw_sprites(&mut self, sprites: &[SpriteInstance]);
    fn present(&mut self);
}

#[derive(Debug, Default)]
pub struct NullRenderer {
    frames_presented: u64,
}

impl NullRenderer {
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl Renderer for NullRenderer {
    fn draw_tiles(&mut self, _tiles: &[TileInstance]) {}

    fn draw_sprites(&mut self, _sprites: &[SpriteInstance]) {}

    fn present(&mut self) {
        self.frames_presented = self.frames_presented.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_renderer_counts_presented_frames() {
        let mut renderer = NullRenderer::default();
        renderer.draw_tiles(&[]);
        renderer.draw_sprites(&[]);
        renderer.present();
        renderer.present();
        assert_eq!(renderer.frames_presented(), 2);
    }
}
