use glam::{UVec2, Vec2};

use crate::{
    geometry::{GeometryId, InvalidIndex, Vertex},
    texture::{EmptyTexture, LoadTextureError, TextureId},
    Rect,
};

/// The render calls a retained-mode layout engine issues each frame.
///
/// Handles returned from this trait stay valid until released
/// through the matching `release_*` call.
pub trait RenderInterface {
    /// Copies a triangle list so it can be drawn repeatedly.
    fn compile_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[i32],
    ) -> Result<GeometryId, InvalidIndex>;

    /// Draws compiled geometry offset by `translation`, optionally textured.
    fn render_geometry(
        &mut self,
        geometry: GeometryId,
        translation: Vec2,
        texture: Option<TextureId>,
    );

    fn release_geometry(&mut self, geometry: GeometryId);

    /// Loads a TGA texture by resource name, returning its handle and dimensions.
    fn load_texture(&mut self, source: &str) -> Result<(TextureId, UVec2), LoadTextureError>;

    /// Registers premultiplied, top-down RGBA8 pixels as a texture.
    ///
    /// # Panics
    /// Panics if `data.len() != dimensions.x * dimensions.y * 4`.
    fn generate_texture(
        &mut self,
        data: &[u8],
        dimensions: UVec2,
    ) -> Result<TextureId, EmptyTexture>;

    fn release_texture(&mut self, texture: TextureId);

    fn enable_scissor_region(&mut self, enable: bool);

    fn set_scissor_region(&mut self, region: Rect);
}
