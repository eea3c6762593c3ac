use glam::{uvec2, UVec2, Vec2};
use serde::{Deserialize, Serialize};
use tiny_skia::{Pixmap, PixmapRef};

use crate::{
    file::{self, FileInterface, LocalFiles},
    geometry::{CompiledGeometry, Geometries, GeometryId, InvalidIndex, Vertex},
    renderer::{Renderer, TextureFilter},
    texture::{EmptyTexture, LoadTextureError, Texture, TextureId, Textures},
    tga, Color, Rect, RenderInterface,
};

#[derive(Debug, thiserror::Error)]
#[error("cannot create a {0}x{1} surface")]
pub struct InvalidSurfaceSize(pub u32, pub u32);

/// Configuration for a [`Context`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    /// The color the surface is cleared to at the start of each frame.
    pub background: Color,
    pub texture_filter: TextureFilter,
    /// Whether triangle edges are anti-aliased. Off by default, since
    /// adjacent quads otherwise show seams.
    pub anti_alias: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: Color::BLACK,
            texture_filter: TextureFilter::default(),
            anti_alias: false,
        }
    }
}

/// Builder for a [`Context`].
pub struct ContextBuilder {
    settings: Settings,
    files: Option<Box<dyn FileInterface>>,
}

impl ContextBuilder {
    /// Sets the surface size in pixels.
    ///
    /// The default is 800x600.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.settings.width = width;
        self.settings.height = height;
        self
    }

    /// Sets the color used by [`Context::begin_frame`].
    ///
    /// The default is opaque black.
    pub fn background(mut self, color: Color) -> Self {
        self.settings.background = color;
        self
    }

    pub fn texture_filter(mut self, filter: TextureFilter) -> Self {
        self.settings.texture_filter = filter;
        self
    }

    pub fn anti_alias(mut self, anti_alias: bool) -> Self {
        self.settings.anti_alias = anti_alias;
        self
    }

    /// Replaces all settings at once, e.g. with values loaded from a config file.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets where texture sources are read from.
    ///
    /// The default reads paths relative to the working directory.
    pub fn file_interface(mut self, files: impl FileInterface + 'static) -> Self {
        self.files = Some(Box::new(files));
        self
    }

    /// Builds the context and allocates its surface.
    pub fn build(self) -> Result<Context, InvalidSurfaceSize> {
        let Settings { width, height, .. } = self.settings;
        let mut surface = Pixmap::new(width, height).ok_or(InvalidSurfaceSize(width, height))?;
        surface.fill(self.settings.background.to_skia());

        log::debug!("Created {}x{} surface", width, height);

        Ok(Context {
            renderer: Renderer::new(self.settings.texture_filter, self.settings.anti_alias),
            surface,
            textures: Textures::default(),
            geometries: Geometries::default(),
            files: self.files.unwrap_or_else(|| Box::new(LocalFiles::new("."))),
            settings: self.settings,
        })
    }
}

/// Owns the render surface along with every texture and geometry
/// handed out to the layout engine.
///
/// Dropping the context releases everything it owns.
pub struct Context {
    settings: Settings,
    renderer: Renderer,
    surface: Pixmap,
    textures: Textures,
    geometries: Geometries,
    files: Box<dyn FileInterface>,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder {
            settings: Settings::default(),
            files: None,
        }
    }

    /// Clears the surface to the background color.
    pub fn begin_frame(&mut self) {
        self.surface.fill(self.settings.background.to_skia());
    }

    pub fn end_frame(&mut self) {}

    /// The rendered pixels, premultiplied RGBA8.
    pub fn surface(&self) -> PixmapRef<'_> {
        self.surface.as_ref()
    }

    pub fn size(&self) -> UVec2 {
        uvec2(self.surface.width(), self.surface.height())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn texture_dimensions(&self, texture: TextureId) -> Option<UVec2> {
        self.textures.get(texture).ok().map(Texture::size)
    }

    pub fn num_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn num_geometries(&self) -> usize {
        self.geometries.len()
    }
}

impl RenderInterface for Context {
    fn compile_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[i32],
    ) -> Result<GeometryId, InvalidIndex> {
        let geometry = CompiledGeometry::new(vertices, indices)?;
        Ok(self.geometries.add(geometry))
    }

    fn render_geometry(
        &mut self,
        geometry: GeometryId,
        translation: Vec2,
        texture: Option<TextureId>,
    ) {
        let geometry = match self.geometries.get(geometry) {
            Ok(geometry) => geometry,
            Err(e) => {
                log::warn!("Skipping draw: {}", e);
                return;
            }
        };
        let texture = match texture.map(|id| self.textures.get(id)).transpose() {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("Drawing untextured: {}", e);
                None
            }
        };
        self.renderer
            .draw_geometry(&mut self.surface, geometry, translation, texture);
    }

    fn release_geometry(&mut self, geometry: GeometryId) {
        if let Err(e) = self.geometries.remove(geometry) {
            log::warn!("Failed to release geometry: {}", e);
        }
    }

    fn load_texture(&mut self, source: &str) -> Result<(TextureId, UVec2), LoadTextureError> {
        let result = file::read_file(self.files.as_mut(), source)
            .map_err(LoadTextureError::from)
            .and_then(|bytes| Ok(tga::decode(&bytes)?))
            .and_then(|decoded| Ok(Texture::from_decoded(decoded)?));

        match result {
            Ok(texture) => {
                let size = texture.size();
                log::debug!("Loaded texture '{}' ({}x{})", source, size.x, size.y);
                Ok((self.textures.add(texture), size))
            }
            Err(e) => {
                log::error!("Failed to load texture '{}': {}", source, e);
                Err(e)
            }
        }
    }

    fn generate_texture(
        &mut self,
        data: &[u8],
        dimensions: UVec2,
    ) -> Result<TextureId, EmptyTexture> {
        let texture = Texture::from_rgba(data.to_vec(), dimensions)?;
        Ok(self.textures.add(texture))
    }

    fn release_texture(&mut self, texture: TextureId) {
        if let Err(e) = self.textures.remove(texture) {
            log::warn!("Failed to release texture: {}", e);
        }
    }

    fn enable_scissor_region(&mut self, enable: bool) {
        self.renderer.enable_scissor(enable, &self.surface);
    }

    fn set_scissor_region(&mut self, region: Rect) {
        self.renderer.set_scissor(region, &self.surface);
    }
}
