//! A software render backend for retained-mode UI layout engines,
//! drawing through `tiny-skia`.
//!
//! A [`Context`] owns the target surface and every texture and geometry
//! the layout engine creates through the [`RenderInterface`] calls.
//! Textures are loaded from uncompressed TGA files (see [`tga`]) or
//! generated from premultiplied RGBA8 pixels.

mod color;
mod context;
pub mod file;
mod geometry;
mod interface;
pub mod ppm;
mod rect;
mod renderer;
mod texture;
pub mod tga;

pub use color::{Color, PremultipliedColor};
pub use context::{Context, ContextBuilder, InvalidSurfaceSize, Settings};
pub use file::{FileError, FileHandle, FileInterface, LocalFiles, MemoryFiles};
pub use geometry::{CompiledGeometry, GeometryId, InvalidIndex, MissingGeometry, Vertex};
pub use interface::RenderInterface;
pub use rect::Rect;
pub use renderer::TextureFilter;
pub use texture::{EmptyTexture, LoadTextureError, MissingTexture, Texture, TextureId};
pub use tga::{DecodeError, DecodedTexture, ImageHeader};

pub use glam;
pub use tiny_skia;
