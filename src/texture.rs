use glam::{uvec2, UVec2};
use slotmap::SlotMap;
use tiny_skia::{Pixmap, PixmapRef};

use crate::{
    file::FileError,
    tga::{DecodeError, DecodedTexture},
};

slotmap::new_key_type! {
    /// ID of a texture.
    pub struct TextureId;
}

#[derive(Debug, thiserror::Error)]
#[error("missing texture {0:?}")]
pub struct MissingTexture(pub TextureId);

#[derive(Debug, thiserror::Error)]
#[error("texture has zero area")]
pub struct EmptyTexture;

/// An error returned when loading a texture from a file.
#[derive(Debug, thiserror::Error)]
pub enum LoadTextureError {
    #[error(transparent)]
    File(#[from] FileError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Empty(#[from] EmptyTexture),
}

/// An immutable RGBA8 image with premultiplied alpha,
/// rows ordered top to bottom.
#[derive(Debug, Clone)]
pub struct Texture {
    pixmap: Pixmap,
}

impl Texture {
    /// Wraps pixel data that is already premultiplied RGBA8 in top-down order.
    ///
    /// # Panics
    /// Panics if `data.len() != size.x * size.y * 4`.
    pub fn from_rgba(data: Vec<u8>, size: UVec2) -> Result<Self, EmptyTexture> {
        assert_eq!(
            data.len(),
            size.x as usize * size.y as usize * 4,
            "texture data length does not match its dimensions"
        );
        let mut pixmap = Pixmap::new(size.x, size.y).ok_or(EmptyTexture)?;
        pixmap.data_mut().copy_from_slice(&data);
        Ok(Self { pixmap })
    }

    pub fn from_decoded(decoded: DecodedTexture) -> Result<Self, EmptyTexture> {
        let size = uvec2(decoded.width(), decoded.height());
        Self::from_rgba(decoded.into_data(), size)
    }

    pub fn size(&self) -> UVec2 {
        uvec2(self.pixmap.width(), self.pixmap.height())
    }

    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub(crate) fn pixmap(&self) -> PixmapRef<'_> {
        self.pixmap.as_ref()
    }
}

/// Owns every texture registered with a context.
#[derive(Debug, Default)]
pub(crate) struct Textures {
    textures: SlotMap<TextureId, Texture>,
}

impl Textures {
    pub fn add(&mut self, texture: Texture) -> TextureId {
        self.textures.insert(texture)
    }

    pub fn get(&self, id: TextureId) -> Result<&Texture, MissingTexture> {
        self.textures.get(id).ok_or(MissingTexture(id))
    }

    pub fn remove(&mut self, id: TextureId) -> Result<Texture, MissingTexture> {
        self.textures.remove(id).ok_or(MissingTexture(id))
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tga;

    #[test]
    fn pack_keeps_bytes() {
        let data: Vec<u8> = (0..2 * 3 * 4).map(|i| i as u8).collect();
        let texture = Texture::from_rgba(data.clone(), uvec2(2, 3)).unwrap();
        assert_eq!(texture.size(), uvec2(2, 3));
        assert_eq!(texture.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "texture data length does not match its dimensions")]
    fn pack_rejects_wrong_length() {
        let _ = Texture::from_rgba(vec![0; 15], uvec2(2, 2));
    }

    #[test]
    fn zero_area_is_empty() {
        assert!(Texture::from_rgba(Vec::new(), uvec2(0, 4)).is_err());
    }

    #[test]
    fn from_decoded_tga() {
        let bytes = tga::tests::encode(1, 1, 24, false, &[10, 20, 30]);
        let texture = Texture::from_decoded(tga::decode(&bytes).unwrap()).unwrap();
        assert_eq!(texture.size(), uvec2(1, 1));
        assert_eq!(texture.data(), &[30, 20, 10, 255]);
    }

    #[test]
    fn released_ids_go_missing() {
        let mut textures = Textures::default();
        let id = textures.add(Texture::from_rgba(vec![0; 4], uvec2(1, 1)).unwrap());
        assert_eq!(textures.len(), 1);
        assert!(textures.get(id).is_ok());
        assert!(textures.remove(id).is_ok());
        assert!(textures.get(id).is_err());
        assert!(matches!(textures.remove(id), Err(MissingTexture(missing)) if missing == id));
    }
}
