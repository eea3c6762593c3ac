//! Rasterizes compiled geometry with [`tiny-skia`](https://docs.rs/tiny-skia).

use std::mem;

use glam::{Affine2, Mat2, Vec2};
use serde::{Deserialize, Serialize};
use tiny_skia::{
    ClipMask, FillRule, FilterQuality, Paint, PathBuilder, Pattern, Pixmap, Shader, SpreadMode,
    Transform,
};

use crate::{
    color::PremultipliedColor,
    geometry::{CompiledGeometry, Vertex},
    texture::Texture,
    Rect,
};

/// How textures are sampled when drawn at a different scale.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFilter {
    Nearest,
    Bilinear,
    Bicubic,
}

impl Default for TextureFilter {
    fn default() -> Self {
        Self::Bilinear
    }
}

impl From<TextureFilter> for FilterQuality {
    fn from(filter: TextureFilter) -> Self {
        match filter {
            TextureFilter::Nearest => FilterQuality::Nearest,
            TextureFilter::Bilinear => FilterQuality::Bilinear,
            TextureFilter::Bicubic => FilterQuality::Bicubic,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Clip {
    None,
    Everything,
    Mask,
}

pub(crate) struct Renderer {
    filter: TextureFilter,
    anti_alias: bool,
    path_builder: PathBuilder,
    scissor: Option<Rect>,
    scissor_enabled: bool,
    clip_mask: ClipMask,
    clip: Clip,
}

impl Renderer {
    pub fn new(filter: TextureFilter, anti_alias: bool) -> Self {
        Self {
            filter,
            anti_alias,
            path_builder: PathBuilder::new(),
            scissor: None,
            scissor_enabled: false,
            clip_mask: ClipMask::new(),
            clip: Clip::None,
        }
    }

    pub fn enable_scissor(&mut self, enable: bool, target: &Pixmap) {
        self.scissor_enabled = enable;
        self.update_clip(target);
    }

    pub fn set_scissor(&mut self, region: Rect, target: &Pixmap) {
        self.scissor = Some(region);
        self.update_clip(target);
    }

    fn update_clip(&mut self, target: &Pixmap) {
        self.clip = Clip::None;
        if !self.scissor_enabled {
            return;
        }
        let region = match self.scissor {
            Some(region) => region,
            None => return,
        };

        let rect = match region.to_skia() {
            Some(rect) => rect,
            None => {
                self.clip = Clip::Everything;
                return;
            }
        };
        let path = PathBuilder::from_rect(rect);
        if self
            .clip_mask
            .set_path(target.width(), target.height(), &path, FillRule::Winding, false)
            .is_none()
        {
            log::warn!("Failed to build clip mask for scissor {:?}", region);
            self.clip = Clip::Everything;
            return;
        }
        self.clip = Clip::Mask;
    }

    fn clip_mask(&self) -> Option<&ClipMask> {
        (self.clip == Clip::Mask).then(|| &self.clip_mask)
    }

    pub fn draw_geometry(
        &mut self,
        target: &mut Pixmap,
        geometry: &CompiledGeometry,
        translation: Vec2,
        texture: Option<&Texture>,
    ) {
        if self.clip == Clip::Everything {
            return;
        }
        let transform = Transform::from_translate(translation.x, translation.y);
        for triangle in geometry.triangles() {
            let paint = match self.paint(&triangle, texture) {
                Some(paint) => paint,
                None => continue,
            };
            self.fill_triangle(target, &triangle, &paint, transform);
        }
    }

    fn paint<'a>(&self, triangle: &[Vertex; 3], texture: Option<&'a Texture>) -> Option<Paint<'a>> {
        let color = PremultipliedColor::average(&triangle.map(|v| v.color));
        let shader = match texture {
            Some(texture) => Pattern::new(
                texture.pixmap(),
                SpreadMode::Pad,
                self.filter.into(),
                f32::from(color.alpha()) / 255.,
                convert_transform(texture_transform(triangle, texture)?),
            ),
            None => Shader::SolidColor(color.demultiply().to_skia()),
        };
        Some(Paint {
            shader,
            anti_alias: self.anti_alias,
            ..Default::default()
        })
    }

    fn fill_triangle(
        &mut self,
        target: &mut Pixmap,
        triangle: &[Vertex; 3],
        paint: &Paint,
        transform: Transform,
    ) {
        let mut builder = mem::take(&mut self.path_builder);
        builder.move_to(triangle[0].position.x, triangle[0].position.y);
        builder.line_to(triangle[1].position.x, triangle[1].position.y);
        builder.line_to(triangle[2].position.x, triangle[2].position.y);
        builder.close();

        // Degenerate triangles produce no path.
        match builder.finish() {
            Some(path) => {
                target.fill_path(&path, paint, FillRule::Winding, transform, self.clip_mask());
                self.path_builder = path.clear();
            }
            None => self.path_builder = PathBuilder::new(),
        }
    }
}

/// Finds the affine map taking texel coordinates to vertex positions.
///
/// Returns `None` when the texture coordinates are collinear.
fn texture_transform(triangle: &[Vertex; 3], texture: &Texture) -> Option<Affine2> {
    let size = texture.size().as_vec2();
    let [t0, t1, t2] = triangle.map(|v| v.tex_coord * size);
    let [p0, p1, p2] = triangle.map(|v| v.position);

    let texels = Mat2::from_cols(t1 - t0, t2 - t0);
    if texels.determinant().abs() <= f32::EPSILON {
        return None;
    }
    let linear = Mat2::from_cols(p1 - p0, p2 - p0) * texels.inverse();
    Some(Affine2::from_mat2_translation(linear, p0 - linear * t0))
}

fn convert_transform(transform: Affine2) -> Transform {
    let cols = transform.to_cols_array();
    Transform::from_row(cols[0], cols[1], cols[2], cols[3], cols[4], cols[5])
}

#[cfg(test)]
mod tests {
    use glam::{uvec2, vec2};

    use super::*;

    fn vertex(position: Vec2, tex_coord: Vec2) -> Vertex {
        Vertex {
            position,
            color: PremultipliedColor::rgba(255, 255, 255, 255),
            tex_coord,
        }
    }

    #[test]
    fn texture_transform_maps_texels_onto_positions() {
        let texture = Texture::from_rgba(vec![0; 4 * 8 * 4], uvec2(4, 8)).unwrap();
        let triangle = [
            vertex(vec2(10., 20.), vec2(0., 0.)),
            vertex(vec2(50., 25.), vec2(1., 0.)),
            vertex(vec2(15., 90.), vec2(0.5, 1.)),
        ];
        let transform = texture_transform(&triangle, &texture).unwrap();

        for (texel, position) in [
            (vec2(0., 0.), vec2(10., 20.)),
            (vec2(4., 0.), vec2(50., 25.)),
            (vec2(2., 8.), vec2(15., 90.)),
        ] {
            let mapped = transform.transform_point2(texel);
            assert!((mapped - position).length() < 1e-3, "{:?} != {:?}", mapped, position);
        }
    }

    #[test]
    fn collinear_tex_coords_have_no_transform() {
        let texture = Texture::from_rgba(vec![0; 4], uvec2(1, 1)).unwrap();
        let triangle = [
            vertex(vec2(0., 0.), vec2(0., 0.)),
            vertex(vec2(1., 0.), vec2(0.5, 0.5)),
            vertex(vec2(0., 1.), vec2(1., 1.)),
        ];
        assert!(texture_transform(&triangle, &texture).is_none());
    }
}
