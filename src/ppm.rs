//! Binary PPM (P6) export of rendered frames.

use std::io::{self, Write};

use tiny_skia::PixmapRef;

use crate::color::PremultipliedColor;

/// Writes `frame` as a binary PPM image, dropping alpha.
pub fn write_ppm(frame: PixmapRef, mut writer: impl Write) -> io::Result<()> {
    write!(writer, "P6\n{} {}\n255\n", frame.width(), frame.height())?;
    let mut row = Vec::with_capacity(frame.width() as usize * 3);
    for line in frame.data().chunks_exact(frame.width() as usize * 4) {
        row.clear();
        for pixel in line.chunks_exact(4) {
            let color =
                PremultipliedColor::rgba(pixel[0], pixel[1], pixel[2], pixel[3]).demultiply();
            row.extend_from_slice(&[color.red(), color.green(), color.blue()]);
        }
        writer.write_all(&row)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tiny_skia::Pixmap;

    use super::*;

    #[test]
    fn header_and_pixels() {
        let mut pixmap = Pixmap::new(2, 1).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(10, 20, 30, 255));

        let mut out = Vec::new();
        write_ppm(pixmap.as_ref(), &mut out).unwrap();

        let header = b"P6\n2 1\n255\n";
        assert_eq!(&out[..header.len()], header);
        assert_eq!(&out[header.len()..], &[10, 20, 30, 10, 20, 30]);
    }
}
