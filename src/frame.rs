/*
 *  frame.rs
 *
 *  KodiMonS - keeping an eye on Kodi
 *	(c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use image::RgbImage;

/// A runtime-sized RGB framebuffer for embedded-graphics.
///
/// One render pass draws the whole screen into this buffer; the display
/// driver then packs it into the panel's wire format in a single blit.
#[derive(Debug, Clone)]
pub struct PanelFrame {
    buf: Vec<Rgb888>,
    w: usize,
    h: usize,
}

impl PanelFrame {
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![Rgb888::BLACK; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access, row-major
    pub fn as_slice(&self) -> &[Rgb888] { &self.buf }

    /// Pixel at (x, y); None when out of bounds
    #[allow(dead_code)] // test inspection
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if (x as usize) < self.w && (y as usize) < self.h {
            Some(self.buf[y as usize * self.w + x as usize])
        } else {
            None
        }
    }

    /// Start a render pass with a blank slate
    pub fn clear_black(&mut self) {
        self.buf.fill(Rgb888::BLACK);
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }

    /// Copy a decoded image into the frame, clipped at the edges.
    pub fn paste(&mut self, img: &RgbImage, top_left: Point) {
        for (x, y, px) in img.enumerate_pixels() {
            let p = Point::new(top_left.x + x as i32, top_left.y + y as i32);
            if let Some(i) = self.idx(p) {
                let [r, g, b] = px.0;
                self.buf[i] = Rgb888::new(r, g, b);
            }
        }
    }

    /// Pack into little-endian RGB565, two bytes per pixel.
    pub fn to_rgb565_le(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.buf.len() * 2);
        for px in &self.buf {
            let v: u16 = ((px.r() as u16 & 0xF8) << 8)
                | ((px.g() as u16 & 0xFC) << 3)
                | (px.b() as u16 >> 3);
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes
    }

    /// Pack into little-endian XRGB8888, four bytes per pixel.
    pub fn to_xrgb8888(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.buf.len() * 4);
        for px in &self.buf {
            bytes.extend_from_slice(&[px.b(), px.g(), px.r(), 0]);
        }
        bytes
    }
}

impl OriginDimensions for PanelFrame {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl DrawTarget for PanelFrame {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buf.fill(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // fast path for the rectangular fills the primitives use
        let Size { width, height } = area.size;
        if width == 0 || height == 0 {
            return Ok(());
        }
        let (x0, y0) = (area.top_left.x.max(0) as usize, area.top_left.y.max(0) as usize);
        let w = width as usize;
        let h = height as usize;

        let mut it = colors.into_iter();
        for row in 0..h {
            let base = (y0 + row) * self.w + x0;
            for col in 0..w {
                if let Some(c) = it.next() {
                    let i = base + col;
                    if i < self.buf.len() {
                        self.buf[i] = c;
                    }
                } else {
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::PrimitiveStyle;

    #[test]
    fn paste_is_clipped_at_the_edges() {
        let mut frame = PanelFrame::new(16, 16);
        let img = RgbImage::from_pixel(8, 8, image::Rgb([255, 0, 0]));
        frame.paste(&img, Point::new(12, 12));

        assert_eq!(frame.pixel(12, 12), Some(Rgb888::new(255, 0, 0)));
        assert_eq!(frame.pixel(11, 11), Some(Rgb888::BLACK));
        // nothing drawn out of bounds, nothing wrapped
        assert_eq!(frame.pixel(0, 0), Some(Rgb888::BLACK));
    }

    #[test]
    fn rgb565_packing() {
        let mut frame = PanelFrame::new(1, 1);
        Rectangle::new(Point::zero(), Size::new(1, 1))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
            .draw(&mut frame)
            .unwrap();

        assert_eq!(frame.to_rgb565_le(), 0xF800u16.to_le_bytes().to_vec());
    }

    #[test]
    fn xrgb8888_packing_is_bgr_ordered() {
        let mut frame = PanelFrame::new(1, 1);
        Rectangle::new(Point::zero(), Size::new(1, 1))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::new(1, 2, 3)))
            .draw(&mut frame)
            .unwrap();

        assert_eq!(frame.to_xrgb8888(), vec![3, 2, 1, 0]);
    }

    #[test]
    fn fill_contiguous_stays_in_bounds() {
        let mut frame = PanelFrame::new(8, 8);
        let area = Rectangle::new(Point::new(6, 6), Size::new(4, 4));
        frame
            .fill_contiguous(&area, core::iter::repeat(Rgb888::WHITE).take(16))
            .unwrap();
        assert_eq!(frame.pixel(7, 7), Some(Rgb888::WHITE));
    }
}
