use alloc::{vec, vec::Vec};
use core::convert::Infallible;

use embedded_graphics::{draw_target::DrawTarget, geometry::Point, pixelcolor::Rgb888, prelude::*, Pixel};
use smart_leds_trait::{SmartLedsWrite, RGB8};

/// Where rendered frames go: a chain of pixels addressed by physical index.
///
/// Renderers set every pixel they own and then call [`show`](Self::show) once
/// per frame.
pub trait PixelSink {
    type Error;

    fn set_pixel(&mut self, index: usize, color: Rgb888);

    fn show(&mut self) -> Result<(), Self::Error>;
}

/// Frame kept in memory. Useful on the host and in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<Rgb888>,
    shows: u32,
}

impl PixelBuffer {
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![Rgb888::BLACK; len],
            shows: 0,
        }
    }

    pub fn pixels(&self) -> &[Rgb888] {
        &self.pixels
    }

    pub fn pixel(&self, index: usize) -> Option<Rgb888> {
        self.pixels.get(index).copied()
    }

    /// Number of frames shown so far.
    pub fn shows(&self) -> u32 {
        self.shows
    }

    pub fn is_dark(&self) -> bool {
        self.pixels.iter().all(|&p| p == Rgb888::BLACK)
    }
}

impl PixelSink for PixelBuffer {
    type Error = Infallible;

    fn set_pixel(&mut self, index: usize, color: Rgb888) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    fn show(&mut self) -> Result<(), Self::Error> {
        self.shows = self.shows.wrapping_add(1);
        Ok(())
    }
}

/// Pushes frames to an embedded-graphics draw target, such as a HUB75 panel
/// framebuffer. Physical index `i` is drawn at `(i % width, i / width)`.
pub struct MatrixSink<D> {
    target: D,
    width: usize,
    frame: Vec<Rgb888>,
}

impl<D> MatrixSink<D>
where
    D: DrawTarget<Color = Rgb888>,
{
    pub fn new(target: D, width: usize, height: usize) -> Self {
        assert!(width > 0, "matrix sink needs a non-zero width");
        Self {
            target,
            width,
            frame: vec![Rgb888::BLACK; width * height],
        }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }
}

impl<D> PixelSink for MatrixSink<D>
where
    D: DrawTarget<Color = Rgb888>,
{
    type Error = D::Error;

    fn set_pixel(&mut self, index: usize, color: Rgb888) {
        if let Some(pixel) = self.frame.get_mut(index) {
            *pixel = color;
        }
    }

    fn show(&mut self) -> Result<(), Self::Error> {
        let width = self.width;
        self.target
            .draw_iter(self.frame.iter().enumerate().map(|(i, &color)| {
                Pixel(Point::new((i % width) as i32, (i / width) as i32), color)
            }))
    }
}

/// Pushes frames to a smart LED strip (WS2812, APA102 and friends).
pub struct StripSink<W> {
    writer: W,
    frame: Vec<RGB8>,
}

impl<W> StripSink<W>
where
    W: SmartLedsWrite,
    RGB8: Into<W::Color>,
{
    pub fn new(writer: W, len: usize) -> Self {
        Self {
            writer,
            frame: vec![RGB8::default(); len],
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W> PixelSink for StripSink<W>
where
    W: SmartLedsWrite,
    RGB8: Into<W::Color>,
{
    type Error = W::Error;

    fn set_pixel(&mut self, index: usize, color: Rgb888) {
        if let Some(pixel) = self.frame.get_mut(index) {
            *pixel = RGB8::new(color.r(), color.g(), color.b());
        }
    }

    fn show(&mut self) -> Result<(), Self::Error> {
        self.writer.write(self.frame.iter().copied())
    }
}
