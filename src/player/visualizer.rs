//! Frequency bars for the music player canvas.

/// Analyser FFT size; half of it is the number of frequency bins.
pub const FFT_SIZE: usize = 256;
pub const BINS: usize = FFT_SIZE / 2;

/// Host analyser attached to the playing audio.
pub trait FrequencySource {
    /// Fills `out` with magnitudes, 0..=255 per bin.
    fn byte_frequency_data(&mut self, out: &mut [u8]);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

pub struct Visualizer {
    data: Vec<u8>,
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self { data: vec![0; BINS] }
    }

    /// Samples the source once and lays out one frame of bars on a
    /// `width` x `height` canvas. Bars starting past the right edge are dropped.
    pub fn frame(&mut self, source: &mut dyn FrequencySource, width: f32, height: f32) -> Vec<Bar> {
        source.byte_frequency_data(&mut self.data);

        let bar_width = width / self.data.len() as f32 * 2.5;
        let mut x = 0.0;
        let mut bars = Vec::with_capacity(self.data.len());

        for &value in &self.data {
            if x >= width {
                break;
            }
            let bar_height = value as f32 / 255.0 * height;
            bars.push(Bar {
                x,
                y: height - bar_height,
                width: bar_width,
                height: bar_height,
            });
            x += bar_width + 1.0;
        }

        bars
    }
}
