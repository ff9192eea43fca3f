use image::{Rgb, Rgb32FImage, RgbImage};

use crate::geometry::{Colour, FloatType};

/// Rec. 709 luminance weights
const LUMINANCE_WEIGHTS: [FloatType; 3] = [0.2126, 0.7152, 0.0722];

/// Maximum luminance of the display, in cd/m^2
const DISPLAY_LUMINANCE_MAX: f64 = 200.0;

const GAMMA_ENCODE: FloatType = 0.45;

/// Floor of pixel luminance when averaging logarithms.
const MIN_LUMINANCE: f64 = 1e-4;

pub fn luminance(colour: &Colour) -> FloatType {
    colour.dot(&Colour::from(LUMINANCE_WEIGHTS))
}

/// Maps mean radiance per pixel to an 8 bit gamma encoded image.
///
/// Uses Ward's linear scale factor, adapted to the log mean luminance of the whole image.
pub fn tone_map(radiance: &Rgb32FImage) -> RgbImage {
    let scale = exposure_scale(radiance);

    RgbImage::from_fn(radiance.width(), radiance.height(), |x, y| {
        let Rgb(pixel) = *radiance.get_pixel(x, y);
        Rgb(pixel.map(|channel| to_byte(channel * scale)))
    })
}

fn exposure_scale(radiance: &Rgb32FImage) -> FloatType {
    let pixel_count = radiance.width() as usize * radiance.height() as usize;
    if pixel_count == 0 {
        return 1.0;
    }

    let sum_log: f64 = radiance
        .pixels()
        .map(|Rgb(pixel)| {
            let y = luminance(&Colour::from(*pixel)) as f64;
            y.max(MIN_LUMINANCE).log10()
        })
        .sum();
    let adapt_luminance = 10f64.powf(sum_log / pixel_count as f64);

    let a = 1.219 + (DISPLAY_LUMINANCE_MAX * 0.25).powf(0.4);
    let b = 1.219 + adapt_luminance.powf(0.4);

    ((a / b).powf(2.5) / DISPLAY_LUMINANCE_MAX) as FloatType
}

fn to_byte(value: FloatType) -> u8 {
    let encoded = value.max(0.0).powf(GAMMA_ENCODE);
    (encoded * 255.0 + 0.5).floor().min(255.0) as u8
}
