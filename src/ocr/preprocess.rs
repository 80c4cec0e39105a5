//! Normalizes the clock overlay region for character recognition.
//!
//! The pipeline is fixed and unconditional: it never branches on image
//! content and never checks whether a step helped. Whether the result is
//! legible is decided downstream by recognition succeeding or not.

use opencv::{core, imgproc, photo, prelude::*};

use crate::error::SeekError;

/// Border padding around the upscaled region, in pixels. Light fill keeps
/// the sharpening and threshold filters from clipping glyphs at the edges.
const PAD: i32 = 10;

/// Denoising strength for the non-local-means pass.
const DENOISE_H: f32 = 30.0;

/// Block size for the local adaptive threshold. Must stay odd.
const ADAPTIVE_BLOCK: i32 = 31;

/// Where the overlay clock sits in the frame. Deployment configuration:
/// a different camera with a different overlay position means a different
/// rectangle, not different code.
#[derive(Debug, Clone, Copy)]
pub struct CropRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Extract the crop region, clamped to the frame bounds.
fn crop_region(frame: &Mat, rect: &CropRect) -> Result<Mat, SeekError> {
    let size = frame.size()?;
    if rect.x < 0 || rect.y < 0 || rect.x >= size.width || rect.y >= size.height {
        return Err(SeekError::CropOutOfBounds {
            x: rect.x,
            y: rect.y,
        });
    }

    let w = rect.width.clamp(1, size.width - rect.x);
    let h = rect.height.clamp(1, size.height - rect.y);

    let roi = core::Rect::new(rect.x, rect.y, w, h);
    let view = Mat::roi(frame, roi)?;
    let mut out = core::Mat::default();
    view.copy_to(&mut out)?;
    Ok(out)
}

/// Crop the overlay region and run the normalization chain. Returns a
/// single-channel image sized for recognition.
pub fn preprocess(frame: &Mat, rect: &CropRect) -> Result<Mat, SeekError> {
    let region = crop_region(frame, rect)?;

    let mut gray = Mat::default();
    imgproc::cvt_color_def(&region, &mut gray, imgproc::COLOR_BGR2GRAY)?;

    let mut denoised = Mat::default();
    photo::fast_nl_means_denoising(&gray, &mut denoised, DENOISE_H, 7, 21)?;

    // Overlay glyphs are small; below 2x Tesseract misses strokes.
    let mut scaled = Mat::default();
    imgproc::resize(
        &denoised,
        &mut scaled,
        core::Size::new(0, 0),
        2.0,
        2.0,
        imgproc::INTER_CUBIC,
    )?;

    let mut padded = Mat::default();
    core::copy_make_border(
        &scaled,
        &mut padded,
        PAD,
        PAD,
        PAD,
        PAD,
        core::BORDER_CONSTANT,
        core::Scalar::all(255.0),
    )?;

    let kernel = Mat::from_slice_2d(&[
        [0.0f32, -1.0, 0.0],
        [-1.0, 5.0, -1.0],
        [0.0, -1.0, 0.0],
    ])?;
    let mut sharpened = Mat::default();
    imgproc::filter_2d_def(&padded, &mut sharpened, -1, &kernel)?;

    // Blur off the sharpening noise, then Otsu picks the global cut.
    let mut blurred = Mat::default();
    imgproc::gaussian_blur_def(&sharpened, &mut blurred, core::Size::new(3, 3), 0.0)?;
    let mut binary = Mat::default();
    imgproc::threshold(
        &blurred,
        &mut binary,
        0.0,
        255.0,
        imgproc::THRESH_BINARY | imgproc::THRESH_OTSU,
    )?;

    let mut adaptive = Mat::default();
    imgproc::adaptive_threshold(
        &binary,
        &mut adaptive,
        255.0,
        imgproc::ADAPTIVE_THRESH_GAUSSIAN_C,
        imgproc::THRESH_BINARY,
        ADAPTIVE_BLOCK,
        2.0,
    )?;

    // Opening: one erosion, one dilation. Kills speckle, keeps strokes.
    let element = imgproc::get_structuring_element_def(imgproc::MORPH_RECT, core::Size::new(2, 2))?;
    let mut eroded = Mat::default();
    imgproc::erode_def(&adaptive, &mut eroded, &element)?;
    let mut opened = Mat::default();
    imgproc::dilate_def(&eroded, &mut opened, &element)?;

    let mut out = Mat::default();
    core::convert_scale_abs(&opened, &mut out, 1.2, 10.0)?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};

    fn frame(width: i32, height: i32) -> Mat {
        Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(40.0)).unwrap()
    }

    #[test]
    fn test_output_is_single_channel() {
        let rect = CropRect {
            x: 0,
            y: 0,
            width: 512,
            height: 64,
        };
        let out = preprocess(&frame(1280, 720), &rect).unwrap();
        assert_eq!(out.channels(), 1);
    }

    #[test]
    fn test_output_dimensions_track_crop() {
        let rect = CropRect {
            x: 0,
            y: 0,
            width: 512,
            height: 64,
        };
        let out = preprocess(&frame(1280, 720), &rect).unwrap();
        let size = out.size().unwrap();
        // 2x upscale plus padding on every side.
        assert_eq!(size.width, 512 * 2 + 2 * PAD);
        assert_eq!(size.height, 64 * 2 + 2 * PAD);
    }

    #[test]
    fn test_crop_clamps_to_frame() {
        let rect = CropRect {
            x: 0,
            y: 0,
            width: 4000,
            height: 4000,
        };
        let out = crop_region(&frame(640, 480), &rect).unwrap();
        let size = out.size().unwrap();
        assert_eq!(size.width, 640);
        assert_eq!(size.height, 480);
    }

    #[test]
    fn test_crop_origin_outside_frame() {
        let rect = CropRect {
            x: 700,
            y: 0,
            width: 100,
            height: 100,
        };
        let err = crop_region(&frame(640, 480), &rect).unwrap_err();
        assert!(matches!(err, SeekError::CropOutOfBounds { .. }));
    }
}
