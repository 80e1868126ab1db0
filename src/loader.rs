use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use image::imageops::{self, FilterType};
use image::{ImageReader, RgbaImage};
use std::fs;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Result, ViewerError};
use crate::view::RenderPlan;

// ---------------------------------------------------------------------------
// Decoded image data
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct DecodedImage {
    pixels: RgbaImage,
}

impl DecodedImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Rotate the raster in place, positive degrees clockwise. Only quarter
    /// turns are supported; width and height swap on odd turns.
    pub fn rotate(&mut self, delta_degrees: i32) {
        self.pixels = match delta_degrees.rem_euclid(360) / 90 {
            1 => imageops::rotate90(&self.pixels),
            2 => imageops::rotate180(&self.pixels),
            3 => imageops::rotate270(&self.pixels),
            _ => return,
        };
    }
}

fn is_heif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("heic") || e.eq_ignore_ascii_case("heif"))
}

/// Decode by content, not by extension, so mislabeled files still open.
/// HEIC/HEIF go through libheif when built with the `heif` feature.
pub fn decode_image(path: &Path) -> Result<DecodedImage> {
    if is_heif(path) {
        return decode_heif(path);
    }
    let img = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| ViewerError::decode(path, e))?
        .decode()
        .map_err(|e| ViewerError::decode(path, e))?;
    Ok(DecodedImage::from_rgba(img.to_rgba8()))
}

#[cfg(feature = "heif")]
fn decode_heif(path: &Path) -> Result<DecodedImage> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let name = path
        .to_str()
        .ok_or_else(|| ViewerError::decode(path, "path is not valid UTF-8"))?;
    let ctx = HeifContext::read_from_file(name).map_err(|e| ViewerError::decode(path, e))?;
    let handle = ctx.primary_image_handle().map_err(|e| ViewerError::decode(path, e))?;
    let heif = LibHeif::new()
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)
        .map_err(|e| ViewerError::decode(path, e))?;

    let plane = heif
        .planes()
        .interleaved
        .ok_or_else(|| ViewerError::decode(path, "no interleaved RGBA plane"))?;
    let (w, h) = (plane.width, plane.height);
    let row_len = w as usize * 4;

    // Rows may be padded past width * 4
    let mut pixels = Vec::with_capacity(row_len * h as usize);
    for row in plane.data.chunks(plane.stride.max(1)).take(h as usize) {
        pixels.extend_from_slice(&row[..row_len.min(row.len())]);
    }
    let pixels = RgbaImage::from_raw(w, h, pixels)
        .ok_or_else(|| ViewerError::decode(path, "truncated HEIF plane"))?;
    Ok(DecodedImage::from_rgba(pixels))
}

#[cfg(not(feature = "heif"))]
fn decode_heif(path: &Path) -> Result<DecodedImage> {
    Err(ViewerError::decode(
        path,
        "HEIF support not built in (enable the `heif` feature)",
    ))
}

// ---------------------------------------------------------------------------
// Display resampling
// ---------------------------------------------------------------------------

/// A resampled raster and where its top-left corner goes in the viewport.
#[derive(Debug)]
pub struct Placed {
    pub pixels: RgbaImage,
    pub x: i32,
    pub y: i32,
}

/// Resample the part of `img` that `plan` makes visible in a
/// `view_w` x `view_h` viewport. Returns `None` if nothing is visible.
pub fn resize_for_display(img: &DecodedImage, plan: &RenderPlan, view_w: u32, view_h: u32) -> Option<Placed> {
    let (img_w, img_h) = (img.width(), img.height());
    if img_w == 0 || img_h == 0 {
        return None;
    }

    // Visible destination rectangle
    let x0 = plan.x.max(0);
    let y0 = plan.y.max(0);
    let x1 = (plan.x + plan.width as i32).min(view_w as i32);
    let y1 = (plan.y + plan.height as i32).min(view_h as i32);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    // Matching source rectangle, widened to whole pixels
    let to_src = |d: i32, origin: i32| (d - origin) as f32 / plan.scale;
    let sx0 = (to_src(x0, plan.x).floor() as u32).min(img_w - 1);
    let sy0 = (to_src(y0, plan.y).floor() as u32).min(img_h - 1);
    let sx1 = (to_src(x1, plan.x).ceil() as u32).clamp(sx0 + 1, img_w);
    let sy1 = (to_src(y1, plan.y).ceil() as u32).clamp(sy0 + 1, img_h);
    let (sw, sh) = (sx1 - sx0, sy1 - sy0);

    let dw = if sw == img_w { plan.width } else { ((sw as f32 * plan.scale).round() as u32).max(1) };
    let dh = if sh == img_h { plan.height } else { ((sh as f32 * plan.scale).round() as u32).max(1) };

    let crop = imageops::crop_imm(img.pixels(), sx0, sy0, sw, sh).to_image();
    let pixels = if (dw, dh) == (sw, sh) {
        crop
    } else {
        imageops::resize(&crop, dw, dh, FilterType::Lanczos3)
    };

    Some(Placed {
        pixels,
        x: plan.x + (sx0 as f32 * plan.scale).round() as i32,
        y: plan.y + (sy0 as f32 * plan.scale).round() as i32,
    })
}

// ---------------------------------------------------------------------------
// Capture date
// ---------------------------------------------------------------------------

/// When the photo was taken: EXIF `DateTimeOriginal`, then `DateTime`, then
/// the file's modification time.
pub fn capture_date(path: &Path) -> Option<NaiveDateTime> {
    exif_date(path).or_else(|| modified_date(path))
}

/// Stem prefix offered by "rename with date", e.g. `2024-05-01_`.
pub fn date_prefix(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%d_").to_string()
}

/// Draft text for "rename with date": the date prefix in front of the old
/// stem, and the caret position right after the prefix. A stem that already
/// carries the prefix is left alone.
pub fn dated_stem(stem: &str, date: Option<&NaiveDateTime>) -> (String, usize) {
    let Some(date) = date else {
        return (stem.to_string(), stem.len());
    };
    let prefix = date_prefix(date);
    let caret = prefix.len();
    if stem.starts_with(&prefix) {
        (stem.to_string(), caret)
    } else {
        (prefix + stem, caret)
    }
}

fn exif_date(path: &Path) -> Option<NaiveDateTime> {
    let file = fs::File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;

    let stamp = [exif::Tag::DateTimeOriginal, exif::Tag::DateTime]
        .into_iter()
        .find_map(|tag| {
            let field = exif.get_field(tag, exif::In::PRIMARY)?;
            match field.value {
                exif::Value::Ascii(ref vals) => vals
                    .first()
                    .and_then(|v| exif::DateTime::from_ascii(v).ok()),
                _ => None,
            }
        })?;

    NaiveDate::from_ymd_opt(stamp.year as i32, stamp.month as u32, stamp.day as u32)?
        .and_hms_opt(stamp.hour as u32, stamp.minute as u32, stamp.second as u32)
}

fn modified_date(path: &Path) -> Option<NaiveDateTime> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Local>::from(modified).naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewState;
    use image::Rgba;
    use tempfile::TempDir;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

    fn solid(w: u32, h: u32) -> DecodedImage {
        DecodedImage::from_rgba(RgbaImage::from_pixel(w, h, RED))
    }

    #[test]
    fn test_decode_png() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.png");
        RgbaImage::from_pixel(6, 4, GREEN).save(&path).unwrap();

        let img = decode_image(&path).unwrap();
        assert_eq!((img.width(), img.height()), (6, 4));
        assert_eq!(*img.pixels().get_pixel(0, 0), GREEN);
    }

    #[test]
    fn test_decode_by_content_not_extension() {
        let temp = TempDir::new().unwrap();
        let png = temp.path().join("a.png");
        RgbaImage::from_pixel(3, 3, RED).save(&png).unwrap();
        let misnamed = temp.path().join("a.jpg");
        fs::rename(&png, &misnamed).unwrap();

        let img = decode_image(&misnamed).unwrap();
        assert_eq!((img.width(), img.height()), (3, 3));
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.jpg");
        fs::write(&path, b"definitely not an image").unwrap();

        let err = decode_image(&path).unwrap_err();
        assert!(matches!(err, ViewerError::Decode { .. }));
    }

    #[test]
    fn test_decode_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = decode_image(&temp.path().join("x.png")).err().unwrap();
        assert!(matches!(err, ViewerError::Decode { .. }));
    }

    #[test]
    fn test_rotate_clockwise() {
        let mut pixels = RgbaImage::new(2, 1);
        pixels.put_pixel(0, 0, RED);
        pixels.put_pixel(1, 0, GREEN);
        let mut img = DecodedImage::from_rgba(pixels);

        img.rotate(90);
        assert_eq!((img.width(), img.height()), (1, 2));
        assert_eq!(*img.pixels().get_pixel(0, 0), RED);
        assert_eq!(*img.pixels().get_pixel(0, 1), GREEN);

        img.rotate(-90);
        assert_eq!((img.width(), img.height()), (2, 1));
        assert_eq!(*img.pixels().get_pixel(1, 0), GREEN);
    }

    #[test]
    fn test_four_quarter_turns_restore_dimensions() {
        let mut img = solid(7, 3);
        let mut view = ViewState::default();
        for turn in 1..=4 {
            img.rotate(90);
            view.rotate(90);
            let expected = if turn % 2 == 1 { (3, 7) } else { (7, 3) };
            assert_eq!((img.width(), img.height()), expected);
        }
        assert_eq!(view.rotation(), 0);
    }

    #[test]
    fn test_resize_fit_whole_image() {
        let img = solid(100, 50);
        let plan = ViewState::default().render_plan(100, 50, 200, 200).unwrap();
        let placed = resize_for_display(&img, &plan, 200, 200).unwrap();

        assert_eq!(placed.pixels.dimensions(), (200, 100));
        assert_eq!((placed.x, placed.y), (0, 50));
    }

    #[test]
    fn test_resize_only_visible_part_when_zoomed() {
        let img = solid(100, 100);
        let mut view = ViewState::default();
        view.set_zoom(8.0);
        let plan = view.render_plan(100, 100, 50, 50).unwrap();
        let placed = resize_for_display(&img, &plan, 50, 50).unwrap();

        let (w, h) = placed.pixels.dimensions();
        assert!(w <= 80 && h <= 80, "resampled {}x{}", w, h);
        assert!(placed.x <= 0 && placed.y <= 0);
        assert!(placed.x + w as i32 >= 50);
        assert!(placed.y + h as i32 >= 50);
    }

    #[test]
    fn test_capture_date_falls_back_to_mtime() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.png");
        RgbaImage::from_pixel(2, 2, RED).save(&path).unwrap();

        let expected = modified_date(&path).unwrap();
        assert_eq!(capture_date(&path), Some(expected));
        assert!(capture_date(&temp.path().join("missing.png")).is_none());
    }

    fn write_exif(path: &Path, tags: &[(exif::Tag, &str)]) {
        let fields: Vec<exif::Field> = tags
            .iter()
            .map(|(tag, stamp)| exif::Field {
                tag: *tag,
                ifd_num: exif::In::PRIMARY,
                value: exif::Value::Ascii(vec![stamp.as_bytes().to_vec()]),
            })
            .collect();
        let mut writer = exif::experimental::Writer::new();
        for field in &fields {
            writer.push_field(field);
        }
        let mut buf = std::io::Cursor::new(Vec::new());
        writer.write(&mut buf, false).unwrap();
        fs::write(path, buf.into_inner()).unwrap();
    }

    fn ymd_hms(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_exif_date_prefers_original() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("IMG_0001.tiff");
        write_exif(
            &path,
            &[
                (exif::Tag::DateTime, "2022:01:01 00:00:00"),
                (exif::Tag::DateTimeOriginal, "2021:03:04 05:06:07"),
            ],
        );

        assert_eq!(exif_date(&path), Some(ymd_hms(2021, 3, 4, 5, 6, 7)));
        assert_eq!(capture_date(&path), Some(ymd_hms(2021, 3, 4, 5, 6, 7)));
    }

    #[test]
    fn test_exif_date_falls_back_to_datetime() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("IMG_0002.tiff");
        write_exif(&path, &[(exif::Tag::DateTime, "2022:01:02 10:20:30")]);

        assert_eq!(exif_date(&path), Some(ymd_hms(2022, 1, 2, 10, 20, 30)));
    }

    #[test]
    fn test_exif_date_absent_in_plain_png() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.png");
        RgbaImage::from_pixel(2, 2, RED).save(&path).unwrap();
        assert!(exif_date(&path).is_none());
    }

    #[test]
    fn test_dated_stem() {
        let date = ymd_hms(2024, 5, 1, 13, 4, 5);
        assert_eq!(dated_stem("IMG_0001", Some(&date)), ("2024-05-01_IMG_0001".to_string(), 11));
        assert_eq!(dated_stem("2024-05-01_beach", Some(&date)), ("2024-05-01_beach".to_string(), 11));
        assert_eq!(dated_stem("IMG_0001", None), ("IMG_0001".to_string(), 8));
    }

    #[cfg(not(feature = "heif"))]
    #[test]
    fn test_heif_without_decoder_is_decode_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("IMG_0003.HEIC");
        fs::write(&path, b"not decoded anyway").unwrap();

        let err = decode_image(&path).unwrap_err();
        assert!(err.to_string().contains("heif"), "{}", err);
    }

    #[test]
    fn test_date_prefix_format() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(13, 4, 5)
            .unwrap();
        assert_eq!(date_prefix(&date), "2024-05-01_");
    }
}
