//! 画像の読み込みとアップロード用の前処理
//!
//! 長辺が上限を超える写真は縮小してJPEGに再エンコードする。
//! EXIF（撮影日時・GPS）は縮小前の元データから読む。

mod exif;

pub use self::exif::ExifMeta;

use crate::error::{PlantCareError, Result};
use image::{DynamicImage, GenericImageView, ImageFormat};
use plant_care_common::{ImageData, PreviewHandle};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PREVIEW_ID: AtomicU64 = AtomicU64::new(1);

/// 読み込み済み画像
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub data: ImageData,
    pub exif: ExifMeta,
    /// 元画像の幅・高さ
    pub dimensions: (u32, u32),
    pub resized: bool,
}

pub fn load_image(path: &Path, max_size: u32) -> Result<LoadedImage> {
    if !path.is_file() {
        return Err(PlantCareError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let source = path.display().to_string();
    prepare_image(bytes, source, max_size)
}

/// バイト列から画像を準備（ファイル以外の入力元用）
pub fn prepare_image(bytes: Vec<u8>, source: String, max_size: u32) -> Result<LoadedImage> {
    let format = image::guess_format(&bytes)
        .map_err(|e| PlantCareError::ImageLoad(format!("{}: {}", source, e)))?;
    let decoded = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| PlantCareError::ImageLoad(format!("{}: {}", source, e)))?;

    let exif = match self::exif::read_meta(&bytes) {
        Ok(meta) => meta,
        Err(e) => {
            tracing::debug!(source = %source, error = %e, "no EXIF metadata");
            ExifMeta::default()
        }
    };

    let dimensions = decoded.dimensions();
    let needs_resize = max_size > 0 && dimensions.0.max(dimensions.1) > max_size;

    let (mime_type, upload) = if needs_resize {
        let resized = decoded.resize(max_size, max_size, image::imageops::FilterType::Triangle);
        tracing::debug!(
            source = %source,
            from = ?dimensions,
            to = ?resized.dimensions(),
            "downscaling image before upload"
        );
        ("image/jpeg".to_string(), encode_jpeg(resized)?)
    } else {
        (format.to_mime_type().to_string(), bytes)
    };

    let handle = PreviewHandle {
        id: NEXT_PREVIEW_ID.fetch_add(1, Ordering::Relaxed),
        source,
    };

    Ok(LoadedImage {
        data: ImageData {
            handle,
            mime_type,
            bytes: upload,
        },
        exif,
        dimensions,
        resized: needs_resize,
    })
}

fn encode_jpeg(image: DynamicImage) -> Result<Vec<u8>> {
    // JPEGはアルファ非対応
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut buffer = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .map_err(|e| PlantCareError::ImageLoad(format!("JPEGエンコード失敗: {}", e)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use tempfile::tempdir;

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = ImageBuffer::from_pixel(width, height, Rgba([30u8, 160, 60, 255]));
        img.save(path).expect("PNG保存失敗");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_image(Path::new("/nonexistent/plant.jpg"), 1500);
        assert!(matches!(result, Err(PlantCareError::FileNotFound(_))));
    }

    #[test]
    fn test_load_not_an_image() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("notes.jpg");
        std::fs::write(&path, b"hello").unwrap();

        let result = load_image(&path, 1500);
        assert!(matches!(result, Err(PlantCareError::ImageLoad(_))));
    }

    #[test]
    fn test_small_image_kept_as_is() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("leaf.png");
        write_png(&path, 40, 30);

        let loaded = load_image(&path, 1500).unwrap();
        assert!(!loaded.resized);
        assert_eq!(loaded.dimensions, (40, 30));
        assert_eq!(loaded.data.mime_type, "image/png");
        assert_eq!(loaded.data.bytes, std::fs::read(&path).unwrap());
        assert!(loaded.exif.coordinates.is_none());
    }

    #[test]
    fn test_large_image_downscaled_to_jpeg() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("tree.png");
        write_png(&path, 200, 100);

        let loaded = load_image(&path, 50).unwrap();
        assert!(loaded.resized);
        assert_eq!(loaded.data.mime_type, "image/jpeg");

        let reloaded = image::load_from_memory(&loaded.data.bytes).unwrap();
        assert_eq!(reloaded.dimensions(), (50, 25));
    }

    #[test]
    fn test_preview_handles_are_unique() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("a.png");
        write_png(&path, 4, 4);

        let first = load_image(&path, 0).unwrap();
        let second = load_image(&path, 0).unwrap();
        assert_ne!(first.data.handle.id, second.data.handle.id);
        assert!(first.data.handle.source.ends_with("a.png"));
    }
}
