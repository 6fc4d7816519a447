use crate::model::VideoMetadata;

/// Decoded RGBA thumbnail, ready to upload as a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
}

/// Thumbnail URL reported by the engine, else the standard one for the video id.
pub fn thumbnail_url(info: &VideoMetadata) -> Option<String> {
    info.thumbnail_url.clone().or_else(|| {
        info.video_id
            .as_ref()
            .map(|id| format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id))
    })
}

/// Downloads and decodes a thumbnail. Blocking; call from a blocking task.
pub fn fetch_thumbnail(url: &str) -> Option<Thumbnail> {
    let resp = reqwest::blocking::get(url).ok()?.error_for_status().ok()?;
    let bytes = resp.bytes().ok()?;
    decode_thumbnail(&bytes)
}

pub fn decode_thumbnail(bytes: &[u8]) -> Option<Thumbnail> {
    let img = image::load_from_memory(bytes).ok()?.to_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    Some(Thumbnail {
        size,
        rgba: img.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_png() {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut bytes, image::ImageOutputFormat::Png)
            .unwrap();

        let thumb = decode_thumbnail(bytes.get_ref()).unwrap();
        assert_eq!(thumb.size, [3, 2]);
        assert_eq!(thumb.rgba.len(), 3 * 2 * 4);
        assert_eq!(&thumb.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_thumbnail(b"not an image").is_none());
    }
}
