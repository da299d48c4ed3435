use choreo::{Decoder, ImageRef, LoadError};
use gdk_pixbuf::{Colorspace, Pixbuf};
use fs_err as fs;
use std::io::ErrorKind;
use std::path::Path;

/// Longest edge a photo is decoded at.
pub const TEXTURE_SIZE: i32 = 512;

/// Raw pixels of a decoded photo. Unlike [`Pixbuf`] this can cross threads.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    bytes: glib::Bytes,
    width: i32,
    height: i32,
    rowstride: i32,
    has_alpha: bool,
}

impl DecodedImage {
    pub fn from_pixbuf(pixbuf: &Pixbuf) -> Self {
        Self {
            bytes: pixbuf.read_pixel_bytes(),
            width: pixbuf.width(),
            height: pixbuf.height(),
            rowstride: pixbuf.rowstride(),
            has_alpha: pixbuf.has_alpha(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn to_pixbuf(&self) -> Pixbuf {
        Pixbuf::from_bytes(
            &self.bytes,
            Colorspace::Rgb,
            self.has_alpha,
            8,
            self.width,
            self.height,
            self.rowstride,
        )
    }
}

/// Decodes image files from disk with gdk-pixbuf.
#[derive(Debug, Clone, Copy)]
pub struct PixbufDecoder {
    pub size: i32,
}

impl Default for PixbufDecoder {
    fn default() -> Self {
        Self { size: TEXTURE_SIZE }
    }
}

impl Decoder for PixbufDecoder {
    type Texture = DecodedImage;

    fn decode(&self, image: &ImageRef) -> Result<DecodedImage, LoadError> {
        let path = Path::new(image.as_str());
        let io_error = |reason: String| LoadError::Io {
            image: image.clone(),
            reason,
        };

        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(io_error("not a regular file".to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LoadError::NotFound(image.clone()));
            }
            Err(e) => return Err(io_error(e.to_string())),
        }

        let pixbuf = Pixbuf::from_file_at_scale(path, self.size, self.size, true).map_err(|e| {
            if e.kind::<glib::FileError>().is_some() {
                io_error(e.to_string())
            } else {
                LoadError::Decode {
                    image: image.clone(),
                    reason: e.to_string(),
                }
            }
        })?;
        Ok(DecodedImage::from_pixbuf(&pixbuf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_found() {
        let image = ImageRef::new("/definitely/not/here.png");
        assert_eq!(
            PixbufDecoder::default().decode(&image).unwrap_err(),
            LoadError::NotFound(image)
        );
    }

    #[test]
    fn test_directory_is_a_read_error() {
        let dir = std::env::temp_dir();
        let image = ImageRef::new(dir.to_string_lossy());
        let err = PixbufDecoder::default().decode(&image).unwrap_err();
        assert!(matches!(err, LoadError::Io { image: ref i, .. } if *i == image));
    }

    #[test]
    fn test_garbage_file_fails_to_decode() {
        let path = std::env::temp_dir().join(format!("tinsel-garbage-{}.png", std::process::id()));
        fs::write(&path, b"not a png at all").unwrap();

        let image = ImageRef::new(path.to_string_lossy());
        let err = PixbufDecoder::default().decode(&image).unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_decoded_image_round_trips_through_pixbuf() {
        let path = std::env::temp_dir().join(format!("tinsel-red-{}.png", std::process::id()));
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 64, 32).unwrap();
        {
            let cr = cairo::Context::new(&surface).unwrap();
            cr.set_source_rgb(1.0, 0.0, 0.0);
            cr.paint().unwrap();
        }
        let mut file = std::fs::File::create(&path).unwrap();
        surface.write_to_png(&mut file).unwrap();
        drop(file);

        let decoded = PixbufDecoder { size: 16 }
            .decode(&ImageRef::new(path.to_string_lossy()))
            .unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
        let pixbuf = decoded.to_pixbuf();
        assert_eq!(pixbuf.width(), 16);

        fs::remove_file(&path).unwrap();
    }
}
