//! Supported image and video media types.

use reqwest::Url;

use crate::domain::errors::{CacheError, CacheResult};

/// Extensions accepted by the locator fallback check.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    // Images
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "svg", "tiff", "tif", "ico", "cur", "heic", "heif",
    "jxr", "wdp", "hdp", "avif", // Videos
    "mp4", "m4v", "webm", "avi", "flv", "mkv", "mpeg", "mpg",
];

/// Image and video media types the cache accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum MediaType {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Webp,
    Svg,
    Tiff,
    Icon,
    Heic,
    Heif,
    Jxr,
    Avif,
    Mp4,
    Webm,
    Avi,
    Flv,
    Mkv,
    Mpeg,
}

impl MediaType {
    /// Every supported media type.
    pub const ALL: [Self; 18] = [
        Self::Jpeg,
        Self::Png,
        Self::Gif,
        Self::Bmp,
        Self::Webp,
        Self::Svg,
        Self::Tiff,
        Self::Icon,
        Self::Heic,
        Self::Heif,
        Self::Jxr,
        Self::Avif,
        Self::Mp4,
        Self::Webm,
        Self::Avi,
        Self::Flv,
        Self::Mkv,
        Self::Mpeg,
    ];

    /// The canonical MIME type.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Webp => "image/webp",
            Self::Svg => "image/svg+xml",
            Self::Tiff => "image/tiff",
            Self::Icon => "image/x-icon",
            Self::Heic => "image/heic",
            Self::Heif => "image/heif",
            Self::Jxr => "image/jxr",
            Self::Avif => "image/avif",
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
            Self::Avi => "video/x-msvideo",
            Self::Flv => "video/x-flv",
            Self::Mkv => "video/x-matroska",
            Self::Mpeg => "video/mpeg",
        }
    }

    /// Returns true for video types.
    #[must_use]
    pub const fn is_video(self) -> bool {
        matches!(
            self,
            Self::Mp4 | Self::Webm | Self::Avi | Self::Flv | Self::Mkv | Self::Mpeg
        )
    }

    /// Parses a `Content-Type` value. Parameters are ignored, case is not significant.
    #[must_use]
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|media| media.mime_type() == essence)
    }

    /// Maps a file extension (without the dot) to its media type.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let media = match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "gif" => Self::Gif,
            "bmp" => Self::Bmp,
            "webp" => Self::Webp,
            "svg" => Self::Svg,
            "tiff" | "tif" => Self::Tiff,
            "ico" | "cur" => Self::Icon,
            "heic" => Self::Heic,
            "heif" => Self::Heif,
            "jxr" | "wdp" | "hdp" => Self::Jxr,
            "avif" => Self::Avif,
            "mp4" | "m4v" => Self::Mp4,
            "webm" => Self::Webm,
            "avi" => Self::Avi,
            "flv" => Self::Flv,
            "mkv" => Self::Mkv,
            "mpeg" | "mpg" => Self::Mpeg,
            _ => return None,
        };
        Some(media)
    }

    /// Returns true if the content type is on the allow-list.
    #[must_use]
    pub fn is_supported_mime(content_type: Option<&str>) -> bool {
        content_type.and_then(Self::from_mime).is_some()
    }

    /// Returns true if the locator's path ends with an allowed extension.
    #[must_use]
    pub fn is_supported_extension(url: &Url) -> bool {
        extension_of(url.path())
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
    }

    /// Gates a fetched resource on its content type, falling back to the
    /// locator's extension.
    ///
    /// # Errors
    /// Returns [`CacheError::UnsupportedContentType`] if neither check passes.
    pub fn verify(content_type: Option<&str>, url: &Url) -> CacheResult<()> {
        if Self::is_supported_mime(content_type) || Self::is_supported_extension(url) {
            Ok(())
        } else {
            Err(CacheError::unsupported_content_type(
                content_type.unwrap_or("<none>"),
                url.as_str(),
            ))
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Extension of the last path segment, if it has a non-empty one.
fn extension_of(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next()?;
    let (_, ext) = segment.rsplit_once('.')?;
    (!ext.is_empty()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test_case("image/png", Some(MediaType::Png) ; "plain")]
    #[test_case("IMAGE/JPEG", Some(MediaType::Jpeg) ; "upper_case")]
    #[test_case("image/webp; charset=binary", Some(MediaType::Webp) ; "with_parameters")]
    #[test_case("video/x-matroska", Some(MediaType::Mkv) ; "video")]
    #[test_case("text/html", None ; "html")]
    #[test_case("", None ; "empty")]
    fn test_from_mime(content_type: &str, expected: Option<MediaType>) {
        assert_eq!(MediaType::from_mime(content_type), expected);
    }

    #[test_case("https://example.com/a/cat.PNG", true ; "upper_case_extension")]
    #[test_case("https://example.com/clip.mp4?t=10", true ; "query_ignored")]
    #[test_case("https://example.com/page", false ; "no_extension")]
    #[test_case("https://example.com/archive.tar.gz", false ; "unsupported_extension")]
    #[test_case("https://example.com/dir.png/", false ; "trailing_slash")]
    #[test_case("https://example.com/file.", false ; "empty_extension")]
    fn test_is_supported_extension(locator: &str, expected: bool) {
        assert_eq!(MediaType::is_supported_extension(&url(locator)), expected);
    }

    #[test]
    fn test_verify_accepts_supported_mime() {
        assert!(MediaType::verify(Some("image/gif"), &url("https://example.com/page")).is_ok());
    }

    #[test]
    fn test_verify_falls_back_to_extension() {
        assert!(MediaType::verify(Some("text/plain"), &url("https://example.com/a.jpg")).is_ok());
        assert!(MediaType::verify(None, &url("file:///tmp/a.webm")).is_ok());
    }

    #[test]
    fn test_verify_rejects_html() {
        let err = MediaType::verify(Some("text/html"), &url("https://example.com/")).unwrap_err();
        assert!(matches!(err, CacheError::UnsupportedContentType { .. }));
    }

    #[test]
    fn test_every_mime_type_round_trips() {
        for media in MediaType::ALL {
            assert_eq!(MediaType::from_mime(media.mime_type()), Some(media));
        }
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(MediaType::from_extension("JPG"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_extension("mpg"), Some(MediaType::Mpeg));
        assert!(MediaType::from_extension("mpg").is_some_and(MediaType::is_video));
        assert_eq!(MediaType::from_extension("txt"), None);
    }
}
