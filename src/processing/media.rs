//! Media classification by file extension.

use super::types::MediaKind;

const IMAGE_EXTENSIONS: [&str; 4] = ["jpeg", "jpg", "gif", "png"];
const VIDEO_EXTENSIONS: [&str; 5] = ["mov", "mp4", "avi", "flv", "wmv"];

/// Lowercased extension of the last path component, without the dot.
pub fn extension_of(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    base.rsplit_once('.')
        .map(|(_, extension)| extension)
        .filter(|extension| !extension.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Classify an uploaded file. Unrecognized or missing extensions are [`MediaKind::Unknown`].
pub fn classify(file_name: &str) -> MediaKind {
    match extension_of(file_name) {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => MediaKind::Image,
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => MediaKind::Video,
        _ => MediaKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map_exactly() {
        for name in ["a.jpeg", "a.jpg", "a.gif", "a.png"] {
            assert_eq!(classify(name), MediaKind::Image, "{name}");
        }
        for name in ["a.mov", "a.mp4", "a.avi", "a.flv", "a.wmv"] {
            assert_eq!(classify(name), MediaKind::Video, "{name}");
        }
    }

    #[test]
    fn extension_match_ignores_case() {
        assert_eq!(classify("HOLIDAY.JPG"), MediaKind::Image);
        assert_eq!(classify("clip.Mp4"), MediaKind::Video);
    }

    #[test]
    fn unknown_and_missing_extensions() {
        assert_eq!(classify("notes.txt"), MediaKind::Unknown);
        assert_eq!(classify("README"), MediaKind::Unknown);
        assert_eq!(classify("trailing."), MediaKind::Unknown);
        assert_eq!(classify(""), MediaKind::Unknown);
    }

    #[test]
    fn only_the_final_component_counts() {
        assert_eq!(classify("photos.png/raw"), MediaKind::Unknown);
        assert_eq!(classify("dir.d/pic.gif"), MediaKind::Image);
        assert_eq!(extension_of(".png").as_deref(), Some("png"));
    }
}
