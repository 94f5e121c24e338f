use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Where the stored file can be fetched; referenced by file message parts.
    pub url: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

/// Coarse classification of an uploaded file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Document,
    Text,
    Archive,
    Audio,
    Video,
    Unknown,
}

impl FileKind {
    pub fn from_url(url: &str) -> Self {
        let extension = url
            .rsplit('.')
            .next()
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" | "bmp" | "ico" => FileKind::Image,
            "pdf" | "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" => FileKind::Document,
            "txt" | "html" | "htm" | "css" | "js" | "json" | "xml" => FileKind::Text,
            "zip" | "rar" | "7z" | "tar" | "gz" => FileKind::Archive,
            "mp3" | "wav" | "ogg" | "m4a" => FileKind::Audio,
            "mp4" | "avi" | "mov" | "wmv" | "flv" | "webm" => FileKind::Video,
            _ => FileKind::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_url() {
        assert_eq!(FileKind::from_url("/files/photo.JPG"), FileKind::Image);
        assert_eq!(FileKind::from_url("report.pdf"), FileKind::Document);
        assert_eq!(FileKind::from_url("notes.txt"), FileKind::Text);
        assert_eq!(FileKind::from_url("song.mp3"), FileKind::Audio);
        assert_eq!(FileKind::from_url("clip.webm"), FileKind::Video);
        assert_eq!(FileKind::from_url("bundle.tar"), FileKind::Archive);
        assert_eq!(FileKind::from_url("no-extension"), FileKind::Unknown);
    }
}
