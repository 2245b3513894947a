//! Media helpers shared by costumes and sounds.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// MIME type from a file extension. Unknown extensions are sent as
/// opaque bytes.
pub fn mime_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

/// `data:` URL embedding `bytes`.
pub fn data_url(file_name: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type(file_name), STANDARD.encode(bytes))
}

/// Scratch 2 asset name: archives number their entries by layer/sound id
/// (`3.png`), the remote server keys them by content hash (`<md5>.png`).
pub fn sb2_file_name(md5: &str, id: Option<i64>) -> String {
    match id {
        Some(id) if id >= 0 => match md5.rsplit_once('.') {
            Some((_, ext)) => format!("{id}.{ext}"),
            None => id.to_string(),
        },
        _ => md5.to_string(),
    }
}
