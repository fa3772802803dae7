//! MIME type detection based on file extensions.

use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Returns the MIME type for a file name, matching the extension without
/// regard to case. Unknown extensions map to `application/octet-stream`.
///
/// ```
/// # use webdesk::http::mime::mime_type;
/// assert_eq!(mime_type("index.HTML"), "text/html");
/// assert_eq!(mime_type("archive.unknown"), "application/octet-stream");
/// ```
pub fn mime_type(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        "xml" | "xsl" => "text/xml",
        "css" => "text/css",
        "sgml" | "sgm" => "text/x-sgml",
        "js" => "application/javascript",
        "json" => "application/json",

        "gif" => "image/gif",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "png" => "image/png",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        "svg" | "svgz" => "image/svg+xml",

        "au" | "snd" => "audio/basic",
        "mid" | "midi" | "rmi" | "kar" => "audio/mid",
        "mpga" | "mp2" | "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "aif" | "aiff" | "aifc" => "audio/aiff",

        "pdf" => "application/pdf",
        "rtf" => "application/rtf",
        "doc" => "application/msword",
        "ppt" => "application/powerpoint",
        "ps" | "ai" | "eps" => "application/postscript",
        "gz" => "application/x-gzip",
        "tgz" => "application/x-compressed",
        "tar" => "application/x-tar",
        "zip" => "application/zip",
        "jnlp" => "application/x-java-jnlp-file",

        "mpg" | "mpe" | "mpeg" => "video/mpeg",
        "qt" | "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",

        _ => OCTET_STREAM,
    }
}
