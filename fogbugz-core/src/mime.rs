//! Static extension to content-type table for attachment uploads.

/// Content type used when the extension is unknown
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content type for a file name's extension, matched case-insensitively.
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
  let (_, extension) = file_name.rsplit_once('.')?;

  let content_type = match extension.to_ascii_lowercase().as_str() {
    // Documents
    "pdf" => "application/pdf",
    "doc" => "application/msword",
    "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "xls" => "application/vnd.ms-excel",
    "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "ppt" => "application/vnd.ms-powerpoint",
    "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "odt" => "application/vnd.oasis.opendocument.text",
    "ods" => "application/vnd.oasis.opendocument.spreadsheet",
    "rtf" => "application/rtf",

    // Text
    "txt" | "log" | "ini" | "cfg" | "conf" => "text/plain",
    "csv" => "text/csv",
    "htm" | "html" => "text/html",
    "css" => "text/css",
    "md" => "text/markdown",
    "xml" => "text/xml",
    "json" => "application/json",
    "js" => "text/javascript",

    // Images
    "png" => "image/png",
    "jpg" | "jpeg" | "jpe" => "image/jpeg",
    "gif" => "image/gif",
    "bmp" => "image/bmp",
    "tif" | "tiff" => "image/tiff",
    "ico" => "image/x-icon",
    "svg" => "image/svg+xml",
    "webp" => "image/webp",

    // Audio and video
    "mp3" => "audio/mpeg",
    "wav" => "audio/wav",
    "mp4" => "video/mp4",
    "avi" => "video/x-msvideo",
    "mov" => "video/quicktime",
    "wmv" => "video/x-ms-wmv",

    // Archives
    "zip" => "application/zip",
    "gz" => "application/gzip",
    "tar" => "application/x-tar",
    "7z" => "application/x-7z-compressed",
    "rar" => "application/vnd.rar",

    // Mail and misc
    "eml" => "message/rfc822",
    "msg" => "application/vnd.ms-outlook",

    _ => return None,
  };
  Some(content_type)
}

#[cfg(test)]
mod tests {
  use test_case::test_case;

  use super::*;

  #[test_case("Spec.pdf", Some("application/pdf") ; "pdf")]
  #[test_case("IMG1.PNG", Some("image/png") ; "upper case extension")]
  #[test_case("archive.tar.gz", Some("application/gzip") ; "last extension wins")]
  #[test_case("photo.jpeg", Some("image/jpeg") ; "jpeg")]
  #[test_case("report.xlsx", Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet") ; "xlsx")]
  #[test_case("README", None ; "no extension")]
  #[test_case("data.unknownext", None ; "unknown extension")]
  fn test_content_type_for(file_name: &str, expected: Option<&str>) {
    assert_eq!(content_type_for(file_name), expected);
  }
}
