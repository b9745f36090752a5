/// Image format detection from leading bytes, plus the MIME and
/// extension tables uploads are checked against.

/// An image container recognized by its signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
    Bmp,
    Tiff,
    /// HEIC/HEIF, recognized by the ISO-BMFF `ftyp` box
    Heif,
}

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const GIF87A: &[u8] = b"GIF87a";
const GIF89A: &[u8] = b"GIF89a";
const BMP: &[u8] = b"BM";
const TIFF_LE: &[u8] = &[b'I', b'I', 0x2A, 0x00];
const TIFF_BE: &[u8] = &[b'M', b'M', 0x00, 0x2A];

/// `ftyp` brands that mark a HEIF-family still image or sequence
const HEIF_BRANDS: &[&[u8]] = &[
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"hevm", b"hevs", b"mif1", b"msf1",
];

fn is_webp(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP"
}

/// Checks for an `ftyp` box whose major or compatible brands include a
/// HEIF brand
fn is_heif(bytes: &[u8]) -> bool {
    if bytes.len() < 12 || &bytes[4..8] != b"ftyp" {
        return false;
    }
    if HEIF_BRANDS.contains(&&bytes[8..12]) {
        return true;
    }
    // box size, then major brand, minor version, compatible brands
    let box_size = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let end = box_size.min(bytes.len());
    if end <= 16 {
        return false;
    }
    bytes[16..end]
        .chunks_exact(4)
        .any(|brand| HEIF_BRANDS.contains(&brand))
}

/// Identifies the image format from the leading bytes
///
/// Returns `None` when no known signature matches.
pub fn sniff(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(JPEG) {
        Some(ImageFormat::Jpeg)
    } else if bytes.starts_with(PNG) {
        Some(ImageFormat::Png)
    } else if is_webp(bytes) {
        Some(ImageFormat::Webp)
    } else if bytes.starts_with(GIF87A) || bytes.starts_with(GIF89A) {
        Some(ImageFormat::Gif)
    } else if bytes.starts_with(TIFF_LE) || bytes.starts_with(TIFF_BE) {
        Some(ImageFormat::Tiff)
    } else if is_heif(bytes) {
        Some(ImageFormat::Heif)
    } else if bytes.len() >= 14 && bytes.starts_with(BMP) {
        Some(ImageFormat::Bmp)
    } else {
        None
    }
}

/// Maps a declared MIME type onto its canonical allow-listed form
///
/// Parameters such as `; charset=` are ignored. Returns `None` for types
/// outside the allow-list.
pub fn canonical_mime(declared: &str) -> Option<&'static str> {
    let essence = declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("image/jpeg"),
        "image/png" => Some("image/png"),
        "image/webp" => Some("image/webp"),
        "image/gif" => Some("image/gif"),
        "image/bmp" | "image/x-ms-bmp" => Some("image/bmp"),
        "image/tiff" => Some("image/tiff"),
        "image/heic" | "image/heic-sequence" => Some("image/heic"),
        "image/heif" | "image/heif-sequence" => Some("image/heif"),
        _ => None,
    }
}

/// Canonical MIME types a filename extension may carry
pub fn mimes_for_extension(extension: &str) -> &'static [&'static str] {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "jpe" | "jfif" => &["image/jpeg"],
        "png" => &["image/png"],
        "webp" => &["image/webp"],
        "gif" => &["image/gif"],
        "bmp" | "dib" => &["image/bmp"],
        "tif" | "tiff" => &["image/tiff"],
        // browsers label HEIC files with either type
        "heic" | "heif" => &["image/heic", "image/heif"],
        _ => &[],
    }
}

/// The extension used when storing a file of the given canonical type
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        "image/heic" => "heic",
        "image/heif" => "heif",
        _ => "bin",
    }
}

/// Lowercased extension of a filename, without the dot
pub fn extension_of(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}
