//! Naming rules for uploaded item images

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Image extensions accepted for upload, lowercase
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Length of the public token attached to every item
pub const UNIQUE_ID_LEN: usize = 8;

static DISALLOWED_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("Invalid regex"));

/// Reduces a client-supplied filename to a safe ASCII name.
///
/// Accented letters are decomposed and keep their ASCII base letter.
/// Path separators become spaces, runs of whitespace become a single `_`,
/// anything outside `[A-Za-z0-9_.-]` is dropped and leading or trailing `.`
/// and `_` are stripped. The result may be empty.
#[must_use]
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    DISALLOWED_FILENAME_CHARS
        .replace_all(&joined, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Returns the lowercase extension if it is on the allow-list.
///
/// Only the suffix is inspected, never the file contents.
#[must_use]
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, extension) = filename.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();

    ALLOWED_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

/// Fresh random public token: 8 lowercase hex characters
#[must_use]
pub fn generate_unique_id() -> String {
    let mut token = uuid::Uuid::new_v4().simple().to_string();
    token.truncate(UNIQUE_ID_LEN);
    token
}

/// Object key `{name}__{filename}__{unique_id}.{extension}`
#[must_use]
pub fn storage_key(item_name: &str, filename: &str, unique_id: &str, extension: &str) -> String {
    format!("{item_name}__{filename}__{unique_id}.{extension}")
}

/// Content type guessed from the key, `application/octet-stream` when unknown
#[must_use]
pub fn guess_content_type(key: &str) -> String {
    mime_guess::from_path(key)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(
            secure_filename("i contain cool \u{fc}ml\u{e4}uts.txt"),
            "i_contain_cool_umlauts.txt"
        );
        assert_eq!(secure_filename("caf\u{e9} photo.jpg"), "cafe_photo.jpg");
        assert_eq!(secure_filename("\u{65e5}\u{672c}.png"), "png");
        assert_eq!(secure_filename("C:\\photos\\wallet.JPG"), "C_photos_wallet.JPG");
        assert_eq!(secure_filename("..."), "");
        assert_eq!(secure_filename("_.hidden.png_"), "hidden.png");
    }

    #[test]
    fn test_allowed_extension_is_case_insensitive() {
        assert_eq!(allowed_extension("photo.png").as_deref(), Some("png"));
        assert_eq!(allowed_extension("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(allowed_extension("photo.JpEg").as_deref(), Some("jpeg"));
        assert_eq!(allowed_extension("archive.tar.png").as_deref(), Some("png"));
    }

    #[test]
    fn test_allowed_extension_rejects_everything_else() {
        for filename in ["photo.gif", "photo.png.exe", "photo", "png", "photo.", "photo.txt"] {
            assert_eq!(allowed_extension(filename), None, "{filename} should be rejected");
        }
    }

    #[test]
    fn test_unique_id_is_short_lowercase_hex() {
        let token = generate_unique_id();

        assert_eq!(token.len(), UNIQUE_ID_LEN);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_unique_ids_differ_between_calls() {
        let tokens: std::collections::HashSet<_> = (0..64).map(|_| generate_unique_id()).collect();

        assert!(tokens.len() > 60);
    }

    #[test]
    fn test_storage_key_layout() {
        assert_eq!(
            storage_key("Red scarf", "scarf.JPG", "0a1b2c3d", "jpg"),
            "Red scarf__scarf.JPG__0a1b2c3d.jpg"
        );
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("a__b.png__0a1b2c3d.png"), "image/png");
        assert_eq!(guess_content_type("a__b.jpeg__0a1b2c3d.jpeg"), "image/jpeg");
        assert_eq!(guess_content_type("a__b.jpg__0a1b2c3d.jpg"), "image/jpeg");
        assert_eq!(guess_content_type("no-extension"), "application/octet-stream");
    }
}
