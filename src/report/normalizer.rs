use regex::Regex;
use std::sync::LazyLock;

/// `**Comment from <author> at <date>**` banners left by the Pagure importer.
static COMMENT_BANNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\*\*Comment from .+?\*\*\n\n").unwrap());

static CLONED_FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Cloned from Pagure issue:.+?\n").unwrap());

/// `- Created at ... ---` metadata header at the top of imported issues.
static CREATED_AT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)- Created at .+?---\n\n").unwrap());

/// Strips importer boilerplate from an issue or comment body.
///
/// Literal `\n` and `\r` escape sequences are turned into real control
/// characters, the known banners are removed, and the result is trimmed.
/// Everything else, markup included, is left as is. Applying it to its own
/// output changes nothing.
pub fn normalize(text: &str) -> String {
    let mut current = text.to_string();

    // Removing a banner can butt two fragments into a new escape or banner,
    // so repeat until nothing changes.
    loop {
        let next = strip_banners(&unescape(&current));
        if next == current {
            break;
        }
        current = next;
    }

    current.trim().to_string()
}

fn unescape(text: &str) -> String {
    text.replace("\\n", "\n").replace("\\r", "\r")
}

fn strip_banners(text: &str) -> String {
    let text = COMMENT_BANNER.replace_all(text, "");
    let text = CLONED_FROM.replace_all(&text, "");
    CREATED_AT_BLOCK.replace_all(&text, "").into_owned()
}
