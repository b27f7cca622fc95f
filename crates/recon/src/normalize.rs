//! Title normalization: the comparable form used for equality checks and
//! the case-preserving display form.

use once_cell::sync::Lazy;
use regex::Regex;

/// Promotional tails cut from a lower-cased title. Leftmost match wins and
/// everything after it goes.
const CUT_PATTERNS: [&str; 10] = [
    r"\| chính hãng.*",
    r" chính hãng.*",
    r"- nhập khẩu.*",
    r"- chỉ có tại.*",
    r"- đã kích hoạt.*",
    r"- đkh online.*",
    r"- cũ.*",
    r"- kèm.*",
    r" kèm.*",
    r"\(bản không quảng cáo\).*",
];

/// Category words removed before attribute extraction. Order matters:
/// "màn hình đồ họa" must be tried before "màn hình".
const CATEGORY_WORDS: [&str; 8] = [
    "điện thoại",
    "laptop",
    "máy tính bảng",
    "màn hình đồ họa",
    "màn hình",
    "máy đọc sách",
    "màn hình gaming",
    "màn hình thông minh",
];

static CUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&CUT_PATTERNS.join("|")).expect("cut patterns compile"));

static DISALLOWED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\-/+.]").expect("character filter compiles"));

static CATEGORY_WORDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&CATEGORY_WORDS.join("|")).expect("category words compile"));

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace compiles"));

/// Comparable and display forms of one title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    pub comparable: String,
    pub display: String,
}

pub fn normalize_name(raw: &str) -> NormalizedName {
    NormalizedName {
        comparable: comparable_name(raw),
        display: display_name(raw),
    }
}

fn cut_promotional(lowered: &str) -> String {
    CUT_RE.replace_all(lowered.trim(), "").trim().to_string()
}

/// Lower-case, cut promotional tails, drop punctuation.
///
/// Repeats until nothing changes, so a comparable name is a fixed point:
/// dropping punctuation can expose a tail (`"a -, cũ"` → `"a - cũ"`).
pub fn comparable_name(raw: &str) -> String {
    let mut current = raw.to_lowercase().trim().to_string();
    loop {
        let cut = cut_promotional(&current);
        let next = DISALLOWED_RE.replace_all(&cut, "").trim().to_string();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// The original-cased span of `raw` that survives promotional cutting.
///
/// Falls back to the lower-cased cut text when the span cannot be located
/// in the original (case folding changed byte offsets).
pub fn display_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let cleaned = cut_promotional(&lowered);

    lowered
        .find(&cleaned)
        .and_then(|start| raw.get(start..start + cleaned.len()))
        .filter(|span| span.to_lowercase() == cleaned)
        .map(|span| span.trim().to_string())
        .unwrap_or(cleaned)
}

/// Remove category words ("điện thoại", "laptop", "màn hình …") and collapse
/// whitespace. Independent of promotional cutting.
pub fn strip_category_words(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = CATEGORY_WORDS_RE.replace_all(lowered.trim(), "");
    WHITESPACE_RE.replace_all(stripped.trim(), " ").into_owned()
}
