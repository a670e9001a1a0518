//! Vietnamese: alphabet, speakable-text expansion and a starter lexicon.
//!
//! The alphabet is 12 vowels carrying any of 5 tone marks, plus `đ`. The
//! expander rewrites common abbreviations and numerals into words the way a
//! reader would say them, so that a speech model never sees raw digits.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::frontend::config::AlphabetSpec;
use crate::frontend::normalizer::{collapse_whitespace, compose, Expander};

/// Vowels that take tone marks.
pub const VOWELS: &str = "aăâeêioôơuưy";

/// Grave, hook above, tilde, acute, dot below.
pub const TONE_MARKS: [char; 5] = ['\u{0300}', '\u{0309}', '\u{0303}', '\u{0301}', '\u{0323}'];

const DIGITS: [&str; 10] = [
    "không", "một", "hai", "ba", "bốn", "năm", "sáu", "bảy", "tám", "chín",
];

/// Abbreviations written with a trailing period, matched case-insensitively
/// at the start of the text or after whitespace.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("pgs.", "phó giáo sư"),
    ("ths.", "thạc sĩ"),
    ("tp.", "thành phố"),
    ("ts.", "tiến sĩ"),
    ("gs.", "giáo sư"),
    ("tx.", "thị xã"),
    ("tt.", "thị trấn"),
    ("q.", "quận"),
    ("p.", "phường"),
];

/// Punctuation kept by the expander besides letters, digits and ASCII.
const KEPT_PUNCTUATION: &str = " .,!?;:'\"()-";

/// Multi-syllable words for the built-in segmentation lexicon.
pub const COMMON_WORDS: &[&str] = &[
    "Việt Nam",
    "Hà Nội",
    "Hồ Chí Minh",
    "thành phố",
    "Sài Gòn",
    "Đà Nẵng",
    "Hải Phòng",
    "Cần Thơ",
    "xin chào",
    "cảm ơn",
    "xin lỗi",
    "tạm biệt",
    "học sinh",
    "sinh viên",
    "giáo viên",
    "giáo sư",
    "tiến sĩ",
    "thạc sĩ",
    "bác sĩ",
    "công ty",
    "nhà hàng",
    "bệnh viện",
    "trường học",
    "đại học",
    "gia đình",
    "điện thoại",
    "máy tính",
    "thời tiết",
    "hôm nay",
    "ngày mai",
    "hôm qua",
    "buổi sáng",
    "buổi tối",
    "tiếng Việt",
    "tiếng Anh",
    "người Việt",
    "đất nước",
    "quốc gia",
    "chính phủ",
    "kinh tế",
    "văn hóa",
    "lịch sử",
    "âm nhạc",
    "bóng đá",
    "phó giáo sư",
    "thị xã",
    "thị trấn",
];

static ABBREVIATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = ABBREVIATIONS
        .iter()
        .map(|(abbr, _)| regex::escape(abbr))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)(^|\s)({alternatives})")).expect("abbreviation pattern is valid")
});

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+\b").expect("number pattern is valid"));

static PUNCTUATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.,!?;:])").expect("punctuation pattern is valid"));

pub fn alphabet() -> AlphabetSpec {
    AlphabetSpec {
        letters: VOWELS.to_string(),
        marks: TONE_MARKS.to_vec(),
        extra: "đ".to_string(),
    }
}

/// Prepares Vietnamese text for speech.
///
/// Steps: NFC and abbreviation expansion, whitespace collapsing, removal of
/// symbols outside letters/digits/basic punctuation, numerals to words, a
/// space on each side of clause punctuation, and an upper-case first letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VietnameseExpander {
    pub expand_abbreviations: bool,
}

impl Default for VietnameseExpander {
    fn default() -> Self {
        Self {
            expand_abbreviations: true,
        }
    }
}

impl Expander for VietnameseExpander {
    fn expand(&self, text: &str) -> String {
        let text = clean(text, self.expand_abbreviations);
        let text = expand_numbers(&text);
        let text = PUNCTUATION_PATTERN.replace_all(&text, " $1 ");
        capitalize_first(&collapse_whitespace(&text))
    }
}

fn clean(text: &str, abbreviations: bool) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut text = compose(text);
    if abbreviations {
        text = expand_abbreviations(&text);
    }
    collapse_whitespace(&text)
        .chars()
        .filter(|&ch| ch.is_ascii() || ch.is_alphabetic() || KEPT_PUNCTUATION.contains(ch))
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn expand_abbreviations(text: &str) -> String {
    ABBREVIATION_PATTERN
        .replace_all(text, |caps: &Captures| {
            let abbr = caps[2].to_lowercase();
            let expansion = ABBREVIATIONS
                .iter()
                .find(|(a, _)| *a == abbr)
                .map_or(&caps[2], |(_, e)| *e);
            format!("{}{}", &caps[1], expansion)
        })
        .into_owned()
}

/// Replace every standalone numeral with its Vietnamese reading.
pub fn expand_numbers(text: &str) -> String {
    NUMBER_PATTERN
        .replace_all(text, |caps: &Captures| {
            let digits = &caps[0];
            match digits.parse::<i64>() {
                Ok(num) => number_to_words(num),
                Err(_) if digits.bytes().all(|b| b.is_ascii_digit()) => read_digits(digits),
                // digits of another script
                Err(_) => digits.to_string(),
            }
        })
        .into_owned()
}

/// Read an integer aloud in Vietnamese.
///
/// Numbers from one million up are read digit by digit.
pub fn number_to_words(num: i64) -> String {
    if num < 0 {
        return format!("âm {}", unsigned_to_words(num.unsigned_abs()));
    }
    unsigned_to_words(num.unsigned_abs())
}

fn unsigned_to_words(num: u64) -> String {
    match num {
        0..=9 => DIGITS[num as usize].to_string(),
        10 => "mười".to_string(),
        11..=19 => match num % 10 {
            5 => "mười lăm".to_string(),
            ones => format!("mười {}", DIGITS[ones as usize]),
        },
        20..=99 => {
            let tens = format!("{} mươi", DIGITS[(num / 10) as usize]);
            match num % 10 {
                0 => tens,
                1 => format!("{tens} mốt"),
                5 => format!("{tens} lăm"),
                ones => format!("{tens} {}", DIGITS[ones as usize]),
            }
        }
        100..=999 => {
            let hundreds = format!("{} trăm", DIGITS[(num / 100) as usize]);
            match num % 100 {
                0 => hundreds,
                rest @ 1..=9 => format!("{hundreds} lẻ {}", DIGITS[rest as usize]),
                rest => format!("{hundreds} {}", unsigned_to_words(rest)),
            }
        }
        1_000..=999_999 => {
            let thousands = format!("{} nghìn", unsigned_to_words(num / 1000));
            match num % 1000 {
                0 => thousands,
                rest @ 1..=99 => format!("{thousands} không trăm {}", unsigned_to_words(rest)),
                rest => format!("{thousands} {}", unsigned_to_words(rest)),
            }
        }
        _ => read_digits(&num.to_string()),
    }
}

fn read_digits(digits: &str) -> String {
    digits
        .chars()
        .map(|d| match d.to_digit(10) {
            Some(n) => DIGITS[n as usize].to_string(),
            None => d.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        _ => text.to_string(),
    }
}
