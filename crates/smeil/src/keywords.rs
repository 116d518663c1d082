//! Reserved keyword and intrinsic type name checks.
//!
//! Used by the identifier verification pass (no declared name may be a
//! keyword or an intrinsic type spelling) and by the type resolver (intrinsic
//! names short-circuit typedef lookup).

/// Every reserved keyword of the surface language. Declarations may never use
/// one of these spellings.
pub const KEYWORDS: &[&str] = &[
    "as", "async", "await", "barrier", "break", "bus", "case", "const", "connect", "clocked",
    "default", "elif", "else", "enum", "exposed", "for", "from", "function", "generate", "if",
    "import", "in", "instance", "inverse", "network", "normal", "of", "out", "proc", "return",
    "switch", "sync", "to", "type", "unique", "var", "wait", "where",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// `int`, `uint`, `bool`, `f8/16/32/64`, or `iN`/`uN` for any positive `N`.
pub fn is_intrinsic_type_name(name: &str) -> bool {
    matches!(name, "int" | "uint" | "bool" | "f8" | "f16" | "f32" | "f64") || parse_sized(name).is_some()
}

/// Name usable in a declaration site: neither a keyword nor an intrinsic type spelling.
pub fn is_reserved(name: &str) -> bool {
    is_keyword(name) || is_intrinsic_type_name(name)
}

/// Parses the trailing digits of an `iN`/`uN` spelling; `None` if `name`
/// isn't of that shape or the width isn't a positive integer.
pub(crate) fn parse_sized(name: &str) -> Option<(char, u32)> {
    let mut chars = name.chars();
    let sign = chars.next()?;
    if sign != 'i' && sign != 'u' {
        return None;
    }
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let width: u32 = digits.parse().ok()?;
    if width == 0 {
        return None;
    }
    Some((sign, width))
}

/// Case-insensitive near-miss suggestion among `candidates`, used to enrich
/// "unknown name" diagnostics.
pub fn suggest<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let lower = name.to_ascii_lowercase();
    candidates.into_iter().find(|candidate| candidate.to_ascii_lowercase() == lower)
}
