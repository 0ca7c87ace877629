use std::fmt;

/// Time bound in a form ffmpeg accepts: bare seconds (`"90"`) or `HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTime(String);

impl NormalizedTime {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn pad2(field: &str) -> String {
    format!("{:0>2}", field)
}

/// Normalize a raw time value.
///
/// Accepts bare seconds, `MM:SS` and `HH:MM:SS`. Anything else, including empty
/// input, yields `None`: a malformed bound means "no bound", never an error.
pub fn normalize_time(raw: Option<&str>) -> Option<NormalizedTime> {
    let t = raw?.trim();
    if t.is_empty() {
        return None;
    }

    if is_digits(t) {
        let stripped = t.trim_start_matches('0');
        let seconds = if stripped.is_empty() { "0" } else { stripped };
        return Some(NormalizedTime(seconds.to_string()));
    }

    let parts: Vec<&str> = t.split(':').collect();
    if !parts.iter().all(|p| is_digits(p)) {
        return None;
    }

    match parts.as_slice() {
        [mm, ss] => Some(NormalizedTime(format!("00:{}:{}", pad2(mm), pad2(ss)))),
        [hh, mm, ss] => Some(NormalizedTime(format!(
            "{}:{}:{}",
            pad2(hh),
            pad2(mm),
            pad2(ss)
        ))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(raw: &str) -> Option<String> {
        normalize_time(Some(raw)).map(|t| t.to_string())
    }

    #[test]
    fn test_bare_seconds() {
        assert_eq!(norm("90").as_deref(), Some("90"));
        assert_eq!(norm("007").as_deref(), Some("7"));
        assert_eq!(norm("000").as_deref(), Some("0"));
        assert_eq!(norm("  45 ").as_deref(), Some("45"));
    }

    #[test]
    fn test_minutes_seconds() {
        assert_eq!(norm("1:30").as_deref(), Some("00:01:30"));
        assert_eq!(norm("12:05").as_deref(), Some("00:12:05"));
    }

    #[test]
    fn test_hours_minutes_seconds() {
        assert_eq!(norm("01:02:03").as_deref(), Some("01:02:03"));
        assert_eq!(norm("1:2:3").as_deref(), Some("01:02:03"));
        assert_eq!(norm("100:00:00").as_deref(), Some("100:00:00"));
    }

    #[test]
    fn test_malformed_is_absent() {
        assert_eq!(norm("abc"), None);
        assert_eq!(norm(""), None);
        assert_eq!(norm("   "), None);
        assert_eq!(norm("1:2:3:4"), None);
        assert_eq!(norm("1:xx"), None);
        assert_eq!(norm("1:"), None);
        assert_eq!(norm("1.5"), None);
        assert_eq!(norm("-5"), None);
    }

    #[test]
    fn test_absent_input() {
        assert_eq!(normalize_time(None), None);
    }
}
