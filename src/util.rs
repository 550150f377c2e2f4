//! Small text helpers used across modules.

/// Canonical form for exact-string answer comparison: trimmed, lowercased.
pub fn normalize_answer(s: &str) -> String {
  s.trim().to_lowercase()
}

/// `[2, 2, 3]` -> `"2×2×3"` (canonical answer form).
pub fn join_factors(factors: &[i64]) -> String {
  join_with(factors, "×")
}

/// `[2, 2, 3]` -> `"2 × 2 × 3"` (explanation form).
pub fn join_factors_spaced(factors: &[i64]) -> String {
  join_with(factors, " × ")
}

/// `[1, 5]` -> `"1+5"`.
pub fn join_digits(digits: &[u32]) -> String {
  digits.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("+")
}

fn join_with(values: &[i64], sep: &str) -> String {
  values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(sep)
}

/// Log-safe truncation for user-submitted text.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  match s.char_indices().nth(max) {
    None => s.to_string(),
    Some((cut, _)) => format!("{}… ({} bytes total)", &s[..cut], s.len()),
  }
}
