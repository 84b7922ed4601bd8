//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Whitespace-separated word count.
pub fn word_count(s: &str) -> usize {
  s.split_whitespace().count()
}

/// Slice from the first `[` to the last `]`; `"[]"` when there is no such span.
/// Model replies often wrap the array in prose or code fences.
pub fn extract_json_array(text: &str) -> &str {
  match (text.find('['), text.rfind(']')) {
    (Some(start), Some(end)) if end > start => &text[start..=end],
    _ => "[]",
  }
}

/// Log-safe truncation for large strings.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}
