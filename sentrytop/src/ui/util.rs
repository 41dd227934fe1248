//! Small UI helpers: human-readable rates and truncation.

pub fn human_rate(bps: f64) -> String {
    const K: f64 = 1024.0;
    if !bps.is_finite() || bps < 0.0 {
        return "--".into();
    }
    if bps < K { return format!("{bps:.0} B/s"); }
    let kb = bps / K;
    if kb < K { return format!("{kb:.1} KB/s"); }
    let mb = kb / K;
    if mb < K { return format!("{mb:.1} MB/s"); }
    let gb = mb / K;
    format!("{gb:.2} GB/s")
}

// Char-based so multi-byte names don't split mid-codepoint
pub fn truncate_middle(s: &str, max: usize) -> String {
    let n = s.chars().count();
    if n <= max { return s.to_string(); }
    if max <= 3 { return "...".into(); }
    let keep = max - 3;
    let left = keep / 2;
    let right = keep - left;
    let head: String = s.chars().take(left).collect();
    let tail: String = s.chars().skip(n - right).collect();
    format!("{head}...{tail}")
}
