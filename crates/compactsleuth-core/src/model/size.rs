/// Human-readable byte and count formatting for listings.
///
/// Sizes stay `u64` bytes everywhere; floats appear only here.

const UNITS: [(&str, u64); 4] = [
    ("TB", 1 << 40),
    ("GB", 1 << 30),
    ("MB", 1 << 20),
    ("KB", 1 << 10),
];

/// Format a byte count with a binary-scaled unit (KB = 1024 bytes).
///
/// KB and MB get one decimal, GB and TB two.
pub fn format_size(bytes: u64) -> String {
    for (label, scale) in UNITS {
        if bytes >= scale {
            let value = bytes as f64 / scale as f64;
            return match label {
                "KB" | "MB" => format!("{value:.1} {label}"),
                _ => format!("{value:.2} {label}"),
            };
        }
    }
    format!("{bytes} B")
}

/// Format a count with comma thousands separators.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_048_576), "1.0 MB");
        assert_eq!(format_size(1_073_741_824), "1.00 GB");
        assert_eq!(format_size(1_099_511_627_776), "1.00 TB");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }
}
