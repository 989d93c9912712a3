pub mod time;

/// Render a nanosecond count with a unit suited to its magnitude
pub fn format_nanos(nanos: u64) -> String {
    match nanos {
        0..=9_999 => format!("{} ns", nanos),
        10_000..=9_999_999 => format!("{:.2} μs", nanos as f64 / 1_000.0),
        _ => format!("{:.2} ms", nanos as f64 / 1_000_000.0),
    }
}

/// Symbol used by generated workloads
pub fn workload_symbol(prefix: &str, index: usize) -> String {
    format!("{}{}", prefix, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_nanos() {
        assert_eq!(format_nanos(850), "850 ns");
        assert_eq!(format_nanos(12_500), "12.50 μs");
        assert_eq!(format_nanos(3_250_000_000), "3250.00 ms");
    }

    #[test]
    fn test_workload_symbol() {
        assert_eq!(workload_symbol("SYM", 42), "SYM42");
    }
}
