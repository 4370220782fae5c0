//! Output formatting utilities

use crate::delta::DeltaStats;

/// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    human_bytes::human_bytes(bytes as f64)
}

/// Format percentage
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// One-line summary of a delta for the diff command
pub fn delta_summary(stats: &DeltaStats, encoded_size: u64) -> String {
    let mut summary = format!(
        "{} ops ({} copied, {} literal), {} reused, delta is {}",
        stats.operation_count(),
        stats.copy_ops,
        stats.data_ops,
        format_percent(stats.savings_percent()),
        format_size(encoded_size)
    );
    if !stats.is_beneficial() {
        summary.push_str(" (not beneficial)");
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(80.0), "80.0%");
        assert_eq!(format_percent(33.333), "33.3%");
    }

    #[test]
    fn test_delta_summary() {
        let stats = DeltaStats {
            copy_ops: 2,
            data_ops: 1,
            bytes_reused: 8,
            bytes_new: 2,
        };
        let summary = delta_summary(&stats, 29);
        assert!(summary.starts_with("3 ops (2 copied, 1 literal), 80.0% reused"));
        assert!(!summary.ends_with("(not beneficial)"));
    }

    #[test]
    fn test_delta_summary_all_literal() {
        let stats = DeltaStats {
            data_ops: 1,
            bytes_new: 10,
            ..Default::default()
        };
        assert!(delta_summary(&stats, 19).ends_with("(not beneficial)"));
    }
}
