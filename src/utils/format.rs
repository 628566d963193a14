/// String representation of a numeric vector with fixed decimal precision,
/// for per-iteration candidate logging.
pub fn format_vector(values: &[f64], precision: usize) -> String {
    let parts: Vec<String> = values
        .iter()
        .map(|v| format!("{:.*}", precision, v))
        .collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_vector() {
        assert_eq!(format_vector(&[0.7568, 1.0], 3), "[0.757, 1.000]");
        assert_eq!(format_vector(&[-1.5], 2), "[-1.50]");
    }

    #[test]
    fn test_format_empty_vector() {
        assert_eq!(format_vector(&[], 3), "[]");
    }
}
