// Tue Jan 13 2026 - Alex

pub mod logging;
pub mod string;

pub use logging::LoggingUtils;
pub use string::StringUtils;

pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "struct", "structs"), "1 struct");
        assert_eq!(pluralize(0, "struct", "structs"), "0 structs");
        assert_eq!(pluralize(3, "match", "matches"), "3 matches");
    }
}
