// Tue Jan 13 2026 - Alex

use std::borrow::Cow;

const WINKLER_PREFIX_SCALE: f64 = 0.1;
const WINKLER_MAX_PREFIX: usize = 4;
const WINKLER_BOOST_THRESHOLD: f64 = 0.7;

pub struct StringUtils;

impl StringUtils {
    pub fn truncate(s: &str, max_len: usize) -> Cow<'_, str> {
        if s.chars().count() <= max_len {
            Cow::Borrowed(s)
        } else if max_len >= 3 {
            Cow::Owned(format!("{}...", s.chars().take(max_len - 3).collect::<String>()))
        } else {
            Cow::Owned(s.chars().take(max_len).collect())
        }
    }

    pub fn pad_right(s: &str, width: usize, pad_char: char) -> String {
        let len = s.chars().count();
        if len >= width {
            s.to_string()
        } else {
            let padding = pad_char.to_string().repeat(width - len);
            format!("{}{}", s, padding)
        }
    }

    /// Total length of the Ratcliff/Obershelp matching blocks of `a` and `b`.
    /// Blocks are found by repeatedly taking the longest common substring
    /// (earliest in `a`, then earliest in `b`) and recursing on both sides.
    pub fn matching_chars(a: &str, b: &str) -> usize {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        let mut total = 0;
        let mut queue = vec![(0, a.len(), 0, b.len())];
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = longest_match(&a, &b, alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        total
    }

    /// `2 * M / T` where `M` is the matching-block length and `T` the combined length.
    pub fn sequence_ratio(a: &str, b: &str) -> f64 {
        let total = a.chars().count() + b.chars().count();
        if total == 0 {
            return 1.0;
        }
        2.0 * Self::matching_chars(a, b) as f64 / total as f64
    }

    /// Matching-block length over the longer string's length.
    pub fn common_ratio(a: &str, b: &str) -> f64 {
        let longest = a.chars().count().max(b.chars().count());
        if longest == 0 {
            return 0.0;
        }
        Self::matching_chars(a, b) as f64 / longest as f64
    }

    pub fn jaro(a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        if a.is_empty() && b.is_empty() {
            return 1.0;
        }
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        let window = (a.len().max(b.len()) / 2).saturating_sub(1);
        let mut a_flags = vec![false; a.len()];
        let mut b_flags = vec![false; b.len()];
        let mut matches = 0usize;

        for (i, ca) in a.iter().enumerate() {
            let lo = i.saturating_sub(window);
            let hi = (i + window + 1).min(b.len());
            for j in lo..hi {
                if !b_flags[j] && b[j] == *ca {
                    a_flags[i] = true;
                    b_flags[j] = true;
                    matches += 1;
                    break;
                }
            }
        }

        if matches == 0 {
            return 0.0;
        }

        let a_matched = a.iter().zip(&a_flags).filter(|(_, &f)| f).map(|(c, _)| c);
        let b_matched = b.iter().zip(&b_flags).filter(|(_, &f)| f).map(|(c, _)| c);
        let transpositions = a_matched.zip(b_matched).filter(|(x, y)| x != y).count() / 2;

        let m = matches as f64;
        (m / a.len() as f64 + m / b.len() as f64 + (m - transpositions as f64) / m) / 3.0
    }

    /// Jaro similarity with the common-prefix bonus applied above 0.7.
    pub fn jaro_winkler(a: &str, b: &str) -> f64 {
        let jaro = Self::jaro(a, b);
        if jaro <= WINKLER_BOOST_THRESHOLD {
            return jaro;
        }

        let prefix = a
            .chars()
            .zip(b.chars())
            .take(WINKLER_MAX_PREFIX)
            .take_while(|(x, y)| x == y)
            .count();

        jaro + prefix as f64 * WINKLER_PREFIX_SCALE * (1.0 - jaro)
    }
}

fn longest_match(a: &[char], b: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0usize);
    let width = bhi - blo + 1;
    let mut prev = vec![0usize; width];

    for i in alo..ahi {
        let mut curr = vec![0usize; width];
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = prev[j - blo] + 1;
                curr[j - blo + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        prev = curr;
    }

    best
}

pub fn truncate(s: &str, max_len: usize) -> String {
    StringUtils::truncate(s, max_len).into_owned()
}

pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    StringUtils::sequence_ratio(a, b)
}

pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    StringUtils::jaro_winkler(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_matching_chars() {
        assert_eq!(StringUtils::matching_chars("abcd", "bcde"), 3);
        assert_eq!(StringUtils::matching_chars("position", "position"), 8);
        assert_eq!(StringUtils::matching_chars("abc", "xyz"), 0);
        assert_eq!(StringUtils::matching_chars("", "abc"), 0);
    }

    #[test]
    fn test_sequence_ratio() {
        assert!(close(sequence_ratio("", ""), 1.0));
        assert!(close(sequence_ratio("abcd", "bcde"), 0.75));
        assert!(close(sequence_ratio("color", "colour"), 10.0 / 11.0));
        assert!(close(StringUtils::common_ratio("color", "colour"), 5.0 / 6.0));
    }

    #[test]
    fn test_jaro_winkler_known_values() {
        assert!((jaro_winkler("martha", "marhta") - 0.961111).abs() < 1e-5);
        assert!(close(jaro_winkler("float", "float"), 1.0));
        assert!(close(jaro_winkler("", "float"), 0.0));
        assert!(jaro_winkler("float3", "float4") > 0.9);
        assert!(jaro_winkler("uint", "float4x4") < 0.7);
    }

    #[test]
    fn test_truncate_and_pad() {
        assert_eq!(truncate("viewProjection", 8), "viewP...");
        assert_eq!(truncate("time", 8), "time");
        assert_eq!(StringUtils::pad_right("ab", 4, '.'), "ab..");
    }
}
