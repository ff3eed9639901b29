//! Chromosome naming and ordering.
//!
//! Annotation sources disagree on how chromosomes are spelled (`chr1`, `1`,
//! `Chromosome1`). Names are compared on their simplified form; numeric names
//! sort numerically and before any non-numeric name.

use std::cmp::Ordering;

const PREFIXES: [&str; 4] = ["chromosome", "chromo", "chrom", "chr"];

/// Strip a leading `chr`/`chrom`/`chromo`/`chromosome` prefix (case-insensitive)
/// and any `_`, `:` or `-` separating it from the rest of the name.
///
/// A name consisting only of a prefix is returned unchanged.
pub fn simple_name(chr: &str) -> &str {
    for prefix in PREFIXES {
        let matches = chr
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
        if matches {
            let rest = chr[prefix.len()..].trim_start_matches(['_', ':', '-']);
            if rest.is_empty() {
                return chr;
            }
            return rest;
        }
    }
    chr
}

/// Numeric value of a chromosome name, if it has one (`chr7` -> 7).
pub fn number(chr: &str) -> Option<u64> {
    simple_name(chr).parse::<u64>().ok()
}

/// Total order over chromosome names.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    match (number(a), number(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => simple_name(a).cmp(simple_name(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("chr1", "1")]
    #[case("Chr22", "22")]
    #[case("chromosome_X", "X")]
    #[case("chrom:2", "2")]
    #[case("MT", "MT")]
    #[case("chr", "chr")]
    fn test_simple_name(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(simple_name(name), expected);
    }

    #[rstest]
    fn test_numeric_before_alphabetic() {
        let mut names = vec!["chrX", "chr10", "chr2", "chrM", "1"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec!["1", "chr2", "chr10", "chrM", "chrX"]);
    }

    #[rstest]
    fn test_same_chromosome_spelled_differently() {
        assert_eq!(compare_names("chr5", "5"), Ordering::Equal);
        assert_eq!(compare_names("chrY", "Y"), Ordering::Equal);
    }
}
