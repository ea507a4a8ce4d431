//! Wire protocol: one ASCII record per line, `P:<float>`.

/// Prefix of a press record.
pub const PRESS_PREFIX: &str = "P:";

/// Parse one line into a press value.
///
/// Returns `None` for anything that is not a press record with a finite value.
pub fn parse_press_line(line: &str) -> Option<f64> {
    let value = line.trim().strip_prefix(PRESS_PREFIX)?;
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn formatted_presses_parse_back(v in -10.0_f64..10.0) {
            prop_assert_eq!(parse_press_line(&format!("P:{v}\r\n")), Some(v));
        }

        #[test]
        fn arbitrary_lines_never_yield_non_finite(line in ".*") {
            if let Some(v) = parse_press_line(&line) {
                prop_assert!(v.is_finite());
            }
        }
    }
}
