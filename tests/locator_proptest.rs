//! Property-based tests for trace decoding and error localization
//!
//! Generated traces are well formed by construction: every rule index fits
//! the rule table and every record satisfies `start <= end <= input length`.

use pegview::pegview::highlight::HighlightRange;
use pegview::pegview::locator::{expand_token, locate_error};
use pegview::pegview::trace::{decode, RuleTable};
use pegview::pegview::trace_render::render_trace;
use proptest::prelude::*;
use rstest::rstest;

const RULES: usize = 4;

fn rule_table() -> RuleTable {
    RuleTable::new(["alpha", "beta", "gamma", "delta"])
}

/// Input text plus a flat trace that is valid for it
fn input_and_trace() -> impl Strategy<Value = (String, Vec<i64>)> {
    "[a-z_ +\n]{0,24}".prop_flat_map(|input| {
        let len = input.chars().count() as i64;
        let record = (
            -(RULES as i64)..(RULES as i64),
            0i64..6,
            0..=len,
            0..=len,
        )
            .prop_map(|(rule_ref, depth, a, b)| vec![rule_ref, depth, a.min(b), a.max(b)]);
        (
            Just(input),
            prop::collection::vec(record, 0..16).prop_map(|records| records.concat()),
        )
    })
}

proptest! {
    #[test]
    fn decode_keeps_one_record_per_group((_input, flat) in input_and_trace()) {
        let trace = decode(&flat, &rule_table()).unwrap();
        prop_assert_eq!(trace.len(), flat.len() / 4);
        for (record, chunk) in trace.iter().zip(flat.chunks(4)) {
            prop_assert_eq!(record.ok(), chunk[0] >= 0);
        }
    }

    #[test]
    fn decode_rejects_partial_records(flat in prop::collection::vec(0i64..2, 1..40)) {
        prop_assume!(flat.len() % 4 != 0);
        prop_assert!(decode(&flat, &rule_table()).is_err());
    }

    #[test]
    fn locator_is_total((input, flat) in input_and_trace()) {
        let trace = decode(&flat, &rule_table()).unwrap();
        if let Some(span) = locate_error(&trace, &input) {
            prop_assert!(span.start <= span.end);
        }
    }

    #[test]
    fn short_top_level_match_reports_the_tail(
        (input, flat) in input_and_trace(),
        cut in 0usize..24,
    ) {
        let len = input.chars().count();
        prop_assume!(cut < len);

        // Keep only records that stay within the cut, then add the top-level match.
        let mut kept: Vec<i64> = flat
            .chunks(4)
            .filter(|c| !(c[1] == 0 && c[0] >= 0) && (c[3] as usize) <= cut)
            .flatten()
            .copied()
            .collect();
        kept.extend([0, 0, 0, cut as i64]);

        let trace = decode(&kept, &rule_table()).unwrap();
        prop_assert_eq!(
            locate_error(&trace, &input),
            Some(HighlightRange::new(cut, len - 1))
        );
    }

    #[test]
    fn trace_log_has_a_line_per_record_at_least((input, flat) in input_and_trace()) {
        let trace = decode(&flat, &rule_table()).unwrap();
        let rendering = render_trace(&input, &rule_table(), &trace);
        prop_assert!(rendering.text.lines().count() >= trace.len());
        prop_assert_eq!(rendering.failures.len(), trace.failures().count());
    }
}

#[rstest]
#[case::identifier_from_start("foo_bar!", 0, HighlightRange::new(0, 6))]
#[case::identifier_from_middle("foo_bar!", 4, HighlightRange::new(4, 6))]
#[case::dollar_and_digits("x = $v1;", 4, HighlightRange::new(4, 6))]
#[case::punctuation("a+b", 1, HighlightRange::point(1))]
#[case::space("a b", 1, HighlightRange::point(1))]
#[case::newline("ab\ncd", 2, HighlightRange::new(1, 3))]
#[case::newline_at_start("\nab", 0, HighlightRange::new(0, 1))]
#[case::past_the_end("abc", 7, HighlightRange::point(7))]
fn token_expansion(#[case] input: &str, #[case] pos: usize, #[case] expected: HighlightRange) {
    let chars: Vec<char> = input.chars().collect();
    assert_eq!(expand_token(&chars, pos), expected);
}
