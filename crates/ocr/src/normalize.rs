//! Repairs characters and digit groupings that OCR commonly gets wrong on
//! printed receipts, before any price detection runs.

re!(re_slash_decimal, r"(\d)/(\d)");
// Horizontal whitespace only: a line break never joins two lines into a price.
re!(re_space_decimal, r"(\d)[^\S\r\n]+(\d{2})");

/// Normalize raw OCR text.
///
/// * typographic single quotes become `'`
/// * `°` becomes `0`, `~` becomes `-`
/// * `3/19` becomes `3.19` (a printed period read as a slash)
/// * `11 38` becomes `11.38` (a printed period read as whitespace)
///
/// The last rewrite also fires on unrelated number pairs such as a quantity
/// followed by a two-digit code (`2 12` becomes `2.12`). That misfire is
/// accepted; receipts print far more prices than such pairs.
///
/// The digit rewrites are repeated until nothing matches, so the result is a
/// fixed point: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(raw: &str) -> String {
    let text: String = raw
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            '\u{00B0}' => '0',
            '~' => '-',
            other => other,
        })
        .collect();

    let text = join_decimal(re_slash_decimal(), text);
    join_decimal(re_space_decimal(), text)
}

fn join_decimal(re: &regex::Regex, mut text: String) -> String {
    // Each pass removes at least one separator, so this terminates.
    while re.is_match(&text) {
        text = re.replace_all(&text, "${1}.${2}").into_owned();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curly_quotes_become_apostrophes() {
        assert_eq!(normalize("Lay\u{2019}s chips"), "Lay's chips");
        assert_eq!(normalize("\u{2018}t Kaashuis"), "'t Kaashuis");
    }

    #[test]
    fn degree_sign_reads_as_zero() {
        assert_eq!(normalize("Bananen 1.5\u{00B0}"), "Bananen 1.50");
    }

    #[test]
    fn tilde_reads_as_hyphen() {
        assert_eq!(normalize("Korting ~0.50"), "Korting -0.50");
    }

    #[test]
    fn slash_between_digits_is_decimal_point() {
        assert_eq!(normalize("Brood 3/19"), "Brood 3.19");
        assert_eq!(normalize("half/vol"), "half/vol");
    }

    #[test]
    fn space_before_two_digits_is_decimal_point() {
        assert_eq!(normalize("Kaas 11 38"), "Kaas 11.38");
        assert_eq!(normalize("Kaas 11   38"), "Kaas 11.38");
    }

    #[test]
    fn line_breaks_are_never_joined() {
        assert_eq!(normalize("Melk 1\n38 Kaas"), "Melk 1\n38 Kaas");
    }

    #[test]
    fn known_false_positive_quantity_then_code() {
        // A quantity followed by a two-digit code is read as a price. This is
        // the accepted cost of repairing `11 38`-style prices.
        assert_eq!(normalize("Eieren 2 12 st"), "Eieren 2.12 st");
    }

    #[test]
    fn chained_groups_reach_a_fixed_point() {
        assert_eq!(normalize("1/2/3"), "1.2.3");
        assert_eq!(normalize("1 23 45"), "1.23.45");
        // A single replace pass would stop at "Item 2.12 34"; repeating joins
        // the trailing group too, so extraction names this line "Item .34"
        // instead of "Item 34".
        assert_eq!(normalize("Item 2 12 34"), "Item 2.12.34");
        let items = crate::extract("Item 2 12 34");
        assert_eq!(items[0].source_name, "Item .34");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "Melk\n1.38\n\nKaas\n3.19",
            "Brood 3/19",
            "1/2/3 and 4 56 78",
            "Lay\u{2019}s 2 99 ~1 00\u{00B0}",
            "",
            "   \n\t\n",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn plain_text_is_unchanged() {
        let s = "ALBERT HEIJN\nMelk 1.38\nTotaal 1.38";
        assert_eq!(normalize(s), s);
    }
}
