/// Renders `n` with its English ordinal suffix: 1st, 2nd, 3rd, 4th, 11th, 21st.
pub fn ordinal(n: u32) -> String {
    let suffix = if (11..=13).contains(&(n % 100)) {
        "th"
    } else {
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{}{}", n, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_first_ten() {
        let expected = ["1st", "2nd", "3rd", "4th", "5th", "6th", "7th", "8th", "9th", "10th"];
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(ordinal(i as u32 + 1), *want);
        }
    }

    #[test]
    fn test_ordinal_teens_use_th() {
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(111), "111th");
        assert_eq!(ordinal(112), "112th");
        assert_eq!(ordinal(1013), "1013th");
    }

    #[test]
    fn test_ordinal_large_numbers() {
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(23), "23rd");
        assert_eq!(ordinal(101), "101st");
        assert_eq!(ordinal(123), "123rd");
        assert_eq!(ordinal(1000), "1000th");
    }

    #[test]
    fn test_ordinal_suffix_rule_holds_for_range() {
        for n in 1..=10_000u32 {
            let text = ordinal(n);
            let suffix = &text[text.len() - 2..];
            let expected = match (n % 100, n % 10) {
                (11..=13, _) => "th",
                (_, 1) => "st",
                (_, 2) => "nd",
                (_, 3) => "rd",
                _ => "th",
            };
            assert_eq!(suffix, expected, "wrong suffix for {}", n);
            assert_eq!(&text[..text.len() - 2], n.to_string());
        }
    }
}
