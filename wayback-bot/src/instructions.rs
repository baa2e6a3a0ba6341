//! Instruction parsing: which archive operation a mention asks for.
//!
//! Priority order, matching the bot's documented behaviour: "save" beats an
//! embedded `MM-DD-YYYY` date, which beats "oldest"; anything else falls
//! through to the most recent snapshot. Keyword checks are plain substring
//! matches on the raw text.

use regex::Regex;
use std::sync::LazyLock;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{2}-[0-9]{2}-[0-9]{4})").expect("date pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Save,
    Nearest {
        month: u32,
        day: u32,
        year: i32,
        /// The date as written, echoed back in the reply.
        raw: String,
    },
    Oldest,
    Newest,
}

impl Instruction {
    pub fn parse(text: &str) -> Instruction {
        if text.contains("save") {
            return Instruction::Save;
        }
        if let Some(m) = DATE_RE.find(text) {
            // only the first date in the text is considered
            let raw = m.as_str().to_string();
            let mut parts = raw.split('-');
            if let (Some(mo), Some(d), Some(y)) = (parts.next(), parts.next(), parts.next()) {
                if let (Ok(month), Ok(day), Ok(year)) = (mo.parse(), d.parse(), y.parse()) {
                    return Instruction::Nearest {
                        month,
                        day,
                        year,
                        raw,
                    };
                }
            }
        }
        if text.contains("oldest") {
            return Instruction::Oldest;
        }
        Instruction::Newest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_keyword_selects_save() {
        assert_eq!(
            Instruction::parse("@searchwayback please save this https://example.com"),
            Instruction::Save
        );
    }

    #[test]
    fn date_selects_nearest_with_exact_parts() {
        let got = Instruction::parse("@searchwayback 04-15-2020 https://example.com");
        assert_eq!(
            got,
            Instruction::Nearest {
                month: 4,
                day: 15,
                year: 2020,
                raw: "04-15-2020".to_string(),
            }
        );
    }

    #[test]
    fn save_wins_over_date_and_oldest() {
        assert_eq!(
            Instruction::parse("save the oldest from 04-15-2020"),
            Instruction::Save
        );
    }

    #[test]
    fn first_date_wins() {
        let got = Instruction::parse("between 01-02-2019 and 03-04-2021");
        assert!(matches!(got, Instruction::Nearest { month: 1, day: 2, year: 2019, .. }));
    }

    #[test]
    fn oldest_keyword_selects_oldest() {
        assert_eq!(
            Instruction::parse("@searchwayback oldest please"),
            Instruction::Oldest
        );
    }

    #[test]
    fn default_is_newest() {
        assert_eq!(
            Instruction::parse("@searchwayback https://example.com"),
            Instruction::Newest
        );
        assert_eq!(Instruction::parse(""), Instruction::Newest);
    }
}
