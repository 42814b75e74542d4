use std::collections::BTreeMap;

use tracing::{debug, error, info, warn};

use crate::core::error::{Result, SlipError};
use crate::core::model::Street;
use crate::core::stats::within;
use crate::parser::grouper::{Row, RowKey};
use crate::parser::known_streets::KnownStreets;
use crate::parser::shape::{parse_row, RowParse};

/// Words whose presence marks a row as a street heading.
pub const HEADING_WORDS: [&str; 8] = [
    "Street", "Court", "Avenue", "North", "South", "Place", "East", "West",
];

/// A row taller than this multiple of the modal height is a heading.
pub const HEADING_HEIGHT_RATIO: f64 = 1.3;

/// Relative height deviation still accepted for a data row.
pub const ROW_HEIGHT_TOLERANCE: f64 = 0.2;

pub const DEFAULT_MAX_FAILURE_RATIO: f64 = 0.15;

#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Keep going even when too many rows were rejected.
    pub force: bool,
    pub max_failure_ratio: f64,
    pub known_streets: Option<KnownStreets>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            force: false,
            max_failure_ratio: DEFAULT_MAX_FAILURE_RATIO,
            known_streets: None,
        }
    }
}

/// Row tallies for one column plus the annotation of every rejected row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub successes: usize,
    pub failures: usize,
    pub annotations: BTreeMap<RowKey, String>,
}

impl ParseReport {
    fn reject(&mut self, key: RowKey, reason: &str) {
        debug!(row = %key, reason, "rejected row");
        self.annotations
            .insert(key, format!("{} {}", self.failures, reason));
        self.failures += 1;
    }

    pub fn failure_ratio(&self) -> f64 {
        let total = self.successes + self.failures;
        if total == 0 {
            0.0
        } else {
            self.failures as f64 / total as f64
        }
    }

    /// Fails once the rejected share passes `options.max_failure_ratio`,
    /// unless `options.force` is set.
    pub fn enforce(&self, page_id: &str, options: &ParseOptions) -> Result<()> {
        if self.failures == 0 {
            return Ok(());
        }
        warn!(
            "{} ({:.1}%) rejected OCR groups",
            self.failures,
            100.0 * self.failure_ratio()
        );
        if !options.force && self.failure_ratio() > options.max_failure_ratio {
            error!("{page_id}: too many OCR errors, aborting");
            return Err(SlipError::ErrorRateExceeded {
                failures: self.failures,
                successes: self.successes,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParserState {
    AwaitingHeader,
    InStreet(Street),
}

/// Streets reconstructed from one column, in document order.
#[derive(Debug, Clone)]
pub struct ColumnParse {
    pub streets: Vec<Street>,
    pub report: ParseReport,
}

/// Advances row by row through a column, opening a street at each heading
/// and attaching address pairs to the open street.
pub struct StreetParser<'a> {
    page_id: String,
    modal_height: f64,
    known_streets: Option<&'a KnownStreets>,
    state: ParserState,
    streets: Vec<Street>,
    report: ParseReport,
}

impl<'a> StreetParser<'a> {
    /// Starts inside `continuation` when the previous column ended mid-street.
    pub fn new(page_id: impl Into<String>, modal_height: i32, continuation: Option<&str>) -> Self {
        let page_id = page_id.into();
        let state = match continuation {
            Some(name) => {
                info!("continuing with {name}");
                ParserState::InStreet(Street::new(name, page_id.clone()))
            }
            None => ParserState::AwaitingHeader,
        };
        Self {
            page_id,
            modal_height: f64::from(modal_height),
            known_streets: None,
            state,
            streets: Vec::new(),
            report: ParseReport::default(),
        }
    }

    pub fn with_known_streets(mut self, known_streets: &'a KnownStreets) -> Self {
        self.known_streets = Some(known_streets);
        self
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    fn is_heading(&self, row: &Row, text: &str) -> bool {
        f64::from(row.height) > HEADING_HEIGHT_RATIO * self.modal_height
            || HEADING_WORDS.iter().any(|word| text.contains(word))
    }

    fn open_street(&mut self, text: String) {
        let name = match self.known_streets {
            Some(known) => known.normalize(&text),
            None => text,
        };
        debug!(street = %name, "street heading");
        let previous = std::mem::replace(
            &mut self.state,
            ParserState::InStreet(Street::new(name, self.page_id.clone())),
        );
        if let ParserState::InStreet(street) = previous {
            self.streets.push(street);
        }
    }

    pub fn feed(&mut self, row: &Row) {
        let text = row.combined_text();
        if self.is_heading(row, &text) {
            self.open_street(text);
            return;
        }

        let data_height = within(
            f64::from(row.height),
            ROW_HEIGHT_TOLERANCE,
            self.modal_height,
        );
        let street = match &mut self.state {
            ParserState::InStreet(street) if data_height => street,
            _ => {
                self.report.reject(row.key, "bad row height");
                return;
            }
        };

        match parse_row(&row.tokens) {
            RowParse::Heading => self.report.successes += 1,
            RowParse::Pairs(pairs) => {
                for pair in pairs {
                    street.push(pair);
                }
                self.report.successes += 1;
            }
            RowParse::Unparsable => {
                debug!(row = %row.key, "unparsable row: {text}");
                self.report.reject(row.key, "unparsable");
            }
        }
    }

    pub fn finish(mut self) -> ColumnParse {
        if let ParserState::InStreet(street) = self.state {
            self.streets.push(street);
        }
        ColumnParse {
            streets: self.streets,
            report: self.report,
        }
    }
}

/// Runs a fresh parser over `rows`.
pub fn parse_rows(
    rows: &[Row],
    page_id: &str,
    modal_height: i32,
    continuation: Option<&str>,
    known_streets: Option<&KnownStreets>,
) -> ColumnParse {
    let mut parser = StreetParser::new(page_id, modal_height, continuation);
    if let Some(known) = known_streets {
        parser = parser.with_known_streets(known);
    }
    for row in rows {
        parser.feed(row);
    }
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::BBox;
    use crate::core::model::Token;
    use pretty_assertions::assert_eq;

    fn row(line: u32, height: i32, texts: &[&str]) -> Row {
        let tokens = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Token {
                text: text.to_string(),
                conf: 90.0,
                bbox: BBox::from_size(i as i32 * 60, line as i32 * 50, 50, height),
                block_num: 1,
                par_num: 1,
                line_num: line,
                flag: false,
            })
            .collect();
        Row {
            key: RowKey {
                block_num: 1,
                par_num: 1,
                line_num: line,
            },
            height,
            tokens,
        }
    }

    fn names(parse: &ColumnParse) -> Vec<&str> {
        parse.streets.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn headings_open_streets() {
        let rows = vec![
            row(1, 60, &["Main", "Street"]),
            row(2, 40, &["101", "17"]),
            row(3, 40, &["103", "19"]),
            row(4, 40, &["Elm", "Street"]),
            row(5, 40, &["2", "4"]),
        ];
        let parse = parse_rows(&rows, "p1", 40, None, None);
        assert_eq!(names(&parse), vec!["Main Street", "Elm Street"]);
        assert_eq!(parse.streets[0].pairs.len(), 2);
        assert_eq!(parse.streets[1].pairs.len(), 1);
        assert_eq!(parse.report.successes, 3);
        assert_eq!(parse.report.failures, 0);
    }

    #[test]
    fn tall_row_is_a_heading_without_marker_words() {
        let parse = parse_rows(&[row(1, 55, &["Broadway"])], "p1", 40, None, None);
        assert_eq!(names(&parse), vec!["Broadway"]);
    }

    #[test]
    fn continuation_seeds_the_first_street() {
        let rows = vec![row(1, 40, &["105", "21"])];
        let parse = parse_rows(&rows, "p1", 40, Some("Main Street"), None);
        assert_eq!(names(&parse), vec!["Main Street"]);
        assert_eq!(parse.streets[0].pairs[0].new.text, "105");
        assert_eq!(parse.streets[0].page_id, "p1");
    }

    #[test]
    fn data_before_any_heading_is_rejected() {
        let rows = vec![row(1, 40, &["101", "17"]), row(2, 60, &["Oak", "Place"])];
        let parse = parse_rows(&rows, "p1", 40, None, None);
        assert_eq!(names(&parse), vec!["Oak Place"]);
        assert_eq!(parse.report.failures, 1);
        assert_eq!(
            parse.report.annotations.values().next().map(String::as_str),
            Some("0 bad row height")
        );
    }

    #[test]
    fn rejected_rows_are_annotated_with_running_index() {
        let rows = vec![
            row(1, 60, &["Main", "Street"]),
            row(2, 40, &["1", "2", "3", "4", "5", "6", "7"]),
            row(3, 20, &["101", "17"]),
            row(4, 40, &["Odd"]),
        ];
        let parse = parse_rows(&rows, "p1", 40, None, None);
        let notes: Vec<&str> = parse.report.annotations.values().map(String::as_str).collect();
        assert_eq!(notes, vec!["0 unparsable", "1 bad row height"]);
        assert_eq!(parse.report.successes, 1);
        assert!(parse.streets[0].pairs.is_empty());
    }

    #[test]
    fn state_follows_rows() {
        let mut parser = StreetParser::new("p1", 40, None);
        assert_eq!(parser.state(), &ParserState::AwaitingHeader);
        parser.feed(&row(1, 40, &["Court", "Square"]));
        assert!(matches!(parser.state(), ParserState::InStreet(s) if s.name == "Court Square"));
    }

    #[test]
    fn known_streets_normalize_headings() {
        let known = KnownStreets::from_pairs([("Main Street", "Main Street")]);
        let rows = vec![row(1, 60, &["Main", "Streot"])];
        let parse = parse_rows(&rows, "p1", 40, None, Some(&known));
        assert_eq!(names(&parse), vec!["Main Street"]);
    }

    #[test]
    fn error_gate_respects_force() {
        let report = ParseReport {
            successes: 5,
            failures: 2,
            annotations: BTreeMap::new(),
        };
        let strict = ParseOptions::default();
        assert!(matches!(
            report.enforce("p1", &strict),
            Err(SlipError::ErrorRateExceeded { failures: 2, successes: 5 })
        ));
        let forced = ParseOptions {
            force: true,
            ..ParseOptions::default()
        };
        assert!(report.enforce("p1", &forced).is_ok());

        let mild = ParseReport {
            successes: 17,
            failures: 3,
            annotations: BTreeMap::new(),
        };
        assert!(mild.enforce("p1", &strict).is_ok());
    }
}
