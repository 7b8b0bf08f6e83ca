use crate::error::FetchError;
use crate::record::Record;

/// Width of the keyword column in a GenBank flat file. Continuation lines are indented by this
/// many spaces.
const KEYWORD_WIDTH: usize = 12;

/// The section the parser is currently inside of. Only sections which contribute to a `Record`
/// are tracked; everything else (REFERENCE, FEATURES, ...) is skipped.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Definition,
    Origin,
    Other,
}

/// Fields collected for the record currently being parsed.
struct Partial {
    name: String,
    accession: Option<String>,
    version: Option<String>,
    definition: String,
    sequence: String,
    section: Section,
}

impl Partial {
    fn from_locus(line: &str) -> Option<Self> {
        let name = line.split_whitespace().nth(1)?;

        Some(Partial {
            name: name.to_string(),
            accession: None,
            version: None,
            definition: String::new(),
            sequence: String::new(),
            section: Section::Other,
        })
    }

    /// Handles a line starting with a keyword, e.g. `DEFINITION  ...`.
    fn keyword_line(&mut self, keyword: &str, value: &str) {
        self.section = match keyword {
            "DEFINITION" => {
                self.definition.push_str(value);
                Section::Definition
            }
            "ACCESSION" => {
                self.accession = first_token(value);
                Section::Other
            }
            "VERSION" => {
                self.version = first_token(value);
                Section::Other
            }
            "ORIGIN" => Section::Origin,
            _ => Section::Other,
        }
    }

    /// Handles an indented line belonging to the current section.
    fn continuation_line(&mut self, line: &str) {
        match self.section {
            Section::Definition => {
                self.definition.push(' ');
                self.definition.push_str(line.trim());
            }
            Section::Origin => {
                // sequence lines are `   61 mkvlaagt ...`: drop the position and the spacing
                self.sequence.extend(
                    line.chars()
                        .filter(|c| !c.is_ascii_digit() && !c.is_whitespace())
                        .map(|c| c.to_ascii_uppercase()),
                );
            }
            Section::Other => (),
        }
    }

    fn finish(self) -> Record {
        let id = self
            .version
            .or(self.accession)
            .unwrap_or_else(|| self.name.clone());

        let description = match self.definition.strip_suffix('.') {
            Some(v) => v.to_string(),
            None => self.definition,
        };

        Record {
            id,
            name: self.name,
            description,
            sequence: self.sequence,
        }
    }
}

fn first_token(value: &str) -> Option<String> {
    value.split_whitespace().next().map(str::to_string)
}

/// Splits a keyword line into its keyword and the value following the keyword column.
fn split_keyword(line: &str) -> (&str, &str) {
    let keyword = line.split_whitespace().next().unwrap_or_default();
    let value = if keyword.len() < KEYWORD_WIDTH {
        line.get(KEYWORD_WIDTH..).unwrap_or_default()
    } else {
        &line[keyword.len()..]
    };
    (keyword, value.trim())
}

/// Parses a GenBank flat file payload containing any number of records.
///
/// # Errors
///
/// Returns `FetchError::Malformed` if:
/// * non-blank text appears outside of a `LOCUS ... //` block
/// * a `LOCUS` line has no name
/// * the payload ends inside a record (missing `//`)
pub fn parse_genbank(payload: &str) -> Result<Vec<Record>, FetchError> {
    let mut records = Vec::new();
    let mut current: Option<Partial> = None;

    for (index, line) in payload.lines().enumerate() {
        let line_no = index + 1;
        let malformed = |reason: &str| FetchError::Malformed {
            record: records.len() + 1,
            reason: format!("line {line_no}: {reason}"),
        };

        match current.as_mut() {
            None => {
                if line.trim().is_empty() {
                    continue;
                }
                if !line.starts_with("LOCUS") {
                    return Err(malformed("expected a LOCUS line"));
                }
                current = Some(
                    Partial::from_locus(line).ok_or_else(|| malformed("LOCUS line has no name"))?,
                );
            }
            Some(partial) => {
                if line.starts_with("//") {
                    if let Some(partial) = current.take() {
                        records.push(partial.finish());
                    }
                } else if line.starts_with("LOCUS") {
                    return Err(malformed("LOCUS line inside an unterminated record"));
                } else if line.starts_with(' ') {
                    partial.continuation_line(line);
                } else if !line.trim().is_empty() {
                    let (keyword, value) = split_keyword(line);
                    partial.keyword_line(keyword, value);
                }
            }
        }
    }

    if current.is_some() {
        return Err(FetchError::Malformed {
            record: records.len() + 1,
            reason: "payload ended before the `//` record terminator".to_string(),
        });
    }

    Ok(records)
}
