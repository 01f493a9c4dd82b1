//! Paper records produced by extraction and aggregation
//!
//! Missing data is `None` everywhere in here. The literal `"N/A"` only
//! appears when a record is rendered as a report row.

/// Placeholder for an absent field in rendered output.
pub const NOT_AVAILABLE: &str = "N/A";

/// Separator for list-valued report columns.
const LIST_SEPARATOR: &str = "; ";

/// Report column headers, in row order.
pub const COLUMNS: [&str; 6] = [
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];

/// One author of a paper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorRecord {
    /// "ForeName LastName", or whichever part exists
    pub name: Option<String>,
    /// Affiliation strings in document order, never blank
    pub affiliations: Vec<String>,
}

/// Metadata extracted from one `<PubmedArticle>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    /// `YYYY[-MM[-DD]]`, or the verbatim MedlineDate
    pub publication_date: Option<String>,
    pub authors: Vec<AuthorRecord>,
    /// First email-like token found in any affiliation
    pub corresponding_email: Option<String>,
}

impl PaperRecord {
    /// All affiliation strings, author by author, in document order.
    pub fn affiliations(&self) -> impl Iterator<Item = &str> {
        self.authors
            .iter()
            .flat_map(|a| a.affiliations.iter().map(String::as_str))
    }
}

/// A paper with at least one non-academic author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub publication_date: Option<String>,
    /// Insertion order, no duplicates
    pub non_academic_authors: Vec<String>,
    /// Insertion order, no duplicates
    pub company_affiliations: Vec<String>,
    pub corresponding_email: Option<String>,
}

impl OutputRecord {
    /// Render as the six report columns (see [`COLUMNS`]).
    pub fn to_row(&self) -> [String; 6] {
        [
            or_na(self.id.as_deref()),
            or_na(self.title.as_deref()),
            or_na(self.publication_date.as_deref()),
            join_or_na(&self.non_academic_authors),
            join_or_na(&self.company_affiliations),
            or_na(self.corresponding_email.as_deref()),
        ]
    }
}

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

fn join_or_na(values: &[String]) -> String {
    if values.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        values.join(LIST_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_renders_all_na() {
        let row = OutputRecord::default().to_row();
        assert!(row.iter().all(|cell| cell == NOT_AVAILABLE));
    }

    #[test]
    fn lists_are_semicolon_joined() {
        let record = OutputRecord {
            id: Some("123".to_string()),
            title: Some("A title".to_string()),
            publication_date: Some("2024-03".to_string()),
            non_academic_authors: vec!["Jane Doe".to_string(), "John Roe".to_string()],
            company_affiliations: vec!["Acme Pharma Inc.".to_string()],
            corresponding_email: Some("jane@acme.com".to_string()),
        };
        assert_eq!(
            record.to_row(),
            [
                "123",
                "A title",
                "2024-03",
                "Jane Doe; John Roe",
                "Acme Pharma Inc.",
                "jane@acme.com",
            ]
        );
    }

    #[test]
    fn affiliations_flatten_in_author_order() {
        let paper = PaperRecord {
            authors: vec![
                AuthorRecord {
                    name: Some("A".to_string()),
                    affiliations: vec!["one".to_string(), "two".to_string()],
                },
                AuthorRecord {
                    name: None,
                    affiliations: vec!["three".to_string()],
                },
            ],
            ..Default::default()
        };
        let all: Vec<&str> = paper.affiliations().collect();
        assert_eq!(all, ["one", "two", "three"]);
    }

    #[test]
    fn columns_match_row_width() {
        assert_eq!(COLUMNS.len(), OutputRecord::default().to_row().len());
    }
}
