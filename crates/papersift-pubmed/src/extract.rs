//! PubMed EFetch XML extraction using quick-xml
//!
//! Streaming extraction of the fields the affiliation filter needs from a
//! `<PubmedArticleSet>` document. Missing elements degrade to `None` or an
//! empty list; only markup that is not well-formed is an error.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::ExtractError;
use crate::heuristics::first_email;
use crate::record::{AuthorRecord, PaperRecord};

/// Extract every `<PubmedArticle>` in `xml`, in document order.
///
/// Empty or whitespace-only input yields no records.
pub fn parse_pubmed_xml(xml: &str) -> Result<Vec<PaperRecord>, ExtractError> {
    if xml.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = Reader::from_str(xml);
    let mut papers = Vec::new();
    let mut buf = Vec::new();
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut saw_element = false;

    loop {
        match next_event(&mut reader, &mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"PubmedArticle" => {
                saw_element = true;
                papers.push(parse_article(&mut reader)?);
            }
            Event::Start(e) => {
                saw_element = true;
                open.push(e.name().as_ref().to_vec());
            }
            Event::End(_) => {
                open.pop();
            }
            Event::Empty(e) => {
                saw_element = true;
                if e.name().as_ref() == b"PubmedArticle" {
                    papers.push(PaperRecord::default());
                }
            }
            Event::Text(t) if open.is_empty() => {
                let text = t.unescape().map_err(|e| malformed(&reader, e))?;
                if !text.trim().is_empty() {
                    return Err(ExtractError::malformed(
                        position(&reader),
                        "text outside of the root element",
                    ));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(name) = open.last() {
        return Err(ExtractError::truncated(position(&reader), name));
    }
    if !saw_element {
        return Err(ExtractError::malformed(
            position(&reader),
            "no root element",
        ));
    }

    log::debug!("Extracted {} articles", papers.len());
    Ok(papers)
}

fn parse_article(reader: &mut Reader<&[u8]>) -> Result<PaperRecord, ExtractError> {
    let mut paper = PaperRecord::default();
    let mut buf = Vec::new();

    loop {
        match next_event(reader, &mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"PMID" => {
                    let pmid = read_text(reader, b"PMID")?;
                    if paper.id.is_none() {
                        paper.id = non_blank(pmid.trim());
                    }
                }
                b"ArticleTitle" => {
                    let title = read_text(reader, b"ArticleTitle")?;
                    if paper.title.is_none() {
                        paper.title = non_blank(title.trim());
                    }
                }
                b"PubDate" => {
                    let date = parse_pub_date(reader)?;
                    if paper.publication_date.is_none() {
                        paper.publication_date = date;
                    }
                }
                b"AuthorList" => {
                    let authors = parse_author_list(reader)?;
                    if paper.authors.is_empty() {
                        paper.authors = authors;
                    }
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"PubmedArticle" => break,
            Event::Eof => {
                return Err(ExtractError::truncated(
                    position(reader),
                    b"PubmedArticle",
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    paper.corresponding_email = first_email(paper.affiliations());
    log::debug!(
        "Article {}: {} authors, email {}",
        paper.id.as_deref().unwrap_or("?"),
        paper.authors.len(),
        if paper.corresponding_email.is_some() {
            "found"
        } else {
            "absent"
        }
    );

    Ok(paper)
}

/// Parts of a `<PubDate>` element.
#[derive(Debug, Default)]
struct PubDate {
    year: Option<String>,
    month: Option<String>,
    day: Option<String>,
    medline: Option<String>,
}

impl PubDate {
    /// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`; MedlineDate verbatim without a year.
    fn render(self) -> Option<String> {
        let Some(year) = self.year else {
            return self.medline;
        };
        let mut out = year;
        if let Some(month) = self.month {
            out.push('-');
            out.push_str(&normalize_month(&month));
            if let Some(day) = self.day {
                out.push('-');
                out.push_str(&zero_pad(&day));
            }
        }
        Some(out)
    }
}

fn parse_pub_date(reader: &mut Reader<&[u8]>) -> Result<Option<String>, ExtractError> {
    let mut date = PubDate::default();
    let mut buf = Vec::new();

    loop {
        match next_event(reader, &mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Year" => date.year = non_blank(read_text(reader, b"Year")?.trim()),
                b"Month" => date.month = non_blank(read_text(reader, b"Month")?.trim()),
                b"Day" => date.day = non_blank(read_text(reader, b"Day")?.trim()),
                b"MedlineDate" => {
                    date.medline = non_blank(read_text(reader, b"MedlineDate")?.trim())
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"PubDate" => break,
            Event::Eof => return Err(ExtractError::truncated(position(reader), b"PubDate")),
            _ => {}
        }
        buf.clear();
    }

    Ok(date.render())
}

/// `"Mar"`/`"march"`/`"3"` -> `"03"`. Unknown text is kept as-is.
fn normalize_month(s: &str) -> String {
    if s.bytes().all(|b| b.is_ascii_digit()) {
        return zero_pad(s);
    }
    let prefix: String = s.chars().take(3).collect::<String>().to_lowercase();
    let number = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return s.to_string(),
    };
    format!("{number:02}")
}

fn zero_pad(s: &str) -> String {
    match s.parse::<u32>() {
        Ok(n) => format!("{n:02}"),
        Err(_) => s.to_string(),
    }
}

fn parse_author_list(reader: &mut Reader<&[u8]>) -> Result<Vec<AuthorRecord>, ExtractError> {
    let mut authors = Vec::new();
    let mut buf = Vec::new();

    loop {
        match next_event(reader, &mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"Author" => {
                authors.push(parse_author(reader)?);
            }
            Event::Empty(e) if e.name().as_ref() == b"Author" => {
                authors.push(AuthorRecord::default());
            }
            Event::End(e) if e.name().as_ref() == b"AuthorList" => break,
            Event::Eof => {
                return Err(ExtractError::truncated(
                    position(reader),
                    b"AuthorList",
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(authors)
}

fn parse_author(reader: &mut Reader<&[u8]>) -> Result<AuthorRecord, ExtractError> {
    let mut author = AuthorRecord::default();
    let mut fore_name = None;
    let mut last_name = None;
    let mut buf = Vec::new();

    loop {
        match next_event(reader, &mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"ForeName" => fore_name = non_blank(read_text(reader, b"ForeName")?.trim()),
                b"LastName" => last_name = non_blank(read_text(reader, b"LastName")?.trim()),
                b"AffiliationInfo" => {
                    if let Some(aff) = parse_affiliation_info(reader)? {
                        author.affiliations.push(aff);
                    }
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"Author" => break,
            Event::Eof => return Err(ExtractError::truncated(position(reader), b"Author")),
            _ => {}
        }
        buf.clear();
    }

    let parts: Vec<String> = [fore_name, last_name].into_iter().flatten().collect();
    author.name = (!parts.is_empty()).then(|| parts.join(" "));

    Ok(author)
}

/// Affiliation text of one `<AffiliationInfo>`, verbatim; `None` if blank.
fn parse_affiliation_info(reader: &mut Reader<&[u8]>) -> Result<Option<String>, ExtractError> {
    let mut affiliation = None;
    let mut buf = Vec::new();

    loop {
        match next_event(reader, &mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"Affiliation" => {
                let text = read_text(reader, b"Affiliation")?;
                if affiliation.is_none() && !text.trim().is_empty() {
                    affiliation = Some(text);
                }
            }
            Event::End(e) if e.name().as_ref() == b"AffiliationInfo" => break,
            Event::Eof => {
                return Err(ExtractError::truncated(
                    position(reader),
                    b"AffiliationInfo",
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(affiliation)
}

/// Text content of the element just opened, including nested inline markup
/// (`<i>`, `<sup>`, ...). Consumes through the matching end tag.
fn read_text(reader: &mut Reader<&[u8]>, end_tag: &[u8]) -> Result<String, ExtractError> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut depth = 1;

    loop {
        match next_event(reader, &mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape().map_err(|err| malformed(reader, err))?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Start(_) => depth += 1,
            Event::End(e) => {
                depth -= 1;
                if depth == 0 && e.name().as_ref() == end_tag {
                    break;
                }
            }
            Event::Eof => return Err(ExtractError::truncated(position(reader), end_tag)),
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

/// Next event, with reader errors mapped to [`ExtractError::Malformed`].
fn next_event<'b>(
    reader: &mut Reader<&[u8]>,
    buf: &'b mut Vec<u8>,
) -> Result<Event<'b>, ExtractError> {
    match reader.read_event_into(buf) {
        Ok(event) => Ok(event),
        Err(e) => Err(malformed(reader, e)),
    }
}

fn malformed(reader: &Reader<&[u8]>, err: impl std::fmt::Display) -> ExtractError {
    ExtractError::malformed(position(reader), err.to_string())
}

fn position(reader: &Reader<&[u8]>) -> u64 {
    reader.buffer_position() as u64
}

fn non_blank(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_XML: &str = r#"<?xml version="1.0"?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">12345</PMID>
      <Article PubModel="Print">
        <Journal>
          <JournalIssue CitedMedium="Internet">
            <PubDate>
              <Year>2024</Year>
              <Month>Jun</Month>
              <Day>5</Day>
            </PubDate>
          </JournalIssue>
        </Journal>
        <ArticleTitle>Test Article</ArticleTitle>
        <AuthorList CompleteYN="Y">
          <Author ValidYN="Y">
            <LastName>Smith</LastName>
            <ForeName>John</ForeName>
            <Initials>J</Initials>
            <AffiliationInfo>
              <Affiliation>Acme Pharma Inc., Boston, MA, USA. john.smith@acme.com</Affiliation>
            </AffiliationInfo>
            <AffiliationInfo>
              <Affiliation>Harvard Medical School, Boston, MA, USA</Affiliation>
            </AffiliationInfo>
          </Author>
          <Author ValidYN="Y">
            <LastName>Doe</LastName>
            <ForeName>Jane</ForeName>
          </Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
    <PubmedData>
      <ReferenceList>
        <Reference>
          <ArticleIdList>
            <ArticleId IdType="pubmed">99999</ArticleId>
          </ArticleIdList>
        </Reference>
      </ReferenceList>
    </PubmedData>
  </PubmedArticle>
</PubmedArticleSet>"#;

    fn single(xml: &str) -> PaperRecord {
        let mut papers = parse_pubmed_xml(xml).unwrap();
        assert_eq!(papers.len(), 1);
        papers.remove(0)
    }

    fn wrap(article_body: &str) -> String {
        format!("<PubmedArticleSet><PubmedArticle><MedlineCitation>{article_body}</MedlineCitation></PubmedArticle></PubmedArticleSet>")
    }

    #[test]
    fn parse_basic_article() {
        let paper = single(SAMPLE_XML);
        assert_eq!(paper.id.as_deref(), Some("12345"));
        assert_eq!(paper.title.as_deref(), Some("Test Article"));
        assert_eq!(paper.publication_date.as_deref(), Some("2024-06-05"));
        assert_eq!(
            paper.corresponding_email.as_deref(),
            Some("john.smith@acme.com")
        );
    }

    #[test]
    fn parse_authors_and_affiliations() {
        let paper = single(SAMPLE_XML);
        assert_eq!(paper.authors.len(), 2);
        assert_eq!(paper.authors[0].name.as_deref(), Some("John Smith"));
        assert_eq!(
            paper.authors[0].affiliations,
            [
                "Acme Pharma Inc., Boston, MA, USA. john.smith@acme.com",
                "Harvard Medical School, Boston, MA, USA",
            ]
        );
        assert_eq!(paper.authors[1].name.as_deref(), Some("Jane Doe"));
        assert!(paper.authors[1].affiliations.is_empty());
    }

    #[test]
    fn empty_input_is_no_records() {
        assert!(parse_pubmed_xml("").unwrap().is_empty());
        assert!(parse_pubmed_xml("  \n\t ").unwrap().is_empty());
    }

    #[test]
    fn empty_article_set() {
        let xml = r#"<?xml version="1.0"?><PubmedArticleSet></PubmedArticleSet>"#;
        assert!(parse_pubmed_xml(xml).unwrap().is_empty());
        assert!(parse_pubmed_xml("<PubmedArticleSet/>").unwrap().is_empty());
    }

    #[test]
    fn self_closing_article_is_counted() {
        let xml = "<PubmedArticleSet><PubmedArticle/>\
                   <PubmedArticle><MedlineCitation><PMID>7</PMID></MedlineCitation></PubmedArticle>\
                   </PubmedArticleSet>";
        let papers = parse_pubmed_xml(xml).unwrap();
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0], PaperRecord::default());
        assert_eq!(papers[1].id.as_deref(), Some("7"));
    }

    #[test]
    fn missing_title_is_none() {
        let paper = single(&wrap("<PMID>1</PMID><Article></Article>"));
        assert_eq!(paper.id.as_deref(), Some("1"));
        assert_eq!(paper.title, None);
        assert_eq!(paper.publication_date, None);
        assert_eq!(paper.corresponding_email, None);
        assert!(paper.authors.is_empty());
    }

    #[test]
    fn empty_title_is_none() {
        let paper = single(&wrap("<Article><ArticleTitle>  </ArticleTitle></Article>"));
        assert_eq!(paper.id, None);
        assert_eq!(paper.title, None);
    }

    #[test]
    fn title_keeps_inline_markup_text() {
        let paper = single(&wrap(
            "<Article><ArticleTitle>Role of <i>TP53</i> in CO<sub>2</sub> sensing &amp; repair.</ArticleTitle></Article>",
        ));
        assert_eq!(
            paper.title.as_deref(),
            Some("Role of TP53 in CO2 sensing & repair.")
        );
    }

    #[test]
    fn first_pmid_wins() {
        let xml = r#"<PubmedArticleSet><PubmedArticle>
            <MedlineCitation><PMID>111</PMID>
              <CommentsCorrectionsList><CommentsCorrections><PMID>222</PMID></CommentsCorrections></CommentsCorrectionsList>
            </MedlineCitation>
        </PubmedArticle></PubmedArticleSet>"#;
        assert_eq!(single(xml).id.as_deref(), Some("111"));
    }

    #[test]
    fn year_only_date() {
        let paper = single(&wrap(
            "<Article><Journal><JournalIssue><PubDate><Year>2019</Year></PubDate></JournalIssue></Journal></Article>",
        ));
        assert_eq!(paper.publication_date.as_deref(), Some("2019"));
    }

    #[test]
    fn year_month_date() {
        let paper = single(&wrap(
            "<Article><Journal><JournalIssue><PubDate><Year>2021</Year><Month>11</Month></PubDate></JournalIssue></Journal></Article>",
        ));
        assert_eq!(paper.publication_date.as_deref(), Some("2021-11"));
    }

    #[test]
    fn medline_date_fallback() {
        let paper = single(&wrap(
            "<Article><Journal><JournalIssue><PubDate><MedlineDate>2019 Spring</MedlineDate></PubDate></JournalIssue></Journal></Article>",
        ));
        assert_eq!(paper.publication_date.as_deref(), Some("2019 Spring"));
    }

    #[test]
    fn only_journal_pub_date_counts() {
        let xml = r#"<PubmedArticleSet><PubmedArticle>
            <MedlineCitation><PMID>5</PMID></MedlineCitation>
            <PubmedData><History>
              <PubMedPubDate PubStatus="received"><Year>2020</Year><Month>1</Month><Day>2</Day></PubMedPubDate>
            </History></PubmedData>
        </PubmedArticle></PubmedArticleSet>"#;
        assert_eq!(single(xml).publication_date, None);
    }

    #[test]
    fn month_normalization() {
        assert_eq!(normalize_month("Jan"), "01");
        assert_eq!(normalize_month("december"), "12");
        assert_eq!(normalize_month("7"), "07");
        assert_eq!(normalize_month("Winter"), "Winter");
        assert_eq!(zero_pad("9"), "09");
        assert_eq!(zero_pad("31"), "31");
    }

    #[test]
    fn author_name_parts() {
        let paper = single(&wrap(
            r#"<Article><AuthorList>
                <Author><LastName>Solo</LastName></Author>
                <Author><ForeName>Only</ForeName></Author>
                <Author><CollectiveName>The Consortium</CollectiveName></Author>
                <Author/>
            </AuthorList></Article>"#,
        ));
        let names: Vec<Option<&str>> = paper.authors.iter().map(|a| a.name.as_deref()).collect();
        assert_eq!(names, [Some("Solo"), Some("Only"), None, None]);
    }

    #[test]
    fn blank_affiliations_are_dropped() {
        let paper = single(&wrap(
            r#"<Article><AuthorList><Author>
                <LastName>Roe</LastName>
                <AffiliationInfo><Affiliation>   </Affiliation></AffiliationInfo>
                <AffiliationInfo><Affiliation/></AffiliationInfo>
                <AffiliationInfo><Affiliation>Example Biotech,  Cambridge</Affiliation></AffiliationInfo>
            </Author></AuthorList></Article>"#,
        ));
        assert_eq!(
            paper.authors[0].affiliations,
            ["Example Biotech,  Cambridge"]
        );
    }

    #[test]
    fn email_scans_all_authors_in_order() {
        let paper = single(&wrap(
            r#"<Article><AuthorList>
                <Author><LastName>A</LastName><AffiliationInfo><Affiliation>No address here</Affiliation></AffiliationInfo></Author>
                <Author><LastName>B</LastName><AffiliationInfo><Affiliation>Lab X. b@x.org</Affiliation></AffiliationInfo></Author>
                <Author><LastName>C</LastName><AffiliationInfo><Affiliation>Lab Y. c@y.org</Affiliation></AffiliationInfo></Author>
            </AuthorList></Article>"#,
        ));
        assert_eq!(paper.corresponding_email.as_deref(), Some("b@x.org"));
    }

    #[test]
    fn multiple_articles_in_order() {
        let xml = r#"<PubmedArticleSet>
            <PubmedArticle><MedlineCitation><PMID>1</PMID></MedlineCitation></PubmedArticle>
            <PubmedArticle><MedlineCitation><PMID>2</PMID></MedlineCitation></PubmedArticle>
            <PubmedArticle><MedlineCitation><PMID>3</PMID></MedlineCitation></PubmedArticle>
        </PubmedArticleSet>"#;
        let ids: Vec<String> = parse_pubmed_xml(xml)
            .unwrap()
            .into_iter()
            .filter_map(|p| p.id)
            .collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn extraction_is_repeatable() {
        let first = parse_pubmed_xml(SAMPLE_XML).unwrap();
        let second = parse_pubmed_xml(SAMPLE_XML).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn truncated_document_is_malformed() {
        let cut = &SAMPLE_XML[..SAMPLE_XML.find("</AuthorList>").unwrap()];
        let err = parse_pubmed_xml(cut).unwrap_err();
        assert!(matches!(err, ExtractError::Malformed { .. }));
    }

    #[test]
    fn truncated_inside_tag_is_malformed() {
        let err = parse_pubmed_xml("<PubmedArticleSet><PubmedArt").unwrap_err();
        assert!(matches!(err, ExtractError::Malformed { .. }));
    }

    #[test]
    fn unclosed_root_is_malformed() {
        let err = parse_pubmed_xml("<PubmedArticleSet>").unwrap_err();
        assert!(format!("{err}").contains("<PubmedArticleSet>"));
    }

    #[test]
    fn mismatched_tags_are_malformed() {
        let xml = "<PubmedArticleSet><PubmedArticle><PMID>1</Title></PubmedArticle></PubmedArticleSet>";
        assert!(parse_pubmed_xml(xml).is_err());
    }

    #[test]
    fn plain_text_is_malformed() {
        assert!(parse_pubmed_xml("Service unavailable").is_err());
        assert!(parse_pubmed_xml(r#"<?xml version="1.0"?>"#).is_err());
    }
}
