//! Extractor: listing markup in, records out
//!
//! This is the only module that knows what the catalogue's HTML looks
//! like. It is synchronous and does no I/O; the crawl loop hands it a page
//! body and gets back record-shaped data plus a pagination signal.

use crate::record::Record;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Site root used to absolutize relative book and author links
const SITE_ROOT: &str = "https://www.goodreads.com";

/// Result of extracting one listing page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// Records found on the page, in listing order
    pub records: Vec<Record>,

    /// Whether the page advertises a following page
    pub has_more: bool,
}

/// Extracts all book records and the pagination signal from a listing page
pub fn extract_page(html: &str, page_index: u32) -> ExtractedPage {
    let document = Html::parse_document(html);

    let row_selector =
        Selector::parse(r#"table.tableList tr[itemtype="http://schema.org/Book"]"#)
            .expect("static selector");

    let records = document
        .select(&row_selector)
        .map(|row| extract_record(&row, page_index))
        .collect();

    ExtractedPage {
        records,
        has_more: has_next_page(&document),
    }
}

/// Extracts a single record from one table row
fn extract_record(row: &ElementRef, page_index: u32) -> Record {
    let title_selector = Selector::parse("a.bookTitle").expect("static selector");
    let author_selector = Selector::parse("a.authorName").expect("static selector");
    let rating_selector = Selector::parse("span.minirating").expect("static selector");
    let cover_selector = Selector::parse("img.bookCover").expect("static selector");

    let title_link = row.select(&title_selector).next();
    let author_link = row.select(&author_selector).next();

    let (avg_rating, ratings_count) = match row.select(&rating_selector).next() {
        Some(span) => {
            let text = element_text(&span);
            (extract_rating_avg(&text), extract_rating_count(&text))
        }
        None => (None, None),
    };

    Record {
        book_url: title_link.and_then(|link| absolutize(link.value().attr("href")?)),
        title: title_link.map(|link| element_text(&link)).filter(|t| !t.is_empty()),
        author: author_link.map(|link| element_text(&link)).filter(|a| !a.is_empty()),
        author_url: author_link.and_then(|link| absolutize(link.value().attr("href")?)),
        avg_rating,
        ratings_count,
        cover_url: row
            .select(&cover_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::to_string),
        cover_id: None,
        page: page_index,
        scraped_at: Record::observed_now(),
    }
}

/// Whether the page links to a following page
///
/// The catalogue renders the next link with a `disabled` class on the last
/// page instead of omitting it.
fn has_next_page(document: &Html) -> bool {
    let next_selector = Selector::parse("a.next_page").expect("static selector");

    document.select(&next_selector).next().is_some_and(|link| {
        !link
            .value()
            .attr("class")
            .unwrap_or("")
            .split_whitespace()
            .any(|class| class == "disabled")
    })
}

/// Rewrites a cover URL to request a higher-resolution image
///
/// The catalogue encodes the rendered size in the filename; stripping the
/// thumbnail markers (or bumping a mid-size one) yields the same image at
/// full resolution.
pub fn upscale_cover_url(cover_url: &str) -> String {
    let upscaled = cover_url
        .replace("._SX50_", "")
        .replace("._SY75_", "")
        .replace("._SX98_", "");

    if upscaled.contains("_SX") {
        upscaled.replace("._SX200_", "._SX400_")
    } else {
        upscaled
    }
}

/// Collects an element's text content, trimmed
fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Resolves an href against the site root
fn absolutize(href: &str) -> Option<String> {
    let base = Url::parse(SITE_ROOT).ok()?;
    base.join(href).ok().map(|url| url.to_string())
}

/// Pulls the decimal average out of a minirating text
///
/// "4.23 avg rating — 1,234 ratings" yields "4.23".
fn extract_rating_avg(text: &str) -> Option<String> {
    text.split_whitespace()
        .find(|token| token.contains('.') && token.parse::<f64>().is_ok())
        .map(str::to_string)
}

/// Pulls the comma-stripped rating count out of a minirating text
///
/// "4.23 avg rating — 1,234 ratings" yields "1234".
fn extract_rating_count(text: &str) -> Option<String> {
    let mut previous: Option<&str> = None;
    for token in text.split_whitespace() {
        if token.starts_with("rating") {
            if let Some(candidate) = previous {
                let digits: String = candidate.chars().filter(char::is_ascii_digit).collect();
                if !digits.is_empty() && candidate.chars().all(|c| c.is_ascii_digit() || c == ',') {
                    return Some(digits);
                }
            }
        }
        previous = Some(token);
    }
    None
}
