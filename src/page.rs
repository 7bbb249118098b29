use crate::config::ExtractConfig;
use crate::dates::{DateExtraction, DateScanner};
use anyhow::{Result, anyhow};
use scraper::{Html, Selector};
use tracing::debug;

/// Title, resolved dates, and body text scraped from one document page.
#[derive(Debug, Clone)]
pub struct PageContents {
    pub title: String,
    pub date: DateExtraction,
    pub possible_date: DateExtraction,
    pub text: String,
}

/// Scrape one page's HTML. Returns `None` for pages that are not documents:
/// no title at all, or a title carrying one of the configured skip markers.
///
/// Date resolution tries the sources in decreasing order of trust. The
/// dateline fragment speaks for the document and wins outright; the title is
/// the fallback. Only when neither yields any signal is the whole page body
/// scanned, and that result is kept apart as the possible date, because body
/// text is full of dates that are not the document's own.
pub fn scrape_page(
    html: &str,
    config: &ExtractConfig,
    scanner: &DateScanner,
) -> Result<Option<PageContents>> {
    let parsed = Html::parse_document(html);

    let title_selector =
        Selector::parse("title").map_err(|err| anyhow!("invalid title selector: {err:?}"))?;
    let Some(title_el) = parsed.select(&title_selector).next() else {
        debug!("page has no title element; skipping");
        return Ok(None);
    };
    let title = title_el.text().collect::<String>();

    if config
        .skip_title_markers
        .iter()
        .any(|marker| title.contains(marker.as_str()))
    {
        debug!(title = %title, "skipping non-document page");
        return Ok(None);
    }

    let dateline_selector = Selector::parse(&config.dateline_selector).map_err(|err| {
        anyhow!(
            "invalid dateline selector {}: {err:?}",
            config.dateline_selector
        )
    })?;
    let dateline = parsed
        .select(&dateline_selector)
        .next()
        .map(|el| el.text().collect::<String>());

    let text = parsed.root_element().text().collect::<String>();

    let from_dateline = dateline
        .as_deref()
        .map(|fragment| scanner.extract(fragment, 0))
        .unwrap_or(DateExtraction::NotFound);
    let date = if from_dateline.is_found() {
        from_dateline
    } else {
        scanner.extract(&title, 0)
    };
    let possible_date = if date.is_found() {
        DateExtraction::NotFound
    } else {
        scanner.extract(&text, 0)
    };

    Ok(Some(PageContents {
        title,
        date,
        possible_date,
        text,
    }))
}
