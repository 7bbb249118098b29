use anyhow::Result;
use docline::fetch::scrape_book_urls;

#[test]
fn catalog_scrape_keeps_only_epub_links_absolutized() -> Result<()> {
    let html = r#"
        <html><body>
            <a href="/historicaldocuments/frus1952-54v01/epub/frus1952-54v01.epub">Volume I</a>
            <a href="https://static.history.state.gov/frus/frus1865p4.epub">1865 Part 4</a>
            <a href="/historicaldocuments/frus1952-54v01">Volume I (web)</a>
            <a>no target</a>
        </body></html>
    "#;

    let urls = scrape_book_urls(html, "https://history.state.gov/historicaldocuments/ebooks")?;

    assert_eq!(
        urls,
        vec![
            "https://history.state.gov/historicaldocuments/frus1952-54v01/epub/frus1952-54v01.epub"
                .to_string(),
            "https://static.history.state.gov/frus/frus1865p4.epub".to_string(),
        ]
    );

    Ok(())
}

#[test]
fn relative_links_without_a_leading_slash_resolve_against_the_catalog() -> Result<()> {
    let html = r#"<a href="volumes/frus1911.epub">1911</a>"#;

    let urls = scrape_book_urls(html, "https://history.state.gov/historicaldocuments/ebooks")?;

    assert_eq!(
        urls,
        vec!["https://history.state.gov/historicaldocuments/volumes/frus1911.epub".to_string()]
    );

    Ok(())
}
