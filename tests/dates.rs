use docline::dates::{
    DateExtraction, DateRules, DateScanner, is_prefixed_by, previous_word_start,
};

fn extract_field(text: &str) -> Option<String> {
    DateScanner::default().extract(text, 0).as_field()
}

#[test]
fn extracts_dates_from_document_prose() {
    let cases = [
        ("January 4, 1952.", "1952-01-04"),
        ("June 19, 1953.", "1953-06-19"),
        ("October 8, 1954-7 p.m.", "1954-10-08"),
        ("White House, 9:05 a.m., December 17, 1954", "1954-12-17"),
        ("May4, 1865", "1865-05-04"),
        ("Nyans were born in September, 1990", "1990-09"),
        (
            "Creatures were born in February 1980, on the 20th",
            "1980-02-20",
        ),
        ("14th of May, 1865", "1865-05-14"),
        ("14th day of May, 1865", "1865-05-14"),
        (
            "We met on the 10th of April, but the agreement was signed on the 16th day of May, 1992",
            "1992-05-16",
        ),
        ("the 22d day of the month of April, 1865", "1865-04-22"),
        ("15th day of September (Saturday), 1990", "1990-09-15"),
        ("15th April, 1986", "1986-04-15"),
        ("april 22nd, 1986", "1986-04-22"),
        ("on the 12th day of May, in the year 1865", "1865-05-12"),
        ("on the 12th day of May, in the year of our Lord 1865", "1865-05-12"),
        (
            "File No. 837.00/571. [Document 336]February 19, 1912.No. 122.]Sir: I",
            "1912-02-19",
        ),
        (
            "Telegram transmitted to the Secretary of State Dec. 11, 1911",
            "1911-12-11",
        ),
    ];

    for (text, expected) in cases {
        assert_eq!(
            extract_field(text).as_deref(),
            Some(expected),
            "input: {text}"
        );
    }
}

#[test]
fn explicit_undated_marker_wins_over_nothing() {
    assert_eq!(extract_field("Washington, undated").as_deref(), Some("Undated"));
    assert_eq!(extract_field("Undated").as_deref(), Some("Undated"));
    assert_eq!(extract_field("UNDATED DRAFT").as_deref(), Some("Undated"));
}

#[test]
fn text_without_signal_yields_not_found() {
    let scanner = DateScanner::default();
    assert_eq!(
        scanner.extract("Sir: I have the honor to report.", 0),
        DateExtraction::NotFound
    );
    assert_eq!(scanner.extract("", 0), DateExtraction::NotFound);
    assert_eq!(
        scanner.extract("Document 336, page 12", 0),
        DateExtraction::NotFound
    );
}

#[test]
fn month_without_nearby_numerals_is_skipped() {
    // The bare "May" carries no digits within its window, so the scan moves
    // on and the text ends without a date.
    assert_eq!(
        extract_field("Early in May the delegation departed without ceremony"),
        None
    );
}

#[test]
fn out_of_range_pair_skips_to_a_later_month() {
    // The first window reads 3000/45 as year/day, both out of range, so the
    // occurrence is dropped and the later month supplies the date.
    assert_eq!(
        extract_field("Lot 3000 May 45, then reissued June 4, 1950"),
        Some("1950-06-04".to_string())
    );
}

#[test]
fn two_digit_year_is_rejected_not_repaired() {
    // "May '65"-style years fall below the floor and the occurrence is
    // dropped rather than guessed at.
    assert_eq!(extract_field("Received May 65"), None);
}

#[test]
fn single_numeral_path_checks_only_the_year_floor() {
    assert_eq!(
        extract_field("Colony ships were promised for May 2150"),
        Some("2150-05".to_string())
    );
}

#[test]
fn smaller_numeral_is_the_day_regardless_of_order() {
    let scanner = DateScanner::default();
    assert_eq!(
        scanner.extract("September 1954, the 7th", 0),
        DateExtraction::Dated {
            year: 1954,
            month: 9,
            day: Some(7),
        }
    );
    assert_eq!(
        scanner.extract("September 7, 1954", 0),
        DateExtraction::Dated {
            year: 1954,
            month: 9,
            day: Some(7),
        }
    );
}

#[test]
fn numerals_beyond_the_second_are_ignored() {
    assert_eq!(
        extract_field("February 19, 1912.No. 122.]Sir"),
        Some("1912-02-19".to_string())
    );
}

#[test]
fn extraction_is_pure_and_idempotent() {
    let scanner = DateScanner::default();
    let text = "White House, 9:05 a.m., December 17, 1954";
    assert_eq!(scanner.extract(text, 0), scanner.extract(text, 0));
}

#[test]
fn offset_restricts_the_scan_to_the_tail() {
    let scanner = DateScanner::default();
    let text = "Signed June 19, 1953, and countersigned July 2, 1954";
    let past_first = text.find("countersigned").expect("marker must exist");

    assert_eq!(
        scanner.extract(text, past_first).as_field().as_deref(),
        Some("1954-07-02")
    );
    assert_eq!(
        scanner.extract(text, text.len()),
        DateExtraction::NotFound
    );
}

#[test]
fn trailing_window_is_a_tunable_constant() {
    let narrow = DateScanner::new(DateRules {
        trailing_window: 2,
        ..DateRules::default()
    });

    // With only two characters past the month, the year is out of reach.
    assert_eq!(narrow.extract("September 1954", 0), DateExtraction::NotFound);
}

#[test]
fn undated_is_only_checked_past_the_cursor() {
    // The disclaimer precedes a rejected month occurrence, so by the time
    // the scan runs dry the marker is behind the cursor.
    let scanner = DateScanner::default();
    assert_eq!(
        scanner.extract("undated; see also May 65", 0),
        DateExtraction::NotFound
    );
}

#[test]
fn previous_word_start_walks_back_two_words_at_most() {
    assert_eq!(previous_word_start("one two three", 4), 0);
    assert_eq!(previous_word_start("one two three", 8), 4);
    assert_eq!(previous_word_start("one two three", 0), 0);
}

#[test]
fn previous_word_start_stops_at_punctuation() {
    assert_eq!(previous_word_start("[Document 336]November", 14), 14);
    assert_eq!(previous_word_start("[Document 336] November", 15), 15);
    assert_eq!(previous_word_start("[Document 336]hi November", 17), 14);
}

#[test]
fn previous_word_start_is_total_over_utf8() {
    // Multi-byte characters act as word fences, never as panic sites.
    let text = "émigré — May";
    let offset = text.find("May").expect("marker must exist");
    let start = previous_word_start(text, offset);
    assert!(text.is_char_boundary(start));
    assert!(start <= offset);
}

#[test]
fn prefix_detector_matches_exact_preceding_bytes() {
    assert!(is_prefixed_by("nyan", "nya", 3));
    assert!(is_prefixed_by("14th of May, 1865", " of ", 8));
    assert!(is_prefixed_by("14th day of May, 1865", " day of ", 12));
    assert!(!is_prefixed_by("May, 1865", " day of ", 0));
    assert!(!is_prefixed_by("of May", " of ", 3));
}
