use anyhow::Result;
use docline::identify::{
    MATCHED_BY_COUNTRY, MATCHED_BY_DEMONYM, STATUS_INTERNAL, STATUS_MEMORANDUM, STATUS_MENTION,
    STATUS_REPRESENTATIVE, TitleClassifier, load_country_names, load_demonyms,
};
use std::fs;
use tempfile::tempdir;

fn classifier() -> TitleClassifier {
    let countries = vec![
        "France".to_string(),
        "Japan".to_string(),
        "China".to_string(),
    ];
    let demonyms = vec!["French".to_string(), "Japanese".to_string()];
    TitleClassifier::new(&countries, &demonyms, "Memorandum").expect("classifier must build")
}

#[test]
fn representative_when_preceded_by_of() {
    let classification =
        classifier().classify("The Minister of France to the Secretary of State");

    assert_eq!(classification.status, STATUS_REPRESENTATIVE);
    assert_eq!(classification.country.as_deref(), Some("France"));
    assert_eq!(classification.matched_by, Some(MATCHED_BY_COUNTRY));
}

#[test]
fn representative_through_republic_phrases() {
    let classification =
        classifier().classify("Note from the Ambassador of the Republic of China");
    assert_eq!(classification.status, STATUS_REPRESENTATIVE);
    assert_eq!(classification.country.as_deref(), Some("China"));

    let classification =
        classifier().classify("Credentials presented to Republic of China by the envoy");
    assert_eq!(classification.status, STATUS_REPRESENTATIVE);
}

#[test]
fn plain_mention_is_not_a_representative() {
    let classification = classifier().classify("The Secretary of State to the Embassy in Japan");

    assert_eq!(classification.status, STATUS_MENTION);
    assert_eq!(classification.country.as_deref(), Some("Japan"));
}

#[test]
fn memoranda_are_excluded() {
    let classification =
        classifier().classify("Memorandum by the Minister of France on trade questions");

    assert_eq!(classification.status, STATUS_MEMORANDUM);
    assert_eq!(classification.country, None);
}

#[test]
fn no_reference_match_means_internal_communication() {
    let classification = classifier().classify("Circular airgram to certain diplomatic missions");

    assert_eq!(classification.status, STATUS_INTERNAL);
    assert_eq!(classification.country, None);
    assert_eq!(classification.matched_by, None);
}

#[test]
fn demonyms_back_up_the_country_list() {
    let classification = classifier().classify("Conversation with the French charge d'affaires");

    assert_eq!(classification.status, STATUS_MENTION);
    assert_eq!(classification.country.as_deref(), Some("French"));
    assert_eq!(classification.matched_by, Some(MATCHED_BY_DEMONYM));
}

#[test]
fn country_names_match_whole_words_case_insensitively() {
    let classification = classifier().classify("The financier of francesque ventures");
    assert_eq!(classification.status, STATUS_INTERNAL);

    let classification = classifier().classify("The Minister of FRANCE reports");
    assert_eq!(classification.country.as_deref(), Some("FRANCE"));
}

#[test]
fn loads_country_column_deduplicated_in_file_order() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("countries.csv");
    fs::write(
        &path,
        "StateAbb,StateNme\nFRN,France\nJPN,Japan\nFRN,France\nCHN,China\n",
    )?;

    let names = load_country_names(&path, "StateNme")?;
    assert_eq!(names, vec!["France", "Japan", "China"]);

    Ok(())
}

#[test]
fn missing_country_column_is_an_error() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("countries.csv");
    fs::write(&path, "StateAbb\nFRN\n")?;

    assert!(load_country_names(&path, "StateNme").is_err());
    Ok(())
}

#[test]
fn loads_demonyms_skipping_blanks() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("countries.json");
    fs::write(
        &path,
        r#"[{"demonym":"French"},{"demonym":""},{"demonym":"Japanese"},{"demonym":"French"}]"#,
    )?;

    let demonyms = load_demonyms(&path)?;
    assert_eq!(demonyms, vec!["French", "Japanese"]);

    Ok(())
}
