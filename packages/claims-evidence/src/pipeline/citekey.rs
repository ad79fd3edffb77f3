//! Deterministic citekeys and question abbreviations.
//!
//! A citekey is `@` + author surname + up to three title keywords + year,
//! e.g. `@smithDeepModelsEntailment2021`. Pure functions of their inputs:
//! no uniqueness is enforced here (see [`crate::CollisionPolicy`]).

const UNKNOWN_AUTHOR: &str = "unknown";

const TITLE_WORDS: usize = 3;

const QUESTION_KEYWORDS: usize = 5;

/// Words never used in a citekey title segment.
const TITLE_STOPWORDS: &[&str] = &[
    // articles, conjunctions
    "a", "an", "the", "and", "or", "but", "nor", "so", "yet", "if", "than", "then",
    // prepositions
    "of", "in", "on", "at", "by", "for", "with", "from", "to", "into", "onto", "over",
    "under", "about", "as", "via", "per", "through", "between", "among", "against",
    "toward", "towards", "without", "within", "across",
    // auxiliary and modal verbs
    "is", "are", "was", "were", "be", "been", "being", "do", "does", "did", "have", "has",
    "had", "can", "could", "will", "would", "should", "may", "might", "must", "shall",
    // wh-words, determiners, pronouns
    "what", "why", "how", "when", "where", "who", "which", "whose", "whom", "this", "that",
    "these", "those", "it", "its", "we", "our",
];

/// Words dropped from a question abbreviation.
const QUESTION_STOPWORDS: &[&str] = &[
    "how", "what", "why", "when", "where", "who", "which", "whose", "are", "is", "was", "were",
    "be", "been", "being", "the", "a", "an", "and", "or", "but", "for", "at", "by", "from", "to",
    "in", "on", "of", "with", "as", "do", "does", "did", "have", "has", "had", "can", "could",
    "will", "would", "should", "may", "might", "must", "that", "this", "these", "those",
];

/// Build a citekey from raw author list, title and year.
///
/// ```
/// use claims_evidence::generate_citekey;
///
/// let key = generate_citekey(Some("Smith, John; Doe, Jane"), "The Effects of Deep Models", Some("2021"));
/// assert_eq!(key, "@smithEffectsDeepModels2021");
/// ```
pub fn generate_citekey(authors: Option<&str>, title: &str, year: Option<&str>) -> String {
    format!(
        "@{}{}{}",
        author_segment(authors),
        title_segment(title),
        year_segment(year)
    )
}

/// Year with anything but ASCII letters and digits removed, so a cell like
/// `2020/21` cannot turn into a path separator.
fn year_segment(year: Option<&str>) -> String {
    year.unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Surname of the first author, letters only, lowercased.
///
/// The first author is everything before the first `,` or `;`, which covers
/// both `Last, First; ...` and `First Last, Other Author`; the surname is
/// its last whitespace-separated word.
fn author_segment(authors: Option<&str>) -> String {
    let surname = authors
        .and_then(|a| a.split([',', ';']).next())
        .and_then(|first| first.split_whitespace().last())
        .unwrap_or_default();

    let letters: String = surname
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();

    if letters.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        letters
    }
}

fn title_segment(title: &str) -> String {
    letter_words(title)
        .filter(|w| !TITLE_STOPWORDS.contains(&w.to_lowercase().as_str()))
        .take(TITLE_WORDS)
        .map(|w| capitalize(&w))
        .collect()
}

/// Maximal runs of letters, in order.
fn letter_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Short file-name-safe label for a focal question.
///
/// Up to five lowercase non-stopword words joined by `-`; `synthesis` when
/// nothing survives.
pub fn abbreviate_question(question: &str) -> String {
    let cleaned: String = question
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect();

    let keywords: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| !QUESTION_STOPWORDS.contains(w))
        .take(QUESTION_KEYWORDS)
        .collect();

    if keywords.is_empty() {
        "synthesis".to_string()
    } else {
        keywords.join("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_last_first_format() {
        assert_eq!(
            generate_citekey(Some("Smith, John"), "Deep Learning for Entailment", Some("2021")),
            "@smithDeepLearningEntailment2021"
        );
    }

    #[test]
    fn test_first_last_format() {
        assert_eq!(
            generate_citekey(Some("John van der Berg, Jane Doe"), "Models", Some("2019")),
            "@bergModels2019"
        );
    }

    #[test]
    fn test_non_letters_stripped() {
        assert_eq!(
            generate_citekey(Some("O'Brien-Smith, K."), "GPT-4 vs. BERT", None),
            "@obriensmithGptVsBert"
        );
    }

    #[test]
    fn test_missing_authors() {
        assert_eq!(generate_citekey(None, "Claims", Some("2020")), "@unknownClaims2020");
        assert_eq!(generate_citekey(Some("  "), "Claims", None), "@unknownClaims");
    }

    #[test]
    fn test_year_is_file_name_safe() {
        assert_eq!(
            generate_citekey(Some("Smith"), "Models", Some("2020/21")),
            "@smithModels202021"
        );
        assert_eq!(generate_citekey(Some("Smith"), "Models", Some(" 2021 ")), "@smithModels2021");
        assert_eq!(generate_citekey(Some("Smith"), "Models", Some("../..")), "@smithModels");
    }

    #[test]
    fn test_stopword_title() {
        assert_eq!(
            generate_citekey(Some("Lee"), "What is the Use of It?", Some("2022")),
            "@leeUse2022"
        );
        assert_eq!(generate_citekey(Some("Lee"), "Is it the", Some("2022")), "@lee2022");
    }

    #[test]
    fn test_abbreviate_question() {
        assert_eq!(
            abbreviate_question(
                "How effective are AI systems at the task of estimating entailment between claims?"
            ),
            "effective-ai-systems-task-estimating"
        );
        assert_eq!(abbreviate_question("What is it?"), "it");
        assert_eq!(abbreviate_question("How are the?"), "synthesis");
        assert_eq!(abbreviate_question(""), "synthesis");
    }

    proptest! {
        #[test]
        fn prop_citekey_is_pure(
            authors in proptest::option::of("[A-Za-z ,.]{0,30}"),
            title in "[A-Za-z0-9 :-]{0,60}",
            year in proptest::option::of("[0-9]{4}"),
        ) {
            let a = generate_citekey(authors.as_deref(), &title, year.as_deref());
            let b = generate_citekey(authors.as_deref(), &title, year.as_deref());
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_year_only_changes_suffix(
            authors in "[A-Za-z]{1,12}, [A-Za-z]{1,12}",
            title in "[A-Za-z ]{0,40}",
            y1 in "[0-9]{4}",
            y2 in "[0-9]{4}",
        ) {
            let a = generate_citekey(Some(&authors), &title, Some(&y1));
            let b = generate_citekey(Some(&authors), &title, Some(&y2));
            prop_assert_eq!(a.strip_suffix(y1.as_str()), b.strip_suffix(y2.as_str()));
        }

        #[test]
        fn prop_citekey_has_no_path_characters(
            authors in proptest::option::of(".{0,30}"),
            title in ".{0,60}",
            year in proptest::option::of(".{0,10}"),
        ) {
            let key = generate_citekey(authors.as_deref(), &title, year.as_deref());
            prop_assert!(!key.contains(['/', '\\', '.']));
        }

        #[test]
        fn prop_empty_authors_unknown(title in "[A-Za-z ]{0,40}") {
            let key = generate_citekey(None, &title, None);
            prop_assert!(key.starts_with("@unknown"));
        }

        #[test]
        fn prop_stopword_title_empty(
            words in prop::collection::vec(prop::sample::select(TITLE_STOPWORDS), 1..6),
        ) {
            let title = words.join(" ");
            prop_assert_eq!(generate_citekey(Some("Kim"), &title, Some("2020")), "@kim2020");
        }
    }
}
