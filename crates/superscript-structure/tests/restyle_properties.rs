use pretty_assertions::assert_eq;
use rand::Rng;
use rand::seq::SliceRandom;
use superscript_core::{Document, DocumentStateManager, LineFormat, SelectionRange};
use superscript_structure::{
    CharacterRecency, LineContext, LineKind, SectionNumber, Structure, autocomplete,
    build_structure, classify, parse_frontmatter, restyle,
};

fn restyled(text: &str) -> (Structure, Document) {
    let mut state = DocumentStateManager::new(text);
    let outcome = restyle(&mut state).unwrap();
    (outcome.structure, state.document().clone())
}

fn page_numbers(structure: &Structure) -> Vec<String> {
    structure
        .pages
        .iter()
        .map(|page| page.section.number.to_string())
        .collect()
}

#[test]
fn test_second_restyle_is_noop() {
    let mut state = DocumentStateManager::new(
        "Script\nwriter: Jo\n\nP\np\nJOHN:\n  Hi.\nmary: (O.S.)\n  Yes?\n:\n::\nCharacters\n## Cast\nPAGE\n2 pages\n",
    );
    assert!(restyle(&mut state).unwrap().applied);
    let second = restyle(&mut state).unwrap();
    assert!(!second.applied);
    assert!(second.patch.is_noop(), "{:?}", second.patch);
}

#[test]
fn test_random_scripts_settle_after_one_pass() {
    const LINES: &[&str] = &[
        "",
        "P",
        "p",
        "PAGE",
        "page 4",
        "PAGES 3-5",
        "2 pages",
        "Page 9.",
        "Panel",
        "panel 7.",
        "JOHN:",
        "mary: (O.S.)",
        ":",
        "::",
        "  Some dialog here.",
        "\tTabbed dialog",
        "Characters",
        "notes",
        "# Heading",
        "## Part",
        "---",
        "Plain action text.",
    ];
    let mut rng = rand::thread_rng();

    for _ in 0..200 {
        let count = rng.gen_range(1..30);
        let mut text = String::from("Title\n");
        for _ in 0..count {
            text.push_str(LINES.choose(&mut rng).copied().unwrap_or_default());
            text.push('\n');
        }

        let (_, settled) = restyled(&text);
        let second = build_structure(&settled);
        assert!(second.patch.is_noop(), "{text:?} -> {:?}", second.patch);
    }
}

#[test]
fn test_title_is_whole_first_line() {
    let attributes = parse_frontmatter("My Script: Issue One\nwriter: Jo\n");
    assert_eq!(attributes.title(), "My Script: Issue One");
    assert_eq!(attributes.writer(), Some("Jo"));
    assert_eq!(attributes.get("my script"), None);
}

#[test]
fn test_pinned_page_number_overrides_sequence() {
    let (structure, document) = restyled("Title\nPAGE\nPanel\nPAGE\nPAGE 10.\nPAGE\n");
    assert_eq!(page_numbers(&structure), vec!["1", "2", "10", "11"]);
    assert_eq!(document.line_text(4).unwrap(), "PAGE 10.");
    assert_eq!(document.line_text(5).unwrap(), "PAGE 11");
}

#[test]
fn test_page_range_advances_sequence() {
    let (structure, document) = restyled("Title\nPAGE\nPAGE\nPAGES 3-5\nPAGE\n");
    assert_eq!(page_numbers(&structure), vec!["1", "2", "5", "6"]);
    assert_eq!(structure.pages[2].section.heading_text, "PAGES 3-5");
    assert_eq!(document.line_text(4).unwrap(), "PAGE 6");
}

#[test]
fn test_colon_shorthand_resolves_by_recency() {
    let (structure, document) = restyled("Title\nPAGE\nPanel\nJOHN:\nMARY:\n:\n::\n");
    assert_eq!(document.line_text(5).unwrap(), "MARY:");
    assert_eq!(document.line_text(6).unwrap(), "JOHN:");

    let names: Vec<_> = structure.pages[0].panels[0]
        .characters
        .iter()
        .map(|c| c.heading_text.as_str())
        .collect();
    assert_eq!(names, vec!["JOHN:", "MARY:", "MARY:", "JOHN:"]);
}

#[test]
fn test_dialog_words_roll_up() {
    let (structure, document) = restyled(
        "Title\nPAGE\nPanel\nJOHN:\n  one two three\n  four five six seven eight\n",
    );
    let page = &structure.pages[0];
    let panel = &page.panels[0];
    assert_eq!(panel.characters[0].word_count, 8);
    assert_eq!(panel.section.word_count, 8);
    assert_eq!(page.section.word_count, 8);
    assert_eq!(structure.total_word_count(), 8);

    assert_eq!(document.line_format(1).unwrap().word_count, Some(8));
    assert_eq!(document.line_format(1).unwrap().panel_count, Some(1));
    assert_eq!(document.line_format(3).unwrap().word_count, Some(8));
}

#[test]
fn test_offpage_section_takes_fractional_number() {
    let (structure, document) = restyled("Title\nPAGE\nPAGE\nCharacters\nJOHN is tall.\nPAGE\n");
    assert_eq!(page_numbers(&structure), vec!["1", "2", "2.1", "3"]);
    assert_eq!(
        structure.find_page(SectionNumber::whole(3)).unwrap().section.heading_text,
        "PAGE 3"
    );
    assert!(document.line_format(3).unwrap().offpage);
    assert!(document.line_format(4).unwrap().offpage);
    assert!(!document.line_format(5).unwrap().offpage);
}

#[test]
fn test_frontmatter_lists_with_continuation() {
    let attributes = parse_frontmatter("Title\ncharacters: Alice, Bob\nvocabulary: foo\n  bar\n");
    assert_eq!(attributes.characters(), ["Alice", "Bob"]);
    assert_eq!(attributes.vocabulary(), ["foo", "bar"]);
}

#[test]
fn test_autocomplete_echoes_case() {
    let script = "Title\ncharacters: Alice\nPAGE 1\nPanel 1\n";
    for (typed, expected) in [("AL", "ALICE"), ("Al", "Alice"), ("al", "Alice")] {
        let text = format!("{script}{typed}\n");
        let document = Document::from_text(&text);
        let caret = text.chars().count() - 1;
        let suggestions = autocomplete(&document, Some(SelectionRange::caret(caret)), 2);
        let labels: Vec<_> = suggestions.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec![expected], "typed {typed}");
    }
}

#[test]
fn test_classification_is_pure() {
    let mut recency = CharacterRecency::new();
    recency.touch("JOHN");
    let ctx = LineContext {
        next_page: 3,
        next_panel: 2,
        ..LineContext::new(&recency)
    };
    let format = LineFormat::default();

    for line in ["PAGE", "Panel", ":", "  Hello there", "Characters", "whatever"] {
        let first = classify(line, &format, &ctx);
        let second = classify(line, &format, &ctx);
        assert_eq!(first, second);
    }
    assert_eq!(recency.len(), 1);
    assert!(matches!(
        classify(":", &format, &ctx).kind,
        LineKind::Character { shorthand: true, .. }
    ));
}
