use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::cli::Family;
use crate::markup::{Element, parse_html};
use crate::model::{DocumentMetadata, LinkStats};

use super::chapter::ChapterFamily;
use super::chunks::{Chunk, group_examples};
use super::corpus::{Corpus, LanguageLookup};
use super::error::RefactorError;
use super::family::DocumentFamily;
use super::linker::{ExampleIndex, LinkOutcome};
use super::normalize::{BREAK_SENTINEL, Normalizer};
use super::paragraphs::{ExampleVerdict, Line, LineAction, Paragraph, ParagraphClassifier};
use super::references::ReferenceParser;
use super::run::process_document;
use super::survey::{SurveyFamily, clean_style};

fn line(text: &str) -> Line {
    Line {
        element: Element::new("p").with_text(text),
        text: text.to_string(),
        tag: "p".to_string(),
    }
}

fn paragraph(classifier: &ParagraphClassifier, texts: &[&str]) -> Paragraph {
    classifier.paragraph(texts.iter().map(|text| line(text)).collect(), false)
}

fn flatten(chunks: Vec<Chunk>) -> Vec<Paragraph> {
    chunks
        .into_iter()
        .flat_map(|chunk| match chunk {
            Chunk::Paragraph(paragraph) => vec![paragraph],
            Chunk::Examples(run) => run,
        })
        .collect()
}

const CHAPTER_HTML: &str = "<html><body>\
<p>Chapter 5</p>\
<p><br></p>\
<p>1. Introduction</p>\
<p>Some prose about the feature.</p>\
<p><br></p>\
<p>(1) Papiamentu (Kouwenberg 1994: 12)</p>\
<p>‘hello world’</p>\
<p><br></p>\
<p>(2) Haitian</p>\
<p>‘unknown sentence’</p>\
<p><br></p>\
<p><font face=\"Times\">Closing remark.</font></p>\
<p><br></p>\
<p>References</p>\
<p>Smith, John. 2001. A study of X. London: Press.</p>\
</body></html>";

#[test]
fn normalize_then_postprocess_restores_line_breaks() {
    let normalizer = Normalizer::new(Family::Chapter).expect("normalizer");

    let normalized = normalizer.normalize("<br /><br />");
    assert_eq!(normalized, BREAK_SENTINEL.repeat(2));
    assert_eq!(normalizer.postprocess(&normalized), "<br /><br />");
    assert_eq!(normalizer.postprocess(&normalizer.normalize("a<br>b")), "a<br />b");
}

#[test]
fn chapter_normalizer_demotes_headings_and_fixes_known_chapter() {
    let normalizer = Normalizer::new(Family::Chapter).expect("normalizer");

    assert_eq!(
        normalizer.normalize("<h1 class=\"x\">Title</h1><h3 id=\"y\">Sub</h3>"),
        "<p class=\"x\">Title</p><p id=\"y\">Sub</p>"
    );

    let fixed = normalizer.normalize("(2005e)).</span></p>");
    assert!(fixed.contains(&format!("<p>{BREAK_SENTINEL}</p>")));
    assert!(fixed.ends_with("<p>References</p>"));

    assert_eq!(
        normalizer.normalize("style=\"line-height: 100%;margin-right:1.74in;\""),
        "style=\"line-height:150%;\""
    );
}

#[test]
fn survey_normalizer_strips_office_markup() {
    let normalizer = Normalizer::new(Family::Survey).expect("normalizer");

    assert_eq!(
        normalizer.normalize("<p style=\"color:windowtext;font-size:12.0pt;line-height:200%\">a<o:p></o:p></p>"),
        "<p style=\"line-height:150%\">a</p>"
    );
    assert_eq!(normalizer.postprocess("<br />"), "<br />");
}

#[test]
fn line_rules_apply_in_order() {
    let classifier = ParagraphClassifier::new().expect("classifier");

    assert_eq!(
        classifier.classify_line("References", false),
        Some(LineAction::EnterReferences)
    );
    assert_eq!(
        classifier.classify_line("Reference", true),
        Some(LineAction::EnterReferences)
    );
    assert_eq!(
        classifier.classify_line("1. Introduction", true),
        Some(LineAction::Relabel("h3"))
    );
    assert_eq!(classifier.classify_line("1. Introduction", false), None);
    assert_eq!(
        classifier.classify_line("2.1. Word order", true),
        Some(LineAction::Relabel("h4"))
    );
    assert_eq!(
        classifier.classify_line("Susanne Michaelis and the APiCS Consortium", false),
        Some(LineAction::Drop)
    );
    assert_eq!(classifier.classify_line("Plain prose.", true), None);
}

#[test]
fn example_rules_recognize_numbered_and_tabbed_lines() {
    let classifier = ParagraphClassifier::new().expect("classifier");

    assert_eq!(
        classifier.example_verdict("(3) Sentence text (Smith 2001)", "p"),
        ExampleVerdict::Example
    );
    assert_eq!(
        classifier.example_verdict("(12) Papiamentu (Kouwenberg 1994: 12)", "p"),
        ExampleVerdict::Example
    );
    assert_eq!(
        classifier.example_verdict("2. value-name\t15", "p"),
        ExampleVerdict::NotExample
    );
    assert_eq!(
        classifier.example_verdict("mi\tta\tkome", "p"),
        ExampleVerdict::Example
    );
    assert_eq!(
        classifier.example_verdict("mi\tta\tkome", "table"),
        ExampleVerdict::NotExample
    );
    assert_eq!(
        classifier.example_verdict("An ordinary sentence.", "p"),
        ExampleVerdict::NotExample
    );
}

#[test]
fn paragraph_flags_come_from_first_line() {
    let classifier = ParagraphClassifier::new().expect("classifier");

    let example = paragraph(&classifier, &["(3) Sentence text (Smith 2001)", "prose"]);
    assert!(example.is_example());
    assert!(!example.is_header());

    let header = paragraph(&classifier, &["Chapter 12"]);
    assert!(header.is_header());
    assert!(!header.is_example());

    let not_example = paragraph(&classifier, &["prose", "(3) Sentence text (Smith 2001)"]);
    assert!(!not_example.is_example());

    let reference_list = classifier.paragraph(vec![line("(1) Haitian")], true);
    assert!(reference_list.is_reference_list());
    assert!(!reference_list.is_example());
}

#[test]
fn value_list_paragraphs_collapse_into_placeholder() {
    let classifier = ParagraphClassifier::new().expect("classifier");
    let document = parse_html(
        "<html><body><p>Intro</p><p>1. one value 12</p><p>2. other value 3</p>\
         <p>3. third 4</p><p>After</p></body></html>",
    );

    let collapsed = classifier.collapse_value_tables(&document);
    let body = collapsed.find_by_name("body").expect("body");
    let texts: Vec<String> = body.element_children().map(Element::text).collect();
    assert_eq!(texts, vec!["Intro", "value-table", "After"]);

    let original = document.find_by_name("body").expect("body");
    assert_eq!(original.element_children().count(), 5);
}

#[test]
fn value_table_collapses_only_the_first_match() {
    let classifier = ParagraphClassifier::new().expect("classifier");
    let document = parse_html(
        "<html><body><table><tr><td>- excl first value</td></tr></table>\
         <table><tr><td>- excl second value</td></tr></table></body></html>",
    );

    let collapsed = classifier.collapse_value_tables(&document);
    let body = collapsed.find_by_name("body").expect("body");
    let names: Vec<&str> = body
        .element_children()
        .map(|element| element.name.as_str())
        .collect();
    assert_eq!(names, vec!["p", "table"]);
}

#[test]
fn paragraph_stream_splits_on_breaks_and_collects_references() {
    let classifier = ParagraphClassifier::new().expect("classifier");
    let normalizer = Normalizer::new(Family::Chapter).expect("normalizer");
    let document = parse_html(&normalizer.normalize(CHAPTER_HTML));

    let paragraphs: Vec<Paragraph> = classifier.paragraphs(&document).collect();
    assert_eq!(paragraphs.len(), 6);

    assert!(paragraphs[0].is_header());
    assert_eq!(paragraphs[1].lines()[0].tag, "h3");
    assert_eq!(paragraphs[1].lines().len(), 2);
    assert!(paragraphs[2].is_example());
    assert!(paragraphs[3].is_example());
    assert!(!paragraphs[4].is_example());

    let references = &paragraphs[5];
    assert!(references.is_reference_list());
    assert_eq!(references.lines().len(), 1);
    assert!(references.lines()[0].text.starts_with("Smith, John."));
}

#[test]
fn paragraph_stream_skips_blocks_inside_list_items_and_cells() {
    let classifier = ParagraphClassifier::new().expect("classifier");
    let document = parse_html(
        "<html><body><ul><li><p>inside item</p></li></ul>\
         <table><tr><td><p>inside cell</p></td></tr></table></body></html>",
    );

    let paragraphs: Vec<Paragraph> = classifier.paragraphs(&document).collect();
    assert_eq!(paragraphs.len(), 1);
    let tags: Vec<&str> = paragraphs[0]
        .lines()
        .iter()
        .map(|line| line.tag.as_str())
        .collect();
    assert_eq!(tags, vec!["ul", "table"]);
}

#[test]
fn paragraph_stream_walks_nested_blocks_in_document_order() {
    let classifier = ParagraphClassifier::new().expect("classifier");
    let document = parse_html(&format!(
        "<html><body><div><p>one</p><div><p>two</p><blockquote><p>three</p></blockquote></div></div>\
         <p>{BREAK_SENTINEL}</p><section><p>four</p></section></body></html>"
    ));

    let mut stream = classifier.paragraphs(&document);
    let first = stream.next().expect("first paragraph");
    let texts: Vec<&str> = first.lines().iter().map(|line| line.text.as_str()).collect();
    assert_eq!(texts, vec!["one", "two", "three"]);

    let second = stream.next().expect("second paragraph");
    assert_eq!(second.lines()[0].text, "four");
    assert!(stream.next().is_none());
}

#[test]
fn grouper_is_lossless_and_never_empty() {
    let classifier = ParagraphClassifier::new().expect("classifier");
    let paragraphs = vec![
        paragraph(&classifier, &["(1) Haitian"]),
        paragraph(&classifier, &["(2) Haitian"]),
        paragraph(&classifier, &["prose"]),
        paragraph(&classifier, &["(3) Haitian"]),
        paragraph(&classifier, &["more prose"]),
        paragraph(&classifier, &["(4) Haitian"]),
    ];

    let chunks: Vec<Chunk> = group_examples(paragraphs.clone()).collect();
    assert_eq!(chunks.len(), 5);
    assert!(matches!(&chunks[0], Chunk::Examples(run) if run.len() == 2));
    assert!(matches!(&chunks[1], Chunk::Paragraph(_)));
    assert!(matches!(&chunks[4], Chunk::Examples(run) if run.len() == 1));
    assert!(chunks.iter().all(|chunk| match chunk {
        Chunk::Examples(run) => !run.is_empty() && run.iter().all(Paragraph::is_example),
        Chunk::Paragraph(paragraph) => !paragraph.is_example(),
    }));

    assert_eq!(flatten(chunks), paragraphs);
}

#[test]
fn grouper_handles_empty_input() {
    assert_eq!(group_examples(Vec::new()).count(), 0);
}

#[test]
fn linker_resolves_quoted_examples_by_slug() {
    let mut index = ExampleIndex::new();
    index.insert("hello world", "ex-12");
    let mut stats = LinkStats::default();

    assert_eq!(
        index.link("‘hello world’ (Smith 2001)", &mut stats),
        LinkOutcome::Linked("ex-12".to_string())
    );
    assert_eq!(stats.linked, 1);

    assert_eq!(index.link("‘goodbye’", &mut stats), LinkOutcome::NotLinked);
    assert_eq!(stats.not_linked, 1);

    assert_eq!(index.link("no quotation here", &mut stats), LinkOutcome::Unquoted);
    assert_eq!(
        stats,
        LinkStats {
            linked: 1,
            not_linked: 1,
            ambiguous: 0
        }
    );
}

#[test]
fn linker_counts_ambiguous_matches() {
    let mut index = ExampleIndex::new();
    index.insert("hello world", "ex-12");
    index.insert("Hello, World!", "ex-13");
    index.insert("hello world", "ex-12");
    let mut stats = LinkStats::default();

    assert_eq!(index.lookup("HELLO WORLD").len(), 2);
    assert_eq!(
        index.link("‘Hello world’", &mut stats),
        LinkOutcome::Ambiguous
    );
    assert_eq!(stats.ambiguous, 1);
    assert_eq!(stats.linked, 0);
}

#[test]
fn reference_parser_extracts_key_year_and_title() {
    let parser = ReferenceParser::new().expect("parser");

    let element = Element::new("p").with_text("Smith, John. 2001. A study of X. London: Press.");
    let record = parser.parse(&element, Some("Primary sources"));
    assert_eq!(record.key.as_deref(), Some("smith2001"));
    assert_eq!(record.year.as_deref(), Some("2001"));
    assert_eq!(record.title.as_deref(), Some("A study of X"));
    assert_eq!(record.category.as_deref(), Some("Primary sources"));

    let element = Element::new("p").with_text("Jane van der Berg and Tom Li (1999a): Creoles in contact.");
    let record = parser.parse(&element, None);
    assert_eq!(record.key.as_deref(), Some("berg1999a"));
    assert_eq!(record.title.as_deref(), Some("Creoles in contact"));

    let element = Element::new("p").with_text("Unparseable entry without a date");
    let record = parser.parse(&element, None);
    assert_eq!(record.key, None);
    assert_eq!(record.text, "Unparseable entry without a date");
    assert!(!parser.has_year(&record.text));
}

#[test]
fn chapter_refactor_builds_example_blocks_and_collects_references() {
    let mut index = ExampleIndex::new();
    index.insert("hello world", "12");
    let family = ChapterFamily::new(&index).expect("chapter family");
    let mut metadata = DocumentMetadata::default();

    let processed = family
        .process("5", CHAPTER_HTML, &mut metadata)
        .expect("processed chapter");

    assert!(processed.html.starts_with("<body>"));
    assert!(!processed.html.contains("Chapter 5"));
    assert!(!processed.html.contains(BREAK_SENTINEL));
    assert!(processed.html.contains("<h3>1. Introduction</h3>"));
    assert!(processed.html.contains(
        "<blockquote class=\"example\" style=\"font-size:100%;padding-left:1.8em;margin-left:0.3em\" id=\"ex-12\">"
    ));
    assert!(processed.html.contains(
        "<p style=\"text-indent:-2em\">(1) Papiamentu (Kouwenberg 1994: 12)</p><p>‘hello world’</p>"
    ));
    assert!(processed.html.contains(
        "<small><a href=\"/sentences/12\">See example 12</a></small>"
    ));
    assert!(processed.html.contains("<p>Closing remark.</p>"));
    assert!(!processed.html.contains("<font"));
    assert!(!processed.html.contains("A study of X"));

    assert_eq!(
        processed.links,
        LinkStats {
            linked: 1,
            not_linked: 1,
            ambiguous: 0
        }
    );
    assert_eq!(metadata.refs.len(), 1);
    assert_eq!(metadata.refs[0].key.as_deref(), Some("smith2001"));
}

#[test]
fn chapter_document_id_is_file_name_prefix() {
    let index = ExampleIndex::new();
    let family = ChapterFamily::new(&index).expect("chapter family");
    assert_eq!(
        family.document_id(Path::new("lo/42.Tense.html")).expect("id"),
        "42"
    );
}

const SURVEY_HTML: &str = "<html><body><div class=\"WordSection1\">
<p class=\"Title\">Papiamentu structure dataset</p>
<p>Silvia Kouwenberg, Eric Murray &amp; Jane Doe and John Roe</p>
<table><tr><td>Lexifier</td></tr></table>
<h1>1. Introduction</h1>
<p class=\"Zitat\">A quoted passage.</p>
<p>2.1. Phonology</p>
<p style=\"mso-bidi-font-size:10pt\">   </p>
<p>Some text.</p>
<table><tr><td>cell</td></tr></table>
</div></body></html>";

fn languages() -> LanguageLookup {
    LanguageLookup::from([("papiamentu".to_string(), "12".to_string())])
}

#[test]
fn survey_front_matter_fills_title_and_authors() {
    let languages = languages();
    let family = SurveyFamily::new(&languages).expect("survey family");
    let mut metadata = DocumentMetadata::default();

    let refactored = family
        .refactor("12.I-12", &parse_html(SURVEY_HTML), &mut metadata)
        .expect("refactored survey");

    assert_eq!(metadata.title.as_deref(), Some("Papiamentu structure dataset"));
    assert_eq!(
        metadata.authors,
        vec!["Silvia Kouwenberg", "Eric Murray", "Jane Doe", "John Roe"]
    );

    let div = refactored.body.find_by_name("div").expect("div");
    let first = div.element_children().next().expect("first child");
    assert!(first.is("h3"));
    assert_eq!(first.text(), "1. Introduction");

    let html = refactored.body.to_html();
    assert!(!html.contains("Papiamentu structure dataset"));
    assert!(!html.contains("Lexifier"));
    assert!(html.contains("<blockquote><p class=\"Zitat\">A quoted passage.</p></blockquote>"));
    assert!(html.contains("<h3>2.1. Phonology</h3>"));
    assert!(html.contains("<div class=\"table\"><table>"));
    assert!(!html.contains("mso-"));
}

#[test]
fn survey_front_matter_mismatch_is_fatal() {
    let languages = languages();
    let family = SurveyFamily::new(&languages).expect("survey family");
    let mut metadata = DocumentMetadata::default();
    let document = parse_html("<html><body><div><p>Title</p><h1>Intro</h1></div></body></html>");

    let err = family
        .refactor("12.I-12", &document, &mut metadata)
        .expect_err("mismatch");

    match err.downcast_ref::<RefactorError>() {
        Some(RefactorError::FrontMatterMismatch { expected, found, context }) => {
            assert_eq!(expected, "p, p, table, h3");
            assert_eq!(found, "p, h3");
            assert!(context.contains("Title"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(metadata.title, None);
}

#[test]
fn survey_without_language_id_skips_front_matter() {
    let languages = languages();
    let family = SurveyFamily::new(&languages).expect("survey family");
    let mut metadata = DocumentMetadata::default();
    let document = parse_html("<html><body><div><h1>Intro</h1><p>Text here.</p></div></body></html>");

    family
        .refactor("I-Introduction", &document, &mut metadata)
        .expect("refactored survey");
    assert_eq!(metadata.title, None);
    assert!(metadata.authors.is_empty());
}

#[test]
fn survey_references_section_is_extracted_and_removed() {
    let languages = languages();
    let family = SurveyFamily::new(&languages).expect("survey family");
    let mut metadata = DocumentMetadata::default();
    let document = parse_html(
        "<html><body><div>\
         <h1>Glossed text</h1><p>Body text of the survey.</p>\
         <h1>References</h1>\
         <p>Primary sources</p>\
         <p>Smith, John. 2001. A study of X. London: Press.</p>\
         <p class=\"comment\">Some sources are unpublished manuscripts.</p>\
         <h4>Archives</h4>\
         <p>Doe, Jane. n.d. Field notes on Y. Manuscript.</p>\
         </div></body></html>",
    );

    let refactored = family
        .refactor("I-Creoles", &document, &mut metadata)
        .expect("refactored survey");

    assert_eq!(metadata.refs.len(), 2);
    assert_eq!(metadata.refs[0].category.as_deref(), Some("Primary sources"));
    assert_eq!(metadata.refs[0].key.as_deref(), Some("smith2001"));
    assert_eq!(metadata.refs[1].category.as_deref(), Some("Archives"));
    assert_eq!(metadata.refs[1].key.as_deref(), Some("doend"));
    assert_eq!(
        metadata.refs_comments,
        vec!["Some sources are unpublished manuscripts."]
    );

    let html = refactored.body.to_html();
    assert!(html.contains("<h3>Glossed text</h3>"));
    assert!(html.contains("Body text of the survey."));
    assert!(!html.contains("References"));
    assert!(!html.contains("Smith"));
    assert!(!html.contains("Archives"));
}

#[test]
fn survey_short_reference_line_is_fatal() {
    let languages = languages();
    let family = SurveyFamily::new(&languages).expect("survey family");
    let mut metadata = DocumentMetadata::default();
    let document = parse_html(
        "<html><body><div><h1>References</h1><p>Smith 2001</p></div></body></html>",
    );

    let err = family
        .refactor("I-Creoles", &document, &mut metadata)
        .expect_err("ambiguous line");
    assert!(matches!(
        err.downcast_ref::<RefactorError>(),
        Some(RefactorError::AmbiguousReferenceLine { text }) if text == "Smith 2001"
    ));
}

#[test]
fn survey_document_ids_follow_file_names() {
    let languages = languages();
    let family = SurveyFamily::new(&languages).expect("survey family");

    assert_eq!(
        family.document_id(Path::new("lo/I_12_Papiamentu.htm")).expect("id"),
        "12.I-12"
    );
    assert_eq!(
        family.document_id(Path::new("lo/II__Introduction.htm")).expect("id"),
        "II-Introduction"
    );

    let err = family
        .document_id(Path::new("lo/I_3_Klingon.htm"))
        .expect_err("unknown language");
    assert!(matches!(
        err.downcast_ref::<RefactorError>(),
        Some(RefactorError::UnknownLanguage(_))
    ));

    let err = family
        .document_id(Path::new("lo/notes.htm"))
        .expect_err("unrecognized name");
    assert!(matches!(
        err.downcast_ref::<RefactorError>(),
        Some(RefactorError::UnrecognizedFileName(_))
    ));
}

#[test]
fn survey_language_lookup_folds_diacritics() {
    let languages = LanguageLookup::from([(crate::util::slug("Sãotomense"), "20".to_string())]);
    let family = SurveyFamily::new(&languages).expect("survey family");

    assert_eq!(
        family.document_id(Path::new("lo/II_20_Saotomense.htm")).expect("id"),
        "20.II-20"
    );
    assert_eq!(
        family.document_id(Path::new("lo/II_20_Sãotomense.htm")).expect("id"),
        "20.II-20"
    );
}

#[test]
fn style_cleanup_rewrites_and_drops_office_rules() {
    let mut element = Element::new("p").with_attr(
        "style",
        "mso-line-height-alt:12pt; tab-stops:14.2pt; font-family: Junicode;color:red",
    );
    clean_style(&mut element);
    assert_eq!(element.attr("style"), Some("margin-top:0.4em;color:red"));

    let mut element = Element::new("p").with_attr("style", "mso-bidi-font-size:10pt;");
    clean_style(&mut element);
    assert_eq!(element.attr("style"), None);
}

#[test]
fn process_document_writes_html_and_metadata() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("5.Chapter.html");
    fs::write(&source, CHAPTER_HTML).expect("write source");
    let output_dir = dir.path().join("processed");
    fs::create_dir_all(&output_dir).expect("output dir");

    let index = ExampleIndex::new();
    let family = ChapterFamily::new(&index).expect("chapter family");
    let outcome = process_document(&family, &source, &output_dir).expect("processed");

    assert_eq!(outcome.document_id.as_deref(), Some("5"));
    assert_eq!(outcome.refs_count, 1);
    assert_eq!(outcome.links.not_linked, 2);
    assert!(outcome.sha256.is_some());

    let html = fs::read_to_string(output_dir.join("5.html")).expect("html output");
    assert!(html.contains("<h3>1. Introduction</h3>"));

    let metadata: DocumentMetadata =
        crate::util::read_json(&output_dir.join("5.json")).expect("metadata output");
    assert_eq!(metadata.refs[0].year.as_deref(), Some("2001"));
}

#[test]
fn corpus_loads_examples_and_languages() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("corpus.sqlite");
    let connection = Connection::open(&db_path).expect("open db");
    connection
        .execute_batch(
            "
            CREATE TABLE sentence (id INTEGER PRIMARY KEY, name TEXT);
            CREATE TABLE language (id TEXT PRIMARY KEY, name TEXT);
            INSERT INTO sentence (id, name) VALUES (7, 'Hello world!');
            INSERT INTO sentence (id, name) VALUES (8, NULL);
            INSERT INTO language (id, name) VALUES ('12', 'Papiamentu');
            ",
        )
        .expect("seed corpus");
    drop(connection);

    let corpus = Corpus::load(&db_path).expect("corpus");
    assert_eq!(corpus.examples.lookup("hello world"), ["7".to_string()]);
    assert_eq!(corpus.examples.len(), 1);
    assert_eq!(corpus.languages.get("papiamentu").map(String::as_str), Some("12"));
}

#[test]
fn process_document_decodes_windows_1252_exports() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("I_12_Papiamentu.htm");
    let mut bytes = b"<html><head><meta http-equiv=\"Content-Type\" \
        content=\"text/html; charset=windows-1252\"></head><body><div>\
        <p>Papiamentu (Cura"
        .to_vec();
    bytes.push(0xE7);
    bytes.extend_from_slice(
        b"ao)</p><p>Silvia Kouwenberg</p><table><tr><td>Lexifier</td></tr></table>\
        <h1>1. Introduction</h1><p>Some text.</p></div></body></html>",
    );
    fs::write(&source, &bytes).expect("write source");
    let output_dir = dir.path().join("processed");
    fs::create_dir_all(&output_dir).expect("output dir");

    let languages = languages();
    let family = SurveyFamily::new(&languages).expect("survey family");
    let outcome = process_document(&family, &source, &output_dir).expect("processed");
    assert_eq!(outcome.document_id.as_deref(), Some("12.I-12"));

    let metadata: DocumentMetadata =
        crate::util::read_json(&output_dir.join("12.I-12.json")).expect("metadata output");
    assert_eq!(metadata.title.as_deref(), Some("Papiamentu (Curaçao)"));
    assert_eq!(metadata.authors, vec!["Silvia Kouwenberg"]);
}
