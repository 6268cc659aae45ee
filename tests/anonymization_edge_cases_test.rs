//! Edge cases of the document engine and the run coordinator

use polarion_anonymizer::adapters::xml::{Document, Node};
use polarion_anonymizer::anonymization::references::{DocumentLocation, PendingAttachmentSet};
use polarion_anonymizer::anonymization::{anonymize_document, AnonymizationContext, TextRandomizer};
use polarion_anonymizer::core::run::{RunCoordinator, RunOptions};
use polarion_anonymizer::domain::AnonymizerError;
use std::fs;
use tempfile::TempDir;

fn location() -> DocumentLocation {
    DocumentLocation::new("/export", "/export_anonymized", "modules")
}

fn anonymize(xml: &str) -> Document {
    let mut document = Document::parse(xml).unwrap();
    let mut context = AnonymizationContext::default();
    anonymize_document(&mut document, &location(), &mut context).unwrap();
    document
}

#[test]
fn test_empty_field_is_left_alone() {
    let document = anonymize("<m><field id=\"author\"/><field id=\"title\"></field></m>");
    assert!(document.to_xml_string().ends_with("<m><field id=\"author\"/><field id=\"title\"/></m>"));
}

#[test]
fn test_cdata_field_stays_cdata() {
    let document = anonymize("<m><field id=\"title\"><![CDATA[Quarterly <report>]]></field></m>");
    let field = document.elements("field")[0];
    match &field.children[0] {
        Node::CData(text) => {
            assert_eq!(text.chars().count(), "Quarterly <report>".chars().count());
            assert!(!text.contains("Quarterly"));
            assert!(text.contains(" <"));
        }
        other => panic!("expected CDATA, got {other:?}"),
    }
}

#[test]
fn test_non_ascii_letters_become_w() {
    let document = anonymize("<m><field id=\"author\">Łódź 東京</field></m>");
    let text = document.elements("field")[0].text_content();
    // Ł has no decomposition, ó and ź lose their accents, CJK letters map to W
    assert!(text.starts_with('W'));
    assert!(text.ends_with(" WW"));
    assert_eq!(text.chars().count(), 7);
}

#[test]
fn test_digits_replaced_in_plain_fields() {
    let document = anonymize("<m><field type=\"integer\">1234567890</field></m>");
    let text = document.elements("field")[0].text_content();
    assert_eq!(text.len(), 10);
    assert!(text.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn test_enum_user_reference_randomized() {
    let document = anonymize("<m><field type=\"enum:@user\">jdoe</field><field type=\"enum:status\">open</field></m>");
    let fields = document.elements("field");
    assert_ne!(fields[0].text_content(), "jdoe");
    assert_eq!(fields[1].text_content(), "open");
}

#[test]
fn test_html_item_inside_html_field_randomized_again() {
    let xml = "<m><field text-type=\"text/html\"><list><item text-type=\"text/html\">&lt;b&gt;Alpha&lt;/b&gt;</item></list></field></m>";
    let document = anonymize(xml);
    let item = document.elements("item")[0].text_content();
    assert!(item.starts_with("<b>"));
    assert!(item.ends_with("</b>"));
    assert!(!item.contains("Alpha"));
}

#[test]
fn test_same_name_in_two_documents_maps_once() {
    let xml = "<m><field text-type=\"text/html\">&lt;img src=\"attachment:logo.png\"/&gt;</field></m>";
    let mut context = AnonymizationContext::with_randomizer(
        TextRandomizer::with_seed(11),
        PendingAttachmentSet::new(),
    );

    let mut first = Document::parse(xml).unwrap();
    let mut second = Document::parse(xml).unwrap();
    let first_moves = anonymize_document(&mut first, &location(), &mut context).unwrap();
    let second_moves = anonymize_document(&mut second, &location(), &mut context).unwrap();

    assert_eq!(first_moves, second_moves);
    assert_eq!(context.names.len(), 1);
    assert_eq!(
        first.elements("field")[0].text_content(),
        second.elements("field")[0].text_content()
    );
}

#[test]
fn test_malformed_reference_aborts_run_leaving_partial_output() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("export");
    fs::create_dir_all(root.join("a")).unwrap();
    fs::create_dir_all(root.join("b")).unwrap();
    fs::write(root.join("a/ok.xml"), "<m><field id=\"author\">x</field></m>").unwrap();
    fs::write(
        root.join("b/bad.xml"),
        "<m><field text-type=\"text/html\">&lt;img src=\"attachment:100%.png\"/&gt;</field></m>",
    )
    .unwrap();

    let result = RunCoordinator::new(RunOptions::new(&root)).execute();
    assert!(matches!(result, Err(AnonymizerError::Decode(_))));
    assert!(temp.path().join("export_anonymized/a/ok.xml").is_file());
    assert!(!temp.path().join("export_anonymized/b/bad.xml").exists());
}

#[test]
fn test_malformed_xml_aborts_run() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("export");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("broken.xml"), "<m><field>unclosed</m>").unwrap();

    let result = RunCoordinator::new(RunOptions::new(&root)).execute();
    assert!(matches!(result, Err(AnonymizerError::Xml(_))));
}

#[test]
fn test_non_xml_outside_attachment_dirs_not_copied() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("export");
    fs::create_dir_all(root.join(".polarion")).unwrap();
    fs::write(root.join(".polarion/settings.properties"), "secret=1").unwrap();
    fs::write(root.join("project.xml"), "<project/>").unwrap();

    let summary = RunCoordinator::new(RunOptions::new(&root)).execute().unwrap();
    assert_eq!(summary.documents, 1);
    assert_eq!(summary.attachments_discovered, 0);
    assert!(!temp
        .path()
        .join("export_anonymized/.polarion/settings.properties")
        .exists());
}

#[test]
fn test_custom_suffix() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("export");
    fs::create_dir_all(&root).unwrap();

    let mut options = RunOptions::new(&root);
    options.suffix = "-public".to_string();
    RunCoordinator::new(options).execute().unwrap();
    assert!(temp.path().join("export-public").is_dir());
}
