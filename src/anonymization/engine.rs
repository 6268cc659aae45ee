//! Per-document anonymization entry point
//!
//! [`anonymize_document`] runs three passes over a parsed document:
//!
//! 1. every `field` element is classified by [`rules::FIELD_RULES`] and each
//!    matching rule's strategy is applied to its text
//! 2. attachment references in `text/html` fields and items are rewritten to
//!    their run-consistent names, producing [`FileMove`] intents
//! 3. every `item` marked `text/html`, wherever it sits, is markup-randomized
//!
//! The passes must run in this order; the third one deliberately sees text
//! the second one already rewrote.
//!
//! # Examples
//!
//! ```
//! use polarion_anonymizer::adapters::xml::Document;
//! use polarion_anonymizer::anonymization::{anonymize_document, AnonymizationContext};
//! use polarion_anonymizer::anonymization::references::DocumentLocation;
//!
//! # fn example() -> polarion_anonymizer::domain::Result<()> {
//! let mut document = Document::parse(r#"<module><field id="author">jdoe</field></module>"#)?;
//! let location = DocumentLocation::new("/export", "/export_anonymized", "modules");
//! let mut context = AnonymizationContext::default();
//!
//! let moves = anonymize_document(&mut document, &location, &mut context)?;
//! assert!(moves.is_empty());
//! assert_ne!(document.elements("field")[0].text_content(), "jdoe");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use super::context::AnonymizationContext;
use super::references::{DocumentLocation, FileMove};
use super::rules::{self, matching_rules, Strategy};
use super::text::TextRandomizer;
use crate::adapters::xml::{Document, Element};
use crate::domain::Result;
use crate::log_progress;

const FIELD_TAG: &str = "field";
const ITEM_TAG: &str = "item";

/// Anonymize one document in place and return the files to copy
///
/// # Errors
///
/// Fails when an attachment reference name is not valid percent-encoding.
pub fn anonymize_document(
    document: &mut Document,
    location: &DocumentLocation,
    context: &mut AnonymizationContext,
) -> Result<Vec<FileMove>> {
    let verbose = context.verbose;

    document.visit_elements_mut(FIELD_TAG, |field| -> Result<()> {
        anonymize_field(field, &mut context.randomizer, verbose)?;
        Ok(())
    })?;

    let mut moves = Vec::new();
    for tag in [FIELD_TAG, ITEM_TAG] {
        document.visit_elements_mut(tag, |element| -> Result<()> {
            if !rules::is_html_text(element) {
                return Ok(());
            }
            if let Some(text) = element.first_text_mut() {
                let outcome = context.rewrite_references(text, location)?;
                *text = outcome.text;
                moves.extend(outcome.moves);
            }
            Ok(())
        })?;
    }

    document.visit_elements_mut(ITEM_TAG, |item| -> Result<()> {
        if rules::is_html_text(item) {
            apply_strategy(item, Strategy::Markup, &mut context.randomizer)?;
        }
        Ok(())
    })?;

    Ok(moves)
}

/// Apply every matching rule to one field and return the names of the rules
/// that fired
pub fn anonymize_field(
    field: &mut Element,
    randomizer: &mut TextRandomizer,
    verbose: bool,
) -> Result<Vec<&'static str>> {
    let fired: Vec<_> = matching_rules(field).collect();

    log_progress!(
        verbose,
        id = field.attribute("id").unwrap_or_default(),
        text_type = field.attribute("text-type").unwrap_or_default(),
        rules = ?fired.iter().map(|rule| rule.name).collect::<Vec<_>>(),
        "Field classified"
    );

    for rule in &fired {
        apply_strategy(field, rule.strategy, randomizer)?;
    }
    Ok(fired.into_iter().map(|rule| rule.name).collect())
}

/// Randomize an element's text with `strategy`
///
/// Multi-value elements (with `item` descendants) have each item's full text
/// replaced; otherwise only the first child is touched, and only when it is a
/// text or CDATA node.
pub fn apply_strategy(
    element: &mut Element,
    strategy: Strategy,
    randomizer: &mut TextRandomizer,
) -> Result<()> {
    if !element.has_children() {
        return Ok(());
    }

    if element.count_descendants(ITEM_TAG) > 0 {
        element.visit_descendants_mut(ITEM_TAG, &mut |item| -> Result<()> {
            let randomized = randomize(randomizer, strategy, &item.text_content());
            item.set_text_content(randomized);
            Ok(())
        })?;
    } else if let Some(text) = element.first_text_mut() {
        let randomized = randomize(randomizer, strategy, text);
        *text = randomized;
    }
    Ok(())
}

fn randomize(randomizer: &mut TextRandomizer, strategy: Strategy, text: &str) -> String {
    match strategy {
        Strategy::PlainText => randomizer.plain_text(text),
        Strategy::Markup => randomizer.markup_text(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::references::{PendingAttachmentSet, ReferenceKind};
    use std::path::PathBuf;

    fn location() -> DocumentLocation {
        DocumentLocation::new("/export", "/export_anonymized", "workitems/WI-1")
    }

    fn first_field_text(document: &Document) -> String {
        document.elements("field")[0].text_content()
    }

    #[test]
    fn test_author_field_randomized() {
        let mut document =
            Document::parse("<module-comment><field id=\"author\">AUTHOR</field></module-comment>")
                .unwrap();
        let mut context = AnonymizationContext::default();
        anonymize_document(&mut document, &location(), &mut context).unwrap();
        let text = first_field_text(&document);
        assert_ne!(text, "AUTHOR");
        assert_eq!(text.len(), 6);
    }

    #[test]
    fn test_html_field_randomized_keeping_tags() {
        let xml = "<module><field id=\"homePageContent\" text-type=\"text/html\">&lt;h1 id=\"polarion_wiki macro name=module-workitem;params=id=2_AN-7846\"&gt;&lt;/h1&gt;&lt;p id=\"polarion_template_0\"&gt;TEST&lt;/p&gt;</field>  </module>";
        let mut document = Document::parse(xml).unwrap();
        let mut context = AnonymizationContext::default();
        anonymize_document(&mut document, &location(), &mut context).unwrap();
        let text = first_field_text(&document);
        assert!(!text.contains("TEST"));
        assert!(text.starts_with("<h1 id=\"polarion_wiki"));
        assert!(text.ends_with("</p>"));
    }

    #[test]
    fn test_multi_value_field_randomizes_each_item() {
        let xml = "<module><field id=\"assignee\"><list><item>ASSIGNEE1</item><item>ASSIGNEE2</item><item>ASSIGNEE3</item></list></field></module>";
        let mut document = Document::parse(xml).unwrap();
        let mut context = AnonymizationContext::default();
        anonymize_document(&mut document, &location(), &mut context).unwrap();
        assert!(!first_field_text(&document).contains("ASSIGNEE"));
        assert_eq!(document.elements("item").len(), 3);
    }

    #[test]
    fn test_multi_value_html_field() {
        let xml = "<module><field text-type=\"text/html\"><list><item>&lt;p&gt;TEST1&lt;/p&gt;</item><item>&lt;p&gt;TEST2&lt;/p&gt;</item></list></field></module>";
        let mut document = Document::parse(xml).unwrap();
        let mut context = AnonymizationContext::default();
        anonymize_document(&mut document, &location(), &mut context).unwrap();
        let text = first_field_text(&document);
        assert!(!text.contains("TEST"));
        assert_eq!(text.matches("<p>").count(), 2);
    }

    #[test]
    fn test_unmatched_document_is_untouched() {
        let xml = "<module><field id=\"status\">open</field><field id=\"created\" type=\"date-time\">2016-01-12</field></module>";
        let mut document = Document::parse(xml).unwrap();
        let before = document.to_xml_string();
        let mut context = AnonymizationContext::default();
        let moves = anonymize_document(&mut document, &location(), &mut context).unwrap();
        assert!(moves.is_empty());
        assert_eq!(document.to_xml_string(), before);
    }

    #[test]
    fn test_attachment_name_rewritten() {
        let xml = "<workitem><field id=\"description\" text-type=\"text/html\">&lt;p&gt;TEST&lt;/p&gt;&lt;img src=\"workitemimg:1-image.png\"/&gt;</field></workitem>";
        let mut document = Document::parse(xml).unwrap();
        let mut pending = PendingAttachmentSet::new();
        pending.insert("/export/workitems/WI-1/attachment1-image.png");
        let mut context = AnonymizationContext::new(pending);

        let moves = anonymize_document(&mut document, &location(), &mut context).unwrap();

        let text = first_field_text(&document);
        assert!(!text.contains("TEST"));
        assert!(text.contains("workitemimg:1-"));
        assert!(!text.contains("image.png"));
        assert!(text.contains(".png"));
        assert_eq!(moves.len(), 1);
        assert_eq!(
            moves[0].source,
            PathBuf::from("/export/workitems/WI-1/attachment1-image.png")
        );
        assert!(matches!(moves[0].kind, ReferenceKind::WorkItemImage { .. }));
        assert!(context.pending.is_empty());
    }

    #[test]
    fn test_html_item_reference_rewritten() {
        let xml = "<workitem><comments><item text-type=\"text/html\">&lt;p&gt;NOTE&lt;/p&gt;&lt;img src=\"workitemimg:2-diagram.png\"/&gt;</item></comments></workitem>";
        let mut document = Document::parse(xml).unwrap();
        let mut pending = PendingAttachmentSet::new();
        pending.insert("/export/workitems/WI-1/attachment2-diagram.png");
        let mut context = AnonymizationContext::new(pending);

        let moves = anonymize_document(&mut document, &location(), &mut context).unwrap();

        let text = document.elements("item")[0].text_content();
        assert!(!text.contains("NOTE"));
        assert!(!text.contains("diagram"));
        assert!(text.contains("src=\"workitemimg:2-"));
        assert_eq!(moves.len(), 1);
        assert_eq!(
            moves[0].source,
            PathBuf::from("/export/workitems/WI-1/attachment2-diagram.png")
        );
        assert_eq!(
            moves[0].kind,
            ReferenceKind::WorkItemImage {
                sequence: "2-".to_string()
            }
        );
        let new_name = context.names.get("diagram.png").unwrap().to_string();
        assert_eq!(
            moves[0].destination,
            PathBuf::from(format!(
                "/export_anonymized/workitems/WI-1/attachment2-{}",
                new_name
            ))
        );
        assert!(text.contains(&new_name));
        assert!(context.pending.is_empty());
    }

    #[test]
    fn test_html_items_outside_fields_randomized() {
        let xml = "<module><comments><item text-type=\"text/html\">&lt;b&gt;SECRET&lt;/b&gt;</item><item>PLAIN</item></comments></module>";
        let mut document = Document::parse(xml).unwrap();
        let mut context = AnonymizationContext::default();
        anonymize_document(&mut document, &location(), &mut context).unwrap();
        let items = document.elements("item");
        assert!(!items[0].text_content().contains("SECRET"));
        assert!(items[0].text_content().starts_with("<b>"));
        assert_eq!(items[1].text_content(), "PLAIN");
    }

    #[test]
    fn test_malformed_reference_fails_document() {
        let xml = "<m><field text-type=\"text/html\">&lt;img src=\"attachment:%zz.png\"/&gt;</field></m>";
        let mut document = Document::parse(xml).unwrap();
        let mut context = AnonymizationContext::default();
        assert!(anonymize_document(&mut document, &location(), &mut context).is_err());
    }

    #[test]
    fn test_anonymize_field_reports_rules() {
        let mut field = Element::new("field")
            .with_attribute("id", "title")
            .with_attribute("type", "string")
            .with_child(crate::adapters::xml::Node::Text("Title".into()));
        let mut randomizer = TextRandomizer::new();
        let fired = anonymize_field(&mut field, &mut randomizer, false).unwrap();
        assert_eq!(fired, vec!["identity_field", "scalar_type"]);
        assert_ne!(field.text_content(), "Title");
    }

    #[test]
    fn test_apply_strategy_skips_element_children() {
        let mut field = Element::new("field")
            .with_child(crate::adapters::xml::Node::Element(Element::new("list")));
        let mut randomizer = TextRandomizer::new();
        apply_strategy(&mut field, Strategy::PlainText, &mut randomizer).unwrap();
        assert_eq!(field.children.len(), 1);
    }
}
