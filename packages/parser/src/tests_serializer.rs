/// Tests to verify the serializer output reads back into the same document
use crate::*;
use std::sync::Arc;

fn registry() -> Arc<TitleLevelRegistry> {
    Arc::new(TitleLevelRegistry::standard("Sans"))
}

fn runs(doc: &Document) -> Vec<Vec<(String, RunFormat)>> {
    doc.blocks()
        .iter()
        .map(|block| {
            block
                .runs()
                .iter()
                .map(|run| (run.text.clone(), run.format.clone()))
                .collect()
        })
        .collect()
}

fn levels(doc: &Document) -> Vec<TitleLevelId> {
    doc.blocks().iter().map(Block::title_level).collect()
}

fn roundtrip(doc: &Document) -> Document {
    let serialized = serialize(doc);
    parse(&serialized, doc.registry().clone())
        .unwrap_or_else(|e| panic!("Failed to reparse: {}\n{}", e, serialized))
}

#[test]
fn test_roundtrip_basic_document() {
    let mut doc = Document::new(registry());
    doc.title = Some("Notes".to_string());
    doc.width = 800;
    let id = doc.first_block().id();
    doc.block_mut(id)
        .unwrap()
        .add_run("hello", RunFormat::new(Font::new("Sans", 12)));

    let reparsed = roundtrip(&doc);

    assert_eq!(reparsed.title.as_deref(), Some("Notes"));
    assert_eq!(reparsed.width, 800);
    assert_eq!(runs(&reparsed), runs(&doc));
    assert_eq!(reparsed.first_block().runs()[0].format.color, Color::rgba(0, 0, 0, 255));
    assert_eq!(reparsed.first_block().runs()[0].format.background, None);
}

#[test]
fn test_roundtrip_heading_level() {
    let registry = registry();
    let h2 = registry.by_name("H2").unwrap();
    let mut doc = Document::new(registry.clone());
    let id = doc.first_block().id();
    let block = doc.block_mut(id).unwrap();
    block.set_title_level(h2);
    block.add_run("Title", RunFormat::new(registry.get(h2).unwrap().font.clone()));

    let reparsed = roundtrip(&doc);
    let level = reparsed.first_block().title_level();

    assert_eq!(registry.get(level).unwrap().tag, "h2");
    assert_eq!(runs(&reparsed), runs(&doc));
}

#[test]
fn test_roundtrip_mixed_formats() {
    let registry = registry();
    let mut doc = Document::new(registry.clone());
    let first = doc.first_block().id();

    let plain = RunFormat::new(Font::new("Sans", 12));
    let mut fancy = RunFormat::new(
        Font::new("Noto Serif", 30)
            .with_weight(FontWeight(300))
            .with_italic(true),
    );
    fancy.color = Color::rgba(12, 200, 99, 77);
    fancy.background = Some(Color::rgba(255, 250, 205, 1));

    {
        let block = doc.block_mut(first).unwrap();
        block.add_run("plain ", plain.clone());
        block.add_run("<fancy> & \"quoted\"", fancy.clone());
        block.add_run(" tail", plain.clone());
    }

    let mut heading = Format::body(&registry);
    heading.block.title_level = registry.by_name("H1").unwrap();
    let second = doc.add_block(&heading);
    doc.block_mut(second).unwrap().add_run("Chapter", fancy);

    let empty = doc.add_block(&Format::body(&registry));
    assert!(doc.block(empty).unwrap().is_empty());

    let reparsed = roundtrip(&doc);

    assert_eq!(levels(&reparsed), levels(&doc));
    assert_eq!(runs(&reparsed), runs(&doc));
    assert_eq!(reparsed.text(), doc.text());
}

#[test]
fn test_roundtrip_preserves_whitespace_inside_runs() {
    let mut doc = Document::new(registry());
    let id = doc.first_block().id();
    doc.block_mut(id)
        .unwrap()
        .add_run("  indented\ttext  ", RunFormat::new(Font::new("Mono", 10)));

    let reparsed = roundtrip(&doc);
    assert_eq!(reparsed.first_block().text(), "  indented\ttext  ");
}

#[test]
fn test_line_spacing_is_not_persisted() {
    let mut doc = Document::new(registry());
    let id = doc.first_block().id();
    let block = doc.block_mut(id).unwrap();
    block.set_line_spacing(20.0);
    block.set_line_spacing_policy(LineSpacingPolicy::Absolute);

    let reparsed = roundtrip(&doc);
    let block = reparsed.first_block();
    assert_eq!(block.line_spacing(), ast::DEFAULT_LINE_SPACING);
    assert_eq!(block.line_spacing_policy(), LineSpacingPolicy::Relative);
}

#[test]
fn test_roundtrip_is_stable() {
    let mut doc = Document::new(registry());
    doc.title = Some("Stable".to_string());
    let id = doc.first_block().id();
    doc.block_mut(id)
        .unwrap()
        .add_run("same", RunFormat::new(Font::new("Sans", 12)));

    let once = serialize(&doc);
    let twice = serialize(&parse(&once, doc.registry().clone()).unwrap());
    assert_eq!(once, twice);
}

#[test]
fn test_roundtrip_family_with_attribute_characters() {
    let families = ["AT&T Sans", "A;B", "Foo \"Bar\"", "'Quoted'", "50% Mono: Wide", "<x>"];

    let mut doc = Document::new(registry());
    let id = doc.first_block().id();
    let block = doc.block_mut(id).unwrap();
    for (i, family) in families.iter().enumerate() {
        block.add_run(format!("run{}", i), RunFormat::new(Font::new(*family, 12)));
    }

    let reparsed = roundtrip(&doc);
    let decoded: Vec<&str> = reparsed
        .first_block()
        .runs()
        .iter()
        .map(|run| run.format.font.family.as_str())
        .collect();
    assert_eq!(decoded, families);
    assert_eq!(runs(&reparsed), runs(&doc));
}
