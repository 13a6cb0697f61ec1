use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scribe_parser::{parse, serialize, tokenize, Color, Document, Font, Format, RunFormat, TitleLevelRegistry};
use std::sync::Arc;

fn build_document(registry: &Arc<TitleLevelRegistry>, blocks: usize) -> Document {
    let heading = registry.by_name("H2").unwrap();
    let mut doc = Document::new(registry.clone());
    doc.title = Some("Benchmark".to_string());

    for i in 0..blocks {
        let mut format = Format::body(registry);
        if i % 10 == 0 {
            format.block.title_level = heading;
        }
        let id = doc.add_block(&format);
        let block = doc.block_mut(id).unwrap();

        let mut emphasis = RunFormat::new(Font::new("Serif", 14).with_italic(true));
        emphasis.color = Color::rgba(200, 20, 20, 230);
        emphasis.background = Some(Color::rgb(255, 255, 200));

        block.add_run("Lorem ipsum dolor sit amet, ", RunFormat::new(Font::new("Sans", 12)));
        block.add_run("consectetur adipiscing", emphasis);
        block.add_run(" elit & sed <do> eiusmod.", RunFormat::new(Font::new("Sans", 12)));
    }
    doc
}

fn parse_small_document(c: &mut Criterion) {
    let registry = Arc::new(TitleLevelRegistry::standard("Sans"));
    let source = r#"
        <html>
        <head><title>Notes</title></head>
        <body style="width:800px">
        <h1>Heading</h1>
        <p>
        <span style="font-family:Sans;font-size:12pt;color:rgba(0,0,0,1);background-color:none">hello</span>
        </p>
        </body>
        </html>
    "#;

    c.bench_function("parse_small_document", |b| {
        b.iter(|| parse(black_box(source), registry.clone()))
    });
}

fn parse_large_document(c: &mut Criterion) {
    let registry = Arc::new(TitleLevelRegistry::standard("Sans"));
    let source = serialize(&build_document(&registry, 1000));

    c.bench_function("parse_large_document_1000_blocks", |b| {
        b.iter(|| parse(black_box(&source), registry.clone()))
    });
}

fn serialize_large_document(c: &mut Criterion) {
    let registry = Arc::new(TitleLevelRegistry::standard("Sans"));
    let doc = build_document(&registry, 1000);

    c.bench_function("serialize_large_document_1000_blocks", |b| {
        b.iter(|| serialize(black_box(&doc)))
    });
}

fn tokenize_only(c: &mut Criterion) {
    let registry = Arc::new(TitleLevelRegistry::standard("Sans"));
    let source = serialize(&build_document(&registry, 200));

    c.bench_function("tokenize_only", |b| b.iter(|| tokenize(black_box(&source))));
}

criterion_group!(
    benches,
    parse_small_document,
    parse_large_document,
    serialize_large_document,
    tokenize_only
);
criterion_main!(benches);
