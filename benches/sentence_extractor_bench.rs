use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use folio::{DocumentParser, Format, OffsetText, SentenceExtractor};

const SIMPLE_TEXT: &str = "Hello world. This is a test. How are you?";
const COMPLEX_TEXT: &str = r#"Mr. Smith met Dr. Brown at 9 a.m. in the U.S.A. and said "Hello there." Then they left... It was 3.14 miles! Really?"#;

const ASCIIDOC_TEXT: &str = "= Guide\n\n== Install\n\nRun the *installer* first. Then reboot.\n\n* check the `log` output\n* read <<faq,the FAQ>>\n\n----\nignored code.\n----\n";

// WHY: repeat a paragraph so throughput numbers are not dominated by setup
fn long_text(paragraph: &str, copies: usize) -> String {
    let mut text = String::with_capacity(paragraph.len() * copies + copies);
    for _ in 0..copies {
        text.push_str(paragraph);
        text.push(' ');
    }
    text
}

fn bench_extract(c: &mut Criterion) {
    let extractor = SentenceExtractor::with_default_rules().expect("Default rules should compile");
    let mut group = c.benchmark_group("extract");

    for (name, text) in [
        ("simple", SIMPLE_TEXT.to_string()),
        ("complex", COMPLEX_TEXT.to_string()),
        ("long", long_text(COMPLEX_TEXT, 200)),
    ] {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &text, |b, text| {
            b.iter(|| extractor.extract(black_box(text)))
        });
    }
    group.finish();
}

fn bench_split_text(c: &mut Criterion) {
    let extractor = SentenceExtractor::with_default_rules().expect("Default rules should compile");
    let text = OffsetText::from_line(&long_text(COMPLEX_TEXT, 50), 1, 0);

    let mut group = c.benchmark_group("split_text");
    group.throughput(Throughput::Bytes(text.as_str().len() as u64));
    group.bench_function("positioned", |b| b.iter(|| extractor.split_text(black_box(&text))));
    group.finish();
}

fn bench_parsers(c: &mut Criterion) {
    let extractor = SentenceExtractor::with_default_rules().expect("Default rules should compile");
    let asciidoc = ASCIIDOC_TEXT.repeat(50);
    let plain = long_text(COMPLEX_TEXT, 50).replace(". ", ".\n");

    let mut group = c.benchmark_group("parse");
    for (format, source) in [(Format::Plain, &plain), (Format::AsciiDoc, &asciidoc)] {
        let parser = format.parser();
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(format), source, |b, source| {
            b.iter(|| parser.parse_str(black_box(source), &extractor))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extract, bench_split_text, bench_parsers);
criterion_main!(benches);
