use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use wordcloud_rs_renderer::config::{Config, PackConfig};
use wordcloud_rs_renderer::ir::WordList;
use wordcloud_rs_renderer::layout::{CancelFlag, PackingSession, RngRandomizer, WordMask, compute_cloud};
use wordcloud_rs_renderer::parser::parse_words;
use wordcloud_rs_renderer::render::render_svg;

fn synthetic_words(count: usize) -> WordList {
    WordList::from_entries((0..count).map(|i| (format!("term{i}"), (count - i) as f64)))
}

fn synthetic_masks(count: usize) -> Vec<WordMask> {
    (0..count)
        .map(|i| {
            let width = 8 + (i * 37) % 90;
            let height = 6 + (i * 11) % 28;
            WordMask::filled(width, height).expect("non-empty mask")
        })
        .collect()
}

fn fixture(name: &str) -> &'static str {
    match name {
        "languages" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/languages.txt"
        )),
        "prose" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/prose.txt"
        )),
        _ => panic!("unknown fixture"),
    }
}

fn fast_config(width: f32, height: f32) -> Config {
    let mut config = Config::default();
    config.set_canvas_size(width, height);
    config.layout.fast_text_metrics = true;
    config.layout.glyph_masks = false;
    config
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for name in ["languages", "prose"] {
        let input = fixture(name);
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, data| {
            b.iter(|| {
                let parsed = parse_words(black_box(data)).expect("parse failed");
                black_box(parsed.words.len());
            });
        });
    }
    group.finish();
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    for (count, dilation) in [(50, 0), (200, 0), (200, 2), (600, 1)] {
        let masks = synthetic_masks(count);
        let id = format!("{count}_words_dilation_{dilation}");
        group.bench_with_input(BenchmarkId::from_parameter(id), &masks, |b, masks| {
            b.iter(|| {
                let config = PackConfig {
                    dilation,
                    ..PackConfig::default()
                };
                let mut session =
                    PackingSession::new(1200.0, 800.0, RngRandomizer::seeded(7), config)
                        .expect("valid canvas");
                let report = session.place_all(masks, &CancelFlag::new());
                black_box(report.placements.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let config = fast_config(1200.0, 800.0);
    for count in [25, 100, 250] {
        let words = synthetic_words(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &words, |b, words| {
            b.iter(|| {
                let layout =
                    compute_cloud(words, &config, RngRandomizer::seeded(11), &CancelFlag::new())
                        .expect("layout failed");
                let svg = render_svg(&layout, &config.theme);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_parse, bench_session, bench_end_to_end
);
criterion_main!(benches);
