use criterion::{Criterion, criterion_group, criterion_main};
use notedown_html::{RenderOptions, markdown_to_html, render_to_html};
use notedown_syntax::FlavourKind;

fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with *some* **content** and a [link](https://example.com).\n\n\
                - Bullet point\n  - Nested item\n- [x] Task item\n\n\
                > Quote with `code`\n\n\
                | a | b |\n|:--|--:|\n| 1 | 2 |\n\n\
                ```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n";
    base.repeat(size)
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(10);

    let content = generate_markdown_content(100);
    let gfm = RenderOptions::default();
    let commonmark = RenderOptions::for_flavour(FlavourKind::CommonMark);

    group.bench_function("gfm_parse_and_render", |b| {
        b.iter(|| {
            let html = markdown_to_html(std::hint::black_box(&content), &gfm);
            std::hint::black_box(html)
        });
    });

    group.bench_function("commonmark_parse_and_render", |b| {
        b.iter(|| {
            let html = markdown_to_html(std::hint::black_box(&content), &commonmark);
            std::hint::black_box(html)
        });
    });

    let tree = notedown_syntax::parse(&content);
    group.bench_function("render_only", |b| {
        b.iter(|| {
            let html = render_to_html(std::hint::black_box(&tree), &content, &gfm);
            std::hint::black_box(html)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
