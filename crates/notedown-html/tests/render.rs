use insta::assert_snapshot;
use notedown_html::{RenderOptions, markdown_to_html};
use notedown_syntax::FlavourKind;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn render(text: &str) -> String {
    markdown_to_html(text, &RenderOptions::default()).expect("render")
}

fn render_with(text: &str, options: &RenderOptions) -> String {
    markdown_to_html(text, options).expect("render")
}

#[rstest]
#[case::quote("> quote\n> more", "<blockquote>\n<p>quote\nmore</p>\n</blockquote>\n")]
#[case::ordered("1. a\n2. b", "<ol>\n<li>a</li>\n<li>b</li>\n</ol>\n")]
#[case::ordered_start("3. a", "<ol start=\"3\">\n<li>a</li>\n</ol>\n")]
#[case::loose(
    "- a\n\n- b",
    "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n"
)]
#[case::loose_item(
    "- a\n- b\n\n  c",
    "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n<p>c</p>\n</li>\n</ul>\n"
)]
#[case::nested("- a\n  - b", "<ul>\n<li>a\n<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>\n")]
#[case::fence(
    "```rust\nfn main() {}\n```",
    "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
)]
#[case::indented("    code\n", "<pre><code>code\n</code></pre>\n")]
#[case::thematic_break("***", "<hr />\n")]
#[case::setext("Title\n===", "<h1>Title</h1>\n")]
#[case::html_block("<div>\n*x*\n</div>", "<div>\n*x*\n</div>\n")]
#[case::empty("", "")]
#[case::tab_after_quote_marker(
    ">\t\tfoo",
    "<blockquote>\n<pre><code>  foo\n</code></pre>\n</blockquote>\n"
)]
#[case::tab_after_list_marker("-\t\tfoo", "<ul>\n<li>\n<pre><code>  foo\n</code></pre>\n</li>\n</ul>\n")]
#[case::tab_inside_an_item(
    "- foo\n\n\t\tbar",
    "<ul>\n<li>\n<p>foo</p>\n<pre><code>  bar\n</code></pre>\n</li>\n</ul>\n"
)]
#[case::tab_indented_sublist(
    " - foo\n   - bar\n\t - baz",
    "<ul>\n<li>foo\n<ul>\n<li>bar\n<ul>\n<li>baz</li>\n</ul>\n</li>\n</ul>\n</li>\n</ul>\n"
)]
#[case::four_column_marker_is_lazy(
    "- a\n - b\n  - c\n   - d\n    - e\n",
    "<ul>\n<li>a</li>\n<li>b</li>\n<li>c</li>\n<li>d\n- e</li>\n</ul>\n"
)]
#[case::four_column_marker_is_code(
    "1. a\n\n  2. b\n\n    3. c\n",
    "<ol>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ol>\n<pre><code>3. c\n</code></pre>\n"
)]
fn blocks(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(render(input), expected);
}

#[rstest]
#[case::hard_break_spaces("a  \nb", "<p>a<br />\nb</p>\n")]
#[case::hard_break_backslash("a\\\nb", "<p>a<br />\nb</p>\n")]
#[case::soft_break_trailing_space("a \nb", "<p>a\nb</p>\n")]
#[case::entities("&amp; &copy; &#35;", "<p>&amp; © #</p>\n")]
#[case::unknown_entity("&nosuch;", "<p>&amp;nosuch;</p>\n")]
#[case::escapes("\\*not emphasis\\*", "<p>*not emphasis*</p>\n")]
#[case::quotes("\"quoted\"", "<p>&quot;quoted&quot;</p>\n")]
#[case::nul("a\0b", "<p>a\u{FFFD}b</p>\n")]
#[case::code_html("`<a>`", "<p><code>&lt;a&gt;</code></p>\n")]
#[case::raw_html("a <b>bold</b>", "<p>a <b>bold</b></p>\n")]
#[case::math("$x^2$", "<p><span class=\"math math-inline\">x^2</span></p>\n")]
#[case::highlight("==mark==", "<p><mark>mark</mark></p>\n")]
#[case::underline("++u++", "<p><u>u</u></p>\n")]
#[case::combining_entity("&ngE;", "<p>\u{2267}\u{0338}</p>\n")]
fn inlines(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(render(input), expected);
}

#[rstest]
#[case::uri(
    "<https://example.com>",
    "<p><a href=\"https://example.com\">https://example.com</a></p>\n"
)]
#[case::email(
    "<foo@bar.example.com>",
    "<p><a href=\"mailto:foo@bar.example.com\">foo@bar.example.com</a></p>\n"
)]
#[case::bare_www(
    "visit www.example.com now",
    "<p>visit <a href=\"http://www.example.com\">www.example.com</a> now</p>\n"
)]
#[case::image(
    "![alt](/img.png \"T\")",
    "<p><img src=\"/img.png\" alt=\"alt\" title=\"T\" /></p>\n"
)]
#[case::data_image(
    "![i](data:image/png;base64,AAA)",
    "<p><img src=\"data:image/png;base64,AAA\" alt=\"i\" /></p>\n"
)]
#[case::reference(
    "[foo]\n\n[foo]: /url \"title\"",
    "<p><a href=\"/url\" title=\"title\">foo</a></p>\n"
)]
#[case::title("[a](/b 'c')", "<p><a href=\"/b\" title=\"c\">a</a></p>\n")]
#[case::bracketed("[a](<b c>)", "<p><a href=\"b%20c\">a</a></p>\n")]
#[case::percent("[a](foo%20b&auml;)", "<p><a href=\"foo%20b%C3%A4\">a</a></p>\n")]
#[case::undefined("[nope]", "<p>[nope]</p>\n")]
#[case::image_in_image(
    "![foo ![bar](/url)](/url2)",
    "<p><img src=\"/url2\" alt=\"foo bar\" /></p>\n"
)]
#[case::link_in_image(
    "![foo [bar](/url)](/url2)",
    "<p><img src=\"/url2\" alt=\"foo bar\" /></p>\n"
)]
#[case::unsafe_scheme("[x](javascript:alert(1))", "<p><a href=\"#\">x</a></p>\n")]
fn links(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(render(input), expected);
}

#[test]
fn task_list() {
    assert_eq!(
        render("- [ ] todo\n- [x] done"),
        "<ul>\n\
         <li><input type=\"checkbox\" disabled=\"\" /> todo</li>\n\
         <li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> done</li>\n\
         </ul>\n"
    );
}

#[test]
fn table_rows_match_the_header_width() {
    assert_eq!(
        render("| a | b |\n|:-|-:|\n| 1 |\n| 2 | 3 | 4 |"),
        "<table>\n<thead>\n<tr>\n\
         <th align=\"left\">a</th>\n<th align=\"right\">b</th>\n\
         </tr>\n</thead>\n<tbody>\n<tr>\n\
         <td align=\"left\">1</td>\n<td align=\"right\"></td>\n\
         </tr>\n<tr>\n\
         <td align=\"left\">2</td>\n<td align=\"right\">3</td>\n\
         </tr>\n</tbody>\n</table>\n"
    );
}

#[test]
fn escaped_pipe_in_cell_code() {
    assert_eq!(
        render("| f\\|oo  |\n| ------ |\n| b `\\|` az |\n| b **\\|** im |"),
        "<table>\n<thead>\n<tr>\n<th>f|oo</th>\n</tr>\n</thead>\n<tbody>\n\
         <tr>\n<td>b <code>|</code> az</td>\n</tr>\n\
         <tr>\n<td>b <strong>|</strong> im</td>\n</tr>\n\
         </tbody>\n</table>\n"
    );
}

#[rstest]
#[case::unclosed_brackets("[a", 20_000)]
#[case::unclosed_emphasis("*a ", 20_000)]
#[case::unclosed_images("![a", 20_000)]
fn long_unmatched_input_stays_text(#[case] unit: &str, #[case] count: usize) {
    let text = unit.repeat(count);
    let html = render(&text);
    assert!(html.starts_with("<p>"));
    assert!(!html.contains("<a ") && !html.contains("<em>") && !html.contains("<img"));
}

#[test]
fn base_uri_and_anchors() {
    let mut options = RenderOptions {
        base_uri: Some("https://x.org/docs/".to_string()),
        ..RenderOptions::default()
    };
    assert_eq!(
        render_with("[a](b) [t](#top)", &options),
        "<p><a href=\"https://x.org/docs/b\">a</a> <a href=\"#top\">t</a></p>\n"
    );
    options.absolutize_anchor_links = true;
    assert_eq!(
        render_with("[t](#top)", &options),
        "<p><a href=\"https://x.org/docs/#top\">t</a></p>\n"
    );
}

#[test]
fn unsafe_links_when_allowed() {
    let options = RenderOptions {
        use_safe_links: false,
        ..RenderOptions::default()
    };
    assert_eq!(
        render_with("[x](javascript:void)", &options),
        "<p><a href=\"javascript:void\">x</a></p>\n"
    );
}

#[test]
fn commonmark_flavour_renders_tables_as_text() {
    let options = RenderOptions::for_flavour(FlavourKind::CommonMark);
    assert_eq!(render_with("|a|\n|-|", &options), "<p>|a|\n|-|</p>\n");
}

#[test]
fn rendering_is_deterministic() {
    let text = "# T\n\n- [x] a\n- b\n\n| x |\n|---|\n| y |\n";
    assert_eq!(render(text), render(text));
}

#[test]
fn snapshot_document() {
    let text = "# Notes\n\n> Quote with *emphasis*\n\n1. first\n2. second\n\n---\n";
    assert_snapshot!(render(text), @r"
    <h1>Notes</h1>
    <blockquote>
    <p>Quote with <em>emphasis</em></p>
    </blockquote>
    <ol>
    <li>first</li>
    <li>second</li>
    </ol>
    <hr />
    ");
}
