use notedown_syntax::{Flavour, MarkdownParser, SyntaxKind, parse};
use pretty_assertions::assert_eq;
use rstest::rstest;

const DOCUMENT: &str = "\
Setext title
============

# ATX title #

Paragraph with *emphasis*, __strong__, ~~strike~~, `code`,\\
a hard break, &copy; &#35; and \\* escapes.

> Quoted text
lazy continuation
> - nested list
>   1. ordered

- [ ] open task
- [x] done task

  second paragraph

10) ten
11) eleven

```toml
key = \"value\"
```

~~~
unterminated fence
~~~~

    indented code

<div class=\"box\">
*raw*
</div>

<!-- comment -->

| left | center | right |
|:-----|:------:|------:|
| a \\| b | `x|y` | www.example.com |

[ref]: https://example.com/path \"Title\"
[Ref] and [other][ref] and ![image](img.png) and <user@example.com>.

$x^2$ and $$y$$ and ==mark== and ++under++.

***
";

#[rstest]
#[case(Flavour::commonmark())]
#[case(Flavour::gfm())]
fn every_byte_survives(#[case] flavour: Flavour) {
    let tree = MarkdownParser::new(flavour)
        .with_assertions(true)
        .parse(DOCUMENT)
        .expect("parse");
    assert_eq!(tree.text().to_string(), DOCUMENT);
}

#[rstest]
#[case("\r\n")]
#[case("\r")]
fn other_line_endings_survive(#[case] eol: &str) {
    let text = DOCUMENT.replace('\n', eol);
    let tree = parse(&text);
    assert_eq!(tree.text().to_string(), text);
}

#[test]
fn tabs_and_odd_whitespace_survive() {
    let text = "-\tfoo\n\n\tbar\n>\t\tcode\n \t- a\n\u{a0}b\n";
    let tree = parse(text);
    assert_eq!(tree.text().to_string(), text);
}

#[test]
fn parsers_are_shared_across_threads() {
    let parser = std::sync::Arc::new(MarkdownParser::default());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let parser = parser.clone();
            std::thread::spawn(move || parser.parse(DOCUMENT).map(|tree| tree.text().to_string()))
        })
        .collect();
    for handle in handles {
        let text = handle.join().expect("thread").expect("parse");
        assert_eq!(text, DOCUMENT);
    }
}

#[test]
fn top_level_blocks() {
    let tree = parse("# a\n\n- b\n\n> c\n\n---\n");
    let kinds: Vec<SyntaxKind> = tree.children().map(|node| node.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::ATX_1,
            SyntaxKind::UNORDERED_LIST,
            SyntaxKind::BLOCK_QUOTE,
        ]
    );
}
