//! Markdown to Slack mrkdwn converter.
//!
//! Slack uses its own markup format called `mrkdwn`:
//! - Bold: `*text*`
//! - Italic: `_text_`
//! - Strikethrough: `~text~`
//! - Code: `` `text` ``
//! - Code block: `` ```text``` ``
//! - Link: `<url|text>`
//! - Quote: `> text`
//!
//! Headings have no mrkdwn equivalent and are rendered bold. The control
//! characters `&`, `<` and `>` are escaped everywhere.
//!
//! See <https://api.slack.com/reference/surfaces/formatting>.

use pulldown_cmark::{Event, Options, Parser, Tag};
use slackify_types::{ConversionError, ConverterOptions};

use super::MarkdownConverter;

/// Indentation per nesting level of lists.
const INDENT: &str = "    ";

const THEMATIC_BREAK: &str = "---";

const TASK_DONE: &str = "☑ ";
const TASK_OPEN: &str = "☐ ";

/// Converts CommonMark to Slack mrkdwn format.
#[derive(Debug, Clone, Default)]
pub struct SlackMarkdownConverter {
    options: ConverterOptions,
}

impl SlackMarkdownConverter {
    pub fn new(options: ConverterOptions) -> Self {
        Self { options }
    }
}

impl MarkdownConverter for SlackMarkdownConverter {
    fn convert(&self, markdown: &str) -> Result<String, ConversionError> {
        if let Some(limit) = self.options.max_input_bytes
            && markdown.len() > limit
        {
            return Err(ConversionError::InputTooLarge {
                len: markdown.len(),
                limit,
            });
        }

        let options =
            Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS;
        let mut writer = MrkdwnWriter::new(&self.options.bullet, markdown.len());
        for event in Parser::new_ext(markdown, options) {
            writer.event(event);
        }
        Ok(writer.finish())
    }
}

/// Element opened by a `Start` event. Popped on the matching `End`.
enum Open {
    Block,
    Heading,
    BlockQuote,
    CodeBlock,
    List,
    Item,
    Strong,
    Emphasis,
    Strikethrough,
    Link,
    Image,
    Table,
    TableRow,
    TableCell,
    Other,
}

/// Link or image text collected until the element closes.
struct Capture {
    url: String,
    text: String,
}

struct MrkdwnWriter<'a> {
    out: String,
    bullet: &'a str,
    open: Vec<Open>,
    /// Next number for ordered lists, `None` for bullet lists.
    lists: Vec<Option<u64>>,
    captures: Vec<Capture>,
    quote_depth: usize,
    strong_depth: usize,
    cell_index: usize,
    at_line_start: bool,
    /// A list marker was just written and nothing followed it yet.
    item_fresh: bool,
}

impl<'a> MrkdwnWriter<'a> {
    fn new(bullet: &'a str, capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            bullet,
            open: Vec::new(),
            lists: Vec::new(),
            captures: Vec::new(),
            quote_depth: 0,
            strong_depth: 0,
            cell_index: 0,
            at_line_start: true,
            item_fresh: false,
        }
    }

    fn finish(self) -> String {
        self.out.trim_end().to_owned()
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.emit(&escape(&text)),
            Event::Code(code) => {
                self.emit("`");
                self.emit(&escape(&code));
                self.emit("`");
            }
            // Raw HTML has no meaning in Slack; show it as text.
            Event::Html(html) | Event::InlineHtml(html) => self.emit(&escape(&html)),
            // Bold cannot span lines in mrkdwn, so headings stay on one.
            Event::SoftBreak | Event::HardBreak if self.in_heading() => self.emit(" "),
            Event::SoftBreak | Event::HardBreak => self.emit("\n"),
            Event::Rule => {
                self.start_block();
                self.emit(THEMATIC_BREAK);
            }
            Event::TaskListMarker(done) => self.emit(if done { TASK_DONE } else { TASK_OPEN }),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let open = match tag {
            Tag::Paragraph | Tag::HtmlBlock => {
                self.start_block();
                Open::Block
            }
            Tag::Heading { .. } => {
                self.start_block();
                self.open_strong();
                Open::Heading
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.quote_depth += 1;
                Open::BlockQuote
            }
            Tag::CodeBlock(_) => {
                self.start_block();
                self.emit("```\n");
                Open::CodeBlock
            }
            Tag::List(first) => {
                self.start_block();
                self.lists.push(first);
                Open::List
            }
            Tag::Item => {
                self.start_item();
                Open::Item
            }
            Tag::Strong => {
                self.open_strong();
                Open::Strong
            }
            Tag::Emphasis => {
                self.emit("_");
                Open::Emphasis
            }
            Tag::Strikethrough => {
                self.emit("~");
                Open::Strikethrough
            }
            Tag::Link { dest_url, .. } => {
                self.open_capture(&dest_url);
                Open::Link
            }
            Tag::Image { dest_url, .. } => {
                self.open_capture(&dest_url);
                Open::Image
            }
            Tag::Table(_) => {
                self.start_block();
                Open::Table
            }
            Tag::TableHead | Tag::TableRow => {
                self.newline();
                self.cell_index = 0;
                Open::TableRow
            }
            Tag::TableCell => {
                if self.cell_index > 0 {
                    self.emit(" | ");
                }
                self.cell_index += 1;
                Open::TableCell
            }
            _ => Open::Other,
        };
        self.open.push(open);
    }

    fn end(&mut self) {
        let Some(open) = self.open.pop() else {
            return;
        };
        match open {
            Open::Heading | Open::Strong => self.close_strong(),
            Open::BlockQuote => self.quote_depth = self.quote_depth.saturating_sub(1),
            Open::CodeBlock => {
                if !self.at_line_start {
                    self.emit("\n");
                }
                self.emit("```");
            }
            Open::List => {
                self.lists.pop();
            }
            Open::Item => self.item_fresh = false,
            Open::Emphasis => self.emit("_"),
            Open::Strikethrough => self.emit("~"),
            Open::Link => self.close_link(),
            Open::Image => self.close_image(),
            Open::Block | Open::Table | Open::TableRow | Open::TableCell | Open::Other => {}
        }
    }

    /// Bold markers do not nest in mrkdwn: only the outermost pair is written.
    fn open_strong(&mut self) {
        if self.strong_depth == 0 {
            self.emit("*");
        }
        self.strong_depth += 1;
    }

    fn close_strong(&mut self) {
        self.strong_depth = self.strong_depth.saturating_sub(1);
        if self.strong_depth == 0 {
            self.emit("*");
        }
    }

    fn in_heading(&self) -> bool {
        self.open.iter().any(|open| matches!(open, Open::Heading))
    }

    fn open_capture(&mut self, url: &str) {
        self.captures.push(Capture {
            url: url.to_owned(),
            text: String::new(),
        });
    }

    /// An image inside a link contributes only its alt text (or URL) to
    /// the link label; mrkdwn links cannot nest.
    fn close_image(&mut self) {
        if self.captures.len() < 2 {
            self.close_link();
            return;
        }
        let Some(image) = self.captures.pop() else {
            return;
        };
        let alt = image.text.trim();
        let label = if alt.is_empty() { escape(&image.url) } else { alt.to_owned() };
        self.emit(&label);
    }

    fn close_link(&mut self) {
        let Some(capture) = self.captures.pop() else {
            return;
        };
        let text = capture.text.trim();
        let url = escape(&capture.url);
        let rendered = if !has_scheme(&capture.url) {
            // Slack cannot resolve relative targets; keep the label only.
            if text.is_empty() { url } else { text.to_owned() }
        } else if text.is_empty() || text == url {
            format!("<{url}>")
        } else {
            format!("<{url}|{text}>")
        };
        self.emit(&rendered);
    }

    fn start_block(&mut self) {
        if self.item_fresh {
            return;
        }
        if self.lists.is_empty() && self.quote_depth == 0 {
            self.blank_line();
        } else {
            self.newline();
        }
    }

    fn start_item(&mut self) {
        self.newline();
        let depth = self.lists.len();
        let marker = match self.lists.last_mut() {
            Some(Some(next)) => {
                let marker = format!("{next}. ");
                *next += 1;
                marker
            }
            _ => format!("{} ", self.bullet),
        };
        self.write_quote_prefix();
        self.out.push_str(&INDENT.repeat(depth.saturating_sub(1)));
        self.out.push_str(&marker);
        self.at_line_start = false;
        self.item_fresh = true;
    }

    fn newline(&mut self) {
        if !self.out.is_empty() && !self.at_line_start {
            self.out.push('\n');
        }
        self.at_line_start = true;
    }

    fn blank_line(&mut self) {
        if self.out.is_empty() {
            return;
        }
        self.newline();
        if !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn write_quote_prefix(&mut self) {
        if self.quote_depth > 0 {
            self.out.push_str("> ");
        }
    }

    /// Write `text`, prefixing every new line with the active quote marker
    /// and list indentation.
    fn emit(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(capture) = self.captures.last_mut() {
            capture.text.push_str(&text.replace('\n', " "));
            return;
        }
        self.item_fresh = false;
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                self.out.push('\n');
                self.at_line_start = true;
            }
            if line.is_empty() {
                continue;
            }
            if self.at_line_start {
                self.write_quote_prefix();
                self.out.push_str(&INDENT.repeat(self.lists.len()));
                self.at_line_start = false;
            }
            self.out.push_str(line);
        }
    }
}

/// Escape the three characters Slack treats as control sequences.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Whether `url` starts with a URI scheme such as `https:` or `mailto:`.
fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once(':') else {
        return false;
    };
    scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(md: &str) -> String {
        SlackMarkdownConverter::default().convert(md).unwrap()
    }

    #[test]
    fn test_bold() {
        assert_eq!(convert("**bold**"), "*bold*");
        assert_eq!(convert("__bold__"), "*bold*");
    }

    #[test]
    fn test_italic() {
        assert_eq!(convert("*italic*"), "_italic_");
        assert_eq!(convert("_italic_"), "_italic_");
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(convert("~~deleted~~"), "~deleted~");
    }

    #[test]
    fn test_code_inline() {
        assert_eq!(convert("`code`"), "`code`");
    }

    #[test]
    fn test_code_block() {
        assert_eq!(convert("```\nhello world\n```"), "```\nhello world\n```");
    }

    #[test]
    fn test_code_block_drops_language() {
        assert_eq!(
            convert("```rust\nfn main() {}\n```"),
            "```\nfn main() {}\n```"
        );
    }

    #[test]
    fn test_code_block_keeps_markdown_literal() {
        assert_eq!(convert("```\n**not bold**\n```"), "```\n**not bold**\n```");
    }

    #[test]
    fn test_combined() {
        assert_eq!(
            convert("**bold** and *italic* and `code`"),
            "*bold* and _italic_ and `code`"
        );
    }

    #[test]
    fn test_link() {
        assert_eq!(convert("[text](https://url)"), "<https://url|text>");
    }

    #[test]
    fn test_link_with_formatted_label() {
        assert_eq!(convert("[**go**](https://x.io)"), "<https://x.io|*go*>");
    }

    #[test]
    fn test_autolink() {
        assert_eq!(
            convert("<https://example.com>"),
            "<https://example.com>"
        );
    }

    #[test]
    fn test_relative_link_keeps_label() {
        assert_eq!(convert("see [docs](./docs.md)"), "see docs");
    }

    #[test]
    fn test_image() {
        assert_eq!(
            convert("![logo](https://x.io/a.png)"),
            "<https://x.io/a.png|logo>"
        );
        assert_eq!(convert("![](https://x.io/a.png)"), "<https://x.io/a.png>");
    }

    #[test]
    fn test_linked_image_uses_alt_as_label() {
        assert_eq!(
            convert("[![alt](https://x.io/a.png)](https://x.io)"),
            "<https://x.io|alt>"
        );
        assert_eq!(
            convert("[![](https://x.io/a.png)](https://x.io)"),
            "<https://x.io|https://x.io/a.png>"
        );
        assert_eq!(
            convert("[![build](https://ci.io/b.svg) status](https://ci.io)"),
            "<https://ci.io|build status>"
        );
    }

    #[test]
    fn test_heading() {
        assert_eq!(convert("# Title"), "*Title*");
        assert_eq!(convert("### Deep"), "*Deep*");
    }

    #[test]
    fn test_heading_does_not_double_bold() {
        assert_eq!(convert("# **Big** deal"), "*Big deal*");
    }

    #[test]
    fn test_heading_then_paragraph() {
        assert_eq!(convert("# Title\nbody"), "*Title*\n\nbody");
    }

    #[test]
    fn test_multiline_heading_stays_on_one_line() {
        assert_eq!(convert("a\nb\n==="), "*a b*");
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(convert("first\n\nsecond"), "first\n\nsecond");
    }

    #[test]
    fn test_soft_break() {
        assert_eq!(convert("line one\nline two"), "line one\nline two");
    }

    #[test]
    fn test_list_items() {
        assert_eq!(convert("- item one\n- item two"), "• item one\n• item two");
    }

    #[test]
    fn test_custom_bullet() {
        let converter = SlackMarkdownConverter::new(ConverterOptions {
            bullet: "-".into(),
            ..ConverterOptions::default()
        });
        assert_eq!(converter.convert("* a\n* b").unwrap(), "- a\n- b");
    }

    #[test]
    fn test_ordered_list() {
        assert_eq!(convert("1. one\n2. two"), "1. one\n2. two");
        assert_eq!(convert("3. three\n4. four"), "3. three\n4. four");
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(convert("- a\n    - b\n- c"), "• a\n    • b\n• c");
    }

    #[test]
    fn test_loose_list() {
        assert_eq!(convert("- a\n\n- b"), "• a\n• b");
    }

    #[test]
    fn test_list_after_paragraph() {
        assert_eq!(convert("intro\n\n- a"), "intro\n\n• a");
    }

    #[test]
    fn test_task_list() {
        assert_eq!(
            convert("- [x] done\n- [ ] todo"),
            "• ☑ done\n• ☐ todo"
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(convert("> quoted text"), "> quoted text");
    }

    #[test]
    fn test_blockquote_multiline() {
        assert_eq!(convert("> a\n> b"), "> a\n> b");
    }

    #[test]
    fn test_blockquote_with_list() {
        assert_eq!(convert("> - x"), "> • x");
    }

    #[test]
    fn test_paragraph_after_blockquote() {
        assert_eq!(convert("> q\n\nafter"), "> q\n\nafter");
    }

    #[test]
    fn test_thematic_break() {
        assert_eq!(convert("a\n\n---\n\nb"), "a\n\n---\n\nb");
    }

    #[test]
    fn test_table() {
        assert_eq!(
            convert("| a | b |\n|---|---|\n| 1 | 2 |"),
            "a | b\n1 | 2"
        );
    }

    #[test]
    fn test_escapes_control_characters() {
        assert_eq!(convert("a & b < c > d"), "a &amp; b &lt; c &gt; d");
    }

    #[test]
    fn test_escapes_inside_code() {
        assert_eq!(convert("`a<b`"), "`a&lt;b`");
    }

    #[test]
    fn test_html_is_escaped() {
        assert_eq!(
            convert("<b>hi</b> there"),
            "&lt;b&gt;hi&lt;/b&gt; there"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(convert(""), "");
        assert_eq!(convert("   \n\n"), "");
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(convert("hello world"), "hello world");
    }

    #[test]
    fn test_input_limit() {
        let converter = SlackMarkdownConverter::new(ConverterOptions {
            max_input_bytes: Some(5),
            ..ConverterOptions::default()
        });
        assert_eq!(converter.convert("hello").unwrap(), "hello");
        assert_eq!(
            converter.convert("hello!").unwrap_err(),
            ConversionError::InputTooLarge { len: 6, limit: 5 }
        );
    }

    #[test]
    fn test_deterministic() {
        let md = "# T\n\n- **a**\n- [b](https://b.io)";
        assert_eq!(convert(md), convert(md));
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("https://x.io"));
        assert!(has_scheme("mailto:a@b.c"));
        assert!(!has_scheme("./docs.md"));
        assert!(!has_scheme("#anchor"));
        assert!(!has_scheme(":nope"));
    }
}
