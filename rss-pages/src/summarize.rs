use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::Html;

/// Sentences kept in an article summary.
pub const SUMMARY_SENTENCES: usize = 3;

const TRUNCATION_MARKER: &str = "...";
const SENTENCE_DELIMITERS: [char; 3] = ['.', '!', '?'];

/// Minimal view of a parsed markup tree: a node is either text or has children.
pub trait MarkupNode: Sized {
    fn text(&self) -> Option<&str>;

    /// Children in document order.
    fn child_nodes(&self) -> Vec<Self>;
}

impl<'a> MarkupNode for NodeRef<'a, Node> {
    fn text(&self) -> Option<&str> {
        match self.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        }
    }

    fn child_nodes(&self) -> Vec<Self> {
        self.children().collect()
    }
}

/// Concatenates every text node under `root` in document order.
pub fn extract_text<N: MarkupNode>(root: N) -> String {
    let mut text = String::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if let Some(piece) = node.text() {
            text.push_str(piece);
        }
        stack.extend(node.child_nodes().into_iter().rev());
    }

    text
}

/// Splits on `.`, `!` and `?`, dropping the delimiters and any segment that
/// is only whitespace.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(SENTENCE_DELIMITERS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Plain-text summary of an HTML fragment, at most `max_sentences` long.
///
/// The HTML parser recovers from any input, so malformed markup never fails:
/// an unterminated tag such as `<bad markup` is discarded and contributes no
/// text, giving an empty summary.
pub fn summarize(raw_html: &str, max_sentences: usize) -> String {
    let document = Html::parse_document(raw_html);
    let text = extract_text(document.tree.root());

    let sentences = split_sentences(&text);
    let truncated = sentences.len() > max_sentences;

    let mut summary = sentences[..sentences.len().min(max_sentences)]
        .join(". ")
        .trim()
        .to_string();

    if truncated {
        summary.push_str(TRUNCATION_MARKER);
    }

    summary
}
