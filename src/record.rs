/// One quote to lay out, as supplied by the corpus.
///
/// Records are plain immutable inputs; dataset ingestion and deduplication
/// happen upstream of this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteRecord {
    /// Full quote text.
    pub text: String,
    /// Phrase inside `text` to emphasize.
    pub target_phrase: String,
    /// Work title, drawn in the footer.
    pub title: String,
    /// Author name, drawn in the footer.
    pub author: String,
}

impl QuoteRecord {
    /// Convenience constructor for owned fields.
    pub fn new(
        text: impl Into<String>,
        target_phrase: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            target_phrase: target_phrase.into(),
            title: title.into(),
            author: author.into(),
        }
    }
}
