use crate::matcher::MarkedText;

/// Atomic styled token: a maximal word or whitespace fragment, or the whole
/// emphasized phrase as a single run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledRun {
    /// Fragment text; never empty.
    pub text: String,
    /// Whether this run carries the emphasis weight.
    pub emphasized: bool,
}

impl StyledRun {
    /// Build an unemphasized run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: false,
        }
    }

    /// Build an emphasized run.
    pub fn emphasized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: true,
        }
    }

    /// Whether the fragment is entirely whitespace.
    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// Map newline characters to spaces, leaving everything else untouched.
pub fn flatten_newlines(text: &str) -> String {
    text.chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect()
}

/// Split marked text into ordered styled runs.
///
/// The emphasized span (if any) becomes exactly one run with interior
/// newlines collapsed to spaces. Everything else alternates between maximal
/// non-whitespace and maximal whitespace runs. Concatenating all fragments
/// reproduces the input with markers removed and newlines flattened.
pub fn tokenize(marked: &MarkedText) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    match marked.emphasis.clone() {
        Some(range) => {
            push_plain_runs(&marked.text[..range.start], &mut runs);
            let body = flatten_newlines(&marked.text[range.clone()]);
            if !body.is_empty() {
                runs.push(StyledRun::emphasized(body));
            }
            push_plain_runs(&marked.text[range.end..], &mut runs);
        }
        None => push_plain_runs(&marked.text, &mut runs),
    }
    runs
}

/// Append alternating word/whitespace runs for an unemphasized region.
fn push_plain_runs(region: &str, runs: &mut Vec<StyledRun>) {
    let flattened = flatten_newlines(region);
    let mut rest = flattened.as_str();
    while !rest.is_empty() {
        let leading_ws = rest.chars().next().is_some_and(char::is_whitespace);
        let split = rest
            .find(|ch: char| ch.is_whitespace() != leading_ws)
            .unwrap_or(rest.len());
        let (fragment, tail) = rest.split_at(split);
        runs.push(StyledRun::plain(fragment));
        rest = tail;
    }
}
