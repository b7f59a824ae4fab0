use envlabels_model::{ParsedLabels, parse_labels};

/// Label-string grammar owned by the scheduler.
///
/// Implementations split a raw string into atoms and report what they could not accept.
/// They must never fail outright: resolution always returns a best-effort set.
pub trait LabelGrammar: Send + Sync {
    fn parse(&self, raw: &str) -> ParsedLabels;
}

/// Whitespace-separated atoms validated by [`envlabels_model::LabelAtom::new`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultGrammar;

impl LabelGrammar for DefaultGrammar {
    #[inline]
    fn parse(&self, raw: &str) -> ParsedLabels {
        parse_labels(raw)
    }
}
