//! On-demand element resolution.
//!
//! A [`Locator`] stores how to find an element, not the element itself:
//! an optional scope selector plus a chain of candidate selectors tried in
//! order. Every [`Locator::resolve`] call queries the live document again.

use tracing::{debug, warn};

use super::{Node, Page};

/// Outcome of a DOM lookup that is allowed to fail
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    TimedOut,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::TimedOut => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::TimedOut => Lookup::TimedOut,
        }
    }
}

/// Recipe for finding an element on `page`
pub struct Locator<'p, P: Page> {
    page: &'p P,
    scope: Option<String>,
    candidates: Vec<String>,
}

impl<'p, P: Page> Locator<'p, P> {
    /// Locate the first element matching any of `candidates`, tried in order
    pub fn new<I, S>(page: &'p P, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            page,
            scope: None,
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    /// Search only below the first element matching `scope`
    pub fn within(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Query the document for a fresh handle.
    ///
    /// A missing scope is `NotFound`. A candidate whose query fails is
    /// logged and the next candidate is tried.
    pub async fn resolve(&self) -> Lookup<P::Node> {
        let scope = match &self.scope {
            Some(scope_css) => match self.page.find(scope_css).await {
                Ok(Some(node)) => Some(node),
                Ok(None) => {
                    debug!(scope = %scope_css, "Locator scope not present");
                    return Lookup::NotFound;
                }
                Err(e) => {
                    warn!(scope = %scope_css, error = %e, "Failed to query locator scope");
                    return Lookup::NotFound;
                }
            },
            None => None,
        };

        for css in &self.candidates {
            let found = match &scope {
                Some(node) => node.find(css).await,
                None => self.page.find(css).await,
            };

            match found {
                Ok(Some(node)) => return Lookup::Found(node),
                Ok(None) => debug!(selector = %css, "Locator candidate did not match"),
                Err(e) => warn!(selector = %css, error = %e, "Locator candidate query failed"),
            }
        }

        Lookup::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockSite, NodeKind};
    use shared::SelectorConfig;

    #[tokio::test]
    async fn test_resolve_uses_first_matching_candidate() {
        let site = MockSite::builder().category("Animals", &[&["fa-cat"]]).build();
        let selectors = SelectorConfig::default();
        let id = "icons-category-Animals";

        let locator = Locator::new(
            &site,
            [selectors.label_for("missing"), selectors.input_with_id(id)],
        )
        .within(selectors.category_container.clone());

        match locator.resolve().await {
            Lookup::Found(node) => assert_eq!(node.kind(), &NodeKind::Input(0)),
            other => panic!("unexpected lookup: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_scope_is_not_found() {
        let site = MockSite::builder()
            .category("Animals", &[&["fa-cat"]])
            .without_container()
            .build();
        let selectors = SelectorConfig::default();

        let locator = Locator::new(&site, [selectors.label_for("icons-category-Animals")])
            .within(selectors.category_container.clone());

        assert!(matches!(locator.resolve().await, Lookup::NotFound));
    }

    #[test]
    fn test_lookup_helpers() {
        assert!(Lookup::Found(1).is_found());
        assert_eq!(Lookup::Found(2).map(|v| v * 2).found(), Some(4));
        assert_eq!(Lookup::<u8>::TimedOut.found(), None);
    }
}
