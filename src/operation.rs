use crate::catalog::{Catalog, CatalogItem};
use crate::matcher::MenuMatcher;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParsedOperation {
    Add { fragment: String, quantity: u32 },
    /// `quantity: None` removes the entry regardless of how many are held.
    Remove { fragment: String, quantity: Option<u32> },
    Reset,
    NavigateToCart,
    NavigateToMenu,
    StartCapture,
    StopCapture,
    Unrecognized { text: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Found { item: CatalogItem, score: f64 },
    NotFound { fragment: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedOperation {
    Add { resolution: Resolution, quantity: u32 },
    Remove { resolution: Resolution, quantity: Option<u32> },
    Reset,
    NavigateToCart,
    NavigateToMenu,
    StartCapture,
    StopCapture,
    Unrecognized { text: String },
}

impl ResolvedOperation {
    pub fn touches_cart(&self) -> bool {
        matches!(
            self,
            ResolvedOperation::Add { .. } | ResolvedOperation::Remove { .. } | ResolvedOperation::Reset
        )
    }
}

/// Only candidates that pass both matcher gates come back as `Found`.
pub fn resolve_fragment(fragment: &str, catalog: &Catalog, matcher: &MenuMatcher) -> Resolution {
    match matcher.best_match(fragment, catalog) {
        Some(candidate) if matcher.accepts(&candidate) => {
            debug!(
                fragment,
                item = %candidate.item.id,
                score = candidate.score,
                "resolved item fragment"
            );
            Resolution::Found {
                item: candidate.item.clone(),
                score: candidate.score,
            }
        }
        Some(candidate) => {
            debug!(
                fragment,
                item = %candidate.item.id,
                score = candidate.score,
                "candidate rejected by acceptance gate"
            );
            Resolution::NotFound {
                fragment: fragment.to_string(),
            }
        }
        None => {
            debug!(fragment, "no catalog match");
            Resolution::NotFound {
                fragment: fragment.to_string(),
            }
        }
    }
}

/// Resolution by catalog id, for intents coming from the menu screen.
pub fn resolve_item_id(item_id: &str, catalog: &Catalog) -> Resolution {
    match catalog.get(item_id) {
        Some(item) => Resolution::Found {
            item: item.clone(),
            score: 0.0,
        },
        None => Resolution::NotFound {
            fragment: item_id.to_string(),
        },
    }
}

pub fn resolve_operation(
    operation: &ParsedOperation,
    catalog: &Catalog,
    matcher: &MenuMatcher,
) -> ResolvedOperation {
    match operation {
        ParsedOperation::Add { fragment, quantity } => ResolvedOperation::Add {
            resolution: resolve_fragment(fragment, catalog, matcher),
            quantity: *quantity,
        },
        ParsedOperation::Remove { fragment, quantity } => ResolvedOperation::Remove {
            resolution: resolve_fragment(fragment, catalog, matcher),
            quantity: *quantity,
        },
        ParsedOperation::Reset => ResolvedOperation::Reset,
        ParsedOperation::NavigateToCart => ResolvedOperation::NavigateToCart,
        ParsedOperation::NavigateToMenu => ResolvedOperation::NavigateToMenu,
        ParsedOperation::StartCapture => ResolvedOperation::StartCapture,
        ParsedOperation::StopCapture => ResolvedOperation::StopCapture,
        ParsedOperation::Unrecognized { text } => ResolvedOperation::Unrecognized { text: text.clone() },
    }
}

pub fn resolve_operations(
    operations: &[ParsedOperation],
    catalog: &Catalog,
    matcher: &MenuMatcher,
) -> Vec<ResolvedOperation> {
    operations
        .iter()
        .map(|operation| resolve_operation(operation, catalog, matcher))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;

    #[test]
    fn resolves_add_fragments_against_catalog() {
        let catalog = default_catalog();
        let resolved = resolve_operation(
            &ParsedOperation::Add {
                fragment: "mango lassi".to_string(),
                quantity: 3,
            },
            &catalog,
            &MenuMatcher::default(),
        );

        match resolved {
            ResolvedOperation::Add {
                resolution: Resolution::Found { item, .. },
                quantity,
            } => {
                assert_eq!(item.id, "mango-lassi");
                assert_eq!(quantity, 3);
            }
            other => panic!("unexpected resolution {other:?}"),
        }
    }

    #[test]
    fn unmatched_fragment_is_echoed_back() {
        let catalog = default_catalog();
        let resolution = resolve_fragment("xyzfood", &catalog, &MenuMatcher::default());
        assert_eq!(
            resolution,
            Resolution::NotFound {
                fragment: "xyzfood".to_string()
            }
        );
    }

    #[test]
    fn resolves_only_known_ids() {
        let catalog = default_catalog();
        assert!(matches!(
            resolve_item_id("rasmalai", &catalog),
            Resolution::Found { .. }
        ));
        assert!(matches!(
            resolve_item_id("pizza", &catalog),
            Resolution::NotFound { .. }
        ));
    }

    #[test]
    fn commands_pass_through_unchanged() {
        let catalog = default_catalog();
        let resolved = resolve_operations(
            &[ParsedOperation::Reset, ParsedOperation::StopCapture],
            &catalog,
            &MenuMatcher::default(),
        );
        assert_eq!(resolved, vec![ResolvedOperation::Reset, ResolvedOperation::StopCapture]);
        assert!(resolved[0].touches_cart());
        assert!(!resolved[1].touches_cart());
    }
}
