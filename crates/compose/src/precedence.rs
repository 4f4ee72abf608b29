//! Precedence consistency checking across contributions.
//!
//! Every contribution that declares effective categories must (a) only use
//! categories present in the global categorization order and (b) list them
//! in strictly increasing global precedence order. Violations are recorded
//! through the diagnostics acceptor and never abort composition.
//!
//! The "previous index" resets per contribution: two contributions in the
//! same layer with internally-consistent but mutually-unordered categories
//! are never flagged against each other.

use std::collections::HashMap;
use strata_core::{Contribution, DiagnosticAcceptor, IssueKind};

/// Check every contribution's declared categories against the global order.
///
/// `order` is the list of category names in global precedence order (most
/// specific first). Contributions without declared categories have no
/// opinion and are skipped.
pub fn check_precedence<'a, I>(order: &[String], contributions: I, acceptor: &dyn DiagnosticAcceptor)
where
    I: IntoIterator<Item = &'a Contribution>,
{
    let index: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    for contribution in contributions {
        let Some(categories) = &contribution.effective_categories else {
            continue;
        };
        let mut previous: Option<usize> = None;
        for category in categories {
            match index.get(category.name.as_str()) {
                None => {
                    acceptor.accept(
                        IssueKind::MissingCategoryPrecedence,
                        &contribution.source_id,
                        format!(
                            "category '{}' is not in the global categorization order",
                            category.name
                        ),
                    );
                    // "previous" is deliberately left untouched.
                }
                Some(&i) => {
                    if previous.is_some_and(|p| i <= p) {
                        acceptor.accept(
                            IssueKind::PrecedenceMismatchInContribution,
                            &contribution.source_id,
                            format!(
                                "category '{}' is out of order relative to the global categorization",
                                category.name
                            ),
                        );
                    } else {
                        previous = Some(i);
                    }
                }
            }
        }
    }
}
