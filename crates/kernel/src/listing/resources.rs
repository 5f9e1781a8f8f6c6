//! Built-in resource definitions.
//!
//! One entry per list endpoint: the collection it reads, which filters it
//! accepts, and the sort key that keeps its page order deterministic.

use super::registry::{FilterRule, FilterRuleSet, ResourceDefinition, ResourceKind};
use super::sort::{SortKey, TiebreakPolicy};

/// Creation timestamp, the default tiebreak on most resources.
const CREATED_AT: &str = "createdAt";

/// Definitions for every [`ResourceKind`], matching localized filters
/// under `languages`.
pub fn builtin(languages: &[String]) -> Vec<ResourceDefinition> {
    let rules = || FilterRuleSet::new(languages);

    vec![
        ResourceDefinition::new(
            ResourceKind::Sites,
            "sites",
            rules()
                .with(FilterRule::string("names").localized())
                .with(FilterRule::ids())
                .with(FilterRule::boolean_array("active"))
                .with(FilterRule::date_range(CREATED_AT)),
            SortKey::asc(CREATED_AT),
        ),
        ResourceDefinition::new(
            ResourceKind::UserRoles,
            "userroles",
            rules()
                .with(FilterRule::string("names").localized())
                .with(FilterRule::exact("priority"))
                .with(FilterRule::ids())
                .with(FilterRule::boolean_array("active")),
            SortKey::asc("priority"),
        )
        .tiebreak_policy(TiebreakPolicy::WhenEmpty),
        ResourceDefinition::new(
            ResourceKind::Settings,
            "settings",
            rules()
                .with(FilterRule::string("key"))
                .with(FilterRule::exact("group"))
                .with(FilterRule::ids()),
            SortKey::asc("key"),
        )
        .without_lifecycle(),
        ResourceDefinition::new(
            ResourceKind::Users,
            "users",
            rules()
                .with(FilterRule::string("email"))
                .with(FilterRule::string("firstName"))
                .with(FilterRule::string("lastName"))
                .with(FilterRule::array("roles").object_ids())
                .with(FilterRule::array("sites").object_ids())
                .with(FilterRule::ids())
                .with(FilterRule::boolean_array("active"))
                .with(FilterRule::date_range(CREATED_AT)),
            SortKey::asc(CREATED_AT),
        )
        .exclude("password"),
        ResourceDefinition::new(
            ResourceKind::Currencies,
            "currencies",
            rules()
                .with(FilterRule::string("names").localized())
                .with(FilterRule::string("code"))
                .with(FilterRule::ids()),
            SortKey::asc("code"),
        )
        .tiebreak_policy(TiebreakPolicy::WhenEmpty),
        ResourceDefinition::new(
            ResourceKind::Products,
            "products",
            rules()
                .with(FilterRule::string("names").localized())
                .with(FilterRule::string("barcode"))
                .with(FilterRule::number("price"))
                .with(FilterRule::array("sites").object_ids())
                .with(FilterRule::ids())
                .with(FilterRule::boolean_array("active")),
            SortKey::asc(CREATED_AT),
        ),
        ResourceDefinition::new(
            ResourceKind::CashRegisters,
            "cashregisters",
            rules()
                .with(FilterRule::string("names").localized())
                .with(FilterRule::array("sites").object_ids())
                .with(FilterRule::ids())
                .with(FilterRule::boolean_array("active")),
            SortKey::asc(CREATED_AT),
        ),
        ResourceDefinition::new(
            ResourceKind::MoneyTransactions,
            "moneytransactions",
            rules()
                .with(FilterRule::exact("cashRegister").object_ids())
                .with(FilterRule::array("kind"))
                .with(FilterRule::number("amount"))
                .with(FilterRule::ids())
                .with(FilterRule::date_range(CREATED_AT)),
            SortKey::desc(CREATED_AT),
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::listing::types::OperatorKind;

    #[test]
    fn every_kind_is_defined_once() {
        let definitions = builtin(&["en".to_string()]);
        for kind in ResourceKind::ALL {
            assert_eq!(definitions.iter().filter(|d| d.kind == kind).count(), 1);
        }
    }

    #[test]
    fn localized_names_use_configured_languages() {
        let languages = vec!["en".to_string(), "fr".to_string()];
        let definitions = builtin(&languages);
        let sites = definitions
            .iter()
            .find(|d| d.kind == ResourceKind::Sites)
            .unwrap();

        let names = sites.rules.get("names").unwrap();
        assert_eq!(names.kind, OperatorKind::String);
        assert!(names.language_aware);
        assert_eq!(sites.rules.languages(), languages.as_slice());
    }

    #[test]
    fn money_transactions_list_newest_first() {
        let definitions = builtin(&[]);
        let transactions = definitions
            .iter()
            .find(|d| d.kind == ResourceKind::MoneyTransactions)
            .unwrap();
        assert_eq!(transactions.tiebreak, SortKey::desc(CREATED_AT));
        assert!(transactions.rules.get("cashRegister").unwrap().object_ids);
    }
}
