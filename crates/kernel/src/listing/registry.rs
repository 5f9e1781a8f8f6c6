//! Filter rule registry.
//!
//! Each resource declares, once at startup, which filter fields it accepts
//! and how each one is matched. Rule sets are immutable after construction.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::sort::{SortKey, TiebreakPolicy};
use super::types::OperatorKind;

/// One allowed filter field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRule {
    /// Filter name as it appears in the request.
    pub field: String,

    /// Document path the filter applies to (usually the same as `field`).
    pub path: String,

    /// How the value is matched.
    pub kind: OperatorKind,

    /// The stored value is a language code → string map.
    pub language_aware: bool,

    /// String values are object ids and are converted before matching.
    pub object_ids: bool,
}

impl FilterRule {
    pub fn new(field: impl Into<String>, kind: OperatorKind) -> Self {
        let field = field.into();
        Self {
            path: field.clone(),
            field,
            kind,
            language_aware: false,
            object_ids: false,
        }
    }

    pub fn string(field: impl Into<String>) -> Self {
        Self::new(field, OperatorKind::String)
    }

    pub fn exact(field: impl Into<String>) -> Self {
        Self::new(field, OperatorKind::Exact)
    }

    pub fn array(field: impl Into<String>) -> Self {
        Self::new(field, OperatorKind::Array)
    }

    pub fn number(field: impl Into<String>) -> Self {
        Self::new(field, OperatorKind::Number)
    }

    pub fn date_range(field: impl Into<String>) -> Self {
        Self::new(field, OperatorKind::DateRange)
    }

    pub fn boolean_array(field: impl Into<String>) -> Self {
        Self::new(field, OperatorKind::BooleanArray)
    }

    /// Filter on a `_id` list: `ids` → `_id`, values converted to object ids.
    pub fn ids() -> Self {
        Self::array("ids").at("_id").object_ids()
    }

    /// Match against every configured language of a localized field.
    pub fn localized(mut self) -> Self {
        self.language_aware = true;
        self
    }

    /// Apply the filter to a different document path.
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Convert string values to object ids where they parse as one.
    pub fn object_ids(mut self) -> Self {
        self.object_ids = true;
        self
    }
}

/// The filter rules of one resource, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRuleSet {
    rules: Vec<FilterRule>,
    languages: Vec<String>,
}

impl FilterRuleSet {
    /// Create an empty rule set matching localized fields under `languages`.
    pub fn new(languages: &[String]) -> Self {
        Self {
            rules: Vec::new(),
            languages: languages.to_vec(),
        }
    }

    /// Add a rule, replacing any earlier rule with the same field name.
    pub fn with(mut self, rule: FilterRule) -> Self {
        if let Some(existing) = self.rules.iter_mut().find(|r| r.field == rule.field) {
            *existing = rule;
        } else {
            self.rules.push(rule);
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&FilterRule> {
        self.rules.iter().find(|r| r.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterRule> {
        self.rules.iter()
    }

    /// Supported language codes, in configuration order.
    pub fn languages(&self) -> &[String] {
        &self.languages
    }
}

/// Resources with a list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Sites,
    UserRoles,
    Settings,
    Users,
    Currencies,
    Products,
    CashRegisters,
    MoneyTransactions,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Sites,
        ResourceKind::UserRoles,
        ResourceKind::Settings,
        ResourceKind::Users,
        ResourceKind::Currencies,
        ResourceKind::Products,
        ResourceKind::CashRegisters,
        ResourceKind::MoneyTransactions,
    ];

    /// URL segment naming the resource.
    pub fn slug(self) -> &'static str {
        match self {
            ResourceKind::Sites => "sites",
            ResourceKind::UserRoles => "user-roles",
            ResourceKind::Settings => "settings",
            ResourceKind::Users => "users",
            ResourceKind::Currencies => "currencies",
            ResourceKind::Products => "products",
            ResourceKind::CashRegisters => "cashregisters",
            ResourceKind::MoneyTransactions => "money-transactions",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}

/// A resource name with no list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource: {0}")]
pub struct UnknownResource(pub String);

/// Everything the compiler needs to list one resource.
#[derive(Debug, Clone)]
pub struct ResourceDefinition {
    pub kind: ResourceKind,

    /// Collection holding the documents.
    pub collection: String,

    pub rules: FilterRuleSet,

    /// Final sort key making page order deterministic.
    pub tiebreak: SortKey,

    /// When the tiebreak is appended to caller-supplied sorts.
    pub tiebreak_policy: TiebreakPolicy,

    /// AND `removed = false` into every query.
    pub enforce_not_removed: bool,

    /// Fields never returned in list results.
    pub excluded_fields: Vec<String>,
}

impl ResourceDefinition {
    pub fn new(
        kind: ResourceKind,
        collection: impl Into<String>,
        rules: FilterRuleSet,
        tiebreak: SortKey,
    ) -> Self {
        Self {
            kind,
            collection: collection.into(),
            rules,
            tiebreak,
            tiebreak_policy: TiebreakPolicy::Always,
            enforce_not_removed: true,
            excluded_fields: Vec::new(),
        }
    }

    pub fn tiebreak_policy(mut self, policy: TiebreakPolicy) -> Self {
        self.tiebreak_policy = policy;
        self
    }

    /// Resource has no soft-delete lifecycle.
    pub fn without_lifecycle(mut self) -> Self {
        self.enforce_not_removed = false;
        self
    }

    pub fn exclude(mut self, field: impl Into<String>) -> Self {
        self.excluded_fields.push(field.into());
        self
    }
}

/// Resource definitions by kind, fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: HashMap<ResourceKind, ResourceDefinition>,
    languages: Vec<String>,
}

impl ResourceRegistry {
    /// Create an empty registry for the given language set.
    pub fn new(languages: Vec<String>) -> Self {
        Self {
            resources: HashMap::new(),
            languages,
        }
    }

    /// Registry preloaded with every built-in resource.
    pub fn builtin(languages: Vec<String>) -> Self {
        let mut registry = Self::new(languages);
        for definition in super::resources::builtin(&registry.languages) {
            registry.register(definition);
        }
        registry
    }

    /// Register a resource, replacing any previous definition of that kind.
    pub fn register(&mut self, definition: ResourceDefinition) {
        self.resources.insert(definition.kind, definition);
    }

    pub fn get(&self, kind: ResourceKind) -> Option<&ResourceDefinition> {
        self.resources.get(&kind)
    }

    /// Definitions ordered by kind.
    pub fn definitions(&self) -> Vec<&ResourceDefinition> {
        let mut definitions: Vec<_> = self.resources.values().collect();
        definitions.sort_by_key(|d| d.kind);
        definitions
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }
}
