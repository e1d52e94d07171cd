//! Route templates and query parameters
//!
//! Routes are RFC 6570 templates such as `articles/{id}/{?embed,fields}`.
//! Expansion is delegated to the `uritemplate` crate; variables without a
//! value are dropped from the result.

use cirrus_domain::OrderDirection;
use uritemplate::UriTemplate;

/// Ordered template variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing an existing value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder form of [`insert`](Self::insert)
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set `name` only when `value` is present
    pub fn insert_opt(&mut self, name: &str, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.insert(name, value.to_string());
        }
    }

    /// Copy every entry of `other` into `self`; `other` wins on conflicts
    pub fn merge(&mut self, other: &Params) {
        for (name, value) in &other.entries {
            self.insert(name.clone(), value.clone());
        }
    }

    /// `self` overlaid with `other`
    #[must_use]
    pub fn merged(mut self, other: &Params) -> Self {
        self.merge(other);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// An RFC 6570 route template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    template: String,
}

impl RouteTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Expand with `params`; unknown variables are ignored
    #[must_use]
    pub fn expand(&self, params: &Params) -> String {
        let mut template = UriTemplate::new(&self.template);
        for (name, value) in params.iter() {
            template.set(name, value.to_string());
        }
        template.build()
    }
}

impl std::fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.template)
    }
}

/// Paging, sorting and filtering for list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub search_query: Option<String>,
    pub page: Option<u32>,
    /// Records per page
    pub rpp: Option<u32>,
    pub order_by: Option<String>,
    pub order_direction: Option<OrderDirection>,
    pub embed: Option<String>,
    pub fields: Option<String>,
    /// Resource-specific filters (`statuses`, `tags`, ...)
    pub filters: Params,
}

impl FindOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    #[must_use]
    pub fn page(mut self, page: u32, rpp: u32) -> Self {
        self.page = Some(page);
        self.rpp = Some(rpp);
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by = Some(field.into());
        self.order_direction = Some(direction);
        self
    }

    #[must_use]
    pub fn embed(mut self, embed: impl Into<String>) -> Self {
        self.embed = Some(embed.into());
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    #[must_use]
    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(name, value);
        self
    }

    /// Wire parameters: `searchQuery`, `page`, `rpp`, `sort`, `embed`,
    /// `fields`, then the filters
    #[must_use]
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params.insert_opt("searchQuery", self.search_query.as_deref());
        params.insert_opt("page", self.page);
        params.insert_opt("rpp", self.rpp);
        if let Some(order_by) = &self.order_by {
            let direction = self.order_direction.unwrap_or_default();
            params.insert("sort", format!("{order_by}|{direction}"));
        }
        params.insert_opt("embed", self.embed.as_deref());
        params.insert_opt("fields", self.fields.as_deref());
        params.merge(&self.filters);
        params
    }
}

/// Projection options for single-item reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetOptions {
    pub embed: Option<String>,
    pub fields: Option<String>,
}

impl GetOptions {
    #[must_use]
    pub fn embed(embed: impl Into<String>) -> Self {
        Self { embed: Some(embed.into()), fields: None }
    }

    #[must_use]
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params.insert_opt("embed", self.embed.as_deref());
        params.insert_opt("fields", self.fields.as_deref());
        params
    }
}
