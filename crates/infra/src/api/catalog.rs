//! Resource catalog
//!
//! Every REST resource family is one row of [`RESOURCES`]. Route templates
//! are generated from the row, so adding a resource means adding data, not
//! code.

use super::errors::ApiError;
use super::uri::RouteTemplate;

/// Query parameters every list endpoint understands
pub const STANDARD_FIND_PARAMS: &[&str] = &["searchQuery", "page", "rpp", "sort", "embed", "fields"];

/// A top-level resource family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDef {
    /// Lookup name, e.g. `"articles"`
    pub name: &'static str,
    /// Path relative to the API root; may contain template variables
    pub base_path: &'static str,
    /// Extra list filters beyond [`STANDARD_FIND_PARAMS`]
    pub query_params: &'static [&'static str],
    pub subresources: &'static [SubresourceDef],
}

/// A collection nested under one item of its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubresourceDef {
    pub name: &'static str,
    /// Path below `<parent>/{parentId}/`
    pub path: &'static str,
    pub query_params: &'static [&'static str],
}

/// Resolved route for one collection, top-level or nested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    pub base_path: String,
    pub query_params: Vec<&'static str>,
}

impl Route {
    /// `<base>/{?searchQuery,page,rpp,sort,embed,fields,<extra>}`
    #[must_use]
    pub fn find_template(&self) -> RouteTemplate {
        let params: Vec<&str> =
            STANDARD_FIND_PARAMS.iter().chain(self.query_params.iter()).copied().collect();
        RouteTemplate::new(format!("{}/{{?{}}}", self.base_path, params.join(",")))
    }

    /// `<base>/{id}/{?embed,fields}`
    #[must_use]
    pub fn get_template(&self) -> RouteTemplate {
        RouteTemplate::new(format!("{}/{{id}}/{{?embed,fields}}", self.base_path))
    }

    /// `<base>`
    #[must_use]
    pub fn create_template(&self) -> RouteTemplate {
        RouteTemplate::new(self.base_path.clone())
    }

    /// `<base>/{id}`, used for update and remove
    #[must_use]
    pub fn item_template(&self) -> RouteTemplate {
        RouteTemplate::new(format!("{}/{{id}}", self.base_path))
    }
}

impl ResourceDef {
    #[must_use]
    pub fn route(&self) -> Route {
        Route {
            name: self.name.to_string(),
            base_path: self.base_path.to_string(),
            query_params: self.query_params.to_vec(),
        }
    }

    #[must_use]
    pub fn find_template(&self) -> RouteTemplate {
        self.route().find_template()
    }

    #[must_use]
    pub fn get_template(&self) -> RouteTemplate {
        self.route().get_template()
    }

    #[must_use]
    pub fn create_template(&self) -> RouteTemplate {
        self.route().create_template()
    }

    #[must_use]
    pub fn item_template(&self) -> RouteTemplate {
        self.route().item_template()
    }

    /// Nested route rooted at `<base>/{parentId}/<sub>`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` when `name` is not a subresource of this
    /// family.
    pub fn subresource(&self, name: &str) -> Result<Route, ApiError> {
        let sub = self.subresources.iter().find(|sub| sub.name == name).ok_or_else(|| {
            ApiError::Config(format!("resource '{}' has no subresource '{name}'", self.name))
        })?;

        Ok(Route {
            name: format!("{}.{}", self.name, sub.name),
            base_path: format!("{}/{{parentId}}/{}", self.base_path, sub.path),
            query_params: sub.query_params.to_vec(),
        })
    }
}

/// Look up a resource family by name
///
/// # Errors
///
/// Returns `ApiError::Config` for unknown names.
pub fn lookup(name: &str) -> Result<&'static ResourceDef, ApiError> {
    RESOURCES
        .iter()
        .find(|def| def.name == name)
        .ok_or_else(|| ApiError::Config(format!("unknown resource '{name}'")))
}

const fn sub(name: &'static str, path: &'static str, query_params: &'static [&'static str]) -> SubresourceDef {
    SubresourceDef { name, path, query_params }
}

/// Articles with tags, ratings, comments, files and subscriptions
pub const ARTICLES: ResourceDef = ResourceDef {
    name: "articles",
    base_path: "articles",
    query_params: &["startDate", "endDate", "statuses", "tags"],
    subresources: &[
        sub("tags", "tags", &[]),
        sub("ratings", "ratings", &[]),
        sub("comments", "comments", &["statuses"]),
        sub("files", "files", &[]),
        sub("subscriptions", "subscriptions", &[]),
    ],
};

pub const USERS: ResourceDef = ResourceDef {
    name: "users",
    base_path: "users",
    query_params: &["roles"],
    subresources: &[sub("social-logins", "social-login", &[])],
};

pub const ROLES: ResourceDef = ResourceDef {
    name: "roles",
    base_path: "lookups/roles",
    query_params: &[],
    subresources: &[],
};

pub const KEY_VALUES: ResourceDef = ResourceDef {
    name: "key-values",
    base_path: "key-values",
    query_params: &[],
    subresources: &[],
};

pub const VALUE_SETS: ResourceDef = ResourceDef {
    name: "value-sets",
    base_path: "value-sets",
    query_params: &[],
    subresources: &[sub("items", "items", &[])],
};

pub const FILES: ResourceDef = ResourceDef {
    name: "files",
    base_path: "files",
    query_params: &["path"],
    subresources: &[],
};

pub const COMMERCE_PRODUCTS: ResourceDef = ResourceDef {
    name: "commerce-products",
    base_path: "commerce/products",
    query_params: &["categoryIds"],
    subresources: &[],
};

pub const NOTIFICATION_SUBSCRIPTIONS: ResourceDef = ResourceDef {
    name: "notification-subscriptions",
    base_path: "notifications/subscriptions",
    query_params: &["channels", "userIds", "startDate", "endDate"],
    subresources: &[],
};

/// Records of a user-defined schema; bind `schemaName` before use
pub const DYNAMIC_RESOURCES: ResourceDef = ResourceDef {
    name: "dynamic-resources",
    base_path: "resources/{schemaName}",
    query_params: &[],
    subresources: &[],
};

/// All resource families exposed by the hosted API
pub static RESOURCES: &[ResourceDef] = &[
    // Content
    ARTICLES,
    ResourceDef { name: "article-tags", base_path: "article-tags", query_params: &[], subresources: &[] },
    ResourceDef {
        name: "article-settings",
        base_path: "article-settings",
        query_params: &[],
        subresources: &[],
    },
    // Membership
    USERS,
    ROLES,
    ResourceDef { name: "user-profiles", base_path: "profiles", query_params: &[], subresources: &[] },
    // Key-value and value sets
    KEY_VALUES,
    VALUE_SETS,
    // Dynamic resources
    DYNAMIC_RESOURCES,
    ResourceDef { name: "dynamic-schemas", base_path: "schemas", query_params: &[], subresources: &[] },
    // Templating and application settings
    ResourceDef { name: "templates", base_path: "templates", query_params: &[], subresources: &[] },
    ResourceDef { name: "application-settings", base_path: "settings", query_params: &[], subresources: &[] },
    ResourceDef { name: "lookups", base_path: "lookups", query_params: &[], subresources: &[] },
    // Files and media
    FILES,
    ResourceDef {
        name: "media-vaults",
        base_path: "media-vaults",
        query_params: &["path"],
        subresources: &[sub("processing-providers", "processing-providers", &[])],
    },
    // Commerce
    COMMERCE_PRODUCTS,
    ResourceDef {
        name: "commerce-customers",
        base_path: "commerce/customers",
        query_params: &[],
        subresources: &[sub("payment-methods", "payment-methods", &[])],
    },
    ResourceDef {
        name: "commerce-invoices",
        base_path: "commerce/invoices",
        query_params: &["from", "to", "statuses"],
        subresources: &[],
    },
    ResourceDef {
        name: "commerce-payment-methods",
        base_path: "commerce/payment-methods",
        query_params: &[],
        subresources: &[],
    },
    ResourceDef { name: "commerce-carts", base_path: "commerce/carts", query_params: &[], subresources: &[] },
    ResourceDef { name: "commerce-coupons", base_path: "commerce/coupons", query_params: &[], subresources: &[] },
    // Notifications
    ResourceDef {
        name: "notification-publish",
        base_path: "notifications/publish",
        query_params: &[],
        subresources: &[],
    },
    NOTIFICATION_SUBSCRIPTIONS,
    ResourceDef {
        name: "notification-registrations",
        base_path: "notifications/registrations",
        query_params: &["providers", "userIds"],
        subresources: &[],
    },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::api::uri::Params;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = RESOURCES.iter().map(|def| def.name).collect();
        assert_eq!(names.len(), RESOURCES.len());
    }

    #[test]
    fn test_lookup_unknown_is_config_error() {
        assert!(matches!(lookup("widgets"), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_find_template_lists_standard_and_extra_params() {
        let template = lookup("articles").unwrap().find_template();
        assert_eq!(
            template.as_str(),
            "articles/{?searchQuery,page,rpp,sort,embed,fields,startDate,endDate,statuses,tags}"
        );
    }

    #[test]
    fn test_item_templates() {
        let roles = lookup("roles").unwrap();
        assert_eq!(roles.get_template().as_str(), "lookups/roles/{id}/{?embed,fields}");
        assert_eq!(roles.create_template().as_str(), "lookups/roles");
        assert_eq!(roles.item_template().as_str(), "lookups/roles/{id}");
    }

    #[test]
    fn test_subresource_route() {
        let comments = lookup("articles").unwrap().subresource("comments").unwrap();

        assert_eq!(comments.name, "articles.comments");
        let url = comments.find_template().expand(&Params::new().with("parentId", "a1").with("page", "1"));
        assert_eq!(url, "articles/a1/comments/?page=1");
    }

    #[test]
    fn test_unknown_subresource() {
        assert!(matches!(lookup("roles").unwrap().subresource("comments"), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_dynamic_resource_base_params() {
        let template = lookup("dynamic-resources").unwrap().get_template();
        let url = template.expand(&Params::new().with("schemaName", "cars").with("id", "c1"));
        assert_eq!(url, "resources/cars/c1/");
    }
}
