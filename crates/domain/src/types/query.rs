//! Query vocabulary shared by list endpoints

use serde::{Deserialize, Serialize};

use crate::impl_wire_enum_conversions;

/// Sort direction for list endpoints, rendered into the `sort` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl_wire_enum_conversions!(OrderDirection {
    Asc => "asc",
    Desc => "desc",
});

/// OAuth-style grant type sent with credential logins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    Password,
}

impl_wire_enum_conversions!(GrantType {
    Password => "password",
});
