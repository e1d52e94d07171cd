//! Conversions from third-party errors into SDK errors

mod conversions;

pub(crate) use conversions::IntoSessionError;
