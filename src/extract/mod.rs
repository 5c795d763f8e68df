//! Lexical extraction of architectural facts from C# source text.
//!
//! Everything here is a pure function of the input text. A construct that
//! does not match its pattern is simply absent from the result; nothing in
//! this module returns an error.

pub mod csharp;
pub mod text;

use serde::{Deserialize, Serialize};

/// How many targets a navigation property points at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// A single related entity.
    One,
    /// A collection of related entities.
    Many,
}

/// An entity property that references another entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Navigation {
    /// Property name.
    pub name: String,
    /// Referenced entity type name.
    pub target_entity: String,
    /// One or many.
    #[serde(rename = "type")]
    pub cardinality: Cardinality,
}

/// A public method signature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MethodSignature {
    /// Method name.
    pub name: String,
    /// Raw return type text.
    pub return_type: String,
    /// Whether the signature carries the `async` modifier.
    pub is_async: bool,
}

/// An HTTP endpoint declared on a controller action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Endpoint {
    /// Action method name.
    pub name: String,
    /// Upper-case HTTP verb (`GET`, `POST`, ...).
    #[serde(rename = "method", default)]
    pub http_method: String,
    /// Route fragment relative to the controller route.
    #[serde(rename = "route", default)]
    pub route_fragment: String,
    /// Request body type, when known.
    #[serde(default)]
    pub request_type: Option<String>,
    /// Response type, when known.
    #[serde(default)]
    pub response_type: Option<String>,
    /// Whether the endpoint requires authentication.
    #[serde(default = "default_requires_auth")]
    pub requires_auth: bool,
    /// Roles required to call the endpoint.
    #[serde(default)]
    pub required_roles: Vec<String>,
}

fn default_requires_auth() -> bool {
    true
}
