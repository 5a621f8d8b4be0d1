//! Data models for ViSearch responses

use crate::error::SearchError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A single matched image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub im_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub im_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Metadata fields requested through `fl`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_map: Option<IndexMap<String, Value>>,
    /// Anything else the server returned for this image
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Bounding box as returned by the API: `[x1, y1, x2, y2]` in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectBox(pub i64, pub i64, pub i64, pub i64);

impl ObjectBox {
    pub fn x1(&self) -> i64 {
        self.0
    }

    pub fn y1(&self) -> i64 {
        self.1
    }

    pub fn x2(&self) -> i64 {
        self.2
    }

    pub fn y2(&self) -> i64 {
        self.3
    }

    pub fn width(&self) -> i64 {
        self.2 - self.0
    }

    pub fn height(&self) -> i64 {
        self.3 - self.1
    }

    /// Returns true if the corners are ordered and non-negative
    pub fn is_valid(&self) -> bool {
        self.0 >= 0 && self.1 >= 0 && self.2 >= self.0 && self.3 >= self.1
    }

    /// Format used by the `box` request parameter
    pub fn to_param(&self) -> String {
        format!("{},{},{},{}", self.0, self.1, self.2, self.3)
    }
}

/// Classification record ("product type") for a detected object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductType {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<ObjectBox>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes_list: IndexMap<String, Value>,
}

/// An object detected in the query image with its own matches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectSearchResult {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<ObjectBox>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes_list: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(rename = "result", default)]
    pub items: Vec<ImageResult>,
}

impl ObjectSearchResult {
    /// Build an object result from a classification record and its matches
    pub fn from_product_type(product_type: &ProductType, items: Vec<ImageResult>) -> Self {
        Self {
            kind: product_type.kind.clone(),
            score: product_type.score,
            bounding_box: product_type.bounding_box,
            attributes: product_type.attributes.clone(),
            attributes_list: product_type.attributes_list.clone(),
            total: None,
            items,
        }
    }
}

/// A labeled bucket of matches produced by `group_by`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSearchResult {
    /// Name of the field that carried the label
    pub group_field: String,
    pub group_value: String,
    pub items: Vec<ImageResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetItem {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,
}

/// Facet summary for one metadata field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<FacetItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<FacetRange>,
}

/// Top-level shape of a search response. Only one is ever populated.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultShape {
    #[default]
    Empty,
    Flat(Vec<ImageResult>),
    Objects(Vec<ObjectSearchResult>),
    Groups(Vec<GroupSearchResult>),
}

impl ResultShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Flat(_) => "flat",
            Self::Objects(_) => "objects",
            Self::Groups(_) => "groups",
        }
    }
}

/// Normalized result of any search endpoint
#[derive(Debug, Clone, Default)]
pub struct PagedSearchResult {
    pub(crate) shape: ResultShape,
    pub(crate) method: String,
    pub(crate) page: Option<u32>,
    pub(crate) limit: Option<u32>,
    pub(crate) total: Option<u64>,
    pub(crate) group_limit: Option<u32>,
    pub(crate) product_types: Option<Vec<ProductType>>,
    pub(crate) product_types_list: Option<Vec<ProductType>>,
    pub(crate) object_types_list: Option<Vec<ProductType>>,
    pub(crate) im_id: Option<String>,
    pub(crate) facets: Option<Vec<Facet>>,
    pub(crate) query_info: Option<IndexMap<String, String>>,
    pub(crate) raw_json: String,
    pub(crate) headers: HashMap<String, String>,
}

impl PagedSearchResult {
    pub fn shape(&self) -> &ResultShape {
        &self.shape
    }

    /// Flat list of matches; empty unless the response carried `result`
    pub fn items(&self) -> &[ImageResult] {
        match &self.shape {
            ResultShape::Flat(items) => items,
            _ => &[],
        }
    }

    pub fn objects(&self) -> Option<&[ObjectSearchResult]> {
        match &self.shape {
            ResultShape::Objects(objects) => Some(objects),
            _ => None,
        }
    }

    pub fn groups(&self) -> Option<&[GroupSearchResult]> {
        match &self.shape {
            ResultShape::Groups(groups) => Some(groups),
            _ => None,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn page(&self) -> Option<u32> {
        self.page
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn group_limit(&self) -> Option<u32> {
        self.group_limit
    }

    pub fn product_types(&self) -> Option<&[ProductType]> {
        self.product_types.as_deref()
    }

    pub fn product_types_list(&self) -> Option<&[ProductType]> {
        self.product_types_list.as_deref()
    }

    pub fn object_types_list(&self) -> Option<&[ProductType]> {
        self.object_types_list.as_deref()
    }

    pub fn im_id(&self) -> Option<&str> {
        self.im_id.as_deref()
    }

    pub fn facets(&self) -> Option<&[Facet]> {
        self.facets.as_deref()
    }

    pub fn query_info(&self) -> Option<&IndexMap<String, String>> {
        self.query_info.as_ref()
    }

    /// The normalized document re-serialized, for diagnostics
    pub fn raw_json(&self) -> &str {
        &self.raw_json
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Attach the diagnostic fields. Only the normalizer calls this, once.
    pub(crate) fn with_diagnostics(mut self, raw_json: String, headers: HashMap<String, String>) -> Self {
        self.raw_json = raw_json;
        self.headers = headers;
        self
    }
}

/// Failed search call
#[derive(Debug)]
pub struct SearchFailure {
    error: SearchError,
}

impl SearchFailure {
    pub fn message(&self) -> String {
        self.error.to_string()
    }

    /// Underlying cause, e.g. the JSON or IO error
    pub fn cause(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.error)
    }

    pub fn raw_response(&self) -> Option<&str> {
        self.error.raw_response()
    }

    pub fn error(&self) -> &SearchError {
        &self.error
    }

    pub fn into_error(self) -> SearchError {
        self.error
    }
}

impl From<SearchError> for SearchFailure {
    fn from(error: SearchError) -> Self {
        Self { error }
    }
}

impl std::fmt::Display for SearchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.error, f)
    }
}

/// What every search operation returns: a result or a failure, never a panic
/// or an `Err`.
#[derive(Debug)]
pub enum SearchOutcome {
    Success(PagedSearchResult),
    Failure(SearchFailure),
}

impl SearchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn result(&self) -> Option<&PagedSearchResult> {
        match self {
            Self::Success(result) => Some(result),
            Self::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&SearchFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> Result<PagedSearchResult, SearchFailure> {
        match self {
            Self::Success(result) => Ok(result),
            Self::Failure(failure) => Err(failure),
        }
    }
}

impl From<crate::error::Result<PagedSearchResult>> for SearchOutcome {
    fn from(result: crate::error::Result<PagedSearchResult>) -> Self {
        match result {
            Ok(result) => Self::Success(result),
            Err(e) => Self::Failure(e.into()),
        }
    }
}
