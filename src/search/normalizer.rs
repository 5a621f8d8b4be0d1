//! Normalization of raw ViSearch responses into `PagedSearchResult`
//!
//! All six search endpoints answer with a JSON document of the same outer
//! form but with one of several item layouts:
//! - `result`: a flat list of images
//! - `objects`: detected objects, each with its own images
//! - `group_results`: images bucketed by a `group_by` field
//! - `group_result`: similar-products buckets, remapped to `objects`

use super::decode::{integer, scalar_text, Decoder};
use super::models::*;
use super::status::ResponseStatusValidator;
use crate::config::ResponseConfig;
use crate::error::{Result, SearchError};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

pub const RESULT: &str = "result";
pub const OBJECTS: &str = "objects";
pub const GROUP_RESULTS: &str = "group_results";
pub const GROUP_RESULT: &str = "group_result";
pub const METHOD: &str = "method";
pub const PAGE: &str = "page";
pub const LIMIT: &str = "limit";
pub const TOTAL: &str = "total";
pub const GROUP_LIMIT: &str = "group_limit";
pub const PRODUCT_TYPES: &str = "product_types";
pub const PRODUCT_TYPES_LIST: &str = "product_types_list";
pub const OBJECT_TYPES_LIST: &str = "object_types_list";
pub const IM_ID: &str = "im_id";
pub const FACETS: &str = "facets";
pub const QINFO: &str = "qinfo";

/// Turns response bodies into `PagedSearchResult`
#[derive(Debug, Clone)]
pub struct ResultNormalizer {
    config: ResponseConfig,
    validator: ResponseStatusValidator,
}

impl ResultNormalizer {
    pub fn new(config: ResponseConfig) -> Self {
        let validator = ResponseStatusValidator::new(config.success_status.clone());
        Self { config, validator }
    }

    pub fn config(&self) -> &ResponseConfig {
        &self.config
    }

    /// Parse, validate and normalize a response body
    pub fn normalize_body(
        &self,
        body: &str,
        headers: HashMap<String, String>,
    ) -> Result<PagedSearchResult> {
        let document: Value =
            serde_json::from_str(body).map_err(|e| SearchError::deserialization(e, body))?;
        self.validator.check(&document)?;
        self.normalize(&document, body, headers)
    }

    /// Normalize a document whose status has already been validated
    pub fn normalize(
        &self,
        document: &Value,
        raw_response: &str,
        headers: HashMap<String, String>,
    ) -> Result<PagedSearchResult> {
        let decoder = Decoder::new(raw_response);

        let shape = detect_shape(document, &decoder)?;

        let method = document
            .get(METHOD)
            .ok_or_else(|| SearchError::malformed(raw_response))?;

        let mut result = PagedSearchResult {
            shape,
            method: scalar_text(method).unwrap_or_default(),
            page: document.get(PAGE).and_then(integer),
            limit: document.get(LIMIT).and_then(integer),
            total: document.get(TOTAL).and_then(integer),
            group_limit: document.get(GROUP_LIMIT).and_then(integer),
            ..Default::default()
        };

        if let Some(node) = document.get(PRODUCT_TYPES) {
            result.product_types = Some(decoder.list(node)?);
        }
        if let Some(node) = document.get(PRODUCT_TYPES_LIST) {
            result.product_types_list = Some(decoder.list(node)?);
        }
        if let Some(node) = document.get(OBJECT_TYPES_LIST) {
            result.object_types_list = Some(decoder.list(node)?);
        }
        if let Some(node) = document.get(IM_ID) {
            result.im_id = scalar_text(node);
        }
        if let Some(node) = document.get(FACETS) {
            result.facets = Some(decoder.list(node)?);
        }
        if let Some(node) = document.get(QINFO) {
            result.query_info = Some(decoder.string_map(node)?);
        }

        if let Some(Value::Array(groups)) = document.get(GROUP_RESULT) {
            let objects = self.remap_similar_products(groups, &result, &decoder)?;
            result.shape = ResultShape::Objects(objects);
            result.object_types_list = result.product_types_list.clone();
        }

        debug!(
            "Normalized {} response: shape={}, page={:?}, total={:?}",
            result.method,
            result.shape.as_str(),
            result.page,
            result.total
        );

        Ok(result.with_diagnostics(document.to_string(), headers))
    }

    /// Reshape similar-products groups into discover-search objects.
    ///
    /// Group `i` takes its classification from `product_types[i]`.
    fn remap_similar_products(
        &self,
        groups: &[Value],
        result: &PagedSearchResult,
        decoder: &Decoder<'_>,
    ) -> Result<Vec<ObjectSearchResult>> {
        let product_types = result.product_types.as_deref().unwrap_or_default();

        if product_types.len() < groups.len() {
            if self.config.enforce_group_alignment {
                return Err(SearchError::InconsistentGroupData {
                    groups: groups.len(),
                    product_types: product_types.len(),
                    raw_response: decoder.raw_response().to_string(),
                });
            }
            warn!(
                "similar products response has {} groups but {} product types",
                groups.len(),
                product_types.len()
            );
        }

        let unclassified = ProductType::default();
        groups
            .iter()
            .enumerate()
            .map(|(i, group)| {
                let product_type = product_types.get(i).unwrap_or(&unclassified);
                Ok(ObjectSearchResult::from_product_type(
                    product_type,
                    decoder.list(group)?,
                ))
            })
            .collect()
    }
}

impl Default for ResultNormalizer {
    fn default() -> Self {
        Self::new(ResponseConfig::default())
    }
}

/// First match wins: `result`, then `objects`, then `group_results`
fn detect_shape(document: &Value, decoder: &Decoder<'_>) -> Result<ResultShape> {
    if let Some(node) = document.get(RESULT) {
        return Ok(ResultShape::Flat(decoder.list(node)?));
    }

    if let Some(node) = document.get(OBJECTS) {
        return Ok(ResultShape::Objects(decoder.list(node)?));
    }

    match document.get(GROUP_RESULTS) {
        Some(Value::Array(groups)) => {
            let groups = groups
                .iter()
                .map(|group| decode_group(group, decoder))
                .collect::<Result<Vec<_>>>()?;
            Ok(ResultShape::Groups(groups))
        }
        _ => Ok(ResultShape::Empty),
    }
}

/// A group holds its images under `result`; the other field is its label
fn decode_group(node: &Value, decoder: &Decoder<'_>) -> Result<GroupSearchResult> {
    let mut group = GroupSearchResult::default();

    let Some(fields) = node.as_object() else {
        return Ok(group);
    };

    for (key, value) in fields {
        if key == RESULT {
            group.items = decoder.list(value)?;
        } else {
            group.group_field = key.clone();
            group.group_value = scalar_text(value).unwrap_or_default();
        }
    }

    Ok(group)
}
