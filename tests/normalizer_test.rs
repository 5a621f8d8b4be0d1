//! Response normalization scenarios across the endpoint families

use serde_json::{json, Value};
use std::collections::HashMap;
use visearch_client::{
    PagedSearchResult, ResponseConfig, ResultNormalizer, ResultShape, SearchError, SearchOutcome,
};

fn normalize(body: &str) -> SearchOutcome {
    ResultNormalizer::default()
        .normalize_body(body, HashMap::new())
        .into()
}

fn success(document: Value) -> PagedSearchResult {
    normalize(&document.to_string())
        .into_result()
        .expect("expected a successful result")
}

#[test]
fn test_search_scenario() {
    let result = success(json!({
        "status": "OK",
        "method": "search",
        "result": [{"im_id": "a"}],
        "page": 0,
        "limit": 10,
        "total": 1
    }));

    assert_eq!(result.items().len(), 1);
    assert_eq!(result.items()[0].im_id.as_deref(), Some("a"));
    assert_eq!(result.page(), Some(0));
    assert_eq!(result.limit(), Some(10));
    assert_eq!(result.total(), Some(1));
    assert!(result.objects().is_none());
    assert!(result.groups().is_none());
}

#[test]
fn test_api_error_scenario() {
    let body = r#"{"status":"error","error":["invalid api key"]}"#;
    let outcome = normalize(body);

    let failure = outcome.failure().expect("expected a failure");
    assert_eq!(failure.message(), "invalid api key");
    assert!(matches!(failure.error(), SearchError::Api { .. }));
    let raw: Value = serde_json::from_str(failure.raw_response().unwrap()).unwrap();
    assert_eq!(raw, serde_json::from_str::<Value>(body).unwrap());
}

#[test]
fn test_failed_status_without_error_field() {
    let outcome = normalize(r#"{"status":"fail","method":"search"}"#);
    assert!(matches!(
        outcome.failure().map(|f| f.error()),
        Some(SearchError::MalformedResponse { .. })
    ));
}

#[test]
fn test_missing_method_for_every_shape() {
    let documents = [
        json!({"status": "OK", "result": [{"im_name": "a"}]}),
        json!({"status": "OK", "objects": []}),
        json!({"status": "OK", "group_results": [{"brand": "x", "result": []}]}),
        json!({"status": "OK"}),
    ];

    for document in documents {
        let outcome = normalize(&document.to_string());
        assert!(
            matches!(
                outcome.failure().map(|f| f.error()),
                Some(SearchError::MalformedResponse { .. })
            ),
            "document without method should be malformed: {}",
            document
        );
    }
}

#[test]
fn test_flat_items_count_matches_result() {
    for n in [0usize, 1, 7] {
        let items: Vec<Value> = (0..n).map(|i| json!({"im_name": format!("img-{}", i)})).collect();
        let result = success(json!({"status": "OK", "method": "search", "result": items}));
        assert_eq!(result.items().len(), n);
        assert!(matches!(result.shape(), ResultShape::Flat(_)));
    }
}

#[test]
fn test_group_results_preserve_labels_and_items() {
    let result = success(json!({
        "status": "OK",
        "method": "search",
        "group_results": [
            {"category": "shoes", "result": [{"im_name": "s1"}, {"im_name": "s2"}]},
            {"category": "bags", "result": [{"im_name": "b1"}]},
            {"category": "hats", "result": []}
        ],
        "group_limit": 2
    }));

    let groups = result.groups().unwrap();
    let summary: Vec<(&str, usize)> = groups
        .iter()
        .map(|g| (g.group_value.as_str(), g.items.len()))
        .collect();
    assert_eq!(summary, vec![("shoes", 2), ("bags", 1), ("hats", 0)]);
    assert!(result.items().is_empty());
}

#[test]
fn test_similar_products_scenario() {
    let result = success(json!({
        "status": "OK",
        "method": "similarproducts",
        "group_result": [[{"im_name": "img1"}, {"im_name": "img2"}]],
        "product_types": [{"type": "shirt", "score": 0.9}]
    }));

    let objects = result.objects().unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].kind.as_deref(), Some("shirt"));
    assert_eq!(objects[0].score, Some(0.9));
    let names: Vec<_> = objects[0].items.iter().filter_map(|i| i.im_name.as_deref()).collect();
    assert_eq!(names, vec!["img1", "img2"]);
}

#[test]
fn test_similar_products_overrides_flat_result() {
    let result = success(json!({
        "status": "OK",
        "method": "similarproducts",
        "result": [{"im_name": "ignored"}],
        "group_result": [[{"im_name": "img1"}]],
        "product_types": [{"type": "bag"}]
    }));

    assert!(result.items().is_empty());
    assert_eq!(result.objects().map(|o| o.len()), Some(1));
}

#[test]
fn test_similar_products_misaligned() {
    let body = json!({
        "status": "OK",
        "method": "similarproducts",
        "group_result": [[], []],
        "product_types": [{"type": "bag"}]
    })
    .to_string();

    let strict = normalize(&body);
    assert!(matches!(
        strict.failure().map(|f| f.error()),
        Some(SearchError::InconsistentGroupData { groups: 2, product_types: 1, .. })
    ));

    let lenient = ResultNormalizer::new(ResponseConfig {
        enforce_group_alignment: false,
        ..Default::default()
    })
    .normalize_body(&body, HashMap::new())
    .unwrap();
    assert_eq!(lenient.objects().map(|o| o.len()), Some(2));
}

#[test]
fn test_raw_json_round_trip() {
    let document = json!({
        "status": "OK",
        "method": "discoversearch",
        "objects": [{"type": "top", "box": [1, 2, 3, 4], "result": [{"im_name": "t1", "score": 0.5}]}],
        "object_types_list": [{"type": "top", "attributes_list": {"color": ["red", "blue"]}}],
        "im_id": "2024-abc",
        "qinfo": {"fl": "price"},
        "facets": [{"key": "price", "range": {"min": 1, "max": 99}}]
    });

    let result = success(document.clone());
    let reparsed: Value = serde_json::from_str(result.raw_json()).unwrap();
    assert_eq!(reparsed, document);
}

#[test]
fn test_truncated_body_is_deserialization_failure() {
    let body = r#"{"status":"OK","method":"search","result":[{"im_na"#;
    let outcome = normalize(body);

    let failure = outcome.failure().unwrap();
    assert!(matches!(failure.error(), SearchError::Deserialization { .. }));
    assert!(failure.cause().is_some());
    assert_eq!(failure.raw_response(), Some(body));
}

#[test]
fn test_wrong_facet_shape_is_deserialization_failure() {
    let outcome = normalize(r#"{"status":"OK","method":"search","result":[],"facets":{"key":"x"}}"#);
    assert!(matches!(
        outcome.failure().map(|f| f.error()),
        Some(SearchError::Deserialization { .. })
    ));
}
