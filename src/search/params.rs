//! Request parameters for the search endpoints

use super::models::ObjectBox;
use bytes::Bytes;
use indexmap::IndexMap;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;

/// Ordered `(name, value)` pairs; names may repeat
pub type QueryParams = Vec<(String, String)>;

/// Parameters shared by every search endpoint
#[derive(Debug, Clone, Default)]
pub struct BaseSearchParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Metadata fields to return
    pub fl: Vec<String>,
    /// Metadata filters, rendered as `key:value`
    pub fq: IndexMap<String, String>,
    pub score: Option<bool>,
    pub score_min: Option<f32>,
    pub score_max: Option<f32>,
    pub get_all_fl: Option<bool>,
    pub qinfo: Option<bool>,
    pub facets: Vec<String>,
    pub facets_limit: Option<u32>,
    pub facets_show_count: Option<bool>,
    pub group_by: Option<String>,
    pub group_limit: Option<u32>,
    /// Passed through verbatim
    pub custom: QueryParams,
}

impl BaseSearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.fl.push(field.into());
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fq.insert(key.into(), value.into());
        self
    }

    pub fn with_score(mut self, score: bool) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_score_range(mut self, min: f32, max: f32) -> Self {
        self.score_min = Some(min);
        self.score_max = Some(max);
        self
    }

    pub fn with_qinfo(mut self, qinfo: bool) -> Self {
        self.qinfo = Some(qinfo);
        self
    }

    pub fn with_facet(mut self, facet: impl Into<String>) -> Self {
        self.facets.push(facet.into());
        self
    }

    pub fn with_group_by(mut self, field: impl Into<String>, group_limit: Option<u32>) -> Self {
        self.group_by = Some(field.into());
        self.group_limit = group_limit;
        self
    }

    pub fn with_custom(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom.push((name.into(), value.into()));
        self
    }

    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        push_opt(&mut query, "page", self.page);
        push_opt(&mut query, "limit", self.limit);
        for field in self.fl.iter().filter(|f| !f.is_empty()) {
            push(&mut query, "fl", field);
        }
        for (key, value) in &self.fq {
            push(&mut query, "fq", format!("{}:{}", key, value));
        }
        push_opt(&mut query, "score", self.score);
        push_opt(&mut query, "score_min", self.score_min);
        push_opt(&mut query, "score_max", self.score_max);
        push_opt(&mut query, "get_all_fl", self.get_all_fl);
        push_opt(&mut query, "qinfo", self.qinfo);
        for facet in self.facets.iter().filter(|f| !f.is_empty()) {
            push(&mut query, "facets", facet);
        }
        push_opt(&mut query, "facets_limit", self.facets_limit);
        push_opt(&mut query, "facets_show_count", self.facets_show_count);
        push_str(&mut query, "group_by", self.group_by.as_deref());
        push_opt(&mut query, "group_limit", self.group_limit);
        query.extend(self.custom.iter().cloned());
        query
    }
}

/// Parameters for search by indexed image name and for recommendation
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub im_name: String,
    pub base: BaseSearchParams,
}

impl SearchParams {
    pub fn new(im_name: impl Into<String>) -> Self {
        Self {
            im_name: im_name.into(),
            base: BaseSearchParams::default(),
        }
    }

    pub fn with_base(mut self, base: BaseSearchParams) -> Self {
        self.base = base;
        self
    }

    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        push_str(&mut query, "im_name", Some(&self.im_name));
        query.extend(self.base.to_query());
        query
    }
}

/// Parameters for color search
#[derive(Debug, Clone)]
pub struct ColorSearchParams {
    /// Hex color without `#`, e.g. `fa4d4d`
    pub color: String,
    pub base: BaseSearchParams,
}

impl ColorSearchParams {
    pub fn new(color: impl Into<String>) -> Self {
        let color = color.into();
        Self {
            color: color.trim_start_matches('#').to_string(),
            base: BaseSearchParams::default(),
        }
    }

    pub fn with_base(mut self, base: BaseSearchParams) -> Self {
        self.base = base;
        self
    }

    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        push_str(&mut query, "color", Some(&self.color));
        query.extend(self.base.to_query());
        query
    }
}

/// Where the query image comes from
pub enum ImageSource {
    File(PathBuf),
    /// Any readable stream; it is read to the end and dropped during the call
    Stream(Box<dyn Read + Send>),
    Url(String),
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
        }
    }
}

/// Parameters for upload, discover and similar-products search
#[derive(Debug, Default)]
pub struct UploadSearchParams {
    /// Id of a previously uploaded image; takes precedence over `image`
    pub im_id: Option<String>,
    pub image: Option<ImageSource>,
    pub bounding_box: Option<ObjectBox>,
    pub detection: Option<String>,
    pub base: BaseSearchParams,
}

impl UploadSearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_im_id(im_id: impl Into<String>) -> Self {
        Self {
            im_id: Some(im_id.into()),
            ..Self::default()
        }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new().with_image(ImageSource::File(path.into()))
    }

    pub fn from_stream(stream: impl Read + Send + 'static) -> Self {
        Self::new().with_image(ImageSource::Stream(Box::new(stream)))
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new().with_image(ImageSource::Url(url.into()))
    }

    pub fn with_image(mut self, image: ImageSource) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_box(mut self, bounding_box: ObjectBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    pub fn with_detection(mut self, detection: impl Into<String>) -> Self {
        self.detection = Some(detection.into());
        self
    }

    pub fn with_base(mut self, base: BaseSearchParams) -> Self {
        self.base = base;
        self
    }

    /// Query parameters, excluding the image itself
    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        push_str(&mut query, "im_id", self.im_id.as_deref());
        if let Some(bounding_box) = &self.bounding_box {
            push(&mut query, "box", bounding_box.to_param());
        }
        push_str(&mut query, "detection", self.detection.as_deref());
        query.extend(self.base.to_query());
        query
    }

    pub(crate) fn has_im_id(&self) -> bool {
        self.im_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Image bytes ready for a multipart upload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub file_name: String,
}

fn push(query: &mut QueryParams, name: &str, value: impl Into<String>) {
    query.push((name.to_string(), value.into()));
}

fn push_str(query: &mut QueryParams, name: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        push(query, name, value);
    }
}

fn push_opt<T: ToString>(query: &mut QueryParams, name: &str, value: Option<T>) {
    if let Some(value) = value {
        push(query, name, value.to_string());
    }
}
