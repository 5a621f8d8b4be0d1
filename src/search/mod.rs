//! ViSearch search operations and response normalization
//!
//! - `status`: decides whether a response document reports success
//! - `normalizer`: builds `PagedSearchResult` from a successful document
//! - `client`: the six search endpoints over a pluggable `Transport`

pub mod client;
mod decode;
pub mod models;
pub mod normalizer;
pub mod params;
pub mod status;
pub mod transport;

pub use client::{Endpoint, ViSearchClient};
pub use models::{
    Facet, FacetItem, FacetRange, GroupSearchResult, ImageResult, ObjectBox, ObjectSearchResult,
    PagedSearchResult, ProductType, ResultShape, SearchFailure, SearchOutcome,
};
pub use normalizer::ResultNormalizer;
pub use params::{
    BaseSearchParams, ColorSearchParams, ImageSource, ImageUpload, QueryParams, SearchParams,
    UploadSearchParams,
};
pub use status::ResponseStatusValidator;
pub use transport::{HttpResponse, ReqwestTransport, Transport};
