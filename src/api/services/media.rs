use crate::api::endpoints::Endpoint;
use crate::api::transport::{ApiClient, ApiResponse, RequestDescriptor};
use crate::api::types::Media;

/// The media registry.
#[derive(Debug, Clone)]
pub struct MediaService {
    api: ApiClient,
}

impl MediaService {
    pub(crate) const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get_all(&self) -> ApiResponse<Vec<Media>> {
        self.api.get(RequestDescriptor::get(Endpoint::Medias)).await
    }

    pub async fn get_by_id(&self, id: u32) -> ApiResponse<Media> {
        self.api.get(RequestDescriptor::get(Endpoint::MediaDetail(id))).await
    }
}
