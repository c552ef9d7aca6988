//! Typed façades over [`ApiClient`], one per resource group.
//!
//! Services apply default arguments and resolve endpoints; they never retry
//! or cache, and failures are returned exactly as the transport produced
//! them.

mod article;
mod audience;
mod classification;
mod media;
mod ranking;
mod scraping;
mod social;
mod stats;

pub use article::ArticleService;
pub use audience::AudienceService;
pub use classification::ClassificationService;
pub use media::MediaService;
pub use ranking::RankingService;
pub use scraping::ScrapingService;
pub use social::SocialService;
pub use stats::StatsService;

use super::transport::ApiClient;

/// Default look-back window, in days, for audience, ranking and stats.
pub const DEFAULT_DAYS: u32 = 30;

/// Default page size for article, classification and social listings.
pub const DEFAULT_LIMIT: u32 = 100;

impl ApiClient {
    #[must_use]
    pub fn media(&self) -> MediaService {
        MediaService::new(self.clone())
    }

    #[must_use]
    pub fn articles(&self) -> ArticleService {
        ArticleService::new(self.clone())
    }

    #[must_use]
    pub fn classifications(&self) -> ClassificationService {
        ClassificationService::new(self.clone())
    }

    #[must_use]
    pub fn social(&self) -> SocialService {
        SocialService::new(self.clone())
    }

    #[must_use]
    pub fn audience(&self) -> AudienceService {
        AudienceService::new(self.clone())
    }

    #[must_use]
    pub fn ranking(&self) -> RankingService {
        RankingService::new(self.clone())
    }

    #[must_use]
    pub fn scraping(&self) -> ScrapingService {
        ScrapingService::new(self.clone())
    }

    #[must_use]
    pub fn stats(&self) -> StatsService {
        StatsService::new(self.clone())
    }
}
