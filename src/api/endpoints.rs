//! Static mapping of logical API operations to URL paths.

use std::fmt;

/// A logical API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Health,

    Medias,
    MediaDetail(u32),

    Articles,

    Classifications,
    ClassificationsStats,
    ClassificationsWeekly,

    FacebookPosts,
    TwitterTweets,

    AudienceWeb,
    AudienceFacebook,
    AudienceTwitter,
    AudienceGlobal,
    AudienceInactive,

    Ranking,

    ScrapingTrigger,
    ScrapingSchedule,
    ScrapingScheduleDetail(u32),
    ScrapingHistory,

    Stats,
}

impl Endpoint {
    /// Returns the path of this endpoint, always with a trailing slash.
    #[must_use]
    pub fn path(self) -> String {
        match self {
            Self::MediaDetail(id) => format!("/api/medias/{id}/"),
            Self::ScrapingScheduleDetail(id) => format!("/api/scraping/schedule/{id}/"),
            other => other.static_path().to_string(),
        }
    }

    const fn static_path(self) -> &'static str {
        match self {
            Self::Health => "/api/health/",
            Self::Medias | Self::MediaDetail(_) => "/api/medias/",
            Self::Articles => "/api/articles/",
            Self::Classifications => "/api/classifications/",
            Self::ClassificationsStats => "/api/classifications/stats/",
            Self::ClassificationsWeekly => "/api/classifications/weekly/",
            Self::FacebookPosts => "/api/facebook/posts/",
            Self::TwitterTweets => "/api/twitter/tweets/",
            Self::AudienceWeb => "/api/audience/web/",
            Self::AudienceFacebook => "/api/audience/facebook/",
            Self::AudienceTwitter => "/api/audience/twitter/",
            Self::AudienceGlobal => "/api/audience/global/",
            Self::AudienceInactive => "/api/audience/inactive/",
            Self::Ranking => "/api/ranking/",
            Self::ScrapingTrigger => "/api/scraping/trigger/",
            Self::ScrapingSchedule | Self::ScrapingScheduleDetail(_) => "/api/scraping/schedule/",
            Self::ScrapingHistory => "/api/scraping/history/",
            Self::Stats => "/api/stats/",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_paths() {
        assert_eq!(Endpoint::Health.path(), "/api/health/");
        assert_eq!(Endpoint::ClassificationsWeekly.path(), "/api/classifications/weekly/");
        assert_eq!(Endpoint::AudienceInactive.path(), "/api/audience/inactive/");
        assert_eq!(Endpoint::ScrapingHistory.path(), "/api/scraping/history/");
    }

    #[test]
    fn test_parameterized_paths() {
        assert_eq!(Endpoint::MediaDetail(12).path(), "/api/medias/12/");
        assert_eq!(Endpoint::ScrapingScheduleDetail(3).path(), "/api/scraping/schedule/3/");
    }

    #[test]
    fn test_every_path_is_rooted_and_slash_terminated() {
        let all = [
            Endpoint::Health,
            Endpoint::Medias,
            Endpoint::MediaDetail(1),
            Endpoint::Articles,
            Endpoint::Classifications,
            Endpoint::ClassificationsStats,
            Endpoint::ClassificationsWeekly,
            Endpoint::FacebookPosts,
            Endpoint::TwitterTweets,
            Endpoint::AudienceWeb,
            Endpoint::AudienceFacebook,
            Endpoint::AudienceTwitter,
            Endpoint::AudienceGlobal,
            Endpoint::AudienceInactive,
            Endpoint::Ranking,
            Endpoint::ScrapingTrigger,
            Endpoint::ScrapingSchedule,
            Endpoint::ScrapingScheduleDetail(1),
            Endpoint::ScrapingHistory,
            Endpoint::Stats,
        ];
        for endpoint in all {
            let path = endpoint.path();
            assert!(path.starts_with("/api/"), "{path}");
            assert!(path.ends_with('/'), "{path}");
        }
    }
}
