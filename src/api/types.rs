//! Payloads exchanged with the monitoring API.
//!
//! Field names follow the API's JSON. Timestamps are kept as the strings the
//! server sends.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: u32,
    pub nom: String,
    pub url: String,
    pub type_site: String,
    #[serde(default)]
    pub facebook_page: Option<String>,
    #[serde(default)]
    pub twitter_account: Option<String>,
    pub actif: bool,
    #[serde(default)]
    pub derniere_collecte: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: u32,
    pub media_id: u32,
    pub titre: String,
    #[serde(default)]
    pub contenu: String,
    #[serde(default)]
    pub extrait: String,
    pub url: String,
    #[serde(default)]
    pub auteur: Option<String>,
    pub date_publication: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source_type: String,
    #[serde(default)]
    pub vues: u64,
    #[serde(default)]
    pub commentaires: u64,
    pub scraped_at: String,
    pub created_at: String,
}

/// Thematic categories assigned by the backend classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Politique,
    #[serde(rename = "Économie")]
    Economie,
    #[serde(rename = "Sécurité")]
    Securite,
    #[serde(rename = "Santé")]
    Sante,
    Culture,
    Sport,
    Autres,
}

impl Category {
    pub const ALL: [Self; 7] = [
        Self::Politique,
        Self::Economie,
        Self::Securite,
        Self::Sante,
        Self::Culture,
        Self::Sport,
        Self::Autres,
    ];

    /// The label the API uses for this category.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Politique => "Politique",
            Self::Economie => "Économie",
            Self::Securite => "Sécurité",
            Self::Sante => "Santé",
            Self::Culture => "Culture",
            Self::Sport => "Sport",
            Self::Autres => "Autres",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s) || format!("{c:?}").eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub id: u32,
    pub article_id: u32,
    pub categorie: String,
    pub score_confiance: f64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationStats {
    pub categorie: String,
    pub total: u64,
    pub confiance_moyenne: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyCategoryStats {
    pub semaine: String,
    pub categorie: String,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacebookPost {
    pub id: u32,
    pub media_id: u32,
    pub post_id: String,
    #[serde(default)]
    pub message: String,
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub date_publication: String,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub engagement_total: u64,
    pub scraped_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: u32,
    pub media_id: u32,
    pub tweet_id: String,
    pub text: String,
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub date_publication: String,
    pub retweets: u64,
    pub replies: u64,
    pub likes: u64,
    pub quotes: u64,
    pub impressions: u64,
    pub engagement_total: u64,
    pub scraped_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceWeb {
    pub id: u32,
    pub nom: String,
    pub url: String,
    pub total_articles: u64,
    pub jours_avec_publication: u32,
    pub articles_par_jour_moyen: f64,
    #[serde(default)]
    pub derniere_publication: Option<String>,
    pub jours_depuis_derniere_pub: u32,
    pub statut: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceFacebook {
    pub id: u32,
    pub nom: String,
    pub url: String,
    #[serde(default)]
    pub facebook_page: Option<String>,
    pub total_posts: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_shares: u64,
    pub engagement_total: u64,
    pub engagement_moyen: f64,
    pub jours_avec_publication: u32,
    pub posts_par_jour_moyen: f64,
    #[serde(default)]
    pub derniere_publication: Option<String>,
    pub jours_depuis_derniere_pub: u32,
    pub statut: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceTwitter {
    pub id: u32,
    pub nom: String,
    pub url: String,
    #[serde(default)]
    pub twitter_account: Option<String>,
    pub total_tweets: u64,
    pub total_retweets: u64,
    pub total_replies: u64,
    pub total_likes: u64,
    pub total_quotes: u64,
    pub total_impressions: u64,
    pub engagement_total: u64,
    pub engagement_moyen: f64,
    pub jours_avec_publication: u32,
    pub tweets_par_jour_moyen: f64,
    #[serde(default)]
    pub derniere_publication: Option<String>,
    pub jours_depuis_derniere_pub: u32,
    pub statut: String,
}

/// Cross-platform audience summary. Platform breakdowns are optional and
/// absent from the compact listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceGlobal {
    pub id: u32,
    pub nom: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub total_publications: u64,
    #[serde(default)]
    pub total_engagement: u64,
    pub score_influence: f64,
    #[serde(default)]
    pub web: Option<AudienceWeb>,
    #[serde(default)]
    pub facebook: Option<AudienceFacebook>,
    #[serde(default)]
    pub twitter: Option<AudienceTwitter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactiveMedia {
    pub nom: String,
    pub jours_depuis_derniere_pub: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactiveMedias {
    #[serde(default)]
    pub web: Vec<InactiveMedia>,
    #[serde(default)]
    pub facebook: Vec<InactiveMedia>,
    #[serde(default)]
    pub twitter: Vec<InactiveMedia>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub id: u32,
    pub nom: String,
    pub url: String,
    pub total_articles: u64,
    pub total_posts_facebook: u64,
    pub total_tweets: u64,
    pub total_likes_fb: u64,
    pub total_comments_fb: u64,
    pub total_shares_fb: u64,
    pub engagement_total_fb: u64,
    pub total_retweets: u64,
    pub total_replies: u64,
    pub total_likes_tw: u64,
    pub total_quotes: u64,
    pub total_impressions: u64,
    pub engagement_total_tw: u64,
    pub engagement_total: u64,
    pub engagement_moyen: f64,
}

/// Body of `POST /api/scraping/trigger/`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapingRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fb_posts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_facebook: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_twitter: Option<bool>,
}

/// Tuning knobs shared by the single-media and bulk scraping shortcuts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub days: Option<u32>,
    pub fb_posts: Option<u32>,
    pub tweets: Option<u32>,
    pub skip_facebook: Option<bool>,
    pub skip_twitter: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapingResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub total_articles: u64,
    #[serde(default)]
    pub total_fb_posts: u64,
    #[serde(default)]
    pub total_tweets: u64,
}

/// How often the backend runs the automatic scraping job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Hourly,
    #[default]
    Daily,
    Weekly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        })
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            other => Err(format!("unknown frequency: {other}")),
        }
    }
}

/// The recurring scraping schedule.
///
/// A schedule read without a `frequency` falls back to [`Frequency::Daily`],
/// so toggling it on never stores an undefined frequency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapingSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fb_posts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tweets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ScrapingSchedule {
    /// Returns a copy with `enabled` set, keeping every other setting.
    #[must_use]
    pub fn toggled(&self, enabled: bool) -> Self {
        Self {
            enabled,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub schedule: Option<ScrapingSchedule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Manual,
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapingTask {
    pub id: u32,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub started_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub total_articles: u64,
    #[serde(default)]
    pub total_fb_posts: u64,
    #[serde(default)]
    pub total_tweets: u64,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapingHistory {
    #[serde(default)]
    pub tasks: Vec<ScrapingTask>,
    #[serde(default)]
    pub total: u64,
}

/// Pagination for the scraping history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Filters for the article listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMedia {
    pub nom: String,
    pub engagement_total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_medias: u64,
    pub total_articles: u64,
    pub total_categories: u64,
    #[serde(default)]
    pub top_media: Option<TopMedia>,
    pub period_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_schedule_without_frequency_defaults_to_daily() {
        let schedule: ScrapingSchedule =
            serde_json::from_str(r#"{"enabled": false}"#).expect("schedule should parse");
        assert_eq!(schedule.frequency, Frequency::Daily);

        let enabled = schedule.toggled(true);
        assert!(enabled.enabled);
        let body = serde_json::to_value(&enabled).expect("schedule should serialize");
        assert_eq!(body, serde_json::json!({"enabled": true, "frequency": "daily"}));
    }

    #[test]
    fn test_toggle_keeps_existing_frequency() {
        let schedule = ScrapingSchedule {
            frequency: Frequency::Weekly,
            days: Some(3),
            ..ScrapingSchedule::default()
        };
        let toggled = schedule.toggled(true);
        assert_eq!(toggled.frequency, Frequency::Weekly);
        assert_eq!(toggled.days, Some(3));
    }

    #[test]
    fn test_scraping_request_omits_unset_fields() {
        let request = ScrapingRequest {
            all: Some(true),
            days: Some(7),
            ..ScrapingRequest::default()
        };
        assert_eq!(
            serde_json::to_string(&request).expect("request should serialize"),
            r#"{"all":true,"days":7}"#
        );
    }

    #[test]
    fn test_task_type_field_rename() {
        let task: ScrapingTask = serde_json::from_str(
            r#"{"id": 4, "type": "scheduled", "status": "running", "started_at": "2024-03-15T10:30:00"}"#,
        )
        .expect("task should parse");
        assert_eq!(task.task_type, TaskType::Scheduled);
        assert_eq!(task.status, TaskStatus::Running);
        assert_eq!(task.total_articles, 0);
    }

    #[test]
    fn test_category_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&Category::Economie).expect("category should serialize");
        assert_eq!(json, r#""Économie""#);
        assert_eq!("sécurité".parse::<Category>(), Ok(Category::Securite));
        assert_eq!("Securite".parse::<Category>(), Ok(Category::Securite));
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!("Hourly".parse::<Frequency>(), Ok(Frequency::Hourly));
        assert!("monthly".parse::<Frequency>().is_err());
    }
}
