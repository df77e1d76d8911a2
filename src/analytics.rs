use std::sync::mpsc::{Receiver, TryRecvError};

use chrono::Utc;
use serde::Deserialize;

use crate::{
    api_client::{ApiClient, ApiError},
    log_util::log_debug,
};

/// The two analytics sources the backend analyzes a product against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Youtube,
    Reddit,
}

impl Source {
    pub fn label(self) -> &'static str {
        match self {
            Self::Youtube => "YouTube",
            Self::Reddit => "Reddit",
        }
    }

    pub fn table_path(self) -> &'static str {
        match self {
            Self::Youtube => "/youtubeTableData",
            Self::Reddit => "/redditTableData",
        }
    }

    pub fn word_cloud_path(self) -> &'static str {
        match self {
            Self::Youtube => "/getYoutubeWordcloud",
            Self::Reddit => "/getRedditWordCloud",
        }
    }

    pub fn bar_chart_path(self) -> &'static str {
        match self {
            Self::Youtube => "/getYoutubeBarGraphs",
            Self::Reddit => "/getRedditBarGraph",
        }
    }

    /// Noun for one row of this source's table, e.g. "Videos" in "Total Videos".
    pub fn record_noun(self) -> &'static str {
        match self {
            Self::Youtube => "Videos",
            Self::Reddit => "Posts",
        }
    }

    /// Header for the table's title column.
    pub fn title_column(self) -> &'static str {
        match self {
            Self::Youtube => "Video Title",
            Self::Reddit => "Post Title",
        }
    }

    /// Noun for the per-record metric column.
    pub fn metric_noun(self) -> &'static str {
        match self {
            Self::Youtube => "Views",
            Self::Reddit => "Score",
        }
    }

    /// Label for the highest-metric record in the summary strip.
    pub fn top_label(self) -> &'static str {
        match self {
            Self::Youtube => "Most Viewed",
            Self::Reddit => "Top Post",
        }
    }

    /// Display cap for titles in this source's table, where one applies.
    pub fn title_display_limit(self) -> Option<usize> {
        match self {
            Self::Youtube => None,
            Self::Reddit => Some(100),
        }
    }
}

/// One row of an analytics table: a content title, its source URL and the
/// engagement metric (view count or score).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsRecord {
    pub title: String,
    pub url: String,
    pub metric: i64,
}

/// The two chart images that accompany a record set, as backend-provided
/// image references (data URIs in practice).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    pub word_cloud: String,
    pub bar_chart: String,
}

/// Everything one analytics view needs, fetched in a single round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsBundle {
    pub records: Vec<AnalyticsRecord>,
    pub images: ImagePair,
}

#[derive(Debug, Deserialize)]
struct YoutubeTableResponse {
    youtube_titles: Vec<String>,
    youtube_urls: Vec<String>,
    youtube_views: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct RedditTableResponse {
    reddit_titles: Vec<String>,
    reddit_urls: Vec<String>,
    reddit_scores: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartImageResponse {
    image: String,
}

/// Zip the backend's parallel arrays into records, rejecting responses whose
/// arrays disagree in length.
fn zip_records(
    path: &str,
    titles: Vec<String>,
    urls: Vec<String>,
    metrics: Vec<i64>,
) -> Result<Vec<AnalyticsRecord>, ApiError> {
    if titles.len() != urls.len() || titles.len() != metrics.len() {
        return Err(ApiError::Malformed {
            path: path.to_string(),
            detail: format!(
                "parallel arrays disagree: {} titles, {} urls, {} metrics",
                titles.len(),
                urls.len(),
                metrics.len()
            ),
        });
    }
    Ok(titles
        .into_iter()
        .zip(urls)
        .zip(metrics)
        .map(|((title, url), metric)| AnalyticsRecord { title, url, metric })
        .collect())
}

async fn fetch_records(
    client: &ApiClient,
    source: Source,
) -> Result<Vec<AnalyticsRecord>, ApiError> {
    let path = source.table_path();
    match source {
        Source::Youtube => {
            let response: YoutubeTableResponse = client.get_json(path).await?;
            zip_records(
                path,
                response.youtube_titles,
                response.youtube_urls,
                response.youtube_views,
            )
        }
        Source::Reddit => {
            let response: RedditTableResponse = client.get_json(path).await?;
            zip_records(
                path,
                response.reddit_titles,
                response.reddit_urls,
                response.reddit_scores,
            )
        }
    }
}

async fn fetch_image(client: &ApiClient, path: &str) -> Result<String, ApiError> {
    let response: ChartImageResponse = client.get_json(path).await?;
    Ok(response.image)
}

/// Fetch the table and both chart images concurrently. All three requests run
/// to completion before the outcome is decided.
pub(crate) async fn fetch_bundle(
    client: &ApiClient,
    source: Source,
) -> Result<AnalyticsBundle, ApiError> {
    let (table, word_cloud, bar_chart) = tokio::join!(
        fetch_records(client, source),
        fetch_image(client, source.word_cloud_path()),
        fetch_image(client, source.bar_chart_path()),
    );
    combine_bundle(table, word_cloud, bar_chart)
}

/// Merge the three fetch outcomes. On multiple failures the table error wins,
/// then the word cloud, then the bar chart.
fn combine_bundle(
    table: Result<Vec<AnalyticsRecord>, ApiError>,
    word_cloud: Result<String, ApiError>,
    bar_chart: Result<String, ApiError>,
) -> Result<AnalyticsBundle, ApiError> {
    let records = table?;
    let word_cloud = word_cloud?;
    let bar_chart = bar_chart?;
    Ok(AnalyticsBundle {
        records,
        images: ImagePair {
            word_cloud,
            bar_chart,
        },
    })
}

/// Lifecycle of one analytics view's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Loaded {
        records: Vec<AnalyticsRecord>,
        images: ImagePair,
    },
    Failed {
        reason: String,
    },
}

/// The enlarged-image overlay. Opening while already open replaces the shown
/// image; there is no stacking.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open {
        image: String,
    },
}

impl ModalState {
    pub fn open(&mut self, image: impl Into<String>) {
        *self = Self::Open {
            image: image.into(),
        };
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

/// Outcome of one background fetch round, tagged with the round it belongs to.
#[derive(Debug)]
pub(crate) struct FetchMessage {
    pub(crate) round: u64,
    pub(crate) outcome: Result<AnalyticsBundle, ApiError>,
}

/// State for one analytics view (table, charts, modal, selection). Fetches are
/// identified by a monotonically increasing round number; results from stale
/// rounds are discarded.
#[derive(Debug)]
pub(crate) struct AnalyticsView {
    pub(crate) source: Source,
    pub(crate) state: ViewState,
    pub(crate) modal: ModalState,
    pub(crate) selected_row: Option<usize>,
    pub(crate) round: u64,
    pub(crate) receiver: Option<Receiver<FetchMessage>>,
    pub(crate) refreshed_at: Option<String>,
    pub(crate) loading_frame: usize,
}

impl AnalyticsView {
    pub(crate) fn new(source: Source) -> Self {
        Self {
            source,
            state: ViewState::Idle,
            modal: ModalState::Closed,
            selected_row: None,
            round: 0,
            receiver: None,
            refreshed_at: None,
            loading_frame: 0,
        }
    }

    /// Start a fresh fetch round and return its number. Any result still in
    /// flight from an earlier round becomes stale.
    pub(crate) fn begin_round(&mut self) -> u64 {
        self.round += 1;
        self.state = ViewState::Loading;
        self.modal.close();
        self.selected_row = None;
        self.loading_frame = 0;
        self.round
    }

    /// Drop this view's in-flight work and reset it to idle. Used when the
    /// user navigates away.
    pub(crate) fn deactivate(&mut self) {
        self.round += 1;
        self.receiver = None;
        self.state = ViewState::Idle;
        self.modal.close();
        self.selected_row = None;
    }

    /// Drain the fetch channel without blocking and fold any completed round
    /// into the view state.
    pub(crate) fn poll(&mut self) {
        enum Polled {
            Message(FetchMessage),
            Disconnected,
        }

        let polled = match self.receiver.as_ref() {
            Some(receiver) => match receiver.try_recv() {
                Ok(message) => Some(Polled::Message(message)),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(Polled::Disconnected),
            },
            None => None,
        };

        match polled {
            Some(Polled::Message(message)) => {
                self.receiver = None;
                self.apply_message(message);
            }
            Some(Polled::Disconnected) => {
                self.receiver = None;
                log_debug(&format!(
                    "AnalyticsView: {} fetch worker disconnected without a result",
                    self.source.label()
                ));
                if matches!(self.state, ViewState::Loading) {
                    self.state = ViewState::Failed {
                        reason: "background fetch worker disconnected".to_string(),
                    };
                }
            }
            None => {}
        }
    }

    /// Fold one fetch outcome into the view. Outcomes from superseded rounds
    /// are logged and dropped.
    pub(crate) fn apply_message(&mut self, message: FetchMessage) {
        if message.round != self.round {
            log_debug(&format!(
                "AnalyticsView: discarding stale {} fetch (round {}, current {})",
                self.source.label(),
                message.round,
                self.round
            ));
            return;
        }
        match message.outcome {
            Ok(bundle) if bundle.records.is_empty() => {
                log_debug(&format!(
                    "AnalyticsView: {} round {} returned no records",
                    self.source.label(),
                    message.round
                ));
                self.state = ViewState::Failed {
                    reason: "backend returned no records".to_string(),
                };
            }
            Ok(bundle) => {
                self.selected_row = Some(0);
                self.refreshed_at = Some(Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string());
                log_debug(&format!(
                    "AnalyticsView: {} round {} loaded {} records",
                    self.source.label(),
                    message.round,
                    bundle.records.len()
                ));
                self.state = ViewState::Loaded {
                    records: bundle.records,
                    images: bundle.images,
                };
            }
            Err(err) => {
                log_debug(&format!(
                    "AnalyticsView: {} round {} failed: {}",
                    self.source.label(),
                    message.round,
                    err
                ));
                self.state = ViewState::Failed {
                    reason: err.to_string(),
                };
            }
        }
    }

    pub(crate) fn tick(&mut self) {
        if matches!(self.state, ViewState::Loading) {
            self.loading_frame = (self.loading_frame + 1) % crate::LOADING_FRAMES.len();
        }
    }

    pub(crate) fn record_count(&self) -> usize {
        match &self.state {
            ViewState::Loaded { records, .. } => records.len(),
            _ => 0,
        }
    }

    pub(crate) fn selected_record(&self) -> Option<&AnalyticsRecord> {
        match &self.state {
            ViewState::Loaded { records, .. } => {
                self.selected_row.and_then(|index| records.get(index))
            }
            _ => None,
        }
    }

    pub(crate) fn select_next(&mut self) {
        let count = self.record_count();
        if count == 0 {
            return;
        }
        let next = match self.selected_row {
            Some(index) if index + 1 < count => index + 1,
            Some(_) => 0,
            None => 0,
        };
        self.selected_row = Some(next);
    }

    pub(crate) fn select_previous(&mut self) {
        let count = self.record_count();
        if count == 0 {
            return;
        }
        let previous = match self.selected_row {
            Some(0) | None => count - 1,
            Some(index) => index - 1,
        };
        self.selected_row = Some(previous);
    }
}

/// Short human description of a backend image reference for panels that cannot
/// draw pixels. Data URIs are summarized; anything else is shown verbatim.
pub(crate) fn describe_image_ref(image: &str) -> String {
    let Some(rest) = image.strip_prefix("data:") else {
        return image.to_string();
    };
    let media_type = match rest.split([';', ',']).next() {
        Some(media) if !media.is_empty() => media,
        _ => "unknown",
    };
    let encoded_len = rest.rsplit(',').next().map(str::len).unwrap_or(0);
    let decoded_bytes = encoded_len * 3 / 4;
    if decoded_bytes >= 1024 {
        format!(
            "{} data URI (~{:.1} KB decoded)",
            media_type,
            decoded_bytes as f64 / 1024.0
        )
    } else {
        format!("{} data URI (~{} B decoded)", media_type, decoded_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<AnalyticsRecord> {
        vec![
            AnalyticsRecord {
                title: "Review roundup".to_string(),
                url: "https://youtube.com/watch?v=a1".to_string(),
                metric: 120,
            },
            AnalyticsRecord {
                title: "Teardown".to_string(),
                url: "https://youtube.com/watch?v=b2".to_string(),
                metric: 450,
            },
        ]
    }

    fn sample_images() -> ImagePair {
        ImagePair {
            word_cloud: "data:image/png;base64,AAAA".to_string(),
            bar_chart: "data:image/png;base64,BBBB".to_string(),
        }
    }

    fn sample_bundle() -> AnalyticsBundle {
        AnalyticsBundle {
            records: sample_records(),
            images: sample_images(),
        }
    }

    fn status_error(path: &str) -> ApiError {
        ApiError::Status {
            path: path.to_string(),
            status: 500,
            body: "boom".to_string(),
        }
    }

    #[test]
    fn title_truncation_applies_to_reddit_only() {
        assert_eq!(Source::Youtube.title_display_limit(), None);
        assert_eq!(Source::Reddit.title_display_limit(), Some(100));
    }

    #[test]
    fn zip_records_pairs_up_matching_arrays() {
        let records = zip_records(
            "/youtubeTableData",
            vec!["A".to_string(), "B".to_string()],
            vec!["u1".to_string(), "u2".to_string()],
            vec![10, 20],
        )
        .expect("matching arrays");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title, "B");
        assert_eq!(records[1].url, "u2");
        assert_eq!(records[1].metric, 20);
    }

    #[test]
    fn zip_records_rejects_mismatched_arrays() {
        let err = zip_records(
            "/redditTableData",
            vec!["A".to_string(), "B".to_string()],
            vec!["u1".to_string()],
            vec![10, 20],
        )
        .expect_err("mismatched arrays");
        assert!(matches!(err, ApiError::Malformed { .. }));
        assert!(err.to_string().contains("parallel arrays disagree"));
    }

    #[test]
    fn combine_bundle_prefers_table_error() {
        let err = combine_bundle(
            Err(status_error("/youtubeTableData")),
            Err(status_error("/getYoutubeWordcloud")),
            Ok("img".to_string()),
        )
        .expect_err("table error wins");
        assert!(err.to_string().contains("/youtubeTableData"));
    }

    #[test]
    fn one_failed_image_fails_the_round() {
        let outcome = combine_bundle(
            Ok(sample_records()),
            Ok("wc".to_string()),
            Err(status_error("/getRedditBarGraph")),
        );
        let err = outcome.expect_err("bar chart failure fails the bundle");
        assert!(err.to_string().contains("/getRedditBarGraph"));
    }

    #[test]
    fn successful_round_loads_and_selects_first_row() {
        let mut view = AnalyticsView::new(Source::Youtube);
        let round = view.begin_round();
        assert_eq!(view.state, ViewState::Loading);
        view.apply_message(FetchMessage {
            round,
            outcome: Ok(sample_bundle()),
        });
        assert!(matches!(view.state, ViewState::Loaded { .. }));
        assert_eq!(view.selected_row, Some(0));
        assert!(view.refreshed_at.is_some());
    }

    #[test]
    fn failed_round_reports_reason() {
        let mut view = AnalyticsView::new(Source::Reddit);
        let round = view.begin_round();
        view.apply_message(FetchMessage {
            round,
            outcome: combine_bundle(
                Ok(sample_records()),
                Ok("wc".to_string()),
                Err(status_error("/getRedditBarGraph")),
            ),
        });
        match &view.state {
            ViewState::Failed { reason } => {
                assert!(reason.contains("/getRedditBarGraph"));
            }
            other => panic!("expected failed state, got {:?}", other),
        }
    }

    #[test]
    fn empty_record_set_is_a_failure() {
        let mut view = AnalyticsView::new(Source::Youtube);
        let round = view.begin_round();
        view.apply_message(FetchMessage {
            round,
            outcome: Ok(AnalyticsBundle {
                records: Vec::new(),
                images: sample_images(),
            }),
        });
        assert_eq!(
            view.state,
            ViewState::Failed {
                reason: "backend returned no records".to_string()
            }
        );
    }

    #[test]
    fn stale_round_results_are_discarded() {
        let mut view = AnalyticsView::new(Source::Reddit);
        let first_round = view.begin_round();
        let second_round = view.begin_round();
        assert_eq!(second_round, first_round + 1);
        view.apply_message(FetchMessage {
            round: first_round,
            outcome: Ok(sample_bundle()),
        });
        assert_eq!(view.state, ViewState::Loading);
        assert_eq!(view.selected_row, None);
    }

    #[test]
    fn deactivation_invalidates_in_flight_rounds() {
        let mut view = AnalyticsView::new(Source::Youtube);
        let round = view.begin_round();
        view.deactivate();
        assert_eq!(view.state, ViewState::Idle);
        view.apply_message(FetchMessage {
            round,
            outcome: Ok(sample_bundle()),
        });
        assert_eq!(view.state, ViewState::Idle);
    }

    #[test]
    fn repeated_rounds_over_same_data_converge() {
        let mut view = AnalyticsView::new(Source::Youtube);
        let round = view.begin_round();
        view.apply_message(FetchMessage {
            round,
            outcome: Ok(sample_bundle()),
        });
        let first_loaded = view.state.clone();

        let round = view.begin_round();
        assert_eq!(view.state, ViewState::Loading);
        view.apply_message(FetchMessage {
            round,
            outcome: Ok(sample_bundle()),
        });
        assert_eq!(view.state, first_loaded);
    }

    #[test]
    fn modal_reopen_replaces_then_close_ends_closed() {
        let mut modal = ModalState::default();
        assert!(!modal.is_open());
        modal.open("data:image/png;base64,AAAA");
        assert!(modal.is_open());
        modal.open("data:image/png;base64,AAAA");
        assert_eq!(
            modal,
            ModalState::Open {
                image: "data:image/png;base64,AAAA".to_string()
            }
        );
        modal.close();
        assert_eq!(modal, ModalState::Closed);
    }

    #[test]
    fn row_selection_wraps_both_directions() {
        let mut view = AnalyticsView::new(Source::Youtube);
        let round = view.begin_round();
        view.apply_message(FetchMessage {
            round,
            outcome: Ok(sample_bundle()),
        });
        assert_eq!(view.selected_row, Some(0));
        view.select_next();
        assert_eq!(view.selected_row, Some(1));
        view.select_next();
        assert_eq!(view.selected_row, Some(0));
        view.select_previous();
        assert_eq!(view.selected_row, Some(1));
        assert_eq!(view.selected_record().map(|r| r.title.as_str()), Some("Teardown"));
    }

    #[test]
    fn selection_is_inert_without_records() {
        let mut view = AnalyticsView::new(Source::Reddit);
        view.select_next();
        assert_eq!(view.selected_row, None);
        view.select_previous();
        assert_eq!(view.selected_row, None);
    }

    #[test]
    fn data_uris_are_summarized() {
        let described = describe_image_ref(&format!("data:image/png;base64,{}", "A".repeat(2048)));
        assert!(described.starts_with("image/png data URI"));
        assert!(described.contains("KB decoded"));
    }

    #[test]
    fn plain_references_pass_through() {
        assert_eq!(
            describe_image_ref("https://cdn.example.com/cloud.png"),
            "https://cdn.example.com/cloud.png"
        );
    }
}
