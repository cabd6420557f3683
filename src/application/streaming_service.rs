// Streaming dashboard service - progressive loading, one event per source
use crate::application::business_metrics::BusinessData;
use crate::application::dashboard_service::{build_summary, DashboardService};
use crate::domain::metric::MetricCategory;
use crate::domain::session::Session;
use crate::domain::source::{SourceKey, SourceStatus};
use crate::domain::summary::DashboardSummary;
use chrono::NaiveDate;
use serde::Serialize;
use std::time::Instant;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    Skeleton {
        sources: Vec<SourceKey>,
        categories: Vec<MetricCategory>,
    },
    SourceLoaded {
        status: SourceStatus,
    },
    Summary {
        summary: DashboardSummary,
    },
    Complete {
        total_sources: usize,
        duration_ms: i64,
    },
}

#[derive(Clone)]
pub struct StreamingDashboardService {
    dashboard: DashboardService,
}

impl StreamingDashboardService {
    pub fn new(dashboard: DashboardService) -> Self {
        Self { dashboard }
    }

    pub async fn stream_dashboard(&self, session: Session, as_of: NaiveDate) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(100);
        let start_time = Instant::now();

        // 1. Skeleton goes out before any fetch starts
        let sources: Vec<SourceKey> = self.dashboard.sources().iter().map(|s| s.key).collect();
        let skeleton = StreamMessage::Skeleton {
            sources: sources.clone(),
            categories: MetricCategory::ALL.to_vec(),
        };
        let _ = tx.send(skeleton).await;

        // 2. One task per source, each reporting as soon as it finishes
        let mut handles = Vec::with_capacity(sources.len());
        for source in self.dashboard.sources().iter().cloned() {
            let tx = tx.clone();
            let dashboard = self.dashboard.clone();
            let session = session.clone();

            handles.push(tokio::spawn(async move {
                let (table, status) = dashboard.load_source(&session, &source, as_of).await;
                let _ = tx
                    .send(StreamMessage::SourceLoaded {
                        status: status.clone(),
                    })
                    .await;
                (source.key, table, status)
            }));
        }

        // 3. Summary and completion once every source is in
        tokio::spawn(async move {
            let mut data = BusinessData::new();
            let mut statuses = Vec::with_capacity(handles.len());

            for result in futures::future::join_all(handles).await {
                match result {
                    Ok((key, table, status)) => {
                        if let Some(table) = table {
                            data.insert(key, table);
                        }
                        statuses.push(status);
                    }
                    Err(e) => tracing::error!("Source task failed: {}", e),
                }
            }

            let total_sources = statuses.len();
            let summary = build_summary(&data, statuses, as_of);
            let _ = tx.send(StreamMessage::Summary { summary }).await;

            let duration_ms = start_time.elapsed().as_millis() as i64;
            tracing::debug!("Dashboard stream complete in {}ms", duration_ms);
            let _ = tx
                .send(StreamMessage::Complete {
                    total_sources,
                    duration_ms,
                })
                .await;
        });

        rx
    }
}
