// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Streamed image pulls with per-layer progress aggregation and the
//! 10-day/forced freshness throttle (spec §4.C).

use crate::timestamps::PullTimestampStore;
use clara_core::{is_pull_fresh, Clock, LayerProgress, PullProgressEvent};
use clara_engine::{EngineError, EngineHandle};
use futures_util::stream::{BoxStream, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, Clone)]
pub enum PullError {
    #[error("engine error while pulling {image_ref}: {source}")]
    Engine {
        image_ref: String,
        #[source]
        source: EngineError,
    },
}

pub struct Puller<C: Clock = clara_core::SystemClock> {
    engine: Arc<dyn EngineHandle>,
    timestamps: Arc<dyn PullTimestampStore>,
    clock: C,
}

impl<C: Clock> Puller<C> {
    pub fn new(engine: Arc<dyn EngineHandle>, timestamps: Arc<dyn PullTimestampStore>, clock: C) -> Self {
        Self { engine, timestamps, clock }
    }

    /// Individual-image "should pull" rule: pull if age ≥ 10 days or forced.
    pub async fn should_pull(&self, image_ref: &str, force: bool) -> bool {
        let last = self.timestamps.last_pulled_at_ms(image_ref).await;
        !is_pull_fresh(last, self.clock.epoch_ms(), force)
    }

    /// Streams normalized progress events for a pull, aggregating per-layer
    /// current/total into an overall percentage. Records `last_pulled_at` on
    /// successful completion of the underlying stream.
    pub async fn pull_stream(
        &self,
        image_ref: &str,
    ) -> Result<BoxStream<'static, Result<PullProgressEvent, PullError>>, PullError> {
        let is_first_run = self.timestamps.last_pulled_at_ms(image_ref).await.is_none();
        let raw = self.engine.pull_image(image_ref).await.map_err(|source| PullError::Engine {
            image_ref: image_ref.to_string(),
            source,
        })?;

        let image_ref = image_ref.to_string();
        let timestamps = self.timestamps.clone();
        let now_ms = self.clock.epoch_ms();

        let stream = async_stream::stream! {
            let mut layers: HashMap<String, LayerProgress> = HashMap::new();
            let mut raw = raw;
            let mut first = is_first_run;

            while let Some(event) = raw.next().await {
                match event {
                    Ok(pull_event) => {
                        let entry = layers.entry(pull_event.layer_id.clone()).or_default();
                        if let Some(total) = pull_event.total {
                            entry.total = total;
                        }
                        entry.current = pull_event.current;

                        let (sum_current, sum_total): (u64, u64) = layers
                            .values()
                            .fold((0, 0), |(c, t), layer| (c + layer.current, t + layer.total));
                        let percentage = if sum_total > 0 {
                            (sum_current as f32 / sum_total as f32) * 100.0
                        } else {
                            0.0
                        };

                        let mut status_text = pull_event.status.clone();
                        if first {
                            status_text = format!("{status_text} (first pull)");
                            first = false;
                        }

                        yield Ok(PullProgressEvent { image_ref: image_ref.clone(), status_text, percentage });
                    }
                    Err(source) => {
                        yield Err(PullError::Engine { image_ref: image_ref.clone(), source });
                        return;
                    }
                }
            }

            timestamps.record_pulled(&image_ref, now_ms).await;
            info!(%image_ref, "pull completed");
        };

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
#[path = "puller_tests.rs"]
mod tests;
