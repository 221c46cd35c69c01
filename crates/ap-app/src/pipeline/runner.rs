use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ap_core::pipeline::{
    PipelineError, ProcessingOutcome, ProgressEvent, RunReport, RunState, RunSummary,
};
use ap_core::ports::{
    CollaboratorFactoryPort, ContentGeneratorPort, ProgressSinkPort, PublishRequest,
    PublisherPort,
};
use ap_core::project::{fill_prompt, slugify, ProjectRecord};

/// Drives one project's keywords through generation and publishing, one at a time.
///
/// A pipeline runs once: `Idle -> Running -> Completed | Cancelled`.
pub struct Pipeline {
    project: ProjectRecord,
    generator: Arc<dyn ContentGeneratorPort>,
    publisher: Arc<dyn PublisherPort>,
    interval: Duration,
    state: RunState,
}

impl Pipeline {
    pub fn new(
        project: ProjectRecord,
        generator: Arc<dyn ContentGeneratorPort>,
        publisher: Arc<dyn PublisherPort>,
        interval: Duration,
    ) -> Self {
        Self {
            project,
            generator,
            publisher,
            interval,
            state: RunState::Idle,
        }
    }

    /// Bind the project's collaborators through `factory`.
    pub fn build(
        project: ProjectRecord,
        factory: &dyn CollaboratorFactoryPort,
        interval: Duration,
    ) -> Result<Self, PipelineError> {
        let generator = factory.generator(&project)?;
        let publisher = factory.publisher(&project)?;
        Ok(Self::new(project, generator, publisher, interval))
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn project(&self) -> &ProjectRecord {
        &self.project
    }

    fn transition(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal run transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "Run state transition");
        self.state = next;
    }

    /// Process every keyword in order and return one outcome per attempted keyword.
    ///
    /// `cancel` is honoured between keywords only; a call in flight always
    /// finishes. The inter-keyword pause ends early on cancellation.
    pub async fn run(
        &mut self,
        sink: &dyn ProgressSinkPort,
        cancel: &CancellationToken,
    ) -> RunReport {
        self.transition(RunState::Running);

        let keywords = self.project.keywords.clone();
        let total = keywords.len();
        let mut outcomes = Vec::with_capacity(total);
        info!(project = %self.project.name, total, "Starting processing of keywords");

        for (index, keyword) in keywords.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(processed = index, total, "Run cancelled");
                self.transition(RunState::Cancelled);
                break;
            }

            sink.on_progress(&ProgressEvent::keyword(index, total, keyword));

            let outcome = self.process_keyword(keyword).await;
            if outcome.success {
                info!(keyword = %keyword, post_id = ?outcome.published_post_id, "Keyword published");
            } else {
                warn!(
                    keyword = %keyword,
                    error = outcome.error_message.as_deref().unwrap_or_default(),
                    "Keyword failed"
                );
            }
            sink.on_outcome(index, &outcome);
            outcomes.push(outcome);

            if index + 1 < total {
                self.pause(cancel).await;
            }
        }

        if self.state == RunState::Running {
            self.transition(RunState::Completed);
            sink.on_progress(&ProgressEvent::complete(total));
        }

        let summary = RunSummary::from_outcomes(total, &outcomes);
        info!(
            state = %self.state,
            succeeded = summary.succeeded,
            failed = summary.failed,
            total = summary.total,
            "Processing finished"
        );

        RunReport {
            project_id: self.project.id.clone(),
            state: self.state,
            outcomes,
            summary,
            error: None,
        }
    }

    async fn pause(&self, cancel: &CancellationToken) {
        if self.interval.is_zero() {
            return;
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => debug!("Pause interrupted by cancellation"),
            _ = tokio::time::sleep(self.interval) => {}
        }
    }

    /// Generate, slug, publish. Never fails; failures become outcomes.
    pub async fn process_keyword(&self, keyword: &str) -> ProcessingOutcome {
        let started = Instant::now();
        let elapsed = || started.elapsed().as_secs_f64();

        let prompt = fill_prompt(&self.project.prompt_template, keyword);
        let article = match self.generator.generate(&prompt).await {
            Ok(article) => article,
            Err(err) => return ProcessingOutcome::failed(keyword, "", err.to_string(), elapsed()),
        };

        let request = PublishRequest {
            title: article.title,
            body: article.body,
            slug: slugify(keyword),
            category_id: self.project.category_id,
            status: self.project.post_status,
        };

        match self.publisher.publish(&request).await {
            Ok(post) => ProcessingOutcome::published(
                keyword,
                request.title,
                post.post_id,
                post.post_url,
                elapsed(),
            ),
            Err(err) => ProcessingOutcome::failed(keyword, request.title, err.to_string(), elapsed()),
        }
    }
}
