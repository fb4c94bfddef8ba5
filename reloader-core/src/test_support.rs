//! Test doubles for engine and rollback tests

use async_trait::async_trait;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

use crate::context::Context;
use crate::domain::container::{ContainerHandle, ContainerSpec, ExecOutput};
use crate::domain::image::{ImageReference, ImageSummary};
use crate::error::StepError;
use crate::runtime::{ContainerRuntime, RuntimeError};
use crate::step::Step;

/// Runtime that refuses every operation; engine tests never reach it
pub struct NullRuntime;

fn unsupported() -> RuntimeError {
    RuntimeError::NotFound("null runtime".to_string())
}

#[async_trait]
impl ContainerRuntime for NullRuntime {
    async fn list_images(&self, _name: &str) -> Result<Vec<ImageSummary>, RuntimeError> {
        Err(unsupported())
    }

    async fn pull_image(&self, _image: &ImageReference) -> Result<(), RuntimeError> {
        Err(unsupported())
    }

    async fn remove_image(&self, _image: &str) -> Result<(), RuntimeError> {
        Err(unsupported())
    }

    async fn list_containers(&self, _label: &str) -> Result<Vec<ContainerHandle>, RuntimeError> {
        Err(unsupported())
    }

    async fn create_container(
        &self,
        _spec: &ContainerSpec,
    ) -> Result<ContainerHandle, RuntimeError> {
        Err(unsupported())
    }

    async fn start_container(&self, _container: &ContainerHandle) -> Result<(), RuntimeError> {
        Err(unsupported())
    }

    async fn remove_container(&self, _container: &ContainerHandle) -> Result<(), RuntimeError> {
        Err(unsupported())
    }

    async fn exec(
        &self,
        _container: &ContainerHandle,
        _command: &[String],
    ) -> Result<ExecOutput, RuntimeError> {
        Err(unsupported())
    }
}

pub fn context() -> Context {
    context_with_id("test-run")
}

pub fn context_with_id(correlation_id: &str) -> Context {
    Context::new(Arc::new(NullRuntime), correlation_id)
}

/// Shared, ordered record of step invocations
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Step that writes `do:<name>` and `undo:<name>` into a journal
pub struct Recorder {
    name: String,
    journal: Journal,
    fail_execute: bool,
    fail_compensate: bool,
    skip: bool,
    delay: Option<Duration>,
}

impl Recorder {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: journal.clone(),
            fail_execute: false,
            fail_compensate: false,
            skip: false,
            delay: None,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail_execute = true;
        self
    }

    pub fn failing_compensation(mut self) -> Self {
        self.fail_compensate = true;
        self
    }

    pub fn skipping(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn boxed(self) -> Box<dyn Step> {
        Box::new(self)
    }
}

#[async_trait]
impl Step for Recorder {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &mut Context) -> Result<(), StepError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.journal.record(format!("do:{}", self.name));
        if self.fail_execute {
            return Err(StepError::Other(format!("{} is broken", self.name)));
        }
        if self.skip {
            ctx.skip_remaining();
        }
        Ok(())
    }

    async fn compensate(&self, _ctx: &mut Context) -> Result<(), StepError> {
        self.journal.record(format!("undo:{}", self.name));
        if self.fail_compensate {
            return Err(StepError::Other(format!("{} cannot be undone", self.name)));
        }
        Ok(())
    }
}

/// One tracing event as seen by `EventCapture`
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub message: String,
    /// The event's own `correlation_id` field
    pub correlation_id: Option<String>,
    /// `correlation_id` of the enclosing `pipeline_run` span, if any
    pub run_span: Option<String>,
}

/// Layer recording every event together with its enclosing run span
#[derive(Clone, Default)]
pub struct EventCapture(Arc<Mutex<Vec<CapturedEvent>>>);

struct RunSpan(String);

#[derive(Default)]
struct Fields {
    message: Option<String>,
    correlation_id: Option<String>,
}

impl Visit for Fields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = Some(format!("{:?}", value)),
            "correlation_id" => self.correlation_id = Some(format!("{:?}", value)),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            "correlation_id" => self.correlation_id = Some(value.to_string()),
            _ => {}
        }
    }
}

impl EventCapture {
    /// Routes events of the current thread into this capture until the guard drops
    pub fn install(&self) -> DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn events_of(&self, correlation_id: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|event| {
                event.correlation_id.as_deref() == Some(correlation_id)
                    || event.run_span.as_deref() == Some(correlation_id)
            })
            .collect()
    }
}

impl<S> Layer<S> for EventCapture
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: LayerContext<'_, S>) {
        if attrs.metadata().name() != "pipeline_run" {
            return;
        }
        let mut fields = Fields::default();
        attrs.record(&mut fields);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut()
                .insert(RunSpan(fields.correlation_id.unwrap_or_default()));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: LayerContext<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);

        let run_span = ctx.event_scope(event).and_then(|scope| {
            scope
                .from_root()
                .find_map(|span| span.extensions().get::<RunSpan>().map(|run| run.0.clone()))
        });

        self.0.lock().unwrap().push(CapturedEvent {
            message: fields.message.unwrap_or_default(),
            correlation_id: fields.correlation_id,
            run_span,
        });
    }
}
