use std::time::Duration;

use anyhow::{bail, Result};
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

use scrollstage_core::progress::{ScrollDirection, ScrollProgressState, ThresholdCrossing};
use scrollstage_core::{
    AppConfig, Clock, FrameControl, FrameLoop, ManualClock, MonotonicClock, ScrollProgressModel,
};

/// What to trace
#[derive(Debug, Clone, Copy)]
pub struct ProgressRequest {
    pub document_height: f64,
    pub viewport_height: f64,
    pub offset: f64,
    pub frames: u32,
    pub every: u32,
    pub json: bool,
}

impl ProgressRequest {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("document height", self.document_height),
            ("viewport height", self.viewport_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("{} must be a non-negative number, got {}", name, value);
            }
        }
        if !self.offset.is_finite() {
            bail!("offset must be a finite number");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ProgressSample {
    frame: u32,
    at_ms: u64,
    #[serde(flatten)]
    state: ScrollProgressState,
    crossings: Vec<ThresholdCrossing>,
}

/// Collects or prints the frames worth showing
struct Tracer {
    every: u32,
    json: bool,
    samples: Vec<ProgressSample>,
}

impl Tracer {
    fn new(every: u32, json: bool) -> Self {
        Self {
            every: every.max(1),
            json,
            samples: Vec::new(),
        }
    }

    /// Tick the model once; returns true once it has settled
    fn record<C: Clock>(&mut self, frame: u32, at: Duration, model: &mut ScrollProgressModel<C>) -> bool {
        model.tick();
        let crossings = model.take_crossings();
        let settled = model.is_settled();

        if crossings.is_empty() && frame % self.every != 0 && !settled {
            return settled;
        }

        let sample = ProgressSample {
            frame,
            at_ms: at.as_millis() as u64,
            state: model.state(),
            crossings,
        };
        if self.json {
            self.samples.push(sample);
        } else {
            print_sample(&sample, settled);
        }
        settled
    }

    fn finish(self) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&self.samples)?);
        }
        Ok(())
    }
}

fn print_sample(sample: &ProgressSample, settled: bool) {
    let arrow = match sample.state.direction {
        ScrollDirection::Down => "↓",
        ScrollDirection::Up => "↑",
        ScrollDirection::None => " ",
    };
    let mut line = format!(
        "frame {:>5} | {:>6} ms | raw {:.4} | display {:.4} {}",
        sample.frame, sample.at_ms, sample.state.raw_progress, sample.state.display_progress, arrow
    );
    for crossing in &sample.crossings {
        let verb = if crossing.entered { "entered" } else { "left" };
        line.push_str(&format!(" [{} {}]", crossing.marker, verb));
    }
    if settled {
        line.push_str(" (settled)");
    }
    println!("{}", line);
}

fn prepare<C: Clock>(config: &AppConfig, request: &ProgressRequest, clock: C) -> Result<ScrollProgressModel<C>> {
    request.validate()?;
    let mut model = ScrollProgressModel::new(config.progress.clone(), clock)?;
    model.on_resize(request.viewport_height, request.document_height);
    model.on_scroll_signal(request.offset, request.viewport_height, request.document_height);
    Ok(model)
}

/// Simulated time: one frame per configured tick, as fast as possible
pub fn run(config: &AppConfig, request: ProgressRequest) -> Result<()> {
    let clock = ManualClock::new();
    let mut model = prepare(config, &request, clock.clone())?;
    let step = FrameLoop::from_tick_rate(config.ui.tick_rate_ms).period();

    let mut tracer = Tracer::new(request.every, request.json);
    for frame in 1..=request.frames {
        clock.advance(step);
        if tracer.record(frame, clock.now(), &mut model) {
            break;
        }
    }
    tracer.finish()
}

/// Wall-clock frames until settled, the frame limit, or Ctrl+C
pub async fn run_realtime(config: &AppConfig, request: ProgressRequest) -> Result<()> {
    let clock = MonotonicClock::new();
    let mut model = prepare(config, &request, clock)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let mut tracer = Tracer::new(request.every, request.json);
    let limit = request.frames as u64;
    let frames = FrameLoop::from_tick_rate(config.ui.tick_rate_ms)
        .run(
            |frame| {
                let settled = tracer.record(frame as u32, clock.now(), &mut model);
                if settled || frame >= limit {
                    FrameControl::Stop
                } else {
                    FrameControl::Continue
                }
            },
            shutdown_rx,
        )
        .await;

    info!(frames, "Realtime trace finished");
    tracer.finish()
}
