//! Island generation on a worker thread.
//!
//! Requests go to a single worker over a channel. Submitting a new request
//! supersedes the previous one: its token is tripped so it stops at the next
//! stage boundary, and any result it still delivers is discarded.

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use atoll_config::GeneratorSettings;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use glam::Vec3;

use crate::cancel::{CancelToken, RunSupervisor};
use crate::error::GenerationError;
use crate::generator::{Host, Island, IslandGenerator};
use crate::headless::{SceneRecorder, TileLibrary};

struct Job {
    run: u64,
    settings: GeneratorSettings,
    force_new_seed: bool,
    cancel: CancelToken,
}

/// A finished run together with the scene it built.
#[derive(Debug)]
pub struct FinishedRun {
    /// Submission number, starting at 1.
    pub run: u64,
    pub result: Result<Island, GenerationError>,
    pub tiles: TileLibrary,
    pub decorations: SceneRecorder,
}

fn run_job(job: Job) -> FinishedRun {
    let mut tiles = TileLibrary::standard(Vec3::from_array(job.settings.tile_scale));
    let mut decorations = SceneRecorder::new();
    let result = {
        let mut host = Host::new()
            .with_tiles(&mut tiles)
            .with_decorations(&mut decorations)
            .with_cancel(job.cancel);
        IslandGenerator::new(job.settings).generate(job.force_new_seed, &mut host)
    };
    FinishedRun {
        run: job.run,
        result,
        tiles,
        decorations,
    }
}

/// Runs generations off the calling thread, keeping only the newest.
pub struct BackgroundGenerator {
    jobs: Option<Sender<Job>>,
    results: Receiver<FinishedRun>,
    supervisor: RunSupervisor,
    latest: u64,
    worker: Option<JoinHandle<()>>,
}

impl BackgroundGenerator {
    /// Spawn the worker thread.
    pub fn new() -> std::io::Result<Self> {
        let (job_sender, job_receiver) = unbounded::<Job>();
        let (result_sender, results) = unbounded::<FinishedRun>();

        let worker = std::thread::Builder::new()
            .name("island-gen-worker".into())
            .spawn(move || {
                while let Ok(job) = job_receiver.recv() {
                    if job.cancel.is_cancelled() {
                        tracing::debug!(run = job.run, "skipping superseded run");
                        continue;
                    }
                    let cancel = job.cancel.clone();
                    let finished = run_job(job);
                    if cancel.is_cancelled() {
                        continue;
                    }
                    if result_sender.send(finished).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            jobs: Some(job_sender),
            results,
            supervisor: RunSupervisor::new(),
            latest: 0,
            worker: Some(worker),
        })
    }

    /// Queue a run, superseding any run still pending. Returns its number.
    pub fn submit(&mut self, settings: GeneratorSettings, force_new_seed: bool) -> u64 {
        let cancel = self.supervisor.begin();
        self.latest = self.supervisor.runs();
        let job = Job {
            run: self.latest,
            settings,
            force_new_seed,
            cancel,
        };
        let sent = self.jobs.as_ref().is_some_and(|jobs| jobs.send(job).is_ok());
        if !sent {
            tracing::error!(run = self.latest, "generation worker is gone");
        }
        self.latest
    }

    /// Cancel the pending run, if any.
    pub fn cancel(&mut self) {
        self.supervisor.cancel_current();
    }

    /// Number of the newest submitted run, 0 before the first.
    pub fn latest_run(&self) -> u64 {
        self.latest
    }

    /// Take the newest run's result if it has arrived. Stale results are
    /// dropped.
    pub fn poll(&mut self) -> Option<FinishedRun> {
        let mut newest = None;
        while let Ok(finished) = self.results.try_recv() {
            if finished.run == self.latest {
                newest = Some(finished);
            }
        }
        newest
    }

    /// Block until the newest run's result arrives or `timeout` passes.
    pub fn wait(&mut self, timeout: Duration) -> Option<FinishedRun> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(remaining) {
                Ok(finished) if finished.run == self.latest => return Some(finished),
                Ok(stale) => {
                    tracing::debug!(run = stale.run, latest = self.latest, "discarding stale run");
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

impl Drop for BackgroundGenerator {
    fn drop(&mut self) {
        self.supervisor.cancel_current();
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
