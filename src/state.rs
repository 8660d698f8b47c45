use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::core::generator::TitleGenerator;
use crate::core::scheduler::ScheduledTask;
use crate::settings::Settings;
use crate::types::{GeneratedTitle, SessionSnapshot};

pub struct AppState {
    pub settings: Settings,
    pub generator: TitleGenerator,
    pub rng: StdRng,
    pub topic: String,
    pub titles: Vec<GeneratedTitle>,
    pub loading: bool,
    pub copied: Option<usize>,
    pub copy_seq: u64,
    pub pending_request: Option<String>,
    pub pending_generation: Option<ScheduledTask>,
    pub copied_reset: Option<ScheduledTask>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, String> {
        let generator = TitleGenerator::from_settings(&settings.generation)?;
        let rng = match settings.generation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            settings,
            generator,
            rng,
            topic: String::new(),
            titles: Vec::new(),
            loading: false,
            copied: None,
            copy_seq: 0,
            pending_request: None,
            pending_generation: None,
            copied_reset: None,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            topic: self.topic.clone(),
            titles: self.titles.clone(),
            loading: self.loading,
            copied: self.copied,
        }
    }

    /// Cancels every scheduled task owned by the session.
    pub fn cancel_timers(&mut self) {
        if let Some(mut task) = self.pending_generation.take() {
            task.cancel();
        }
        if let Some(mut task) = self.copied_reset.take() {
            task.cancel();
        }
        self.pending_request = None;
        self.loading = false;
        // Invalidate a copy that is between its event and arming its reset timer.
        self.copy_seq += 1;
    }
}
