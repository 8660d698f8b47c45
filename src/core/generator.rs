use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::catalog::{Template, CATALOG};
use crate::core::normalize;
use crate::settings::GenerationSettings;
use crate::types::GeneratedTitle;

pub const DEFAULT_TITLE_COUNT: usize = 5;

#[derive(Debug, Clone)]
pub struct TitleGenerator {
    catalog: &'static [Template],
    count: usize,
    collapse_spaces: bool,
}

impl Default for TitleGenerator {
    fn default() -> Self {
        Self {
            catalog: &CATALOG,
            count: DEFAULT_TITLE_COUNT,
            collapse_spaces: false,
        }
    }
}

impl TitleGenerator {
    pub fn new(catalog: &'static [Template], count: usize) -> Result<Self, String> {
        if catalog.is_empty() {
            return Err("Template catalog is empty".to_string());
        }
        if count == 0 {
            return Err("Title count must be at least 1".to_string());
        }
        if count > catalog.len() {
            return Err(format!(
                "Title count {count} exceeds the {} available templates",
                catalog.len()
            ));
        }
        Ok(Self {
            catalog,
            count,
            collapse_spaces: false,
        })
    }

    pub fn from_settings(settings: &GenerationSettings) -> Result<Self, String> {
        let generator = Self::new(&CATALOG, settings.title_count)?;
        Ok(generator.with_collapse_spaces(settings.collapse_spaces))
    }

    pub fn with_collapse_spaces(mut self, collapse_spaces: bool) -> Self {
        self.collapse_spaces = collapse_spaces;
        self
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Picks `count` distinct templates in random order and fills them with the normalized topic.
    ///
    /// Returns `None` without touching `rng` when the topic is blank.
    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        topic: &str,
        rng: &mut R,
    ) -> Option<Vec<GeneratedTitle>> {
        if normalize::is_blank(topic) {
            return None;
        }
        let topic = normalize::normalize_topic(topic, self.collapse_spaces);

        let mut order: Vec<usize> = (0..self.catalog.len()).collect();
        order.shuffle(rng);

        let titles = order
            .into_iter()
            .take(self.count)
            .map(|index| {
                let template = &self.catalog[index];
                GeneratedTitle {
                    text: template.apply(&topic),
                    template_index: index,
                    template_id: template.id.to_string(),
                }
            })
            .collect();
        Some(titles)
    }

    pub fn generate(&self, topic: &str) -> Option<Vec<GeneratedTitle>> {
        self.generate_with(topic, &mut rand::thread_rng())
    }
}

/// Five titles for `topic` from the built-in catalog, or `None` for a blank topic.
pub fn generate_titles(topic: &str) -> Option<Vec<String>> {
    TitleGenerator::default()
        .generate(topic)
        .map(|titles| titles.into_iter().map(|title| title.text).collect())
}
