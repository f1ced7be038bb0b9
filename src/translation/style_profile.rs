/*!
 * Loading of the style/terminology profile sent along with every chunk.
 *
 * A profile is assembled from two skill directories under a root:
 * - the base skill, `<root>/<base>-<lang>` or else `<root>/<base>`
 * - the subtitle extension, `<root>/<subtitle>-<lang>` or else `<root>/<subtitle>`
 *
 * Each directory contributes its `SKILL.md` and every Markdown file under `references/`.
 * The pipeline never looks inside the rendered text.
 */

use anyhow::{anyhow, Result};
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::StyleProfileConfig;
use crate::file_utils::FileManager;

/// One titled part of a profile
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSection {
    /// Heading shown above the content
    pub title: String,
    /// File content
    pub content: String,
    /// File the content was read from
    pub source: PathBuf,
}

/// A loaded style profile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleProfile {
    /// Sections in rendering order
    pub sections: Vec<ProfileSection>,
}

impl StyleProfile {
    /// An empty profile, rendered as an empty string
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Render as `# TITLE` sections separated by horizontal rules
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|s| format!("# {}\n\n{}", s.title, s.content))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }
}

/// Loads profiles from disk, caching them per language
#[derive(Debug)]
pub struct StyleProfileLoader {
    config: StyleProfileConfig,
    cache: HashMap<String, Arc<StyleProfile>>,
}

impl StyleProfileLoader {
    pub fn new(config: StyleProfileConfig) -> Self {
        Self {
            config,
            cache: HashMap::new(),
        }
    }

    /// Load the profile for a target language
    pub fn load(&mut self, target_language: &str) -> Result<Arc<StyleProfile>> {
        let language = target_language.trim().to_lowercase();
        if let Some(profile) = self.cache.get(&language) {
            debug!("Style profile for {} served from cache", language);
            return Ok(Arc::clone(profile));
        }

        info!("Loading style profile for {}", language.to_uppercase());

        let base_dir = self.resolve_dir(&self.config.base_skill, &language);
        let subtitle_dir = self.resolve_dir(&self.config.subtitle_skill, &language);

        let mut sections = Vec::new();
        if FileManager::dir_exists(&base_dir) {
            info!("Loading base skill: {}", base_dir.display());
            Self::load_skill_dir(&base_dir, "BASE TRANSLATION SKILL", &mut sections)?;
        }
        if FileManager::dir_exists(&subtitle_dir) {
            info!("Loading subtitle extension: {}", subtitle_dir.display());
            Self::load_skill_dir(&subtitle_dir, "SRT SUBTITLE EXTENSION", &mut sections)?;
        }

        if sections.is_empty() {
            return Err(anyhow!(
                "Style profile not found. Tried:\n  - {}\n  - {}",
                base_dir.display(),
                subtitle_dir.display()
            ));
        }

        info!("Loaded {} style profile files", sections.len());
        let profile = Arc::new(StyleProfile { sections });
        self.cache.insert(language, Arc::clone(&profile));
        Ok(profile)
    }

    /// Language-specific directory if present, else the generic one
    fn resolve_dir(&self, skill: &str, language: &str) -> PathBuf {
        let specific = self.config.root.join(format!("{}-{}", skill, language));
        if FileManager::dir_exists(&specific) {
            specific
        } else {
            self.config.root.join(skill)
        }
    }

    fn load_skill_dir(dir: &Path, skill_title: &str, sections: &mut Vec<ProfileSection>) -> Result<()> {
        let skill_file = dir.join("SKILL.md");
        if FileManager::file_exists(&skill_file) {
            sections.push(ProfileSection {
                title: skill_title.to_string(),
                content: FileManager::read_to_string(&skill_file)?,
                source: skill_file,
            });
        }

        let references = dir.join("references");
        if FileManager::dir_exists(&references) {
            for file in FileManager::find_files(&references, "md")? {
                let stem = file.file_stem().unwrap_or_default().to_string_lossy().to_string();
                debug!("  reference {}", file.display());
                sections.push(ProfileSection {
                    title: title_case(&stem),
                    content: FileManager::read_to_string(&file)?,
                    source: file,
                });
            }
        }

        Ok(())
    }
}

/// `brand-terminology_v2` -> `Brand Terminology V2`
fn title_case(stem: &str) -> String {
    stem.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
