use chrono::{Duration, Utc};
use insights_core::{demangle_project_name, facets_dir};
use insights_types::{Facet, SessionDescriptor};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::{Error, FacetFilter, ProjectSummary, Result};

const FACET_EXTENSION: &str = "json";

/// Directory of cached facets, one `<session_id>.json` per session
#[derive(Debug, Clone)]
pub struct FacetStore {
    dir: PathBuf,
}

impl FacetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `<output_dir>/facets`
    pub fn for_output_dir(output_dir: &Path) -> Self {
        Self::new(facets_dir(output_dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", session_id, FACET_EXTENSION))
    }

    /// Read the cached facet for a session, if one exists
    pub fn load(&self, session_id: &str) -> Result<Option<Facet>> {
        let path = self.path_for(session_id);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Whether the cached facet was produced from the descriptor's current file state.
    ///
    /// A missing, unreadable or corrupt entry is never fresh.
    pub fn is_fresh(&self, session: &SessionDescriptor) -> bool {
        match self.load(&session.session_id) {
            Ok(Some(facet)) => facet.is_fresh_for(session.mtime),
            Ok(None) => false,
            Err(err) => {
                tracing::debug!(
                    session_id = %session.session_id,
                    error = %err,
                    "corrupt cache entry, treating as stale"
                );
                false
            }
        }
    }

    /// Sessions that need (re)processing, in input order.
    ///
    /// With `force` every session is returned.
    pub fn filter_stale(&self, sessions: &[SessionDescriptor], force: bool) -> Vec<SessionDescriptor> {
        if force {
            return sessions.to_vec();
        }

        sessions
            .iter()
            .filter(|s| !self.is_fresh(s))
            .cloned()
            .collect()
    }

    /// Persist a facet, replacing any previous entry for the session
    pub fn save(&self, facet: &Facet) -> Result<PathBuf> {
        validate_session_id(&facet.session_id)?;
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(&facet.session_id);
        let json = serde_json::to_string_pretty(facet)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    /// Load every readable facet matching the filter, ordered by file name.
    ///
    /// Unreadable or unparseable entries are skipped.
    pub fn load_all(&self, filter: &FacetFilter) -> Result<Vec<Facet>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let cutoff = filter
            .since_days
            .map(|days| Utc::now() - Duration::days(days as i64));

        let mut facets = Vec::new();
        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().is_none_or(|e| e != FACET_EXTENSION)
            {
                continue;
            }

            let facet = match read_facet(path) {
                Ok(facet) => facet,
                Err(err) => {
                    tracing::debug!(path = %path.display(), error = %err, "skipping unreadable facet");
                    continue;
                }
            };

            if let Some(project) = &filter.project {
                if !facet.project.as_deref().unwrap_or("").contains(project.as_str()) {
                    continue;
                }
            }

            if let Some(cutoff) = cutoff {
                if let Some(started) = facet.started_at() {
                    if started.with_timezone(&Utc) < cutoff {
                        continue;
                    }
                }
            }

            facets.push(facet);
        }

        Ok(facets)
    }

    /// Cached projects with their session counts, most sessions first
    pub fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let facets = self.load_all(&FacetFilter::default())?;

        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        for facet in &facets {
            let project = facet.project_or_default().to_string();
            let count = counts.entry(project.clone()).or_insert(0);
            if *count == 0 {
                order.push(project);
            }
            *count += 1;
        }

        let mut projects: Vec<ProjectSummary> = order
            .into_iter()
            .map(|encoded| ProjectSummary {
                name: demangle_project_name(&encoded),
                session_count: counts.get(&encoded).copied().unwrap_or(0),
                encoded,
            })
            .collect();

        // Stable: ties keep first-seen order
        projects.sort_by(|a, b| b.session_count.cmp(&a.session_count));
        Ok(projects)
    }
}

fn read_facet(path: &Path) -> Result<Facet> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn validate_session_id(session_id: &str) -> Result<()> {
    if session_id.is_empty() {
        return Err(Error::Query("facet has an empty session_id".to_string()));
    }
    if session_id.contains(['/', '\\']) || session_id == "." || session_id == ".." {
        return Err(Error::Query(format!(
            "session_id '{}' is not a valid file name",
            session_id
        )));
    }
    Ok(())
}
