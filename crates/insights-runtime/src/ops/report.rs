use chrono::{DateTime, Utc};
use insights_core::project_slug;
use insights_engine::{ReportInput, compute_aggregate_stats, compute_temporal_stats, strip_code_fence};
use insights_types::{Facet, file_stamp};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::inference::InferenceBackend;
use crate::Result;

/// Stable name that always points at the newest report
pub const LATEST_REPORT_NAME: &str = "report_latest.html";

/// Builds the report prompt from cached facets
pub struct ReportService<'a> {
    report_prompt: &'a str,
}

/// A rendered report prompt, ready for the single report inference call
#[derive(Debug, Clone)]
pub struct PreparedReport {
    input: String,
    slug: Option<String>,
    sessions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub path: PathBuf,
    pub latest: PathBuf,
    pub bytes: usize,
}

impl<'a> ReportService<'a> {
    pub fn new(report_prompt: &'a str) -> Self {
        Self { report_prompt }
    }

    /// Aggregate the facets and render the report prompt.
    ///
    /// `project` marks the facets as filtered to one project: the prompt gets a
    /// single-project note and the file name carries the project slug.
    pub fn prepare(&self, facets: &[Facet], project: Option<&str>) -> Result<PreparedReport> {
        let stats = compute_aggregate_stats(facets);
        let temporal = compute_temporal_stats(facets);

        let input = ReportInput {
            report_prompt: self.report_prompt,
            project_filtered: project.is_some(),
            stats: &stats,
            temporal: &temporal,
            facets,
        }
        .render()
        .map_err(io::Error::from)?;

        Ok(PreparedReport {
            input,
            slug: project.map(project_slug),
            sessions: facets.len(),
        })
    }
}

impl PreparedReport {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_chars(&self) -> usize {
        self.input.chars().count()
    }

    pub fn sessions(&self) -> usize {
        self.sessions
    }

    /// `report_<slug>_<stamp>.html`, or `report_<stamp>.html` without a project
    pub fn file_name(&self, now: DateTime<Utc>) -> String {
        let stamp = file_stamp(now);
        match &self.slug {
            Some(slug) => format!("report_{}_{}.html", slug, stamp),
            None => format!("report_{}.html", stamp),
        }
    }

    /// Call the backend once, write the report and repoint the latest alias.
    ///
    /// There is no retry: a failed call is returned to the caller and nothing is written.
    pub fn generate<B: InferenceBackend>(
        &self,
        backend: &B,
        output_dir: &Path,
        now: DateTime<Utc>,
    ) -> Result<ReportArtifact> {
        let envelope = backend.invoke(&self.input)?;
        let html = strip_code_fence(&envelope.response);

        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(self.file_name(now));
        fs::write(&path, html)?;
        let latest = update_latest_alias(output_dir, &path)?;

        tracing::info!(path = %path.display(), bytes = html.len(), "report written");
        Ok(ReportArtifact {
            path,
            latest,
            bytes: html.len(),
        })
    }
}

/// Point `<output_dir>/report_latest.html` at `report`.
///
/// On unix this is a relative symlink swapped in with a rename, so readers
/// never see the alias missing. Elsewhere the report is copied.
pub fn update_latest_alias(output_dir: &Path, report: &Path) -> Result<PathBuf> {
    let latest = output_dir.join(LATEST_REPORT_NAME);

    #[cfg(unix)]
    {
        let target = report.file_name().map(PathBuf::from).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "report path has no file name")
        })?;
        let staging = output_dir.join(format!(".{}.tmp", LATEST_REPORT_NAME));
        if fs::symlink_metadata(&staging).is_ok() {
            fs::remove_file(&staging)?;
        }
        std::os::unix::fs::symlink(&target, &staging)?;
        fs::rename(&staging, &latest)?;
    }

    #[cfg(not(unix))]
    {
        fs::copy(report, &latest)?;
    }

    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{Envelope, InferenceError};
    use chrono::TimeZone;
    use tempfile::TempDir;

    struct Canned(std::result::Result<&'static str, ()>);

    impl InferenceBackend for Canned {
        fn model(&self) -> &str {
            "canned"
        }

        fn invoke(&self, _prompt: &str) -> std::result::Result<Envelope, InferenceError> {
            self.0
                .map(Envelope::new)
                .map_err(|_| InferenceError::EmptyOutput)
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 12, 9, 30, 5).unwrap()
    }

    fn facets() -> Vec<Facet> {
        let mut facet = Facet::new("s1");
        facet.project = Some("-Users-me-code-app".to_string());
        facet.outcome = Some("fully_achieved".to_string());
        facet.start_timestamp = Some("2024-02-12T09:00:00Z".to_string());
        vec![facet]
    }

    #[test]
    fn test_file_names() {
        let service = ReportService::new("REPORT");
        let plain = service.prepare(&facets(), None).unwrap();
        let scoped = service
            .prepare(&facets(), Some("Papers/Sandbagging Detection"))
            .unwrap();

        assert_eq!(plain.file_name(now()), "report_20240212_093005.html");
        assert_eq!(
            scoped.file_name(now()),
            "report_papers-sandbagging-detection_20240212_093005.html"
        );
        assert!(scoped.input().contains("NOTE: These facets are filtered"));
        assert!(!plain.input().contains("NOTE:"));
        assert!(plain.input().contains("\"week\": \"2024-W07\""));
    }

    #[test]
    fn test_generate_strips_fence_and_points_latest() {
        let temp = TempDir::new().unwrap();
        let prepared = ReportService::new("REPORT").prepare(&facets(), None).unwrap();
        let backend = Canned(Ok("```html\n<!DOCTYPE html><p>hi</p>\n```"));

        let artifact = prepared.generate(&backend, temp.path(), now()).unwrap();

        assert_eq!(fs::read_to_string(&artifact.path).unwrap(), "<!DOCTYPE html><p>hi</p>");
        assert_eq!(
            fs::read_to_string(&artifact.latest).unwrap(),
            "<!DOCTYPE html><p>hi</p>"
        );
        assert_eq!(artifact.latest, temp.path().join(LATEST_REPORT_NAME));
    }

    #[test]
    fn test_failed_call_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let prepared = ReportService::new("REPORT").prepare(&facets(), None).unwrap();

        let err = prepared.generate(&Canned(Err(())), temp.path(), now()).unwrap_err();

        assert!(matches!(err, crate::Error::Inference(InferenceError::EmptyOutput)));
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_latest_alias_is_repointed() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("report_1.html");
        let second = temp.path().join("report_2.html");
        fs::write(&first, "one").unwrap();
        fs::write(&second, "two").unwrap();

        update_latest_alias(temp.path(), &first).unwrap();
        let latest = update_latest_alias(temp.path(), &second).unwrap();

        assert_eq!(fs::read_link(&latest).unwrap(), PathBuf::from("report_2.html"));
        assert_eq!(fs::read_to_string(&latest).unwrap(), "two");
    }
}
