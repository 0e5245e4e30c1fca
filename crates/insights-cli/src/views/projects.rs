use insights_index::ProjectSummary;
use std::fmt;

pub struct ProjectsView<'a> {
    pub projects: &'a [ProjectSummary],
}

impl fmt::Display for ProjectsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<40} {:>8}", "Project", "Sessions")?;
        writeln!(f, "{}", "-".repeat(50))?;
        for project in self.projects {
            writeln!(f, "{:<40} {:>8}", project.name, project.session_count)?;
        }
        Ok(())
    }
}
