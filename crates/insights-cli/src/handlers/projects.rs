use anyhow::Result;
use insights_runtime::Error;

use crate::context::ExecutionContext;
use crate::views::ProjectsView;

pub fn handle(ctx: &ExecutionContext) -> Result<()> {
    let projects = ctx.store().list_projects()?;
    if projects.is_empty() {
        return Err(Error::EmptyCache("run extraction first (`insights run`)".to_string()).into());
    }

    print!("{}", ProjectsView { projects: &projects });
    Ok(())
}
