//! Detection
//!
//! Declares what this buildpack needs from the rest of the group and what it
//! can supply. The only conditional is whether `requirements.txt` exists;
//! its contents are never read here.

use crate::error::{PipLayersError, PipLayersResult};
use crate::plan::{Plan, Provided, Required};
use crate::{PYTHON, PYTHON_PACKAGES, REQUIREMENTS, REQUIREMENTS_FILE};
use std::path::Path;
use tracing::debug;

/// Result of running detection against an application root
#[derive(Debug, Clone, PartialEq)]
pub struct DetectOutcome {
    pub plan: Plan,
    pub pass: bool,
}

/// Inspect `app_root` and build the requires/provides plan.
///
/// Always passes so the host can merge this plan with the plans of the other
/// buildpacks in the group.
pub async fn detect(app_root: &Path) -> PipLayersResult<DetectOutcome> {
    let requirements_path = app_root.join(REQUIREMENTS_FILE);
    let has_requirements = tokio::fs::try_exists(&requirements_path)
        .await
        .map_err(|e| {
            PipLayersError::io(format!("checking {}", requirements_path.display()), e)
        })?;
    debug!(
        "{} present: {}",
        requirements_path.display(),
        has_requirements
    );

    let mut provides = vec![Provided::new(PYTHON_PACKAGES)];
    if has_requirements {
        provides.push(Provided::new(REQUIREMENTS));
    }

    let plan = Plan {
        provides,
        requires: vec![
            Required::new(PYTHON).build().launch(),
            Required::new(PYTHON_PACKAGES).launch(),
            Required::new(REQUIREMENTS).build(),
        ],
    };

    Ok(DetectOutcome { plan, pass: true })
}
