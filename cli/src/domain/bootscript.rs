//! Instance user-data rendering.
//!
//! The image is expected to ship the runner distribution in `runner_dir`;
//! the script only configures and starts it.

use crate::domain::unit::LaunchConfig;

/// Quote `value` for a POSIX shell.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Render the boot script that registers the instance as runner `label`.
#[must_use]
pub fn render(config: &LaunchConfig, label: &str, registration_token: &str) -> String {
    let dir = shell_quote(&config.runner_dir);
    let user = shell_quote(&config.runner_user);
    let url = shell_quote(&config.repository_url);
    let label = shell_quote(label);
    let token = shell_quote(registration_token);
    format!(
        "#!/bin/bash\n\
         set -euo pipefail\n\
         cd {dir}\n\
         chown -R {user} .\n\
         sudo -u {user} ./config.sh --unattended --url {url} --token {token} --labels {label} --name {label} --replace\n\
         sudo -u {user} nohup ./run.sh > runner.log 2>&1 &\n"
    )
}
