//! External signing tool invocation
//!
//! The tool signs its input file in place; we only learn success or
//! failure from its exit code. The argument template is fixed: SHA-256
//! for both the file digest and the timestamp digest, verbose output,
//! certificate and timestamp authority from configuration.

use std::ffi::OsString;
use std::path::Path;

use tracing::{info, warn};

use signrelay_core::command::{output_tail, run_command};
use signrelay_core::ServerConfig;

use crate::error::SignError;

/// Diagnostic output is bounded to this many trailing characters
const DIAG_TAIL_CHARS: usize = 4000;

/// Invoke the signing tool against `input`, which it signs in place.
///
/// A non-zero exit code becomes [`SignError::ToolFailed`] carrying the
/// bounded tool output and the redacted active configuration.
pub async fn sign_in_place(config: &ServerConfig, input: &Path) -> Result<(), SignError> {
    let args = sign_args(config, input);
    let output = run_command(&config.signtool_path, &args, config.sign_timeout())
        .await
        .map_err(SignError::Internal)?;

    if !output.success() {
        warn!(
            code = output.code,
            input = %input.display(),
            "signing tool failed"
        );
        return Err(SignError::ToolFailed {
            return_code: output.code,
            stdout: output_tail(&output.stdout, DIAG_TAIL_CHARS),
            stderr: output_tail(&output.stderr, DIAG_TAIL_CHARS),
            config: config.redacted(),
        });
    }

    info!(input = %input.display(), "file signed in place");
    Ok(())
}

fn sign_args(config: &ServerConfig, input: &Path) -> Vec<OsString> {
    vec![
        OsString::from("sign"),
        OsString::from("/f"),
        config.cert_path.clone().into_os_string(),
        OsString::from("/p"),
        OsString::from(config.cert_password.as_deref().unwrap_or("")),
        OsString::from("/tr"),
        OsString::from(&config.timestamp_url),
        OsString::from("/td"),
        OsString::from("sha256"),
        OsString::from("/fd"),
        OsString::from("sha256"),
        OsString::from("/v"),
        input.as_os_str().to_os_string(),
    ]
}
