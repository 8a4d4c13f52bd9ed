//! Terminal consent host.
//!
//! Opens Google's consent page in the system browser. After approval the
//! browser lands on the extension redirect URL, which the user pastes back.

use eventcreator_providers::google::AuthFlowHost;
use eventcreator_providers::{BoxFuture, ProviderError, ProviderResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;

const CANCELLED_MESSAGE: &str = "Authorization cancelled";

/// Runs the consent flow through the user's browser and terminal.
#[derive(Debug, Clone)]
pub struct TerminalAuthHost {
    redirect_uri: String,
}

impl TerminalAuthHost {
    pub fn new(redirect_uri: impl Into<String>) -> Self {
        Self {
            redirect_uri: redirect_uri.into(),
        }
    }
}

impl AuthFlowHost for TerminalAuthHost {
    fn redirect_uri(&self) -> String {
        self.redirect_uri.clone()
    }

    fn launch_web_auth_flow(&self, auth_url: String) -> BoxFuture<'_, ProviderResult<String>> {
        Box::pin(async move {
            if let Err(e) = open::that(&auth_url) {
                warn!("failed to open browser: {}", e);
            }
            eprintln!("\nIf the browser did not open, visit:\n\n{}\n", auth_url);
            eprintln!("After approving, paste the full address the browser ended up on");
            eprintln!("(it starts with {}). Leave empty to cancel:", self.redirect_uri);

            let mut stdin = BufReader::new(tokio::io::stdin());
            read_redirect(&mut stdin).await
        })
    }
}

/// Reads one pasted redirect URL. An empty line or EOF cancels.
pub(crate) async fn read_redirect<R>(reader: &mut R) -> ProviderResult<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    reader.read_line(&mut line).await.map_err(|e| {
        ProviderError::user_cancelled(format!("failed to read redirect URL: {}", e))
    })?;

    let line = line.trim();
    if line.is_empty() {
        Err(ProviderError::user_cancelled(CANCELLED_MESSAGE))
    } else {
        Ok(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventcreator_providers::ProviderErrorCode;

    #[tokio::test]
    async fn reads_pasted_url() {
        let mut input: &[u8] = b"  https://abcdef.chromiumapp.org/#access_token=at  \nrest\n";
        let url = read_redirect(&mut input).await.unwrap();
        assert_eq!(url, "https://abcdef.chromiumapp.org/#access_token=at");
    }

    #[tokio::test]
    async fn empty_line_cancels() {
        for raw in [&b"\n"[..], &b""[..]] {
            let mut input = raw;
            let err = read_redirect(&mut input).await.unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::UserCancelled);
            assert_eq!(err.message(), "Authorization cancelled");
        }
    }

    #[test]
    fn reports_configured_redirect() {
        let host = TerminalAuthHost::new("https://abcdef.chromiumapp.org/");
        assert_eq!(host.redirect_uri(), "https://abcdef.chromiumapp.org/");
    }
}
