use reqwest::Client;

use crate::error::Result;

const LIBRARY_URL: &str = "https://ollama.com/library";

/// HTTP client for the catalog's library page.
pub struct LibraryClient {
    http: Client,
}

impl LibraryClient {
    pub fn new() -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Fetch the library page as text. No retries.
    pub async fn fetch_library(&self) -> Result<String> {
        let resp = self.http.get(LIBRARY_URL).send().await?;
        let resp = resp.error_for_status()?;
        Ok(resp.text().await?)
    }
}

impl Default for LibraryClient {
    fn default() -> Self {
        Self::new()
    }
}
