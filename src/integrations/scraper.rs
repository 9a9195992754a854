use crate::integrations::{HttpIntegrations, IntegrationResult, PageFetcher};

/// Bytes of a page kept for text extraction; the rest of the body is not read.
pub const MAX_PAGE_BYTES: usize = 2 * 1024 * 1024;

/// Appends `chunk` to `body` up to `limit` bytes and reports whether the
/// limit was reached.
fn append_capped(body: &mut Vec<u8>, chunk: &[u8], limit: usize) -> bool {
    let room = limit.saturating_sub(body.len());
    body.extend_from_slice(&chunk[..chunk.len().min(room)]);
    body.len() >= limit
}

impl PageFetcher for HttpIntegrations {
    async fn fetch_page(&self, url: &str) -> IntegrationResult<String> {
        let response = self.client.get(url).send().await?;
        let mut response = Self::check("scraper", response).await?;

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if append_capped(&mut body, &chunk, MAX_PAGE_BYTES) {
                log::debug!("Truncated {url} at {MAX_PAGE_BYTES} bytes");
                break;
            }
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_stops_growing_at_limit() {
        let mut body = Vec::new();
        assert!(!append_capped(&mut body, b"<html>", 10));
        assert!(append_capped(&mut body, b"<body>news", 10));
        assert_eq!(body, b"<html><bod");
        assert!(append_capped(&mut body, b"more", 10));
        assert_eq!(body.len(), 10);
    }
}
