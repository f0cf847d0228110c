use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use async_trait::async_trait;
use base64::Engine;

use crate::providers::{ProviderError, ProviderResult};

/// Upper bound on downloaded image size.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Downloaded image ready to be inlined into a provider request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub base64_data: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_base64(&self, image_url: &str) -> ProviderResult<InlineImage>;
}

/// Redirect hops followed before giving up. Each hop is re-checked.
const MAX_REDIRECTS: usize = 3;

/// Fetches images over http(s), refusing hosts that resolve to private,
/// loopback or link-local addresses.
pub struct ReqwestImageFetcher {
    timeout: Duration,
}

impl ReqwestImageFetcher {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Client pinned to the address that passed the check, so the request
    /// cannot be re-resolved somewhere else.
    fn pinned_client(&self, host: &str, addr: SocketAddr) -> ProviderResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .resolve(host, addr)
            .build()
            .map_err(|e| ProviderError::Image(e.to_string()))
    }

    async fn send_checked(&self, image_url: &str) -> ProviderResult<reqwest::Response> {
        let mut url = reqwest::Url::parse(image_url)
            .map_err(|e| ProviderError::Image(format!("Invalid image URL: {}", e)))?;

        for _ in 0..=MAX_REDIRECTS {
            let (host, addr) = resolve_public(&url).await?;
            let response = self
                .pinned_client(&host, addr)?
                .get(url.clone())
                .send()
                .await
                .map_err(|e| ProviderError::Image(e.to_string()))?;

            if !response.status().is_redirection() {
                return Ok(response);
            }

            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| ProviderError::Image("Redirect without location".to_string()))?;
            url = url
                .join(location)
                .map_err(|e| ProviderError::Image(format!("Invalid redirect: {}", e)))?;
            log::debug!("Following image redirect to {}", url);
        }

        Err(ProviderError::Image("Too many redirects".to_string()))
    }
}

#[async_trait]
impl ImageFetcher for ReqwestImageFetcher {
    async fn fetch_base64(&self, image_url: &str) -> ProviderResult<InlineImage> {
        let mut response = self.send_checked(image_url).await?;

        if !response.status().is_success() {
            return Err(ProviderError::Image(format!(
                "Failed to fetch image: {}",
                response.status()
            )));
        }
        if let Some(length) = response.content_length() {
            if length > MAX_IMAGE_BYTES as u64 {
                return Err(too_large(length as usize));
            }
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ProviderError::Image(e.to_string()))?
        {
            append_capped(&mut bytes, &chunk)?;
        }

        log::debug!("Fetched {} bytes from {}", bytes.len(), image_url);
        encode_image(&bytes, mime_type.as_deref())
    }
}

fn too_large(size: usize) -> ProviderError {
    ProviderError::Image(format!("Image is too large ({} bytes)", size))
}

/// Append a downloaded chunk, failing as soon as the image outgrows the cap.
fn append_capped(buffer: &mut Vec<u8>, chunk: &[u8]) -> ProviderResult<()> {
    let size = buffer.len() + chunk.len();
    if size > MAX_IMAGE_BYTES {
        return Err(too_large(size));
    }
    buffer.extend_from_slice(chunk);
    Ok(())
}

/// Resolve the URL's host and return its first address, provided every
/// address it resolves to is publicly routable.
async fn resolve_public(url: &reqwest::Url) -> ProviderResult<(String, SocketAddr)> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProviderError::Image(format!(
            "Unsupported image URL scheme: {}",
            url.scheme()
        )));
    }
    let host = url
        .host_str()
        .ok_or_else(|| ProviderError::Image("Image URL has no host".to_string()))?;
    let port = url.port_or_known_default().unwrap_or(80);
    let bare_host = host.trim_start_matches('[').trim_end_matches(']');

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((bare_host, port))
        .await
        .map_err(|e| ProviderError::Image(format!("Cannot resolve {}: {}", host, e)))?
        .collect();

    if let Some(blocked) = addrs.iter().find(|a| !is_public_ip(a.ip())) {
        log::warn!("Refusing image fetch from {} ({})", host, blocked.ip());
        return Err(ProviderError::Image(format!(
            "Image host {} is not publicly reachable",
            host
        )));
    }
    let addr = addrs
        .first()
        .copied()
        .ok_or_else(|| ProviderError::Image(format!("No addresses for {}", host)))?;

    Ok((host.to_string(), addr))
}

pub fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_public_v4(v4),
            None => {
                let first = v6.segments()[0];
                !(v6.is_loopback()
                    || v6.is_unspecified()
                    || v6.is_multicast()
                    || first & 0xfe00 == 0xfc00
                    || first & 0xffc0 == 0xfe80)
            }
        },
    }
}

fn is_public_v4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    !(ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_unspecified()
        || ip.is_multicast()
        || a == 0
        || (a == 100 && (64..128).contains(&b)))
}

/// Base64-encode image bytes. Non-image content types fall back to JPEG.
pub fn encode_image(bytes: &[u8], mime_type: Option<&str>) -> ProviderResult<InlineImage> {
    if bytes.is_empty() {
        return Err(ProviderError::Image("Image is empty".to_string()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(too_large(bytes.len()));
    }

    let mime_type = mime_type
        .filter(|m| m.starts_with("image/"))
        .unwrap_or("image/jpeg")
        .to_string();

    Ok(InlineImage {
        mime_type,
        base64_data: base64::engine::general_purpose::STANDARD.encode(bytes),
    })
}
