// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Structural validation applied to decoded manifest/version payloads
//! before they are accepted as a [`mc_core::DistributionVersion`]
//! (`spec.md` §4.1), grounded on
//! `examples/original_source/internal/distribution/utils.go`'s
//! `validate.StructCtx` call with `required`/`required,url`/
//! `required,hexadecimal` tags.

use crate::error::{DistributionError, Result};

/// Reject an empty version id.
pub fn require_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(DistributionError::Validation("version id is empty".to_string()));
    }
    Ok(())
}

/// Reject a download URL that isn't a well-formed absolute `http(s)` URL.
pub fn require_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url)
        .map_err(|e| DistributionError::Validation(format!("malformed download url {url:?}: {e}")))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(DistributionError::Validation(format!(
            "download url {url:?} has unsupported scheme {:?}",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none() {
        return Err(DistributionError::Validation(format!("download url {url:?} has no host")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_is_rejected() {
        assert!(require_id("").is_err());
        assert!(require_id("   ").is_err());
        assert!(require_id("1.21.1").is_ok());
    }

    #[test]
    fn malformed_url_is_rejected() {
        assert!(require_url("not a url").is_err());
        assert!(require_url("ftp://example.com/x.jar").is_err());
        assert!(require_url("https://example.com/x.jar").is_ok());
        assert!(require_url("http://example.com/x.jar").is_ok());
    }
}
