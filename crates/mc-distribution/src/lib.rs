// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Distribution Resolver and Artifact Downloader (`spec.md` §4.1-4.2).

#![deny(missing_docs)]

/// Errors from resolution and download.
pub mod error;
/// PaperMC resolver.
pub mod paper;
/// Artifact download with hash verification.
pub mod downloader;
/// Resolver trait and registry.
pub mod resolver;
/// Structural validation for decoded manifest/version payloads.
pub mod validate;
/// Mojang Vanilla resolver.
pub mod vanilla;

pub use downloader::ArtifactDownloader;
pub use error::{DistributionError, Result};
pub use paper::PaperResolver;
pub use resolver::{DistributionResolver, ResolverRegistry};
pub use vanilla::VanillaResolver;
