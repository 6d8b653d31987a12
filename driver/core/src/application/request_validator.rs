// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Request Validator
//!
//! Rejects malformed publish/unpublish requests before anything touches the
//! host. A request that passes comes back as a borrowed, already-checked
//! view so later stages never re-inspect optional fields.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Field and capability checks for the node service

use crate::domain::node::NodeError;
use crate::domain::volume::{
    AccessMode, PublishVolumeRequest, UnpublishVolumeRequest, VolumeCapability, VolumeId,
};

/// Checked view of a publish request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget<'a> {
    pub volume_id: &'a VolumeId,
    pub dns_name: &'a str,
    /// `None` when the context carries no (or an empty) `mountname`
    pub mount_name: Option<&'a str>,
    pub target_path: &'a str,
    pub readonly: bool,
    pub mount_flags: &'a [String],
}

/// Checked view of an unpublish request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpublishTarget<'a> {
    pub volume_id: &'a VolumeId,
    pub target_path: &'a str,
}

#[derive(Debug, Clone)]
pub struct RequestValidator {
    supported_access_modes: Vec<AccessMode>,
}

impl RequestValidator {
    pub fn new(supported_access_modes: Vec<AccessMode>) -> Self {
        Self {
            supported_access_modes,
        }
    }

    pub fn supported_access_modes(&self) -> &[AccessMode] {
        &self.supported_access_modes
    }

    pub fn validate_publish<'a>(
        &self,
        req: &'a PublishVolumeRequest,
    ) -> Result<PublishTarget<'a>, NodeError> {
        if req.volume_id.is_empty() {
            return Err(NodeError::invalid_argument("Volume ID not provided"));
        }

        let dns_name = req
            .volume_context
            .dns_name()
            .ok_or_else(|| NodeError::invalid_argument("dnsname is not provided"))?;

        if req.target_path.is_empty() {
            return Err(NodeError::invalid_argument("Target path not provided"));
        }

        let capability = req
            .volume_capability
            .as_ref()
            .ok_or_else(|| NodeError::invalid_argument("Volume capability not provided"))?;

        if !self.is_supported(capability) {
            return Err(NodeError::invalid_argument(format!(
                "Volume capability not supported: access mode {}",
                capability.access_mode
            )));
        }

        Ok(PublishTarget {
            volume_id: &req.volume_id,
            dns_name,
            mount_name: req.volume_context.mount_name(),
            target_path: &req.target_path,
            readonly: req.readonly,
            mount_flags: capability.mount_flags(),
        })
    }

    pub fn validate_unpublish<'a>(
        &self,
        req: &'a UnpublishVolumeRequest,
    ) -> Result<UnpublishTarget<'a>, NodeError> {
        if req.volume_id.is_empty() {
            return Err(NodeError::invalid_argument("Volume ID not provided"));
        }

        if req.target_path.is_empty() {
            return Err(NodeError::invalid_argument("Target path not provided"));
        }

        Ok(UnpublishTarget {
            volume_id: &req.volume_id,
            target_path: &req.target_path,
        })
    }

    fn is_supported(&self, capability: &VolumeCapability) -> bool {
        self.supported_access_modes.contains(&capability.access_mode)
    }
}

impl Default for RequestValidator {
    fn default() -> Self {
        Self::new(vec![AccessMode::MultiNodeMultiWriter])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::volume::{VolumeContext, VOLUME_CONTEXT_DNS_NAME, VOLUME_CONTEXT_MOUNT_NAME};

    fn standard_request() -> PublishVolumeRequest {
        PublishVolumeRequest {
            volume_id: VolumeId::new("vol1"),
            volume_context: VolumeContext::new()
                .with(VOLUME_CONTEXT_DNS_NAME, "fs-1.example.com")
                .with(VOLUME_CONTEXT_MOUNT_NAME, "random"),
            target_path: "/target".to_string(),
            volume_capability: Some(VolumeCapability::mount(
                AccessMode::MultiNodeMultiWriter,
                vec!["flock".to_string()],
            )),
            readonly: true,
        }
    }

    fn assert_invalid(result: Result<PublishTarget<'_>, NodeError>, reason: &str) {
        match result {
            Err(NodeError::InvalidArgument(msg)) => assert!(msg.contains(reason), "{msg}"),
            other => panic!("expected InvalidArgument({reason}), got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_standard_request() {
        let validator = RequestValidator::default();
        let req = standard_request();
        let target = validator.validate_publish(&req).unwrap();

        assert_eq!(target.volume_id.as_str(), "vol1");
        assert_eq!(target.dns_name, "fs-1.example.com");
        assert_eq!(target.mount_name, Some("random"));
        assert_eq!(target.target_path, "/target");
        assert!(target.readonly);
        assert_eq!(target.mount_flags, ["flock".to_string()]);
    }

    #[test]
    fn test_missing_mount_name_is_not_an_error() {
        let validator = RequestValidator::default();
        let mut req = standard_request();
        req.volume_context = VolumeContext::new().with(VOLUME_CONTEXT_DNS_NAME, "fs-1.example.com");

        let target = validator.validate_publish(&req).unwrap();
        assert_eq!(target.mount_name, None);
    }

    #[test]
    fn test_rejects_missing_fields() {
        let validator = RequestValidator::default();

        let mut req = standard_request();
        req.volume_id = VolumeId::default();
        assert_invalid(validator.validate_publish(&req), "Volume ID");

        let mut req = standard_request();
        req.volume_context = VolumeContext::new().with(VOLUME_CONTEXT_MOUNT_NAME, "random");
        assert_invalid(validator.validate_publish(&req), "dnsname");

        let mut req = standard_request();
        req.volume_context = VolumeContext::new().with(VOLUME_CONTEXT_DNS_NAME, "");
        assert_invalid(validator.validate_publish(&req), "dnsname");

        let mut req = standard_request();
        req.target_path.clear();
        assert_invalid(validator.validate_publish(&req), "Target path");

        let mut req = standard_request();
        req.volume_capability = None;
        assert_invalid(validator.validate_publish(&req), "capability not provided");
    }

    #[test]
    fn test_rejects_unsupported_access_mode() {
        let validator = RequestValidator::default();
        let mut req = standard_request();
        req.volume_capability = Some(VolumeCapability::mount(AccessMode::SingleNodeReaderOnly, vec![]));

        assert_invalid(validator.validate_publish(&req), "not supported");
    }

    #[test]
    fn test_configured_access_modes() {
        let validator = RequestValidator::new(vec![
            AccessMode::MultiNodeMultiWriter,
            AccessMode::SingleNodeReaderOnly,
        ]);
        let mut req = standard_request();
        req.volume_capability = Some(VolumeCapability::mount(AccessMode::SingleNodeReaderOnly, vec![]));

        assert!(validator.validate_publish(&req).is_ok());
    }

    #[test]
    fn test_unpublish_validation() {
        let validator = RequestValidator::default();

        let req = UnpublishVolumeRequest {
            volume_id: VolumeId::new("vol1"),
            target_path: "/target".to_string(),
        };
        let target = validator.validate_unpublish(&req).unwrap();
        assert_eq!(target.target_path, "/target");

        let req = UnpublishVolumeRequest {
            volume_id: VolumeId::default(),
            target_path: "/target".to_string(),
        };
        assert!(matches!(
            validator.validate_unpublish(&req),
            Err(NodeError::InvalidArgument(_))
        ));

        let req = UnpublishVolumeRequest {
            volume_id: VolumeId::new("vol1"),
            target_path: String::new(),
        };
        assert!(matches!(
            validator.validate_unpublish(&req),
            Err(NodeError::InvalidArgument(_))
        ));
    }
}
