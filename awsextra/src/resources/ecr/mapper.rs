//! Mapping between repository API structs and Terraform state values
//!
//! Single-block configuration groups travel through state as one-element
//! lists; an absent group is a null value, and an empty list in config
//! means "unset" on the API side.

use crate::api::{
    CreateRepositoryRequest, EncryptionConfiguration, ImageScanningConfiguration, Repository,
};
use std::collections::HashMap;
use tfbridge::{AttributePath, Dynamic, DynamicValue};

const DEFAULT_ENCRYPTION_TYPE: &str = "AES256";

/// Write every attribute of a described repository into `state`
pub fn flatten_repository(repo: &Repository, state: &mut DynamicValue) {
    let _ = state.set_string(&AttributePath::new("name"), repo.name.clone());
    let _ = state.set_string(&AttributePath::new("arn"), repo.arn.clone());
    let _ = state.set_string(&AttributePath::new("registry_id"), repo.registry_id.clone());
    let _ = state.set_string(
        &AttributePath::new("repository_url"),
        repo.repository_url.clone(),
    );
    let _ = state.set_string(
        &AttributePath::new("image_tag_mutability"),
        repo.image_tag_mutability.clone(),
    );
    let _ = state.set_raw(
        &AttributePath::new("image_scanning_configuration"),
        flatten_image_scanning_configuration(repo.image_scanning_configuration.as_ref()),
    );
    let _ = state.set_raw(
        &AttributePath::new("encryption_configuration"),
        flatten_encryption_configuration(repo.encryption_configuration.as_ref()),
    );
}

pub fn flatten_image_scanning_configuration(
    config: Option<&ImageScanningConfiguration>,
) -> Dynamic {
    match config {
        None => Dynamic::Null,
        Some(config) => {
            let mut block = HashMap::new();
            block.insert(
                "scan_on_push".to_string(),
                Dynamic::Bool(config.scan_on_push),
            );
            Dynamic::List(vec![Dynamic::Map(block)])
        }
    }
}

pub fn flatten_encryption_configuration(config: Option<&EncryptionConfiguration>) -> Dynamic {
    match config {
        None => Dynamic::Null,
        Some(config) => {
            let mut block = HashMap::new();
            block.insert(
                "encryption_type".to_string(),
                Dynamic::String(config.encryption_type.clone()),
            );
            Dynamic::List(vec![Dynamic::Map(block)])
        }
    }
}

/// Build a creation request from planned configuration
pub fn expand_create_request(config: &DynamicValue) -> CreateRepositoryRequest {
    CreateRepositoryRequest {
        name: config
            .get_string(&AttributePath::new("name"))
            .unwrap_or_default(),
        image_tag_mutability: config
            .get_string(&AttributePath::new("image_tag_mutability"))
            .unwrap_or_default(),
        image_scanning_configuration: expand_image_scanning_configuration(
            &config.get_raw(&AttributePath::new("image_scanning_configuration")),
        ),
        encryption_configuration: expand_encryption_configuration(
            &config.get_raw(&AttributePath::new("encryption_configuration")),
        ),
    }
}

pub fn expand_image_scanning_configuration(value: &Dynamic) -> Option<ImageScanningConfiguration> {
    let block = first_block(value)?;
    let scan_on_push = matches!(block.get("scan_on_push"), Some(Dynamic::Bool(true)));
    Some(ImageScanningConfiguration { scan_on_push })
}

pub fn expand_encryption_configuration(value: &Dynamic) -> Option<EncryptionConfiguration> {
    let block = first_block(value)?;
    let encryption_type = match block.get("encryption_type") {
        Some(Dynamic::String(s)) if !s.is_empty() => s.clone(),
        _ => DEFAULT_ENCRYPTION_TYPE.to_string(),
    };
    Some(EncryptionConfiguration { encryption_type })
}

/// Effective scan-on-push value of a planned configuration; an absent or
/// empty block reads as false
pub fn scan_on_push_value(config: &DynamicValue) -> bool {
    expand_image_scanning_configuration(
        &config.get_raw(&AttributePath::new("image_scanning_configuration")),
    )
    .map(|c| c.scan_on_push)
    .unwrap_or(false)
}

fn first_block(value: &Dynamic) -> Option<&HashMap<String, Dynamic>> {
    match value {
        Dynamic::List(items) => match items.first() {
            Some(Dynamic::Map(block)) => Some(block),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn described_repository() -> Repository {
        Repository {
            name: "svc-a".to_string(),
            arn: "arn:aws:ecr:eu-central-1:123456789012:repository/svc-a".to_string(),
            registry_id: "123456789012".to_string(),
            repository_url: "123456789012.dkr.ecr.eu-central-1.amazonaws.com/svc-a".to_string(),
            image_tag_mutability: "IMMUTABLE".to_string(),
            image_scanning_configuration: Some(ImageScanningConfiguration { scan_on_push: true }),
            encryption_configuration: Some(EncryptionConfiguration {
                encryption_type: "KMS".to_string(),
            }),
        }
    }

    #[test]
    fn flatten_writes_every_attribute() {
        let mut state = DynamicValue::empty_object();
        flatten_repository(&described_repository(), &mut state);

        assert_eq!(
            state.get_string(&AttributePath::new("name")).unwrap(),
            "svc-a"
        );
        assert_eq!(
            state.get_string(&AttributePath::new("arn")).unwrap(),
            "arn:aws:ecr:eu-central-1:123456789012:repository/svc-a"
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("registry_id"))
                .unwrap(),
            "123456789012"
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("image_tag_mutability"))
                .unwrap(),
            "IMMUTABLE"
        );
        let scanning = state.get_raw(&AttributePath::new("image_scanning_configuration"));
        assert_eq!(
            expand_image_scanning_configuration(&scanning),
            Some(ImageScanningConfiguration { scan_on_push: true })
        );
        let encryption = state.get_raw(&AttributePath::new("encryption_configuration"));
        assert_eq!(
            expand_encryption_configuration(&encryption),
            Some(EncryptionConfiguration {
                encryption_type: "KMS".to_string()
            })
        );
    }

    #[test]
    fn flatten_absent_groups_are_null() {
        let mut repo = described_repository();
        repo.image_scanning_configuration = None;
        repo.encryption_configuration = None;

        let mut state = DynamicValue::empty_object();
        flatten_repository(&repo, &mut state);

        assert_eq!(
            state.get_raw(&AttributePath::new("image_scanning_configuration")),
            Dynamic::Null
        );
        assert_eq!(
            state.get_raw(&AttributePath::new("encryption_configuration")),
            Dynamic::Null
        );
    }

    #[test]
    fn expand_empty_list_means_unset() {
        assert_eq!(
            expand_image_scanning_configuration(&Dynamic::List(vec![])),
            None
        );
        assert_eq!(expand_encryption_configuration(&Dynamic::List(vec![])), None);
        assert_eq!(expand_image_scanning_configuration(&Dynamic::Null), None);
    }

    #[test]
    fn expand_encryption_defaults_type_within_block() {
        let block = Dynamic::List(vec![Dynamic::Map(HashMap::new())]);
        assert_eq!(
            expand_encryption_configuration(&block),
            Some(EncryptionConfiguration {
                encryption_type: "AES256".to_string()
            })
        );
    }

    #[test]
    fn expand_create_request_round_trips() {
        let mut config = DynamicValue::empty_object();
        config
            .set_string(&AttributePath::new("name"), "svc-a".to_string())
            .unwrap();
        config
            .set_string(
                &AttributePath::new("image_tag_mutability"),
                "MUTABLE".to_string(),
            )
            .unwrap();
        config
            .set_raw(
                &AttributePath::new("image_scanning_configuration"),
                flatten_image_scanning_configuration(Some(&ImageScanningConfiguration {
                    scan_on_push: true,
                })),
            )
            .unwrap();

        let request = expand_create_request(&config);
        assert_eq!(request.name, "svc-a");
        assert_eq!(request.image_tag_mutability, "MUTABLE");
        assert_eq!(
            request.image_scanning_configuration,
            Some(ImageScanningConfiguration { scan_on_push: true })
        );
        assert_eq!(request.encryption_configuration, None);
    }

    #[test]
    fn scan_on_push_reads_false_when_absent() {
        let config = DynamicValue::empty_object();
        assert!(!scan_on_push_value(&config));

        let mut config = DynamicValue::empty_object();
        config
            .set_raw(
                &AttributePath::new("image_scanning_configuration"),
                Dynamic::List(vec![]),
            )
            .unwrap();
        assert!(!scan_on_push_value(&config));
    }
}
