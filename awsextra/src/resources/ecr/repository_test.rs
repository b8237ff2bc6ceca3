use crate::api::{ApiError, CreateRepositoryRequest, EcrApi, Repository};
use crate::provider_data::AwsProviderData;
use crate::resources::ecr::repository::EcrRepositoryResource;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tfbridge::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ReadResourceRequest, UpdateResourceRequest,
};
use tfbridge::types::has_errors;
use tfbridge::{
    AttributePath, Context, Dynamic, DynamicValue, Resource, ResourceWithConfigure,
};

/// In-memory stand-in for the ECR service, recording every call
struct FakeEcr {
    repos: Mutex<HashMap<String, Repository>>,
    calls: Mutex<Vec<&'static str>>,
    fail_op: Option<&'static str>,
}

impl FakeEcr {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            repos: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_op: None,
        })
    }

    fn failing(op: &'static str) -> Arc<Self> {
        Arc::new(Self {
            repos: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_op: Some(op),
        })
    }

    fn with_repository(self: Arc<Self>, name: &str) -> Arc<Self> {
        self.repos
            .lock()
            .unwrap()
            .insert(name.to_string(), server_repository(name));
        self
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(op);
        if self.fail_op == Some(op) {
            return Err(ApiError::Remote(format!("{} failed", op)));
        }
        Ok(())
    }
}

fn server_repository(name: &str) -> Repository {
    Repository {
        name: name.to_string(),
        arn: format!("arn:aws:ecr:eu-central-1:123456789012:repository/{}", name),
        registry_id: "123456789012".to_string(),
        repository_url: format!(
            "123456789012.dkr.ecr.eu-central-1.amazonaws.com/{}",
            name
        ),
        image_tag_mutability: "MUTABLE".to_string(),
        image_scanning_configuration: None,
        encryption_configuration: None,
    }
}

#[async_trait]
impl EcrApi for FakeEcr {
    async fn describe_repository(&self, name: &str) -> Result<Repository, ApiError> {
        self.record("describe")?;
        self.repos
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                name: name.to_string(),
            })
    }

    async fn create_repository(
        &self,
        request: &CreateRepositoryRequest,
    ) -> Result<Repository, ApiError> {
        self.record("create")?;
        let mut repo = server_repository(&request.name);
        repo.image_tag_mutability = request.image_tag_mutability.clone();
        repo.image_scanning_configuration = request.image_scanning_configuration.clone();
        repo.encryption_configuration = request.encryption_configuration.clone();
        self.repos
            .lock()
            .unwrap()
            .insert(request.name.clone(), repo.clone());
        Ok(repo)
    }

    async fn put_image_tag_mutability(
        &self,
        _registry_id: Option<&str>,
        name: &str,
        image_tag_mutability: &str,
    ) -> Result<(), ApiError> {
        self.record("put_mutability")?;
        if let Some(repo) = self.repos.lock().unwrap().get_mut(name) {
            repo.image_tag_mutability = image_tag_mutability.to_string();
        }
        Ok(())
    }

    async fn put_image_scanning_configuration(
        &self,
        _registry_id: Option<&str>,
        name: &str,
        scan_on_push: bool,
    ) -> Result<(), ApiError> {
        self.record("put_scanning")?;
        if let Some(repo) = self.repos.lock().unwrap().get_mut(name) {
            repo.image_scanning_configuration =
                Some(crate::api::ImageScanningConfiguration { scan_on_push });
        }
        Ok(())
    }

    async fn delete_repository(
        &self,
        _registry_id: Option<&str>,
        name: &str,
        _force: bool,
    ) -> Result<(), ApiError> {
        self.record("delete")?;
        if self.repos.lock().unwrap().remove(name).is_none() {
            return Err(ApiError::NotFound {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

async fn configured_resource(api: Arc<FakeEcr>) -> EcrRepositoryResource {
    let mut resource = EcrRepositoryResource::new();
    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(Arc::new(AwsProviderData::new(api))),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    resource
}

fn planned_state(entries: &[(&str, Dynamic)]) -> DynamicValue {
    let mut state = DynamicValue::empty_object();
    for (name, value) in entries {
        state
            .set_raw(&AttributePath::new(name), value.clone())
            .unwrap();
    }
    state
}

fn scanning_block(scan_on_push: bool) -> Dynamic {
    let mut block = HashMap::new();
    block.insert("scan_on_push".to_string(), Dynamic::Bool(scan_on_push));
    Dynamic::List(vec![Dynamic::Map(block)])
}

fn managed_prior_state(name: &str) -> DynamicValue {
    planned_state(&[
        ("id", Dynamic::String(name.to_string())),
        ("name", Dynamic::String(name.to_string())),
        ("registry_id", Dynamic::String("123456789012".to_string())),
        (
            "image_tag_mutability",
            Dynamic::String("MUTABLE".to_string()),
        ),
    ])
}

#[tokio::test]
async fn create_provisions_new_repository() {
    let fake = FakeEcr::new();
    let resource = configured_resource(fake.clone()).await;

    let planned = planned_state(&[
        ("name", Dynamic::String("svc-a".to_string())),
        (
            "image_tag_mutability",
            Dynamic::String("IMMUTABLE".to_string()),
        ),
        ("use_existing", Dynamic::Bool(false)),
    ]);

    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                config: planned.clone(),
                planned_state: planned,
            },
        )
        .await;

    assert!(!has_errors(&response.diagnostics));
    assert_eq!(fake.calls(), vec!["create"]);
    assert_eq!(
        response
            .new_state
            .get_string(&AttributePath::new("id"))
            .unwrap(),
        "svc-a"
    );
    assert_eq!(
        response
            .new_state
            .get_string(&AttributePath::new("arn"))
            .unwrap(),
        "arn:aws:ecr:eu-central-1:123456789012:repository/svc-a"
    );
    assert_eq!(
        response
            .new_state
            .get_string(&AttributePath::new("registry_id"))
            .unwrap(),
        "123456789012"
    );
}

#[tokio::test]
async fn create_adopts_existing_repository_without_creating() {
    let fake = FakeEcr::new().with_repository("svc-a");
    let resource = configured_resource(fake.clone()).await;

    let planned = planned_state(&[
        ("name", Dynamic::String("svc-a".to_string())),
        ("use_existing", Dynamic::Bool(true)),
    ]);

    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                config: planned.clone(),
                planned_state: planned,
            },
        )
        .await;

    assert!(!has_errors(&response.diagnostics));
    assert_eq!(fake.calls(), vec!["describe"]);
    assert_eq!(
        response
            .new_state
            .get_string(&AttributePath::new("id"))
            .unwrap(),
        "svc-a"
    );
}

#[tokio::test]
async fn create_with_use_existing_falls_through_when_absent() {
    let fake = FakeEcr::new();
    let resource = configured_resource(fake.clone()).await;

    let planned = planned_state(&[
        ("name", Dynamic::String("svc-a".to_string())),
        ("use_existing", Dynamic::Bool(true)),
    ]);

    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                config: planned.clone(),
                planned_state: planned,
            },
        )
        .await;

    assert!(!has_errors(&response.diagnostics));
    assert_eq!(fake.calls(), vec!["describe", "create"]);
}

#[tokio::test]
async fn create_failure_leaves_no_state() {
    let fake = FakeEcr::failing("create");
    let resource = configured_resource(fake.clone()).await;

    let planned = planned_state(&[("name", Dynamic::String("svc-a".to_string()))]);

    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                config: planned.clone(),
                planned_state: planned,
            },
        )
        .await;

    assert!(has_errors(&response.diagnostics));
    assert!(response.new_state.is_null());
}

#[tokio::test]
async fn read_refreshes_remote_attributes() {
    let fake = FakeEcr::new().with_repository("svc-a");
    fake.repos
        .lock()
        .unwrap()
        .get_mut("svc-a")
        .unwrap()
        .image_tag_mutability = "IMMUTABLE".to_string();
    let resource = configured_resource(fake.clone()).await;

    let response = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                current_state: managed_prior_state("svc-a"),
            },
        )
        .await;

    assert!(!has_errors(&response.diagnostics));
    let new_state = response.new_state.unwrap();
    assert_eq!(
        new_state
            .get_string(&AttributePath::new("image_tag_mutability"))
            .unwrap(),
        "IMMUTABLE"
    );
}

#[tokio::test]
async fn read_clears_identity_when_repository_is_gone() {
    let fake = FakeEcr::new();
    let resource = configured_resource(fake.clone()).await;

    let response = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                current_state: managed_prior_state("svc-a"),
            },
        )
        .await;

    assert!(response.new_state.is_none());
    assert!(response.diagnostics.is_empty());
}

#[tokio::test]
async fn update_without_changes_makes_no_calls() {
    let fake = FakeEcr::new().with_repository("svc-a");
    let resource = configured_resource(fake.clone()).await;

    let prior = managed_prior_state("svc-a");
    let response = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                config: prior.clone(),
                prior_state: prior.clone(),
                planned_state: prior,
            },
        )
        .await;

    assert!(!has_errors(&response.diagnostics));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn update_mutability_only_makes_one_call() {
    let fake = FakeEcr::new().with_repository("svc-a");
    let resource = configured_resource(fake.clone()).await;

    let prior = managed_prior_state("svc-a");
    let mut planned = prior.clone();
    planned
        .set_string(
            &AttributePath::new("image_tag_mutability"),
            "IMMUTABLE".to_string(),
        )
        .unwrap();

    let response = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                config: planned.clone(),
                prior_state: prior,
                planned_state: planned,
            },
        )
        .await;

    assert!(!has_errors(&response.diagnostics));
    assert_eq!(fake.calls(), vec!["put_mutability"]);
    assert_eq!(
        response
            .new_state
            .get_string(&AttributePath::new("image_tag_mutability"))
            .unwrap(),
        "IMMUTABLE"
    );
}

#[tokio::test]
async fn update_scanning_only_makes_one_call() {
    let fake = FakeEcr::new().with_repository("svc-a");
    let resource = configured_resource(fake.clone()).await;

    let prior = managed_prior_state("svc-a");
    let mut planned = prior.clone();
    planned
        .set_raw(
            &AttributePath::new("image_scanning_configuration"),
            scanning_block(true),
        )
        .unwrap();

    let response = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                config: planned.clone(),
                prior_state: prior,
                planned_state: planned,
            },
        )
        .await;

    assert!(!has_errors(&response.diagnostics));
    assert_eq!(fake.calls(), vec!["put_scanning"]);
}

#[tokio::test]
async fn update_both_groups_makes_two_calls() {
    let fake = FakeEcr::new().with_repository("svc-a");
    let resource = configured_resource(fake.clone()).await;

    let prior = managed_prior_state("svc-a");
    let mut planned = prior.clone();
    planned
        .set_string(
            &AttributePath::new("image_tag_mutability"),
            "IMMUTABLE".to_string(),
        )
        .unwrap();
    planned
        .set_raw(
            &AttributePath::new("image_scanning_configuration"),
            scanning_block(true),
        )
        .unwrap();

    let response = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                config: planned.clone(),
                prior_state: prior,
                planned_state: planned,
            },
        )
        .await;

    assert!(!has_errors(&response.diagnostics));
    assert_eq!(fake.calls(), vec!["put_mutability", "put_scanning"]);
}

#[tokio::test]
async fn update_treats_empty_scanning_list_as_unchanged() {
    let fake = FakeEcr::new().with_repository("svc-a");
    let resource = configured_resource(fake.clone()).await;

    let prior = managed_prior_state("svc-a");
    let mut planned = prior.clone();
    planned
        .set_raw(
            &AttributePath::new("image_scanning_configuration"),
            Dynamic::List(vec![]),
        )
        .unwrap();

    let response = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                config: planned.clone(),
                prior_state: prior,
                planned_state: planned,
            },
        )
        .await;

    assert!(!has_errors(&response.diagnostics));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn update_failure_keeps_prior_state() {
    let fake = FakeEcr::failing("put_mutability");
    let resource = configured_resource(fake.clone()).await;

    let prior = managed_prior_state("svc-a");
    let mut planned = prior.clone();
    planned
        .set_string(
            &AttributePath::new("image_tag_mutability"),
            "IMMUTABLE".to_string(),
        )
        .unwrap();

    let response = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                config: planned.clone(),
                prior_state: prior.clone(),
                planned_state: planned,
            },
        )
        .await;

    assert!(has_errors(&response.diagnostics));
    assert_eq!(response.new_state, prior);
}

#[tokio::test]
async fn delete_passes_force_flag() {
    let fake = FakeEcr::new().with_repository("svc-a");
    let resource = configured_resource(fake.clone()).await;

    let mut prior = managed_prior_state("svc-a");
    prior
        .set_bool(&AttributePath::new("force_delete"), true)
        .unwrap();

    let response = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                prior_state: prior,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty());
    assert_eq!(fake.calls(), vec!["delete"]);
    assert!(fake.repos.lock().unwrap().is_empty());
}

#[tokio::test]
async fn delete_of_missing_repository_is_an_error() {
    let fake = FakeEcr::new();
    let resource = configured_resource(fake.clone()).await;

    let response = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                prior_state: managed_prior_state("svc-a"),
            },
        )
        .await;

    assert!(has_errors(&response.diagnostics));
}

#[tokio::test]
async fn delete_failure_reports_diagnostic() {
    let fake = FakeEcr::failing("delete");
    let resource = configured_resource(fake.clone()).await;

    let response = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                prior_state: managed_prior_state("svc-a"),
            },
        )
        .await;

    assert!(has_errors(&response.diagnostics));
}

#[tokio::test]
async fn import_maps_id_to_state() {
    let fake = FakeEcr::new();
    let resource = configured_resource(fake.clone()).await;

    let response = resource
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: "awsextra_ecr_repository".to_string(),
                id: "svc-a".to_string(),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty());
    assert_eq!(response.imported_resources.len(), 1);
    assert_eq!(
        response.imported_resources[0]
            .state
            .get_string(&AttributePath::new("id"))
            .unwrap(),
        "svc-a"
    );
}
